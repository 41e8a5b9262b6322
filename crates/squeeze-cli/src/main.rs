//! squeeze - entry point: argument parsing, logging setup and command dispatch.

use clap::Parser;
use miette::Result;
use squeeze_cli::{cli, commands, error, logger, ui};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init(args.no_color, args.quiet);

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args),
        cli::Command::Clean(clean_args) => commands::clean_execute(clean_args),
        cli::Command::Warm(warm_args) => commands::warm_execute(warm_args),
    };

    result.map_err(error::cli_error_to_miette)
}
