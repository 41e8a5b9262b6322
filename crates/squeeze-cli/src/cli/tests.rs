#[cfg(test)]
mod tests {
    use crate::cli::validation::parse_jobs;
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_parse_jobs() {
        assert_eq!(parse_jobs("4"), Ok(4));
        assert_eq!(parse_jobs(" 2 "), Ok(2));
        assert!(parse_jobs("0").is_err());
        assert!(parse_jobs("-1").is_err());
        assert!(parse_jobs("many").is_err());
    }

    #[test]
    fn test_build_defaults() {
        let cli = Cli::try_parse_from(["squeeze", "build"]).unwrap();
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert!(args.config.is_none());
        assert!(args.bundles.is_empty());
        assert!(args.jobs.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_build_with_filters() {
        let cli = Cli::try_parse_from([
            "squeeze",
            "build",
            "--config",
            "web/bundleconfig.json",
            "-b",
            "css/site.css",
            "--bundle",
            "js/app.js",
            "--jobs",
            "3",
        ])
        .unwrap();
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.config, Some(PathBuf::from("web/bundleconfig.json")));
        assert_eq!(
            args.bundles,
            vec![PathBuf::from("css/site.css"), PathBuf::from("js/app.js")]
        );
        assert_eq!(args.jobs, Some(3));
    }

    #[test]
    fn test_zero_jobs_rejected() {
        assert!(Cli::try_parse_from(["squeeze", "build", "--jobs", "0"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["squeeze", "clean", "--quiet", "--no-color"]).unwrap();
        assert!(cli.quiet);
        assert!(cli.no_color);
        assert!(matches!(cli.command, Command::Clean(_)));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["squeeze", "-v", "-q", "build"]).is_err());
    }

    #[test]
    fn test_warm_runtime_args() {
        let cli = Cli::try_parse_from([
            "squeeze",
            "warm",
            "--runtime-archive",
            "runtime.tar.gz",
            "--cache-dir",
            ".cache",
        ])
        .unwrap();
        let Command::Warm(args) = cli.command else {
            panic!("expected warm");
        };
        assert_eq!(args.runtime.runtime_archive, Some(PathBuf::from("runtime.tar.gz")));
        assert_eq!(args.runtime.cache_dir, Some(PathBuf::from(".cache")));
    }
}
