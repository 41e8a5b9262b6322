//! In-process stylesheet and markup minification.
//!
//! CSS goes through lightningcss (parse → minify → print), HTML through
//! minify-html. Both are pure functions of their input: no I/O happens here.

use lightningcss::error::Error as CssError;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use minify_html::Cfg;
use std::path::Path;

use super::Minifier;
use crate::events::EventBus;
use crate::output::min_file_name;
use crate::{Bundle, CssOptions, HtmlOptions, MinificationError, MinificationOutcome, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Css,
    Html,
}

/// In-process minifier for stylesheets and markup.
#[derive(Debug, Clone)]
pub struct StyleMarkupMinifier {
    mode: Mode,
}

impl StyleMarkupMinifier {
    /// Stylesheet mode.
    pub fn css() -> Self {
        Self { mode: Mode::Css }
    }

    /// Markup mode.
    pub fn html() -> Self {
        Self { mode: Mode::Html }
    }
}

impl Minifier for StyleMarkupMinifier {
    fn name(&self) -> &'static str {
        match self.mode {
            Mode::Css => "lightningcss",
            Mode::Html => "minify-html",
        }
    }

    fn minify(
        &self,
        bundle: &Bundle,
        target: &Path,
        _events: &EventBus,
    ) -> Result<MinificationOutcome> {
        let file_name = target.to_string_lossy();
        let (code, errors) = match self.mode {
            Mode::Css => minify_css(&bundle.output, &file_name, &bundle.minify.css),
            Mode::Html => minify_html(&bundle.output, &bundle.minify.html, &file_name),
        };

        let mut outcome = MinificationOutcome::new(min_file_name(target));
        if errors.is_empty() {
            outcome.content = Some(code);
        } else {
            outcome.errors = errors;
        }
        Ok(outcome)
    }
}

/// Minify a stylesheet.
///
/// Returns the minified text and any errors. The text is empty when errors
/// were reported.
///
/// # Example
///
/// ```
/// use squeeze::CssOptions;
/// use squeeze::minifier::minify_css;
///
/// let (code, errors) = minify_css(".a {\n  color: red;\n}", "site.css", &CssOptions::default());
/// assert!(errors.is_empty());
/// assert_eq!(code, ".a{color:red}");
/// ```
pub fn minify_css(
    text: &str,
    file_name: &str,
    options: &CssOptions,
) -> (String, Vec<MinificationError>) {
    let parser_options = ParserOptions {
        filename: file_name.to_string(),
        error_recovery: options.error_recovery,
        ..ParserOptions::default()
    };

    let mut stylesheet = match StyleSheet::parse(text, parser_options) {
        Ok(stylesheet) => stylesheet,
        Err(err) => return (String::new(), vec![css_error(file_name, &err)]),
    };

    if let Err(err) = stylesheet.minify(MinifyOptions::default()) {
        return (String::new(), vec![css_error(file_name, &err)]);
    }

    match stylesheet.to_css(PrinterOptions {
        minify: true,
        ..PrinterOptions::default()
    }) {
        Ok(result) => (result.code, Vec::new()),
        Err(err) => (String::new(), vec![css_error(file_name, &err)]),
    }
}

/// Minify an HTML document.
///
/// minify-html does not report errors; the only failure is output that is not
/// valid UTF-8.
pub fn minify_html(
    text: &str,
    options: &HtmlOptions,
    file_name: &str,
) -> (String, Vec<MinificationError>) {
    let cfg = Cfg {
        keep_comments: options.keep_comments,
        keep_closing_tags: options.keep_closing_tags,
        minify_css: options.minify_css,
        minify_js: options.minify_js,
        ..Cfg::default()
    };

    match String::from_utf8(minify_html::minify(text.as_bytes(), &cfg)) {
        Ok(code) => (code, Vec::new()),
        Err(err) => (
            String::new(),
            vec![MinificationError::new(file_name, err.to_string(), 0, 0)],
        ),
    }
}

// lightningcss lines are 0-based and columns 1-based.
fn css_error<T: std::fmt::Display>(file_name: &str, err: &CssError<T>) -> MinificationError {
    let (line, column) = err
        .loc
        .as_ref()
        .map(|loc| (loc.line + 1, loc.column.saturating_sub(1)))
        .unwrap_or((0, 0));
    MinificationError::new(file_name, err.kind.to_string(), line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_basic_css() {
        let (code, errors) = minify_css(".a { color: red; }", "site.css", &CssOptions::default());
        assert!(errors.is_empty());
        assert_eq!(code.trim(), ".a{color:red}");
    }

    #[test]
    fn test_minify_css_shrinks_output() {
        let css = "body {\n  color: red;\n  background: blue;\n}\n\n.b {\n  margin: 0px;\n}\n";
        let (code, errors) = minify_css(css, "site.css", &CssOptions::default());
        assert!(errors.is_empty());
        assert!(code.len() < css.len());
        assert!(code.contains("color"));
        assert!(code.contains("background"));
    }

    #[test]
    fn test_malformed_css_reports_position() {
        let css = ".a { color: red; }\n.{ }";
        let (code, errors) = minify_css(css, "site.css", &CssOptions::default());
        assert!(code.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].file_name, "site.css");
        assert!(errors[0].line > 0);
        assert!(!errors[0].message.is_empty());
    }

    #[test]
    fn test_error_recovery_skips_invalid_rules() {
        let css = ".a { color: red; }\n.{ }";
        let options = CssOptions {
            error_recovery: true,
        };
        let (code, errors) = minify_css(css, "site.css", &options);
        assert!(errors.is_empty());
        assert!(code.contains(".a{color:red}"));
    }

    #[test]
    fn test_minify_html() {
        let html = "<html>\n  <body>\n    <!-- banner -->\n    <p>  hello   world  </p>\n  </body>\n</html>\n";
        let (code, errors) = minify_html(html, &HtmlOptions::default(), "index.html");
        assert!(errors.is_empty());
        assert!(code.len() < html.len());
        assert!(code.contains("hello world"));
        assert!(!code.contains("banner"));
    }

    #[test]
    fn test_minify_html_keeps_comments_when_asked() {
        let html = "<div><!-- keep me --><span>x</span></div>";
        let options = HtmlOptions {
            keep_comments: true,
            ..HtmlOptions::default()
        };
        let (code, errors) = minify_html(html, &options, "index.html");
        assert!(errors.is_empty());
        assert!(code.contains("keep me"));
    }

    #[test]
    fn test_strategy_names_min_file() {
        let bundle = Bundle::new("/site", "css/site.css").content("a { color: red; }");
        let outcome = StyleMarkupMinifier::css()
            .minify(&bundle, Path::new("/site/css/site.css"), &EventBus::new())
            .unwrap();
        assert_eq!(outcome.file_name, Path::new("/site/css/site.min.css"));
        assert_eq!(outcome.content.as_deref(), Some("a{color:red}"));
    }
}
