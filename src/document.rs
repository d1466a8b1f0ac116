//! Checking one document.

use crate::checkers::{CheckContext, Toolchain};
use crate::diagnostic::{Diagnostic, parse_gcc_style_message};
use crate::ignore::IgnoreSet;
use crate::rst::{self, DirectiveTable, ParserSettings, ReportLevel};
use crate::text::strip_byte_order_mark;
use crate::visitor::CheckVisitor;
use std::path::{Path, PathBuf};

pub use crate::checkers::CheckError;

/// How to check a document.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Label used in parser messages. Also locates the directory external tools run in.
    pub filename: String,
    pub report_level: ReportLevel,
    pub ignore: IgnoreSet,
    /// Enable the Sphinx directive and role schema.
    pub extension: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            filename: "<string>".to_string(),
            report_level: ReportLevel::Info,
            ignore: IgnoreSet::default(),
            extension: false,
        }
    }
}

/// Directory holding `filename`, resolved the way the file system sees it.
///
/// Names that do not exist on disk, such as `-` or `<string>`, resolve to the
/// current directory.
pub fn document_directory(filename: &str) -> PathBuf {
    let path = Path::new(filename);
    let resolved = path
        .canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf());
    resolved
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Check `source` and return its diagnostics in discovery order.
///
/// A malformed `.. rstcheck:` comment comes first, then problems found in code blocks
/// in document order, then the parser's own messages. Line numbers refer to `source`.
pub fn check_source(source: &str, options: &CheckOptions) -> Result<Vec<Diagnostic>, CheckError> {
    let mut diagnostics = Vec::new();

    let mut ignore = options.ignore.clone();
    if let Err(error) = ignore.apply_comments(source) {
        diagnostics.push(Diagnostic::new(error.line(), error.to_string()));
    }

    let directives = DirectiveTable::new(&ignore.directives, &ignore.roles, options.extension);
    let toolchain = Toolchain::from_env();
    let working_directory = document_directory(&options.filename);
    let context = CheckContext {
        working_directory: &working_directory,
        toolchain: &toolchain,
        ignore: &ignore,
        extension: options.extension,
    };
    let settings = ParserSettings {
        source_path: &options.filename,
        report_level: options.report_level,
        directives: &directives,
        ignored_substitutions: &ignore.substitutions,
    };

    let mut visitor = CheckVisitor::new(source, context);
    let messages = rst::publish(strip_byte_order_mark(source), &settings, &mut visitor)?;

    let line_count = source.lines().count();
    for check in visitor.into_checks() {
        diagnostics.extend(check.run(line_count)?);
    }

    diagnostics.extend(
        messages
            .iter()
            .filter(|message| !ignore.is_message_ignored(message))
            .filter_map(|message| parse_gcc_style_message(message, &options.filename, false)),
    );
    log::debug!("[rstcheck-check] {}: {} diagnostics", options.filename, diagnostics.len());
    Ok(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn check(source: &str) -> Vec<Diagnostic> {
        check_source(source, &CheckOptions::default()).unwrap()
    }

    #[test]
    fn test_clean_document() {
        assert!(check("Title\n=====\n\nJust text.\n").is_empty());
    }

    #[test]
    fn test_code_block_errors_are_anchored() {
        let source = "Example\n=======\n\n.. code-block:: python\n\n    x = (\n\nAfter.\n";
        assert_eq!(check(source).iter().map(|d| d.line).collect::<Vec<_>>(), [6]);
    }

    #[test]
    fn test_valid_code_blocks() {
        let source = ".. code-block:: json\n\n    {\"a\": 1}\n\n.. code-block:: xml\n\n    <a>text</a>\n\n.. code-block:: python\n\n    x = 1\n";
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_comment_ignores_language() {
        let source = ".. rstcheck: ignore-language=json\n\n.. code-block:: json\n\n    {\n";
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_malformed_comment_is_first() {
        let source = "Title\n====\n\n.. rstcheck: ignore-language\n";
        let diagnostics = check(source);
        assert_eq!(diagnostics[0], Diagnostic::new(4, "Expected \"key=value\" syntax"));
        assert_eq!(diagnostics[1], Diagnostic::new(2, "(WARNING/2) Title underline too short."));
    }

    #[test]
    fn test_ignore_messages_only_filters_parser_messages() {
        let options = CheckOptions {
            ignore: IgnoreSet {
                messages: Some(fancy_regex::Regex::new("Title underline|json").unwrap()),
                ..IgnoreSet::default()
            },
            ..CheckOptions::default()
        };
        let source = "Title\n====\n\n.. code-block:: json\n\n    {\n";
        let diagnostics = check_source(source, &options).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.starts_with("(json) "));
    }

    #[test]
    fn test_doctest_checks_structure_only() {
        let source = ".. code-block:: python\n\n    >>> x = (\n    >>> print(\n";
        assert!(check(source).is_empty());
    }

    #[test]
    fn test_nested_rst_is_reanchored() {
        let source = "Outer\n=====\n\n.. code-block:: rst\n\n    Inner\n    ====\n\nAfter.\n";
        let diagnostics = check(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 7);
        assert_eq!(diagnostics[0].message, "(rst) (WARNING/2) Title underline too short.");
    }

    #[test]
    fn test_checking_twice_is_identical() {
        let source = "Title\n===\n\n.. code-block:: json\n\n    {\n\nSee [x](y).\n";
        assert_eq!(check(source), check(source));
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        assert!(check("\u{feff}Title\n=====\n").is_empty());
    }
}
