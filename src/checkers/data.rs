//! Structured data formats.
//!
//! Parser errors carry their position as `line N` in the message; the line is read
//! back from the text so both formats report the same way.

use crate::diagnostic::Diagnostic;
use regex::Regex;
use std::sync::LazyLock;

static LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"line\s+([0-9]+)[^:]*$").unwrap());

fn diagnostic_from_message(message: String) -> Diagnostic {
    let line = LINE_REGEX
        .captures(&message)
        .and_then(|captures| captures[1].parse().ok())
        .unwrap_or(0);
    Diagnostic::new(line, message)
}

pub fn check_json(code: &str) -> Vec<Diagnostic> {
    match serde_json::from_str::<serde_json::Value>(code) {
        Ok(_) => Vec::new(),
        Err(error) => vec![diagnostic_from_message(error.to_string())],
    }
}

pub fn check_xml(code: &str) -> Vec<Diagnostic> {
    match roxmltree::Document::parse(code) {
        Ok(_) => Vec::new(),
        Err(error) => {
            let position = error.pos();
            let message = format!("{error}: line {}, column {}", position.row.max(1), position.col);
            vec![diagnostic_from_message(message)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_json() {
        assert!(check_json("{\"a\": 1}").is_empty());
    }

    #[test]
    fn test_invalid_json_reports_line() {
        let diagnostics = check_json("{\n  \"a\": 1,\n  \"b\": }\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 3);
        assert!(diagnostics[0].message.contains("line 3"));
    }

    #[test]
    fn test_unterminated_json() {
        let diagnostics = check_json("{\"a\": 1");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 1);
    }

    #[test]
    fn test_valid_xml() {
        assert!(check_xml("<a>text</a>").is_empty());
    }

    #[test]
    fn test_invalid_xml() {
        let diagnostics = check_xml("<a>\n  <b>text</c>\n</a>");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 2);
    }

    #[test]
    fn test_unclosed_xml() {
        let diagnostics = check_xml("<a>text");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].line >= 1);
    }

    #[test]
    fn test_message_without_line_maps_to_zero() {
        assert_eq!(diagnostic_from_message("broken".to_string()).line, 0);
    }
}
