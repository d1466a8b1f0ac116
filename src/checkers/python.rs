//! Python syntax, checked in process.

use crate::diagnostic::Diagnostic;
use rustpython_parser::{Parse, ast};

/// Parse `code` as a Python module and report the first syntax error.
pub fn check(code: &str) -> Vec<Diagnostic> {
    match ast::Suite::parse(code, "<string>") {
        Ok(_) => Vec::new(),
        Err(error) => {
            let offset = (u32::from(error.offset) as usize).min(code.len());
            let line = code.as_bytes()[..offset].iter().filter(|&&byte| byte == b'\n').count() + 1;
            vec![Diagnostic::new(line, error.error.to_string())]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_code() {
        assert!(check("x = 1\n\ndef f(a):\n    return a * 2\n").is_empty());
    }

    #[test]
    fn test_unclosed_paren() {
        let diagnostics = check("x = (");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 1);
    }

    #[test]
    fn test_error_line_is_counted_from_offset() {
        let diagnostics = check("a = 1\nb = 2\nprint(\"x\" 1)\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, 3);
    }
}
