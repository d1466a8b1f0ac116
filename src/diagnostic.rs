//! Diagnostics and the message formats they are parsed from.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static SEVERITY_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\([A-Z]+/[0-9]+\)").unwrap());

/// A problem found in a document.
///
/// `line` is 1-indexed. Checkers produce diagnostics relative to the code block they
/// checked; once re-anchored, `line` refers to the document as passed to the check.
/// `0` means the location is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    /// Whether the message starts with a severity tag such as `(WARNING/2)`.
    pub fn has_severity_tag(&self) -> bool {
        SEVERITY_TAG_REGEX.is_match(&self.message)
    }

    /// The message as printed: untagged messages are reported as errors.
    pub fn tagged_message(&self) -> String {
        if self.has_severity_tag() {
            self.message.clone()
        } else {
            format!("(ERROR/3) {}", self.message)
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.line, self.tagged_message())
    }
}

/// Parse a compiler-style `path:line[:column]:message` line.
///
/// Returns `None` when the line does not belong to `path` or has no numeric line field.
pub fn parse_gcc_style_message(message: &str, path: &str, has_column: bool) -> Option<Diagnostic> {
    let rest = message.strip_prefix(path)?.strip_prefix(':')?;
    let fields = if has_column { 3 } else { 2 };
    let parts: Vec<&str> = rest.splitn(fields, ':').collect();
    if parts.len() != fields {
        return None;
    }
    let line = parts[0].trim().parse().ok()?;
    Some(Diagnostic::new(line, parts[fields - 1].trim()))
}
