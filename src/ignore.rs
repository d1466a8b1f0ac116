//! What a document check leaves alone.
//!
//! An [`IgnoreSet`] starts from the configured values and is extended by
//! `.. rstcheck: key=value` comments found in the document itself.

use fancy_regex::Regex as FancyRegex;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static RSTCHECK_COMMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\.\. rstcheck:").unwrap());

/// A malformed `.. rstcheck:` comment. `line` is 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommentError {
    #[error("Expected \"key=value\" syntax")]
    Syntax { line: usize },
    #[error("Unknown rstcheck comment key: \"{key}\"")]
    UnknownKey { key: String, line: usize },
}

impl CommentError {
    pub fn line(&self) -> usize {
        match self {
            Self::Syntax { line } | Self::UnknownKey { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    pub languages: BTreeSet<String>,
    /// Parser messages matching this pattern are dropped.
    pub messages: Option<FancyRegex>,
    pub directives: BTreeSet<String>,
    pub roles: BTreeSet<String>,
    pub substitutions: BTreeSet<String>,
}

/// Split a comma-separated list, dropping empty entries.
pub fn split_comma_separated(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl IgnoreSet {
    /// Blocks without a language are never checked.
    pub fn is_language_ignored(&self, language: Option<&str>) -> bool {
        language.is_none_or(|language| self.languages.contains(language))
    }

    pub fn is_message_ignored(&self, message: &str) -> bool {
        self.messages
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(message).unwrap_or(false))
    }

    /// Apply every `.. rstcheck:` comment in `source`, stopping at the first malformed one.
    ///
    /// Values read before the error stay applied.
    pub fn apply_comments(&mut self, source: &str) -> Result<(), CommentError> {
        for (index, line) in source.lines().enumerate() {
            let Some(found) = RSTCHECK_COMMENT_REGEX.find(line) else {
                continue;
            };
            let line_number = index + 1;
            let parts: Vec<&str> = line[found.end()..].trim().split('=').collect();
            let [key, value] = parts.as_slice() else {
                return Err(CommentError::Syntax { line: line_number });
            };
            let target = match key.trim() {
                "ignore-language" | "ignore-languages" => &mut self.languages,
                "ignore-directives" => &mut self.directives,
                "ignore-roles" => &mut self.roles,
                "ignore-substitutions" => &mut self.substitutions,
                other => {
                    return Err(CommentError::UnknownKey {
                        key: other.to_string(),
                        line: line_number,
                    });
                }
            };
            log::debug!("[rstcheck-ignore] Line {line_number}: {} += {value}", key.trim());
            target.extend(split_comma_separated(value));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untyped_blocks_are_always_ignored() {
        let ignore = IgnoreSet::default();
        assert!(ignore.is_language_ignored(None));
        assert!(!ignore.is_language_ignored(Some("python")));
    }

    #[test]
    fn test_comments_extend_languages() {
        let mut ignore = IgnoreSet::default();
        let source = "Example\n=======\n\n.. rstcheck: ignore-language=cpp,json\n\n.. rstcheck: ignore-language=python\n";
        ignore.apply_comments(source).unwrap();
        let languages: Vec<&str> = ignore.languages.iter().map(String::as_str).collect();
        assert_eq!(languages, ["cpp", "json", "python"]);
    }

    #[test]
    fn test_comments_extend_other_lists() {
        let mut ignore = IgnoreSet::default();
        ignore
            .apply_comments(".. rstcheck: ignore-directives=foo, bar\n.. rstcheck: ignore-roles=baz\n.. rstcheck: ignore-substitutions=qux,\n")
            .unwrap();
        assert!(ignore.directives.contains("foo") && ignore.directives.contains("bar"));
        assert!(ignore.roles.contains("baz"));
        assert_eq!(ignore.substitutions.len(), 1);
    }

    #[test]
    fn test_comment_without_value() {
        let mut ignore = IgnoreSet::default();
        let error = ignore.apply_comments("Text\n\n.. rstcheck: ignore-language\n").unwrap_err();
        assert_eq!(error, CommentError::Syntax { line: 3 });
        assert_eq!(error.to_string(), "Expected \"key=value\" syntax");
    }

    #[test]
    fn test_comment_with_unknown_key_stops_scanning() {
        let mut ignore = IgnoreSet::default();
        let source = ".. rstcheck: ignore-language=c\n.. rstcheck: colour=blue\n.. rstcheck: ignore-language=cpp\n";
        let error = ignore.apply_comments(source).unwrap_err();
        assert_eq!(error.line(), 2);
        assert_eq!(error.to_string(), "Unknown rstcheck comment key: \"colour\"");
        assert!(ignore.languages.contains("c"));
        assert!(!ignore.languages.contains("cpp"));
    }

    #[test]
    fn test_message_pattern_supports_lookaround() {
        let ignore = IgnoreSet {
            messages: Some(FancyRegex::new(r"Title (?!underline)").unwrap()),
            ..IgnoreSet::default()
        };
        assert!(ignore.is_message_ignored("(SEVERE/4) Title level inconsistent:"));
        assert!(!ignore.is_message_ignored("(WARNING/2) Title underline too short."));
    }
}
