//! Inline markup scanning and reference resolution.
//!
//! Only what can produce a system message is recognised: start-strings without
//! end-strings, interpreted text roles, hyperlink references, inline targets and
//! substitution references.

use super::blocks::{Parser, Pending};
use crate::text::normalize_name;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

const START_PREFIX: &str = "'\"([{<-/:";
const END_SUFFIX: &str = "'\")]}>-/:.,;!?\\";
const QUOTE_PAIRS: [(char, char); 6] = [('\'', '\''), ('"', '"'), ('(', ')'), ('[', ']'), ('{', '}'), ('<', '>')];

static PREFIX_ROLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([A-Za-z0-9](?:[-_.+:]?[A-Za-z0-9])*):`").unwrap());
static SUFFIX_ROLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([A-Za-z0-9](?:[-_.+:]?[A-Za-z0-9])*):").unwrap());
static EMBEDDED_URI_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)^(.*?)\s*<([^<>]+)>$").unwrap());
static URI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:https?|ftp|sftp|file)://[^\s<>]*[^\s<>.,;:!?'")\]}]|mailto:[^\s<>]+|[\w.+-]+@[\w-]+(?:\.[\w-]+)+"#)
        .unwrap()
});
static SIMPLE_REFERENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}](?:[-_.+:]?[\p{L}\p{N}])*(__?)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Markup {
    Literal,
    Strong,
    Emphasis,
    Interpreted,
    InlineTarget,
    Substitution,
}

impl Markup {
    fn end_string(self) -> &'static str {
        match self {
            Self::Literal => "``",
            Self::Strong => "**",
            Self::Emphasis => "*",
            Self::Interpreted | Self::InlineTarget => "`",
            Self::Substitution => "|",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Strong => "strong",
            Self::Emphasis => "emphasis",
            Self::Interpreted => "interpreted text or phrase reference",
            Self::InlineTarget => "target",
            Self::Substitution => "substitution_reference",
        }
    }

    /// Whether a reference suffix (`_` or `__`) may follow the end-string.
    fn takes_reference_suffix(self) -> bool {
        matches!(self, Self::Interpreted | Self::InlineTarget | Self::Substitution)
    }
}

/// A start-string found at the scan position.
struct Start {
    markup: Markup,
    length: usize,
    role: Option<String>,
}

fn start_string(rest: &str) -> Option<Start> {
    let (markup, length) = if rest.starts_with("``") {
        (Markup::Literal, 2)
    } else if rest.starts_with("**") {
        (Markup::Strong, 2)
    } else if rest.starts_with('*') {
        (Markup::Emphasis, 1)
    } else if rest.starts_with("_`") {
        (Markup::InlineTarget, 2)
    } else if rest.starts_with('`') {
        (Markup::Interpreted, 1)
    } else if rest.starts_with('|') {
        (Markup::Substitution, 1)
    } else {
        let captures = PREFIX_ROLE_REGEX.captures(rest)?;
        return Some(Start {
            markup: Markup::Interpreted,
            length: captures.get(0)?.end(),
            role: Some(captures[1].to_string()),
        });
    };
    Some(Start {
        markup,
        length,
        role: None,
    })
}

fn is_start_boundary(text: &str, position: usize, length: usize) -> bool {
    let before = text[..position].chars().next_back();
    let after = text[position + length..].chars().next();
    let Some(after) = after.filter(|c| !c.is_whitespace()) else {
        return false;
    };
    match before {
        None => true,
        Some(before) if before.is_whitespace() => true,
        Some(before) if START_PREFIX.contains(before) => {
            !QUOTE_PAIRS.iter().any(|(open, close)| *open == before && *close == after)
        }
        Some(_) => false,
    }
}

fn is_end_boundary(after: Option<char>, markup: Markup) -> bool {
    match after {
        None => true,
        Some(c) => {
            c.is_whitespace() || END_SUFFIX.contains(c) || (c == '_' && markup.takes_reference_suffix())
        }
    }
}

/// Byte offset of the end-string closing the markup whose content starts at `from`.
fn find_end(text: &str, from: usize, markup: Markup) -> Option<usize> {
    let end_string = markup.end_string();
    let mut position = from;
    while position < text.len() {
        let rest = &text[position..];
        let c = rest.chars().next()?;
        if c == '\\' && markup != Markup::Literal {
            position += c.len_utf8() + rest[1..].chars().next().map_or(0, char::len_utf8);
            continue;
        }
        if position > from && rest.starts_with(end_string) {
            let before = text[..position].chars().next_back();
            let after = text[position + end_string.len()..].chars().next();
            if before.is_some_and(|b| !b.is_whitespace()) && is_end_boundary(after, markup) {
                return Some(position);
            }
        }
        position += c.len_utf8();
    }
    None
}

fn overlaps(ranges: &[Range<usize>], range: &Range<usize>) -> bool {
    ranges
        .iter()
        .any(|covered| covered.start < range.end && range.start < covered.end)
}

impl Parser<'_> {
    /// Scan one text element. Messages are reported at `line`, the element's first line.
    pub(super) fn scan_inline(&mut self, text: &str, line: usize) {
        let uris: Vec<Range<usize>> = URI_REGEX.find_iter(text).map(|m| m.range()).collect();
        let mut covered = uris.clone();
        let mut position = 0;
        while position < text.len() {
            if let Some(uri) = uris.iter().find(|uri| uri.start == position) {
                position = uri.end;
                continue;
            }
            let rest = &text[position..];
            let Some(c) = rest.chars().next() else { break };
            if c == '\\' {
                position += c.len_utf8() + rest[1..].chars().next().map_or(0, char::len_utf8);
                continue;
            }
            let Some(start) = start_string(rest).filter(|start| is_start_boundary(text, position, start.length)) else {
                position += c.len_utf8();
                continue;
            };
            let content_start = position + start.length;
            match find_end(text, content_start, start.markup) {
                Some(end) => {
                    let content = &text[content_start..end];
                    let span_end = self.inline_element(text, &start, content, end, line);
                    covered.push(position..span_end);
                    position = span_end;
                }
                None => {
                    self.reporter.warning(
                        line,
                        format!("Inline {} start-string without end-string.", start.markup.description()),
                    );
                    position = content_start;
                }
            }
        }
        self.simple_references(text, &covered, line);
    }

    /// Record a complete inline element and return the offset just past it.
    fn inline_element(&mut self, text: &str, start: &Start, content: &str, end: usize, line: usize) -> usize {
        let mut span_end = end + start.markup.end_string().len();
        let after = &text[span_end..];
        let reference = if after.starts_with("__") {
            Some(true)
        } else if after.starts_with('_') {
            Some(false)
        } else {
            None
        };
        match start.markup {
            Markup::Interpreted => {
                let mut role = start.role.clone();
                let mut anonymous = None;
                if role.is_none() {
                    if let Some(captures) = SUFFIX_ROLE_REGEX.captures(after) {
                        role = Some(captures[1].to_string());
                        span_end += captures[0].len();
                    } else if let Some(is_anonymous) = reference {
                        anonymous = Some(is_anonymous);
                        span_end += if is_anonymous { 2 } else { 1 };
                    }
                }
                if let Some(role) = role {
                    self.check_role(&role, line);
                } else if let Some(anonymous) = anonymous {
                    self.phrase_reference(content, anonymous, line);
                }
            }
            Markup::InlineTarget => {
                self.targets.insert(normalize_name(content));
            }
            Markup::Substitution => {
                self.pending_substitutions.push(Pending {
                    name: content.split_whitespace().collect::<Vec<_>>().join(" "),
                    line,
                });
                if let Some(anonymous) = reference {
                    span_end += if anonymous { 2 } else { 1 };
                    if !anonymous {
                        self.pending_references.push(Pending {
                            name: normalize_name(content),
                            line,
                        });
                    }
                }
            }
            Markup::Literal | Markup::Strong | Markup::Emphasis => {}
        }
        span_end
    }

    fn phrase_reference(&mut self, content: &str, anonymous: bool, line: usize) {
        if let Some(captures) = EMBEDDED_URI_REGEX.captures(content) {
            let label = captures[1].trim();
            let target = captures[2].trim();
            match target.strip_suffix('_').filter(|alias| !alias.ends_with('\\')) {
                Some(alias) => self.pending_references.push(Pending {
                    name: normalize_name(alias),
                    line,
                }),
                None if anonymous => {}
                None if label.is_empty() => {
                    self.targets.insert(normalize_name(target));
                }
                None => {
                    self.targets.insert(normalize_name(label));
                }
            }
        } else if !anonymous {
            self.pending_references.push(Pending {
                name: normalize_name(content),
                line,
            });
        }
    }

    fn check_role(&mut self, role: &str, line: usize) {
        let name = role.to_lowercase();
        if self.directives.is_known_role(&name) || self.custom_roles.contains(&name) {
            return;
        }
        self.reporter.info(
            line,
            format!(
                "No role entry for \"{role}\" in module \"docutils.parsers.rst.languages.en\". \
                 Trying \"{role}\" as canonical role name."
            ),
        );
        self.reporter
            .error(line, format!("Unknown interpreted text role \"{role}\"."));
    }

    fn simple_references(&mut self, text: &str, covered: &[Range<usize>], line: usize) {
        for captures in SIMPLE_REFERENCE_REGEX.captures_iter(text) {
            let (Some(whole), Some(suffix)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            if suffix.len() == 2 || overlaps(covered, &whole.range()) {
                continue;
            }
            let before = text[..whole.start()].chars().next_back();
            let after = text[whole.end()..].chars().next();
            let starts_word = before.is_none_or(|c| c.is_whitespace() || START_PREFIX.contains(c));
            let ends_word = after.is_none_or(|c| c.is_whitespace() || END_SUFFIX.contains(c));
            if starts_word && ends_word {
                self.pending_references.push(Pending {
                    name: normalize_name(&text[whole.start()..suffix.start()]),
                    line,
                });
            }
        }
    }

    /// Report references left without a definition once the whole document is known.
    pub(super) fn resolve_references(&mut self) {
        for pending in std::mem::take(&mut self.pending_substitutions) {
            let key = normalize_name(&pending.name);
            let ignored = self
                .ignored_substitutions
                .iter()
                .any(|name| normalize_name(name) == key);
            if !ignored && !self.substitutions.contains(&key) {
                self.reporter.error(
                    pending.line,
                    format!("Undefined substitution referenced: \"{}\".", pending.name),
                );
            }
        }
        for pending in std::mem::take(&mut self.pending_references) {
            if !self.targets.contains(&pending.name) {
                self.reporter
                    .error(pending.line, format!("Unknown target name: \"{}\".", pending.name));
            }
        }
    }
}
