//! Small text helpers shared by the parser and the checkers.

use std::borrow::Cow;

const TAB_WIDTH: usize = 8;

/// Replace tabs with spaces, using tab stops every eight columns.
pub fn expand_tabs(line: &str) -> Cow<'_, str> {
    if !line.contains('\t') {
        return Cow::Borrowed(line);
    }
    let mut expanded = String::with_capacity(line.len() + TAB_WIDTH);
    let mut column = 0;
    for c in line.chars() {
        match c {
            '\t' => {
                let pad = TAB_WIDTH - column % TAB_WIDTH;
                expanded.extend(std::iter::repeat_n(' ', pad));
                column += pad;
            }
            '\n' | '\r' => {
                expanded.push(c);
                column = 0;
            }
            _ => {
                expanded.push(c);
                column += 1;
            }
        }
    }
    Cow::Owned(expanded)
}

pub fn strip_byte_order_mark(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Collapse whitespace and lowercase, the way reference and target names are compared.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tabs_uses_tab_stops() {
        assert_eq!(expand_tabs("a\tb"), "a       b");
        assert_eq!(expand_tabs("\tx"), "        x");
        assert_eq!(expand_tabs("abcdefgh\tx"), "abcdefgh        x");
    }

    #[test]
    fn test_expand_tabs_borrows_when_unchanged() {
        assert!(matches!(expand_tabs("no tabs"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_expand_tabs_resets_column_after_newline() {
        assert_eq!(expand_tabs("ab\n\tc"), "ab\n        c");
    }

    #[test]
    fn test_strip_byte_order_mark() {
        assert_eq!(strip_byte_order_mark("\u{feff}Title"), "Title");
        assert_eq!(strip_byte_order_mark("Title"), "Title");
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Read   the\nDocs "), "read the docs");
    }
}
