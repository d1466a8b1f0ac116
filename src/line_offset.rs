//! Mapping checker-local line numbers back onto the document.
//!
//! The parser anchors a code block to a line that is usually not the block's first
//! line. Where the anchor lands depends on how the block was produced, so the first
//! line is reconstructed from the anchor, the block length and the surrounding text.

/// How the code block reached the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockForm {
    /// A full code directive carrying its own `language` attribute.
    Directive,
    /// Anything else: the `code` class form or a native doctest block.
    Generic,
}

/// A block of code found in a document, ready to be handed to a checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRegion {
    pub text: String,
    pub language: String,
    pub form: BlockForm,
    /// Line reported by the parser for the node.
    pub anchor_line: usize,
    /// Number of attributes explicitly set on the node.
    pub attribute_count: usize,
}

/// Extension-mode code blocks are reported one line late.
const EXTENSION_CODE_BLOCK_DELTA: isize = -1;

impl CodeRegion {
    /// The document line holding the first line of the code.
    ///
    /// The result may be off for unusual layouts and is not clamped; callers clamp the
    /// final diagnostic line instead.
    pub fn first_line(&self, document: &str, extension: bool) -> isize {
        let lines: Vec<&str> = document.lines().collect();
        let anchor = self.anchor_line as isize;

        if extension && self.form == BlockForm::Directive {
            let attributes = self.attribute_count as isize;
            let leading = lines
                .iter()
                .skip(self.anchor_line)
                .position(|line| !line.is_empty())
                .unwrap_or(0) as isize;
            return anchor + attributes - 1 + leading - 1 + EXTENSION_CODE_BLOCK_DELTA;
        }

        let code_length = self.text.lines().count() as isize;
        let anchor_is_text = self
            .anchor_line
            .checked_sub(1)
            .and_then(|index| lines.get(index))
            .is_some_and(|line| !line.trim().is_empty());
        if anchor_is_text {
            return anchor - code_length + 1;
        }

        // Walk back over blank lines the parser counted into the block.
        let mut line_number = anchor;
        for candidate in (2..=self.anchor_line).rev() {
            line_number = candidate as isize;
            if lines.get(candidate - 2).is_some_and(|line| !line.trim().is_empty()) {
                break;
            }
        }
        line_number - code_length
    }
}

/// Document line for a checker-local line, clamped to `0..=line_count`.
pub fn resolve_line(first_line: isize, local_line: usize, line_count: usize) -> usize {
    let resolved = first_line + local_line as isize - 1;
    resolved.clamp(0, line_count as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(text: &str, form: BlockForm, anchor_line: usize, attribute_count: usize) -> CodeRegion {
        CodeRegion {
            text: text.to_string(),
            language: "python".to_string(),
            form,
            anchor_line,
            attribute_count,
        }
    }

    #[test]
    fn test_anchor_on_last_code_line() {
        let document = "Intro\n\n.. code:: python\n\n    a\n    b\n    c";
        let region = region("a\nb\nc", BlockForm::Generic, 7, 1);
        assert_eq!(region.first_line(document, false), 5);
    }

    #[test]
    fn test_walks_back_over_trailing_blank_lines() {
        let document = ".. code:: python\n\n    a\n    b\n    c\n\n\nAfter";
        let region = region("a\nb\nc", BlockForm::Generic, 7, 1);
        assert_eq!(region.first_line(document, false), 3);
    }

    #[test]
    fn test_extension_directive_regime() {
        let document = ".. code-block:: python\n\n   x = (\n";
        let region = region("x = (", BlockForm::Directive, 1, 4);
        assert_eq!(region.first_line(document, true), 3);
    }

    #[test]
    fn test_directive_uses_generic_regime_without_extension() {
        let document = ".. code-block:: python\n\n   x = (\n   y\n";
        let region = region("x = (\ny", BlockForm::Directive, 4, 2);
        assert_eq!(region.first_line(document, false), 3);
    }

    #[test]
    fn test_resolve_line_clamps() {
        assert_eq!(resolve_line(3, 2, 10), 4);
        assert_eq!(resolve_line(-4, 1, 10), 0);
        assert_eq!(resolve_line(9, 5, 10), 10);
    }
}
