//! Finding checkable code while the document tree is walked.

use crate::checkers::{CheckContext, CheckError, CheckerKind, PreparedCheck};
use crate::diagnostic::Diagnostic;
use crate::line_offset::{BlockForm, CodeRegion, resolve_line};
use crate::rst::{DoctestBlock, LiteralBlock, Node, NodeVisitor, Paragraph, Reporter, Walk};
use regex::Regex;
use std::sync::LazyLock;

static MARKDOWN_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]+\]\([^\)]+\)").unwrap());

/// A prepared check together with where its code starts in the document.
#[derive(Debug)]
pub struct DeferredCheck {
    pub language: &'static str,
    pub first_line: isize,
    check: PreparedCheck,
}

impl DeferredCheck {
    /// Run the check and move its diagnostics onto document lines.
    pub fn run(self, line_count: usize) -> Result<Vec<Diagnostic>, CheckError> {
        let Self {
            language,
            first_line,
            check,
        } = self;
        let diagnostics = check
            .run()?
            .into_iter()
            .map(|diagnostic| {
                Diagnostic::new(
                    resolve_line(first_line, diagnostic.line, line_count),
                    format!("({language}) {}", diagnostic.message),
                )
            })
            .collect();
        Ok(diagnostics)
    }
}

/// Collects a [`DeferredCheck`] for every code block worth checking.
pub struct CheckVisitor<'a> {
    document: &'a str,
    context: CheckContext<'a>,
    checks: Vec<DeferredCheck>,
}

impl<'a> CheckVisitor<'a> {
    /// `document` is the text line numbers are resolved against.
    pub fn new(document: &'a str, context: CheckContext<'a>) -> Self {
        Self {
            document,
            context,
            checks: Vec::new(),
        }
    }

    pub fn into_checks(self) -> Vec<DeferredCheck> {
        self.checks
    }

    fn literal_block(&mut self, block: &LiteralBlock) -> Result<(), CheckError> {
        let (language, form) = match block.language.as_deref().filter(|language| !language.is_empty()) {
            Some(language) => (language, BlockForm::Directive),
            None if block.classes.iter().any(|class| class == "code") => match block.classes.last() {
                Some(class) => (class.as_str(), BlockForm::Generic),
                None => return Ok(()),
            },
            None => return Ok(()),
        };
        if self.context.ignore.is_language_ignored(Some(language)) {
            log::debug!("[rstcheck-visitor] Skipping ignored {language} block at line {}", block.line);
            return Ok(());
        }

        let is_doctest = language == "doctest" || (language == "python" && block.text.trim_start().starts_with(">>> "));
        let kind = if is_doctest {
            if self.context.ignore.is_language_ignored(Some("doctest")) {
                return Ok(());
            }
            CheckerKind::Doctest
        } else {
            let Some(kind) = CheckerKind::for_language(language) else {
                log::debug!("[rstcheck-visitor] No checker for {language} block at line {}", block.line);
                return Ok(());
            };
            kind
        };

        let region = CodeRegion {
            text: block.text.clone(),
            language: language.to_string(),
            form,
            anchor_line: block.line,
            attribute_count: block.attributes.len(),
        };
        self.defer(kind, &region)
    }

    fn doctest_block(&mut self, block: &DoctestBlock) -> Result<(), CheckError> {
        if self.context.ignore.is_language_ignored(Some("doctest")) {
            return Ok(());
        }
        let region = CodeRegion {
            text: block.text.clone(),
            language: "doctest".to_string(),
            form: BlockForm::Generic,
            anchor_line: block.line,
            attribute_count: 0,
        };
        self.defer(CheckerKind::Doctest, &region)
    }

    fn defer(&mut self, kind: CheckerKind, region: &CodeRegion) -> Result<(), CheckError> {
        let first_line = region.first_line(self.document, self.context.extension);
        log::debug!(
            "[rstcheck-visitor] Checking {} block ({} lines) from line {first_line}",
            kind.language(),
            region.text.lines().count()
        );
        let check = kind.prepare(&region.text, &self.context)?;
        self.checks.push(DeferredCheck {
            language: kind.language(),
            first_line,
            check,
        });
        Ok(())
    }

    fn paragraph(paragraph: &Paragraph, reporter: &mut Reporter) {
        if MARKDOWN_LINK_REGEX.is_match(&paragraph.text) {
            reporter.warning(paragraph.line, "(rst) Link is formatted in Markdown style.");
        }
    }
}

impl NodeVisitor for CheckVisitor<'_> {
    type Error = CheckError;

    fn visit(&mut self, node: &Node, reporter: &mut Reporter) -> Result<Walk, Self::Error> {
        match node {
            Node::LiteralBlock(block) => {
                self.literal_block(block)?;
                Ok(Walk::SkipChildren)
            }
            Node::DoctestBlock(block) => {
                self.doctest_block(block)?;
                Ok(Walk::SkipChildren)
            }
            Node::Paragraph(paragraph) => {
                Self::paragraph(paragraph, reporter);
                Ok(Walk::Continue)
            }
            _ => Ok(Walk::Continue),
        }
    }
}
