//! reStructuredText parsing.
//!
//! [`publish`] parses a document, walks the resulting tree with a [`NodeVisitor`] and
//! returns the system messages in the order they were raised: parse messages, then
//! unresolved references, then anything the visitor reported.

mod blocks;
pub mod directives;
pub mod extension;
mod inline;
pub mod nodes;
pub mod reporter;

pub use directives::{CodeStyle, DirectiveKind, DirectiveTable};
pub use extension::ExtensionSchema;
pub use nodes::{
    Container, ContainerKind, DoctestBlock, Document, LiteralBlock, Node, NodeVisitor, Paragraph, Section, Walk,
    walk,
};
pub use reporter::{InvalidReportLevel, Level, ReportLevel, Reporter};

use std::collections::BTreeSet;

/// Everything the parser needs besides the text.
#[derive(Debug, Clone, Copy)]
pub struct ParserSettings<'a> {
    /// Label used in front of every system message.
    pub source_path: &'a str,
    pub report_level: ReportLevel,
    pub directives: &'a DirectiveTable,
    /// Substitution names that are never reported as undefined.
    pub ignored_substitutions: &'a BTreeSet<String>,
}

/// Parse `source` into a document tree plus the reporter holding the parse messages.
pub fn parse(source: &str, settings: &ParserSettings<'_>) -> (Document, Reporter) {
    blocks::Parser::new(settings).parse_document(source)
}

/// Parse `source`, walk it with `visitor` and return all system messages.
pub fn publish<V: NodeVisitor>(
    source: &str,
    settings: &ParserSettings<'_>,
    visitor: &mut V,
) -> Result<Vec<String>, V::Error> {
    let (document, mut reporter) = parse(source, settings);
    log::debug!(
        "[rstcheck-parser] Parsed {} into {} top-level nodes",
        settings.source_path,
        document.children.len()
    );
    walk(&document.children, visitor, &mut reporter)?;
    Ok(reporter.into_messages())
}
