//! Document tree and traversal.
//!
//! Every node records a `line`. For paragraphs and titles it is the first line of the
//! text; for literal and doctest blocks it is the line the parser anchors the block
//! to, which is usually not where the code starts.

use super::reporter::Reporter;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Section(Section),
    Paragraph(Paragraph),
    LiteralBlock(LiteralBlock),
    DoctestBlock(DoctestBlock),
    Container(Container),
    Directive { name: String, line: usize },
    SubstitutionDefinition { name: String, line: usize },
    Table { line: usize },
    LineBlock { line: usize },
    Target { line: usize },
    Comment { line: usize },
    Transition { line: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub level: usize,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub line: usize,
}

/// Preformatted text, either from `::` or from a code directive.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralBlock {
    pub text: String,
    /// Set by code directives that declare a language attribute.
    pub language: Option<String>,
    pub classes: Vec<String>,
    pub line: usize,
    /// Attributes set explicitly on the node.
    pub attributes: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoctestBlock {
    pub text: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub kind: ContainerKind,
    pub line: usize,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerKind {
    BlockQuote,
    ListItem,
    Definition,
    FieldBody,
    Footnote,
    Directive(String),
}

impl Node {
    pub fn line(&self) -> usize {
        match self {
            Self::Section(section) => section.line,
            Self::Paragraph(paragraph) => paragraph.line,
            Self::LiteralBlock(block) => block.line,
            Self::DoctestBlock(block) => block.line,
            Self::Container(container) => container.line,
            Self::Directive { line, .. }
            | Self::SubstitutionDefinition { line, .. }
            | Self::Table { line }
            | Self::LineBlock { line }
            | Self::Target { line }
            | Self::Comment { line }
            | Self::Transition { line } => *line,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Self::Container(container) => &container.children,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub children: Vec<Node>,
}

/// What a visitor wants after seeing a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Continue,
    SkipChildren,
}

/// Observer attached to a parse. Visiting may add messages to the reporter.
pub trait NodeVisitor {
    type Error;

    fn visit(&mut self, node: &Node, reporter: &mut Reporter) -> Result<Walk, Self::Error>;
}

/// Visit `nodes` depth-first in document order.
pub fn walk<V: NodeVisitor>(nodes: &[Node], visitor: &mut V, reporter: &mut Reporter) -> Result<(), V::Error> {
    for node in nodes {
        if visitor.visit(node, reporter)? == Walk::Continue {
            walk(node.children(), visitor, reporter)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rst::ReportLevel;

    struct LineCollector {
        lines: Vec<usize>,
        skip_containers: bool,
    }

    impl NodeVisitor for LineCollector {
        type Error = std::convert::Infallible;

        fn visit(&mut self, node: &Node, _reporter: &mut Reporter) -> Result<Walk, Self::Error> {
            self.lines.push(node.line());
            if self.skip_containers && matches!(node, Node::Container(_)) {
                return Ok(Walk::SkipChildren);
            }
            Ok(Walk::Continue)
        }
    }

    fn tree() -> Vec<Node> {
        vec![
            Node::Paragraph(Paragraph {
                text: "intro".to_string(),
                line: 1,
            }),
            Node::Container(Container {
                kind: ContainerKind::BlockQuote,
                line: 3,
                children: vec![Node::Paragraph(Paragraph {
                    text: "quoted".to_string(),
                    line: 3,
                })],
            }),
            Node::Transition { line: 5 },
        ]
    }

    #[test]
    fn test_walk_visits_in_document_order() {
        let mut reporter = Reporter::new("<string>", ReportLevel::Info);
        let mut visitor = LineCollector {
            lines: Vec::new(),
            skip_containers: false,
        };
        walk(&tree(), &mut visitor, &mut reporter).unwrap();
        assert_eq!(visitor.lines, vec![1, 3, 3, 5]);
    }

    #[test]
    fn test_walk_honours_skip_children() {
        let mut reporter = Reporter::new("<string>", ReportLevel::Info);
        let mut visitor = LineCollector {
            lines: Vec::new(),
            skip_containers: true,
        };
        walk(&tree(), &mut visitor, &mut reporter).unwrap();
        assert_eq!(visitor.lines, vec![1, 3, 5]);
    }
}
