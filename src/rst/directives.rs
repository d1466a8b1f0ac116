//! Directive and role lookup for one parse.
//!
//! A [`DirectiveTable`] is built per document check and handed to the parser, so
//! documents checked concurrently never share registration state.

use super::extension::ExtensionSchema;
use std::collections::HashSet;

/// How a code directive shapes its literal block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStyle {
    /// `language` attribute, anchored at the end of the directive.
    Literal,
    /// `language` plus the extension's own attributes, anchored at the directive line.
    Extension,
    /// No `language` attribute; the language is carried in the class list.
    Classes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Code(CodeStyle),
    /// Content is parsed as document body.
    Body,
    /// Known, but the content is not parsed.
    Opaque,
    /// Defines a custom interpreted text role.
    Role,
    Ignored,
    Unknown,
}

/// Argument and option layout of a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveSpec {
    pub required_arguments: usize,
    pub optional_arguments: usize,
    pub final_argument_whitespace: bool,
    pub has_options: bool,
}

impl DirectiveSpec {
    const fn new(required_arguments: usize, optional_arguments: usize, final_argument_whitespace: bool) -> Self {
        Self {
            required_arguments,
            optional_arguments,
            final_argument_whitespace,
            has_options: true,
        }
    }

    pub fn takes_arguments(&self) -> bool {
        self.required_arguments + self.optional_arguments > 0
    }
}

const CODE: DirectiveSpec = DirectiveSpec::new(0, 1, false);
const NO_ARGUMENTS: DirectiveSpec = DirectiveSpec::new(0, 0, false);
const TITLED: DirectiveSpec = DirectiveSpec::new(1, 0, true);
const OPTIONAL_TITLE: DirectiveSpec = DirectiveSpec::new(0, 1, true);

pub const CODE_DIRECTIVES: [&str; 3] = ["code", "code-block", "sourcecode"];

pub const CODE_OPTIONS: &[&str] = &[
    "linenos",
    "lineno-start",
    "number-lines",
    "emphasize-lines",
    "caption",
    "name",
    "class",
    "dedent",
    "force",
];

const ADMONITIONS: &[&str] = &[
    "attention",
    "caution",
    "danger",
    "error",
    "hint",
    "important",
    "note",
    "tip",
    "warning",
];

const OPAQUE_DIRECTIVES: &[&str] = &[
    "image",
    "include",
    "raw",
    "math",
    "rubric",
    "line-block",
    "parsed-literal",
    "table",
    "csv-table",
    "list-table",
    "contents",
    "sectnum",
    "section-numbering",
    "header",
    "footer",
    "target-notes",
    "meta",
    "replace",
    "unicode",
    "date",
    "class",
    "default-role",
    "title",
];

const STANDARD_ROLES: &[&str] = &[
    "abbreviation",
    "ab",
    "acronym",
    "ac",
    "code",
    "emphasis",
    "literal",
    "math",
    "pep-reference",
    "pep",
    "rfc-reference",
    "rfc",
    "strong",
    "subscript",
    "sub",
    "superscript",
    "sup",
    "title-reference",
    "title",
    "t",
];

#[derive(Debug, Clone, Default)]
pub struct DirectiveTable {
    ignored_directives: HashSet<String>,
    ignored_roles: HashSet<String>,
    extension: Option<&'static ExtensionSchema>,
}

impl DirectiveTable {
    pub fn new<D, R>(ignored_directives: D, ignored_roles: R, extension: bool) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let extension = extension.then(ExtensionSchema::sphinx);
        if let Some(schema) = extension {
            log::debug!(
                "[rstcheck-parser] Extension schema enabled ({} directives, {} roles)",
                schema.directive_names().count(),
                schema.role_names().count()
            );
        }
        Self {
            ignored_directives: ignored_directives
                .into_iter()
                .map(|name| name.as_ref().to_lowercase())
                .collect(),
            ignored_roles: ignored_roles
                .into_iter()
                .map(|name| name.as_ref().to_lowercase())
                .collect(),
            extension,
        }
    }

    pub fn extension_enabled(&self) -> bool {
        self.extension.is_some()
    }

    pub fn directive(&self, name: &str) -> (DirectiveKind, DirectiveSpec) {
        let name = name.to_lowercase();
        if self.ignored_directives.contains(&name) {
            return (DirectiveKind::Ignored, OPTIONAL_TITLE);
        }
        if CODE_DIRECTIVES.contains(&name.as_str()) {
            let style = match (self.extension_enabled(), name.as_str()) {
                (false, _) => CodeStyle::Literal,
                (true, "code") => CodeStyle::Classes,
                (true, _) => CodeStyle::Extension,
            };
            return (DirectiveKind::Code(style), CODE);
        }
        if let Some(schema) = self.extension
            && name != "include"
            && schema.has_directive(&name)
        {
            return (DirectiveKind::Ignored, OPTIONAL_TITLE);
        }
        if ADMONITIONS.contains(&name.as_str()) {
            return (DirectiveKind::Body, NO_ARGUMENTS);
        }
        match name.as_str() {
            "admonition" | "topic" | "figure" => (DirectiveKind::Body, TITLED),
            "sidebar" | "container" => (DirectiveKind::Body, OPTIONAL_TITLE),
            "compound" | "epigraph" | "highlights" | "pull-quote" => (DirectiveKind::Body, NO_ARGUMENTS),
            "role" => (DirectiveKind::Role, TITLED),
            other if OPAQUE_DIRECTIVES.contains(&other) => (DirectiveKind::Opaque, OPTIONAL_TITLE),
            _ => (DirectiveKind::Unknown, OPTIONAL_TITLE),
        }
    }

    pub fn is_known_role(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.ignored_roles.contains(&name)
            || STANDARD_ROLES.contains(&name.as_str())
            || self.extension.is_some_and(|schema| schema.has_role(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(extension: bool) -> DirectiveTable {
        DirectiveTable::new(["custom"], ["myrole"], extension)
    }

    #[test]
    fn test_code_directives_without_extension() {
        let table = table(false);
        for name in CODE_DIRECTIVES {
            assert_eq!(table.directive(name).0, DirectiveKind::Code(CodeStyle::Literal));
        }
    }

    #[test]
    fn test_code_directives_with_extension() {
        let table = table(true);
        assert_eq!(table.directive("code").0, DirectiveKind::Code(CodeStyle::Classes));
        assert_eq!(table.directive("code-block").0, DirectiveKind::Code(CodeStyle::Extension));
        assert_eq!(table.directive("sourcecode").0, DirectiveKind::Code(CodeStyle::Extension));
    }

    #[test]
    fn test_ignored_directive_wins_over_code() {
        let table = DirectiveTable::new(["code-block"], Vec::<String>::new(), false);
        assert_eq!(table.directive("code-block").0, DirectiveKind::Ignored);
    }

    #[test]
    fn test_directive_lookup_is_case_insensitive() {
        let table = table(false);
        assert_eq!(table.directive("NOTE").0, DirectiveKind::Body);
        assert_eq!(table.directive("Custom").0, DirectiveKind::Ignored);
    }

    #[test]
    fn test_unknown_and_schema_directives() {
        assert_eq!(table(false).directive("toctree").0, DirectiveKind::Unknown);
        assert_eq!(table(true).directive("toctree").0, DirectiveKind::Ignored);
        assert_eq!(table(true).directive("include").0, DirectiveKind::Opaque);
        assert_eq!(table(true).directive("note").0, DirectiveKind::Body);
    }

    #[test]
    fn test_roles() {
        assert!(table(false).is_known_role("strong"));
        assert!(table(false).is_known_role("MyRole"));
        assert!(!table(false).is_known_role("ref"));
        assert!(table(true).is_known_role("ref"));
        assert!(table(true).is_known_role("py:class"));
    }
}
