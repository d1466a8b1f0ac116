//! Directive and role names contributed by the Sphinx documentation toolchain.
//!
//! Documents written for Sphinx use these freely; without the schema they would be
//! reported as unknown. Domain names are available both bare (`function`) and
//! prefixed (`py:function`), except for the standard domain which is bare only.

use std::collections::HashSet;
use std::sync::LazyLock;

const GENERAL_DIRECTIVES: &[&str] = &[
    "toctree",
    "versionadded",
    "versionchanged",
    "versionremoved",
    "deprecated",
    "seealso",
    "centered",
    "hlist",
    "highlight",
    "literalinclude",
    "code-block",
    "sourcecode",
    "index",
    "only",
    "tabularcolumns",
    "sectionauthor",
    "moduleauthor",
    "codeauthor",
    "acks",
    "default-domain",
    "math",
    "include",
];

const STD_DIRECTIVES: &[&str] = &[
    "program",
    "option",
    "cmdoption",
    "envvar",
    "glossary",
    "productionlist",
    "describe",
    "object",
];

const STD_ROLES: &[&str] = &[
    "ref", "doc", "term", "keyword", "option", "envvar", "token", "download", "numref", "abbr", "command", "dfn",
    "file", "guilabel", "kbd", "mailheader", "makevar", "manpage", "menuselection", "mimetype", "newsgroup",
    "program", "regexp", "samp", "pep", "rfc", "any", "math", "eq", "index",
];

struct Domain {
    name: &'static str,
    directives: &'static [&'static str],
    roles: &'static [&'static str],
}

const DOMAINS: &[Domain] = &[
    Domain {
        name: "c",
        directives: &[
            "member",
            "var",
            "function",
            "macro",
            "struct",
            "union",
            "enum",
            "enumerator",
            "type",
            "alias",
            "namespace",
            "namespace-push",
            "namespace-pop",
        ],
        roles: &[
            "member",
            "data",
            "var",
            "func",
            "macro",
            "struct",
            "union",
            "enum",
            "enumerator",
            "type",
            "expr",
            "texpr",
        ],
    },
    Domain {
        name: "cpp",
        directives: &[
            "class",
            "struct",
            "function",
            "member",
            "var",
            "type",
            "concept",
            "enum",
            "enum-struct",
            "enum-class",
            "enumerator",
            "union",
            "alias",
            "namespace",
            "namespace-push",
            "namespace-pop",
        ],
        roles: &[
            "any",
            "class",
            "struct",
            "union",
            "func",
            "member",
            "var",
            "type",
            "concept",
            "enum",
            "enumerator",
            "expr",
            "texpr",
        ],
    },
    Domain {
        name: "js",
        directives: &["function", "method", "class", "data", "attribute", "module"],
        roles: &["func", "meth", "class", "data", "attr", "mod"],
    },
    Domain {
        name: "py",
        directives: &[
            "module",
            "currentmodule",
            "function",
            "data",
            "class",
            "exception",
            "method",
            "classmethod",
            "staticmethod",
            "attribute",
            "property",
            "decorator",
            "decoratormethod",
            "type",
        ],
        roles: &["data", "exc", "func", "class", "const", "attr", "meth", "mod", "obj", "type"],
    },
];

static SPHINX: LazyLock<ExtensionSchema> = LazyLock::new(ExtensionSchema::build);

#[derive(Debug)]
pub struct ExtensionSchema {
    directives: HashSet<String>,
    roles: HashSet<String>,
}

impl ExtensionSchema {
    pub fn sphinx() -> &'static Self {
        &SPHINX
    }

    fn build() -> Self {
        let mut directives: HashSet<String> = GENERAL_DIRECTIVES
            .iter()
            .chain(STD_DIRECTIVES)
            .map(|name| name.to_string())
            .collect();
        let mut roles: HashSet<String> = STD_ROLES.iter().map(|name| name.to_string()).collect();
        for domain in DOMAINS {
            for directive in domain.directives {
                directives.insert(directive.to_string());
                directives.insert(format!("{}:{directive}", domain.name));
            }
            for role in domain.roles {
                roles.insert(role.to_string());
                roles.insert(format!("{}:{role}", domain.name));
            }
        }
        Self { directives, roles }
    }

    pub fn has_directive(&self, name: &str) -> bool {
        self.directives.contains(name)
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.contains(name)
    }

    pub fn directive_names(&self) -> impl Iterator<Item = &str> {
        self.directives.iter().map(String::as_str)
    }

    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }
}
