use pretty_assertions::assert_eq;
use rstcheck_lib::{CheckOptions, Diagnostic, IgnoreSet, check_source};

fn lines(source: &str) -> Vec<usize> {
    check(source).iter().map(|diagnostic| diagnostic.line).collect()
}

fn check(source: &str) -> Vec<Diagnostic> {
    check_source(source, &CheckOptions::default()).expect("check should run")
}

#[test]
fn test_valid_and_invalid_fragments() {
    for (language, valid, invalid) in [
        ("json", "{\"a\": 1}", "{\"a\": 1"),
        ("xml", "<a>text</a>", "<a>text"),
        ("python", "x = 1", "x = ("),
    ] {
        let document = |code: &str| format!(".. code-block:: {language}\n\n    {code}\n");
        assert!(check(&document(valid)).is_empty(), "{language}");

        let diagnostics = check(&document(invalid));
        assert_eq!(diagnostics.len(), 1, "{language}: {diagnostics:?}");
        assert!(diagnostics[0].line > 0, "{language}");
        assert!(diagnostics[0].message.starts_with(&format!("({language}) ")));
    }
}

#[test]
fn test_line_points_into_the_block() {
    let source = "\
Heading
=======

Intro text.

.. code-block:: python

    def f():
        return (

Outro.
";
    let found = lines(source);
    assert_eq!(found.len(), 1, "{found:?}");
    assert!((9..=10).contains(&found[0]), "{found:?}");
}

#[test]
fn test_generic_literal_block_with_class() {
    let source = "\
Heading
=======

.. code:: json

    {
      \"a\": 1,
    }
";
    let diagnostics = check(source);
    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
    assert!(diagnostics[0].message.starts_with("(json) "));
    assert!((5..=8).contains(&diagnostics[0].line), "{diagnostics:?}");
}

#[test]
fn test_untyped_literal_block_is_not_checked() {
    assert!(check("Example::\n\n    x = (\n").is_empty());
}

#[test]
fn test_doctest_block_structure() {
    assert!(check(">>> x = (\n").is_empty());
    let diagnostics = check(">>> print(1)\n>>>print(2)\n");
    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
    assert!(diagnostics[0].message.starts_with("(doctest) "));
}

#[test]
fn test_markdown_link_warning() {
    let diagnostics = check("Read [the docs](https://example.com) first.\n");
    assert_eq!(
        diagnostics,
        [Diagnostic::new(1, "(WARNING/2) (rst) Link is formatted in Markdown style.")]
    );
}

#[test]
fn test_ignore_set_from_options() {
    let mut ignore = IgnoreSet::default();
    ignore.directives.insert("automodule".to_string());
    ignore.roles.insert("py:func".to_string());
    let options = CheckOptions {
        ignore,
        ..CheckOptions::default()
    };
    let source = ".. automodule:: package\n\nCall :py:func:`main`.\n";
    assert_eq!(check_source(source, &options).unwrap(), []);
}

#[test]
fn test_comment_directives() {
    let source = "\
.. rstcheck: ignore-directives=automodule
.. rstcheck: ignore-roles=func

.. automodule:: package

Call :func:`main`.
";
    assert!(check(source).is_empty());
}

#[test]
fn test_extension_mode() {
    let source = "Contents\n========\n\n.. toctree::\n   :maxdepth: 2\n\n   intro\n";
    assert!(!check(source).is_empty());

    let options = CheckOptions {
        extension: true,
        ..CheckOptions::default()
    };
    assert_eq!(check_source(source, &options).unwrap(), []);
}
