use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

mod common;
use common::{BAD_JSON_DOCUMENT, CLEAN_DOCUMENT, write_file};

#[test]
fn test_clean_file_succeeds() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let file = write_file(dir.path(), "good.rst", CLEAN_DOCUMENT);

    cargo_bin_cmd!("rstcheck")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Success! No issues detected."))
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_issues_exit_with_one() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let file = write_file(dir.path(), "bad.rst", BAD_JSON_DOCUMENT);
    let name = file.display().to_string();

    cargo_bin_cmd!("rstcheck")
        .arg(&name)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Error! Issues detected."))
        .stderr(predicate::str::starts_with(format!("{name}:")))
        .stderr(predicate::str::contains("(ERROR/3) (json) "));
}

#[test]
fn test_parser_warning_keeps_its_tag() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let file = write_file(dir.path(), "title.rst", "Title\n====\n");
    let name = file.display().to_string();

    cargo_bin_cmd!("rstcheck")
        .arg(&name)
        .assert()
        .code(1)
        .stderr(predicate::str::contains(format!(
            "{name}:2: (WARNING/2) Title underline too short."
        )));
}

#[test]
fn test_report_level_hides_warnings() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let file = write_file(dir.path(), "title.rst", "Title\n====\n");

    cargo_bin_cmd!("rstcheck").args(["--report", "error"]).arg(&file).assert().success();
}

#[test]
fn test_invalid_report_level_is_a_usage_error() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let file = write_file(dir.path(), "good.rst", CLEAN_DOCUMENT);

    cargo_bin_cmd!("rstcheck").args(["--report", "loud"]).arg(&file).assert().code(2);
}

#[test]
fn test_invalid_ignore_messages_is_a_usage_error() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let file = write_file(dir.path(), "good.rst", CLEAN_DOCUMENT);

    cargo_bin_cmd!("rstcheck")
        .args(["--ignore-messages", "(unclosed"])
        .arg(&file)
        .assert()
        .code(2);
}

#[test]
fn test_ignore_language_and_alias() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let file = write_file(dir.path(), "bad.rst", BAD_JSON_DOCUMENT);

    for flag in ["--ignore-language", "--ignore"] {
        cargo_bin_cmd!("rstcheck")
            .args([flag, "cpp,json"])
            .arg(&file)
            .assert()
            .success();
    }
}

#[test]
fn test_ignore_messages() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let file = write_file(dir.path(), "title.rst", "Title\n====\n");

    cargo_bin_cmd!("rstcheck")
        .args(["--ignore-messages", "Title underline"])
        .arg(&file)
        .assert()
        .success();
}

#[test]
fn test_stdin() {
    cargo_bin_cmd!("rstcheck")
        .arg("-")
        .write_stdin(BAD_JSON_DOCUMENT)
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("-:"));

    cargo_bin_cmd!("rstcheck")
        .arg("-")
        .write_stdin(CLEAN_DOCUMENT)
        .assert()
        .success();
}

#[test]
fn test_stdin_must_be_alone() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let file = write_file(dir.path(), "good.rst", CLEAN_DOCUMENT);

    cargo_bin_cmd!("rstcheck")
        .arg(&file)
        .arg("-")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("'-' is only allowed without additional files."));
}

#[test]
fn test_missing_file_is_reported() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let missing = dir.path().join("missing.rst").display().to_string();

    cargo_bin_cmd!("rstcheck")
        .arg(&missing)
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with(format!("{missing}: ")));
}

#[test]
fn test_output_follows_argument_order() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let names: Vec<String> = (0..6)
        .map(|index| {
            write_file(dir.path(), &format!("doc{index}.rst"), "Title\n====\n")
                .display()
                .to_string()
        })
        .collect();

    let output = cargo_bin_cmd!("rstcheck").args(&names).output().expect("Failed to run rstcheck");
    let stderr = String::from_utf8_lossy(&output.stderr);
    let files: Vec<&str> = stderr.lines().filter_map(|line| line.split(":2: ").next()).collect();
    assert_eq!(files, names);
}

#[test]
fn test_recursive_directory() {
    let dir = tempdir().expect("Failed to create temporary directory");
    write_file(dir.path(), "index.rst", CLEAN_DOCUMENT);
    write_file(dir.path(), "guide/bad.rst", BAD_JSON_DOCUMENT);
    write_file(dir.path(), "guide/notes.txt", "not checked");

    cargo_bin_cmd!("rstcheck")
        .arg("-r")
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("bad.rst:"))
        .stderr(predicate::str::contains("index.rst").not());
}

#[test]
fn test_sphinx_flag_accepts_sphinx_directives() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let file = write_file(dir.path(), "index.rst", "Contents\n========\n\n.. toctree::\n\n   intro\n");

    cargo_bin_cmd!("rstcheck")
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown directive type \"toctree\"."));

    cargo_bin_cmd!("rstcheck").arg("--sphinx").arg(&file).assert().success();
}

#[test]
fn test_version() {
    cargo_bin_cmd!("rstcheck")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_files_are_required() {
    cargo_bin_cmd!("rstcheck").assert().code(2);
}
