//! Syntax checkers for code found in documents.
//!
//! Each supported language maps to a [`CheckerKind`]. Preparing a check does the
//! expensive, non-blocking part (writing the temporary file and starting the external
//! tool); running it collects the diagnostics, numbered from the first line of the code.

pub mod data;
pub mod doctest;
pub mod process;
pub mod python;
pub mod toolchain;

use crate::diagnostic::{Diagnostic, parse_gcc_style_message};
use crate::document::{CheckOptions, check_source};
use crate::ignore::IgnoreSet;
use crate::rst::ReportLevel;
use process::{ProcessCheck, ToolFailure};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;
pub use toolchain::Toolchain;

/// A checker that could not do its job. Syntax errors in the code are not errors here.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Failed to write temporary file: {source}")]
    Artifact { source: std::io::Error },
    #[error("Failed to run '{tool}': {source}")]
    Spawn { tool: String, source: std::io::Error },
    #[error("Failed to wait for '{tool}': {source}")]
    Wait { tool: String, source: std::io::Error },
    #[error("Invalid {variable}: {source}")]
    Flags {
        variable: &'static str,
        source: shell_words::ParseError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckerKind {
    Bash,
    C,
    Cpp,
    Doctest,
    Json,
    Python,
    Rst,
    Xml,
}

static CHECKERS: LazyLock<HashMap<&'static str, CheckerKind>> = LazyLock::new(|| {
    HashMap::from([
        ("bash", CheckerKind::Bash),
        ("c", CheckerKind::C),
        ("cpp", CheckerKind::Cpp),
        ("doctest", CheckerKind::Doctest),
        ("json", CheckerKind::Json),
        ("python", CheckerKind::Python),
        ("rst", CheckerKind::Rst),
        ("xml", CheckerKind::Xml),
    ])
});

/// What a checker may need besides the code.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    /// Directory of the document, used as the external tool's working directory.
    pub working_directory: &'a Path,
    pub toolchain: &'a Toolchain,
    /// Effective ignore set of the enclosing document, for nested documents.
    pub ignore: &'a IgnoreSet,
    pub extension: bool,
}

impl CheckerKind {
    /// The checker registered for `language`. Unsupported languages are not checked.
    pub fn for_language(language: &str) -> Option<Self> {
        CHECKERS.get(language).copied()
    }

    pub fn language(self) -> &'static str {
        match self {
            Self::Bash => "bash",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Doctest => "doctest",
            Self::Json => "json",
            Self::Python => "python",
            Self::Rst => "rst",
            Self::Xml => "xml",
        }
    }

    /// Prepare a check of `code`. External tools are started right away.
    pub fn prepare(self, code: &str, context: &CheckContext<'_>) -> Result<PreparedCheck, CheckError> {
        let directory = context.working_directory;
        let prepared = match self {
            Self::Bash => {
                PreparedCheck::Bash(ProcessCheck::spawn(code, ".bash", &context.toolchain.bash_command(), directory)?)
            }
            Self::C => PreparedCheck::Gcc(ProcessCheck::spawn(code, ".c", &context.toolchain.c_command()?, directory)?),
            Self::Cpp => {
                PreparedCheck::Gcc(ProcessCheck::spawn(code, ".cpp", &context.toolchain.cpp_command()?, directory)?)
            }
            Self::Rst => PreparedCheck::Rst {
                code: code.to_string(),
                ignore: context.ignore.clone(),
                extension: context.extension,
            },
            Self::Doctest | Self::Json | Self::Python | Self::Xml => PreparedCheck::InProcess {
                kind: self,
                code: code.to_string(),
            },
        };
        Ok(prepared)
    }
}

/// A check ready to produce diagnostics.
#[derive(Debug)]
pub enum PreparedCheck {
    InProcess { kind: CheckerKind, code: String },
    Rst { code: String, ignore: IgnoreSet, extension: bool },
    Bash(ProcessCheck),
    Gcc(ProcessCheck),
}

impl PreparedCheck {
    /// Collect the diagnostics, waiting for the external tool if there is one.
    pub fn run(self) -> Result<Vec<Diagnostic>, CheckError> {
        match self {
            Self::InProcess { kind, code } => Ok(match kind {
                CheckerKind::Doctest => doctest::check(&code),
                CheckerKind::Json => data::check_json(&code),
                CheckerKind::Xml => data::check_xml(&code),
                _ => python::check(&code),
            }),
            Self::Rst { code, ignore, extension } => {
                let options = CheckOptions {
                    filename: "<string>".to_string(),
                    report_level: ReportLevel::default(),
                    ignore,
                    extension,
                };
                check_source(&code, &options)
            }
            Self::Bash(check) => Ok(check.finish()?.map(|failure| bash_diagnostics(&failure)).unwrap_or_default()),
            Self::Gcc(check) => Ok(check.finish()?.map(|failure| gcc_diagnostics(&failure)).unwrap_or_default()),
        }
    }
}

/// Parse `<path>: line N: message` lines from `bash -n`.
///
/// Bash counts one line past the end of the script for unterminated constructs, so
/// reported lines are moved up by one.
fn bash_diagnostics(failure: &ToolFailure) -> Vec<Diagnostic> {
    let prefix = format!("{}: line ", failure.artifact_path);
    failure
        .stderr
        .lines()
        .filter_map(|line| {
            let (number, message) = line.strip_prefix(&prefix)?.split_once(':')?;
            let number = number.trim().parse::<usize>().ok()?;
            Some(Diagnostic::new(number.saturating_sub(1), message.trim()))
        })
        .collect()
}

fn gcc_diagnostics(failure: &ToolFailure) -> Vec<Diagnostic> {
    failure
        .stderr
        .lines()
        .filter_map(|line| parse_gcc_style_message(line, &failure.artifact_path, true))
        .collect()
}
