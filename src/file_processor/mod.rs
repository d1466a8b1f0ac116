//! Checking many documents.
//!
//! A single document, including standard input, is checked on the calling thread.
//! Several documents are spread over a thread pool; each worker resolves its own
//! configuration. Results keep the order of the file arguments.

mod discovery;

pub use discovery::find_files;

use crate::config::{ConfigError, Overrides, load_settings};
use crate::diagnostic::Diagnostic;
use crate::document::{CheckError, CheckOptions, check_source};
use std::io::{self, Read};

/// Upper bound on workers where the platform limits waitable handles.
const MAX_WINDOWS_WORKERS: usize = 61;

/// Why a document could not be checked.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("{0}")]
    Read(#[source] io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Check(#[from] CheckError),
}

/// The outcome for one file argument.
#[derive(Debug)]
pub struct FileReport {
    pub filename: String,
    pub outcome: Result<Vec<Diagnostic>, FileError>,
}

impl FileReport {
    pub fn is_clean(&self) -> bool {
        self.outcome.as_ref().is_ok_and(Vec::is_empty)
    }
}

fn read_document(filename: &str) -> Result<String, FileError> {
    if filename == "-" {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content).map_err(FileError::Read)?;
        return Ok(content);
    }
    std::fs::read_to_string(filename).map_err(FileError::Read)
}

/// Hide ignored substitutions from the parser by rewriting `|name|` to `xnamex`.
fn mask_substitutions<'a>(content: String, names: impl IntoIterator<Item = &'a String>) -> String {
    names.into_iter().fold(content, |content, name| {
        content.replace(&format!("|{name}|"), &format!("x{name}x"))
    })
}

fn check_document(filename: &str, overrides: &Overrides) -> Result<Vec<Diagnostic>, FileError> {
    let content = read_document(filename)?;
    let settings = load_settings(filename, overrides)?;
    let content = mask_substitutions(content, &settings.ignore.substitutions);
    let options = CheckOptions {
        filename: filename.to_string(),
        report_level: settings.report_level,
        ignore: settings.ignore,
        extension: settings.sphinx,
    };
    Ok(check_source(&content, &options)?)
}

/// Check one document (`-` reads standard input).
pub fn check_file(filename: &str, overrides: &Overrides) -> FileReport {
    log::debug!("[rstcheck-files] Checking {filename}");
    FileReport {
        filename: filename.to_string(),
        outcome: check_document(filename, overrides),
    }
}

fn pool_size() -> usize {
    let available = std::thread::available_parallelism().map_or(1, |count| count.get());
    if cfg!(windows) {
        available.min(MAX_WINDOWS_WORKERS)
    } else {
        available
    }
}

#[cfg(feature = "parallel")]
fn check_in_pool(files: &[String], overrides: &Overrides) -> Vec<FileReport> {
    use rayon::prelude::*;

    let size = pool_size();
    match rayon::ThreadPoolBuilder::new().num_threads(size).build() {
        Ok(pool) => {
            log::debug!("[rstcheck-files] Checking {} files on {size} threads", files.len());
            pool.install(|| files.par_iter().map(|file| check_file(file, overrides)).collect())
        }
        Err(e) => {
            log::warn!("Failed to build thread pool, checking files sequentially: {e}");
            files.iter().map(|file| check_file(file, overrides)).collect()
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn check_in_pool(files: &[String], overrides: &Overrides) -> Vec<FileReport> {
    log::debug!("[rstcheck-files] Checking {} files sequentially ({} cores)", files.len(), pool_size());
    files.iter().map(|file| check_file(file, overrides)).collect()
}

/// Check every file, returning one report per file in argument order.
pub fn check_files(files: &[String], overrides: &Overrides) -> Vec<FileReport> {
    match files {
        [] => Vec::new(),
        [file] => vec![check_file(file, overrides)],
        _ => check_in_pool(files, overrides),
    }
}
