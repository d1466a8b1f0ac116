use ignore::WalkBuilder;
use std::path::Path;

fn is_rst_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("rst"))
}

/// Expand the file arguments into the list of documents to check.
///
/// Without `recursive`, arguments are used as given. With it, directories are walked
/// in file-name order, skipping hidden entries but not gitignored ones, and every
/// `.rst` file is collected.
pub fn find_files(paths: &[String], recursive: bool) -> Vec<String> {
    let mut files = Vec::new();
    for path in paths {
        if !recursive || !Path::new(path).is_dir() {
            files.push(path.clone());
            continue;
        }
        let walker = WalkBuilder::new(path)
            .standard_filters(false)
            .hidden(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    let is_file = entry.file_type().is_some_and(|file_type| file_type.is_file());
                    if is_file && is_rst_file(entry.path()) {
                        files.push(entry.path().display().to_string());
                    }
                }
                Err(e) => log::warn!("Skipping unreadable entry under {path}: {e}"),
            }
        }
    }
    log::debug!("[rstcheck-discovery] {} files to check", files.len());
    files
}
