use std::fs;
use std::path::{Path, PathBuf};

use super::parsers::{parse_ini, parse_pyproject_toml};
use super::{ConfigError, FileOptions, Overrides, RawOptions, Settings};
use crate::document::document_directory;

/// Config file names, in the order they are tried within one directory.
pub const CONFIG_FILES: [&str; 3] = [".rstcheck.cfg", "pyproject.toml", "setup.cfg"];

fn read_section(path: &Path) -> Result<Option<RawOptions>, ConfigError> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        source,
        path: display.clone(),
    })?;
    if path.file_name().is_some_and(|name| name == "pyproject.toml") {
        parse_pyproject_toml(&content, &display)
    } else {
        parse_ini(&content, &display)
    }
}

/// Find the config for `directory_or_file`.
///
/// A file is used as is, even without an rstcheck section. A directory is searched,
/// then its ancestors; the first file holding an rstcheck section wins.
pub fn discover_config(directory_or_file: &Path) -> Result<Option<(PathBuf, RawOptions)>, ConfigError> {
    if !directory_or_file.exists() {
        return Err(ConfigError::NotFound {
            path: directory_or_file.display().to_string(),
        });
    }
    let start = directory_or_file
        .canonicalize()
        .unwrap_or_else(|_| directory_or_file.to_path_buf());

    if start.is_file() {
        log::debug!("[rstcheck-config] Using config file: {}", start.display());
        let options = read_section(&start)?.unwrap_or_default();
        return Ok(Some((start, options)));
    }

    let mut directory = Some(start.as_path());
    while let Some(current) = directory {
        log::debug!("[rstcheck-config] Searching for config in: {}", current.display());
        for name in CONFIG_FILES {
            let candidate = current.join(name);
            if !candidate.is_file() {
                continue;
            }
            match read_section(&candidate)? {
                Some(options) => {
                    log::debug!("[rstcheck-config] Found config file: {}", candidate.display());
                    return Ok(Some((candidate, options)));
                }
                None => log::debug!("[rstcheck-config] {} has no rstcheck section", candidate.display()),
            }
        }
        directory = current.parent();
    }
    log::debug!("[rstcheck-config] No config file found");
    Ok(None)
}

/// Resolve the settings for the document `filename`.
///
/// The search starts at `--config` when given, otherwise at the document's directory.
pub fn load_settings(filename: &str, overrides: &Overrides) -> Result<Settings, ConfigError> {
    let start = overrides
        .config
        .clone()
        .unwrap_or_else(|| document_directory(filename));
    let file_options = match discover_config(&start)? {
        Some((path, raw)) => FileOptions::from_raw(raw, &path.display().to_string())?,
        None => FileOptions::default(),
    };
    Ok(Settings::merge(overrides, file_options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rst::ReportLevel;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_nearest_file_with_section_wins() {
        let root = tempdir().unwrap();
        let nested = root.path().join("docs/api");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.path().join("setup.cfg"), "[rstcheck]\nreport = error\n").unwrap();
        fs::write(root.path().join("docs/setup.cfg"), "[metadata]\nname = docs\n").unwrap();

        let (path, options) = discover_config(&nested).unwrap().unwrap();
        assert_eq!(path, root.path().join("setup.cfg").canonicalize().unwrap());
        assert_eq!(options["report"], "error");
    }

    #[test]
    fn test_order_within_directory() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("setup.cfg"), "[rstcheck]\nreport = error\n").unwrap();
        fs::write(
            root.path().join("pyproject.toml"),
            "[tool.rstcheck]\nreport = \"severe\"\n",
        )
        .unwrap();
        let (path, _) = discover_config(root.path()).unwrap().unwrap();
        assert!(path.ends_with("pyproject.toml"));

        fs::write(root.path().join(".rstcheck.cfg"), "[rstcheck]\nreport = warning\n").unwrap();
        let (path, _) = discover_config(root.path()).unwrap().unwrap();
        assert!(path.ends_with(".rstcheck.cfg"));
    }

    #[test]
    fn test_explicit_file_without_section() {
        let root = tempdir().unwrap();
        let config = root.path().join("custom.cfg");
        fs::write(&config, "[other]\nkey = value\n").unwrap();
        let (_, options) = discover_config(&config).unwrap().unwrap();
        assert!(options.is_empty());
    }

    #[test]
    fn test_missing_explicit_path() {
        let root = tempdir().unwrap();
        let error = discover_config(&root.path().join("missing.cfg")).unwrap_err();
        assert!(matches!(error, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_load_settings_for_document() {
        let root = tempdir().unwrap();
        fs::write(
            root.path().join(".rstcheck.cfg"),
            "[rstcheck]\nignore_language = cpp\nreport = warning\n",
        )
        .unwrap();
        let document = root.path().join("index.rst");
        fs::write(&document, "Title\n=====\n").unwrap();

        let settings = load_settings(&document.display().to_string(), &Overrides::default()).unwrap();
        assert_eq!(settings.report_level, ReportLevel::Warning);
        assert!(settings.ignore.languages.contains("cpp"));
    }

    #[test]
    fn test_invalid_value_names_the_file() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("setup.cfg"), "[rstcheck]\nreport = loud\n").unwrap();
        let overrides = Overrides {
            config: Some(root.path().to_path_buf()),
            ..Overrides::default()
        };
        let error = load_settings("-", &overrides).unwrap_err();
        assert!(error.to_string().contains("setup.cfg"));
    }
}
