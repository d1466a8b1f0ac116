//! Configuration for a document check.
//!
//! Options come from three layers: built-in defaults, the first config file found for
//! the document (`.rstcheck.cfg`, `pyproject.toml` or `setup.cfg`) and the command
//! line. A non-empty command-line value wins over the file.

mod loading;
mod parsers;

pub use loading::{CONFIG_FILES, discover_config, load_settings};

use crate::ignore::{IgnoreSet, split_comma_separated};
use crate::rst::ReportLevel;
use fancy_regex::Regex as FancyRegex;
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

/// Option values of a config section, keyed by normalized name.
pub type RawOptions = BTreeMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file at {path}: {source}")]
    IoError { source: io::Error, path: String },

    /// Failed to parse the configuration content (TOML or INI)
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid value for '{key}' in {path}: {message}")]
    InvalidValue { key: String, path: String, message: String },

    /// An explicitly given config path does not exist
    #[error("Config file not found: {path}")]
    NotFound { path: String },
}

const KNOWN_KEYS: [&str; 7] = [
    "report",
    "ignore_language",
    "ignore_messages",
    "ignore_directives",
    "ignore_substitutions",
    "ignore_roles",
    "sphinx",
];

/// Validated options from one config file.
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    pub report: Option<ReportLevel>,
    pub ignore_language: Option<String>,
    pub ignore_messages: Option<FancyRegex>,
    pub ignore_directives: Option<String>,
    pub ignore_substitutions: Option<String>,
    pub ignore_roles: Option<String>,
    pub sphinx: Option<bool>,
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

impl FileOptions {
    /// Validate the raw values read from `path`. Unknown keys are only warned about.
    pub fn from_raw(raw: RawOptions, path: &str) -> Result<Self, ConfigError> {
        let invalid = |key: &str, message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            path: path.to_string(),
            message,
        };

        let mut options = Self::default();
        for (key, value) in raw {
            match key.as_str() {
                "report" => {
                    let level = value.parse::<ReportLevel>().map_err(|e| invalid(&key, e.to_string()))?;
                    options.report = Some(level);
                }
                "ignore_messages" if value.is_empty() => {}
                "ignore_messages" => {
                    let pattern = FancyRegex::new(&value).map_err(|e| invalid(&key, e.to_string()))?;
                    options.ignore_messages = Some(pattern);
                }
                "sphinx" => {
                    let flag = parse_flag(&value)
                        .ok_or_else(|| invalid(&key, format!("expected a boolean, got \"{value}\"")))?;
                    options.sphinx = Some(flag);
                }
                "ignore_language" | "ignore_languages" => options.ignore_language = Some(value),
                "ignore_directives" => options.ignore_directives = Some(value),
                "ignore_substitutions" => options.ignore_substitutions = Some(value),
                "ignore_roles" => options.ignore_roles = Some(value),
                _ => {
                    log::warn!("Unknown key in {path}: '{key}' (expected one of: {})", KNOWN_KEYS.join(", "));
                }
            }
        }
        Ok(options)
    }
}

/// Values given on the command line. Empty values defer to the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Config file, or directory to start the search from.
    pub config: Option<PathBuf>,
    pub report: Option<ReportLevel>,
    pub ignore_language: Vec<String>,
    pub ignore_messages: Option<FancyRegex>,
    pub ignore_directives: Vec<String>,
    pub ignore_substitutions: Vec<String>,
    pub ignore_roles: Vec<String>,
    pub sphinx: bool,
}

/// Everything needed to check one document.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub report_level: ReportLevel,
    pub ignore: IgnoreSet,
    pub sphinx: bool,
}

fn pick_list(cli: &[String], file: Option<&str>) -> Vec<String> {
    if cli.is_empty() {
        file.map(split_comma_separated).unwrap_or_default()
    } else {
        cli.to_vec()
    }
}

impl Settings {
    pub fn merge(overrides: &Overrides, file: FileOptions) -> Self {
        let ignore = IgnoreSet {
            languages: pick_list(&overrides.ignore_language, file.ignore_language.as_deref())
                .into_iter()
                .collect(),
            messages: overrides.ignore_messages.clone().or(file.ignore_messages),
            directives: pick_list(&overrides.ignore_directives, file.ignore_directives.as_deref())
                .into_iter()
                .collect(),
            roles: pick_list(&overrides.ignore_roles, file.ignore_roles.as_deref())
                .into_iter()
                .collect(),
            substitutions: pick_list(&overrides.ignore_substitutions, file.ignore_substitutions.as_deref())
                .into_iter()
                .collect(),
        };
        Self {
            report_level: overrides.report.or(file.report).unwrap_or_default(),
            ignore,
            sphinx: overrides.sphinx || file.sphinx.unwrap_or(false),
        }
    }
}
