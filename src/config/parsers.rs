use ini::Ini;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::{ConfigError, RawOptions};

pub(super) const SECTION: &str = "rstcheck";

/// Config keys are matched case-insensitively, with `-` and `_` interchangeable.
pub(super) fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('-', "_")
}

/// Reads the `[rstcheck]` section of an INI file (`.rstcheck.cfg`, `setup.cfg`).
pub(super) fn parse_ini(content: &str, path: &str) -> Result<Option<RawOptions>, ConfigError> {
    let ini = Ini::load_from_str(content).map_err(|e| ConfigError::ParseError(format!("{path}: {e}")))?;
    let Some(section) = ini.section(Some(SECTION)) else {
        return Ok(None);
    };
    Ok(Some(
        section
            .iter()
            .map(|(key, value)| (normalize_key(key), value.trim().to_string()))
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
struct PyProject {
    tool: Option<Tools>,
}

#[derive(Debug, Deserialize)]
struct Tools {
    rstcheck: Option<BTreeMap<String, PyprojectValue>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PyprojectValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
    Number(i64),
}

impl PyprojectValue {
    /// Lists become comma-separated text, matching what INI files hold.
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::List(items) => items.join(","),
            Self::Flag(flag) => flag.to_string(),
            Self::Number(number) => number.to_string(),
        }
    }
}

/// Reads the `[tool.rstcheck]` table of a `pyproject.toml`.
pub(super) fn parse_pyproject_toml(content: &str, path: &str) -> Result<Option<RawOptions>, ConfigError> {
    let document: PyProject = toml::from_str(content)
        .map_err(|e| ConfigError::ParseError(format!("{path}: Failed to parse TOML: {e}")))?;
    let Some(table) = document.tool.and_then(|tool| tool.rstcheck) else {
        return Ok(None);
    };
    Ok(Some(
        table
            .into_iter()
            .map(|(key, value)| (normalize_key(&key), value.into_text()))
            .collect(),
    ))
}
