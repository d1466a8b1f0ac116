//! System messages produced while parsing a document.

use std::fmt;
use std::str::FromStr;

/// Severity of a system message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info = 1,
    Warning = 2,
    Error = 3,
    Severe = 4,
}

impl Level {
    pub fn name(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Severe => "SEVERE",
        }
    }
}

/// Lowest level a message needs to be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportLevel {
    #[default]
    Info,
    Warning,
    Error,
    Severe,
    None,
}

impl ReportLevel {
    fn threshold(self) -> u8 {
        match self {
            Self::Info => 1,
            Self::Warning => 2,
            Self::Error => 3,
            Self::Severe => 4,
            Self::None => 5,
        }
    }

    pub fn admits(self, level: Level) -> bool {
        level as u8 >= self.threshold()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid report level \"{0}\" (expected info, warning, error, severe, none or 1-5)")]
pub struct InvalidReportLevel(pub String);

impl FromStr for ReportLevel {
    type Err = InvalidReportLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "info" | "1" => Ok(Self::Info),
            "warning" | "2" => Ok(Self::Warning),
            "error" | "3" => Ok(Self::Error),
            "severe" | "4" => Ok(Self::Severe),
            "none" | "5" => Ok(Self::None),
            _ => Err(InvalidReportLevel(s.to_string())),
        }
    }
}

impl fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Severe => "severe",
            Self::None => "none",
        };
        f.write_str(name)
    }
}

/// Collects system messages as `path:line: (LEVEL/n) message` lines.
#[derive(Debug)]
pub struct Reporter {
    source_path: String,
    report_level: ReportLevel,
    stream: Vec<String>,
}

impl Reporter {
    pub fn new(source_path: impl Into<String>, report_level: ReportLevel) -> Self {
        Self {
            source_path: source_path.into(),
            report_level,
            stream: Vec::new(),
        }
    }

    pub fn report(&mut self, level: Level, line: usize, message: impl AsRef<str>) {
        if !self.report_level.admits(level) {
            return;
        }
        self.stream.push(format!(
            "{}:{}: ({}/{}) {}",
            self.source_path,
            line,
            level.name(),
            level as u8,
            message.as_ref()
        ));
    }

    pub fn info(&mut self, line: usize, message: impl AsRef<str>) {
        self.report(Level::Info, line, message);
    }

    pub fn warning(&mut self, line: usize, message: impl AsRef<str>) {
        self.report(Level::Warning, line, message);
    }

    pub fn error(&mut self, line: usize, message: impl AsRef<str>) {
        self.report(Level::Error, line, message);
    }

    pub fn severe(&mut self, line: usize, message: impl AsRef<str>) {
        self.report(Level::Severe, line, message);
    }

    pub fn messages(&self) -> &[String] {
        &self.stream
    }

    pub fn into_messages(self) -> Vec<String> {
        self.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_level_parsing() {
        assert_eq!("warning".parse::<ReportLevel>(), Ok(ReportLevel::Warning));
        assert_eq!("SEVERE".parse::<ReportLevel>(), Ok(ReportLevel::Severe));
        assert_eq!("5".parse::<ReportLevel>(), Ok(ReportLevel::None));
        assert!("loud".parse::<ReportLevel>().is_err());
    }

    #[test]
    fn test_reporter_formats_messages() {
        let mut reporter = Reporter::new("doc.rst", ReportLevel::Info);
        reporter.warning(4, "Title underline too short.");
        assert_eq!(reporter.messages(), ["doc.rst:4: (WARNING/2) Title underline too short."]);
    }

    #[test]
    fn test_reporter_drops_messages_below_threshold() {
        let mut reporter = Reporter::new("doc.rst", ReportLevel::Error);
        reporter.info(1, "info");
        reporter.warning(2, "warning");
        reporter.error(3, "error");
        reporter.severe(4, "severe");
        assert_eq!(
            reporter.into_messages(),
            ["doc.rst:3: (ERROR/3) error", "doc.rst:4: (SEVERE/4) severe"]
        );
    }

    #[test]
    fn test_report_level_none_silences_everything() {
        let mut reporter = Reporter::new("doc.rst", ReportLevel::None);
        reporter.severe(1, "severe");
        assert!(reporter.messages().is_empty());
    }
}
