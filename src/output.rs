//! Printing check results.
//!
//! Diagnostics and per-file faults go to stderr, one line each. The final verdict goes
//! to stdout.

use crate::diagnostic::Diagnostic;
use crate::file_processor::FileReport;
use colored::Colorize;

/// `{file}:{line}: {message}`, with untagged messages reported as errors.
pub fn format_diagnostic(filename: &str, diagnostic: &Diagnostic) -> String {
    format!("{filename}:{}: {}", diagnostic.line, diagnostic.tagged_message())
}

/// The stderr lines for one file.
pub fn report_lines(report: &FileReport) -> Vec<String> {
    match &report.outcome {
        Ok(diagnostics) => diagnostics
            .iter()
            .map(|diagnostic| format_diagnostic(&report.filename, diagnostic))
            .collect(),
        Err(e) => vec![format!("{}: {e}", report.filename)],
    }
}

/// Print a file's diagnostics. Returns `true` when the file is clean.
pub fn print_report(report: &FileReport) -> bool {
    for line in report_lines(report) {
        eprintln!("{line}");
    }
    report.is_clean()
}

pub fn print_summary(success: bool) {
    if success {
        println!("{} No issues detected.", "Success!".green().bold());
    } else {
        println!("{} Issues detected.", "Error!".red().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_processor::FileError;
    use std::io;

    #[test]
    fn test_untagged_messages_get_error_tag() {
        let tagged = Diagnostic::new(3, "(WARNING/2) Title underline too short.");
        let untagged = Diagnostic::new(7, "(python) '(' was never closed");
        assert_eq!(
            format_diagnostic("doc.rst", &tagged),
            "doc.rst:3: (WARNING/2) Title underline too short."
        );
        assert_eq!(
            format_diagnostic("doc.rst", &untagged),
            "doc.rst:7: (ERROR/3) (python) '(' was never closed"
        );
    }

    #[test]
    fn test_fault_is_one_line() {
        let report = FileReport {
            filename: "missing.rst".to_string(),
            outcome: Err(FileError::Read(io::Error::new(io::ErrorKind::NotFound, "not found"))),
        };
        assert_eq!(report_lines(&report), ["missing.rst: not found"]);
    }
}
