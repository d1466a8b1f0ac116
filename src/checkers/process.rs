//! External syntax checkers running on a temporary copy of the code.
//!
//! A [`ProcessCheck`] owns both the temporary file and the child process. The process
//! starts as soon as the check is prepared, so several tools for one document run at
//! the same time; the result is only collected by [`ProcessCheck::finish`]. Dropping
//! the check at any point kills and reaps the child and removes the file.

use super::CheckError;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use tempfile::NamedTempFile;

/// A tool that exited with a non-zero status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolFailure {
    pub stderr: String,
    /// Path of the temporary file, as the tool saw it.
    pub artifact_path: String,
}

#[derive(Debug)]
pub struct ProcessCheck {
    tool: String,
    child: Option<Child>,
    artifact: NamedTempFile,
}

impl ProcessCheck {
    /// Write `code` to a temporary file ending in `suffix` and start `command` on it.
    pub fn spawn(
        code: &str,
        suffix: &str,
        command: &[String],
        working_directory: &Path,
    ) -> Result<Self, CheckError> {
        let Some((tool, arguments)) = command.split_first() else {
            return Err(CheckError::Spawn {
                tool: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        let mut artifact = tempfile::Builder::new()
            .prefix("rstcheck")
            .suffix(suffix)
            .tempfile()
            .map_err(|source| CheckError::Artifact { source })?;
        artifact
            .write_all(code.as_bytes())
            .and_then(|()| artifact.flush())
            .map_err(|source| CheckError::Artifact { source })?;

        log::debug!(
            "[rstcheck-process] Running {tool} {} {} in {}",
            arguments.join(" "),
            artifact.path().display(),
            working_directory.display()
        );
        let child = Command::new(tool)
            .args(arguments)
            .arg(artifact.path())
            .current_dir(working_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CheckError::Spawn {
                tool: tool.clone(),
                source,
            })?;

        Ok(Self {
            tool: tool.clone(),
            child: Some(child),
            artifact,
        })
    }

    #[cfg(test)]
    pub(crate) fn artifact_path(&self) -> std::path::PathBuf {
        self.artifact.path().to_path_buf()
    }

    /// Wait for the tool. `None` means it exited successfully.
    pub fn finish(mut self) -> Result<Option<ToolFailure>, CheckError> {
        let Some(child) = self.child.take() else {
            return Ok(None);
        };
        let output = child.wait_with_output().map_err(|source| CheckError::Wait {
            tool: self.tool.clone(),
            source,
        })?;
        log::debug!("[rstcheck-process] {} exited with {}", self.tool, output.status);
        if output.status.success() {
            return Ok(None);
        }
        Ok(Some(ToolFailure {
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            artifact_path: self.artifact.path().to_string_lossy().into_owned(),
        }))
    }
}

impl Drop for ProcessCheck {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn command(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|part| part.to_string()).collect()
    }

    #[test]
    fn test_success_returns_none() {
        let directory = tempfile::tempdir().unwrap();
        let check = ProcessCheck::spawn("hello", ".txt", &command(&["cat"]), directory.path()).unwrap();
        assert_eq!(check.finish().unwrap(), None);
    }

    #[test]
    fn test_failure_captures_stderr_and_path() {
        let directory = tempfile::tempdir().unwrap();
        let script = command(&["sh", "-c", "echo \"$0: broken\" >&2; exit 1"]);
        let check = ProcessCheck::spawn("", ".sh", &script, directory.path()).unwrap();
        let path = check.artifact_path();
        let failure = check.finish().unwrap().unwrap();
        assert_eq!(failure.artifact_path, path.to_string_lossy());
        assert_eq!(failure.stderr.trim(), format!("{}: broken", path.display()));
        assert!(!path.exists());
    }

    #[test]
    fn test_artifact_keeps_suffix_and_content() {
        let directory = tempfile::tempdir().unwrap();
        let check = ProcessCheck::spawn("int x;", ".c", &command(&["true"]), directory.path()).unwrap();
        let path = check.artifact_path();
        assert!(path.to_string_lossy().ends_with(".c"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "int x;");
        check.finish().unwrap();
    }

    #[test]
    fn test_drop_removes_artifact() {
        let directory = tempfile::tempdir().unwrap();
        let check = ProcessCheck::spawn("", ".txt", &command(&["sleep", "5"]), directory.path()).unwrap();
        let path = check.artifact_path();
        drop(check);
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_tool_is_a_spawn_error() {
        let directory = tempfile::tempdir().unwrap();
        let error = ProcessCheck::spawn("", ".txt", &command(&["rstcheck-no-such-tool"]), directory.path())
            .unwrap_err();
        assert!(matches!(error, CheckError::Spawn { .. }));
    }
}
