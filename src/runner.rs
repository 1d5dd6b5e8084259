//! Runs a built command line through the host shell.

use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use crate::command::ShellCommand;

/// Why a process gave no usable result.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start shell for `{line}`: {source}")]
    Spawn {
        line: String,
        source: std::io::Error,
    },

    #[error("Command failed with exit code {code}: {line}")]
    Exit { line: String, code: i32 },

    #[error("Command terminated by signal: {line}")]
    Killed { line: String },
}

/// Everything a finished process reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub stdout: String,
    pub stderr: String,
    /// Set when the process could not run or exited unsuccessfully.
    pub terminal_error: Option<String>,
}

#[async_trait]
pub trait ShellRunner: Send + Sync {
    /// Run `command` to completion. Never fails; failures land in the outcome.
    async fn run(&self, command: &ShellCommand) -> ProcessOutcome;
}

/// `sh -c` on Unix, `cmd /C` on Windows.
#[derive(Debug, Default)]
pub struct SystemShell;

pub(crate) fn shell(line: &str) -> Command {
    if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(line);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(line);
        cmd
    }
}

#[async_trait]
impl ShellRunner for SystemShell {
    async fn run(&self, command: &ShellCommand) -> ProcessOutcome {
        let start = std::time::Instant::now();
        tracing::info!(
            line = command.line.as_str(),
            cwd = %command.working_dir.display(),
            "spawning render command"
        );

        let result = shell(&command.line)
            .current_dir(&command.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                let terminal_error = if output.status.success() {
                    None
                } else {
                    let line = command.line.clone();
                    let err = match output.status.code() {
                        Some(code) => RunError::Exit { line, code },
                        None => RunError::Killed { line },
                    };
                    Some(err.to_string())
                };

                tracing::info!(
                    duration_ms,
                    exit_code = ?output.status.code(),
                    stdout_bytes = stdout.len(),
                    stderr_bytes = stderr.len(),
                    "render command finished"
                );

                ProcessOutcome {
                    stdout,
                    stderr,
                    terminal_error,
                }
            }
            Err(source) => {
                let err = RunError::Spawn {
                    line: command.line.clone(),
                    source,
                };
                tracing::error!(error = %err, "render command did not start");
                ProcessOutcome {
                    terminal_error: Some(err.to_string()),
                    ..Default::default()
                }
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::Path;

    fn command(line: &str, dir: &Path) -> ShellCommand {
        ShellCommand {
            line: line.to_string(),
            working_dir: dir.to_path_buf(),
            output_path: dir.join("out.txt"),
        }
    }

    #[tokio::test]
    async fn test_captures_stdout_and_stderr_separately() {
        let temp = tempfile::tempdir().expect("tempdir");
        let outcome = SystemShell
            .run(&command("echo converted; echo careful >&2", temp.path()))
            .await;
        assert_eq!(outcome.stdout, "converted\n");
        assert_eq!(outcome.stderr, "careful\n");
        assert_eq!(outcome.terminal_error, None);
    }

    #[tokio::test]
    async fn test_runs_in_working_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        let outcome = SystemShell
            .run(&command("echo body > out.txt", temp.path()))
            .await;
        assert_eq!(outcome.terminal_error, None);
        let written = std::fs::read_to_string(temp.path().join("out.txt")).expect("read");
        assert_eq!(written, "body\n");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_terminal() {
        let temp = tempfile::tempdir().expect("tempdir");
        let outcome = SystemShell.run(&command("exit 3", temp.path())).await;
        let err = outcome.terminal_error.expect("terminal error");
        assert!(err.contains("exit code 3"));
        assert!(err.contains("exit 3"));
    }

    #[tokio::test]
    async fn test_missing_tool_is_terminal() {
        let temp = tempfile::tempdir().expect("tempdir");
        let outcome = SystemShell
            .run(&command("definitely-not-a-pandoc-binary --version", temp.path()))
            .await;
        assert!(outcome.terminal_error.is_some());
        assert!(!outcome.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_missing_working_dir_is_terminal() {
        let outcome = SystemShell
            .run(&command("echo never", Path::new("/nonexistent/pandoc-render")))
            .await;
        let err = outcome.terminal_error.expect("terminal error");
        assert!(err.starts_with("failed to start shell"));
        assert_eq!(outcome.stdout, "");
    }
}
