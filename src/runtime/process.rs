//! Shell command execution.

use anyhow::{Context, Result};
use log::debug;
use std::process::Stdio;
use tokio::process::Command;

use super::RealRuntime;

/// Separator between entries of a PATH-like environment variable.
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: char = ':';
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: char = ';';

/// Captured result of a shell command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the command exited with status 0.
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Text describing what the command printed, preferring stderr.
    pub fn failure_text(&self) -> String {
        let stderr = self.stderr.trim();
        let stdout = self.stdout.trim();
        match (stderr.is_empty(), stdout.is_empty()) {
            (false, true) => stderr.to_string(),
            (true, false) => stdout.to_string(),
            (false, false) => format!("{}\n{}", stderr, stdout),
            (true, true) => "(no output)".to_string(),
        }
    }
}

fn shell_command(command: &str) -> Command {
    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    }
}

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) async fn run_shell_impl(&self, command: &str) -> Result<CommandOutput> {
        let output = shell_command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to spawn shell for `{}`", command))?;

        debug!("`{}` exited with {}", command, output.status);

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Runtime;

    #[tokio::test]
    async fn test_run_shell_captures_stdout() {
        let output = RealRuntime.run_shell("echo hello").await.unwrap();
        assert!(output.success);
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_shell_reports_failure_without_error() {
        let output = RealRuntime.run_shell("exit 3").await.unwrap();
        assert!(!output.success);
    }

    #[test]
    fn test_failure_text_prefers_stderr() {
        let output = CommandOutput::failure("out", "err");
        assert_eq!(output.failure_text(), "err\nout");

        let output = CommandOutput::failure("", "  npm ERR! 404  ");
        assert_eq!(output.failure_text(), "npm ERR! 404");

        let output = CommandOutput::failure("only stdout", "");
        assert_eq!(output.failure_text(), "only stdout");

        let output = CommandOutput::failure("", "");
        assert_eq!(output.failure_text(), "(no output)");
    }
}
