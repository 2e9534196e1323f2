//! Shell execution interface and the portable default backend.

use std::process::Command;

use crate::{ToolkitError, ToolkitResult};

/// Maximum bytes of stdout/stderr kept from one command (64 KB each).
const MAX_STREAM_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ShellCommand {
    pub command: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ShellOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: i32,
    /// True when either stream was cut at [`MAX_STREAM_BYTES`].
    pub truncated: bool,
}

pub trait ShellProvider: Send + Sync {
    /// Run one command in the platform's native shell and wait for it.
    /// Callers bound the wait with their own deadline; an abandoned command
    /// keeps running in the background.
    fn run(&self, req: &ShellCommand) -> ToolkitResult<ShellOutput>;
}

/// Default backend: PowerShell on Windows, `sh -c` elsewhere.
pub struct SystemShell;

impl ShellProvider for SystemShell {
    fn run(&self, req: &ShellCommand) -> ToolkitResult<ShellOutput> {
        if req.command.trim().is_empty() {
            return Err(ToolkitError::InvalidRequest("empty command".into()));
        }

        let output = native_shell(&req.command).output()?;

        let (stdout, out_cut) = truncate_stream(&output.stdout);
        let (stderr, err_cut) = truncate_stream(&output.stderr);

        Ok(ShellOutput {
            stdout,
            stderr,
            status: output.status.code().unwrap_or(-1),
            truncated: out_cut || err_cut,
        })
    }
}

#[cfg(windows)]
fn native_shell(command: &str) -> Command {
    let mut cmd = Command::new("powershell");
    cmd.args(["-NoProfile", "-NonInteractive", "-Command", command]);
    cmd
}

#[cfg(not(windows))]
fn native_shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", command]);
    cmd
}

fn truncate_stream(bytes: &[u8]) -> (String, bool) {
    let text = String::from_utf8_lossy(bytes);
    if text.len() > MAX_STREAM_BYTES {
        let mut cut = MAX_STREAM_BYTES;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        (text[..cut].to_string(), true)
    } else {
        (text.into_owned(), false)
    }
}

/// Stub for configurations where shell access is disabled entirely.
pub struct UnavailableShell;

impl ShellProvider for UnavailableShell {
    fn run(&self, _req: &ShellCommand) -> ToolkitResult<ShellOutput> {
        Err(ToolkitError::Unavailable("shell execution not supported".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_a_command_and_captures_stdout() {
        let out = SystemShell
            .run(&ShellCommand {
                command: "echo hello".into(),
            })
            .unwrap();
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.status, 0);
        assert!(!out.truncated);
    }

    #[test]
    fn reports_nonzero_exit_status() {
        let out = SystemShell
            .run(&ShellCommand {
                command: "exit 3".into(),
            })
            .unwrap();
        assert_eq!(out.status, 3);
    }

    #[test]
    fn rejects_empty_command() {
        let err = SystemShell
            .run(&ShellCommand {
                command: "   ".into(),
            })
            .unwrap_err();
        assert!(matches!(err, ToolkitError::InvalidRequest(_)));
    }

    #[test]
    fn truncates_oversized_output() {
        let (text, cut) = truncate_stream(&vec![b'a'; MAX_STREAM_BYTES + 10]);
        assert_eq!(text.len(), MAX_STREAM_BYTES);
        assert!(cut);
    }
}
