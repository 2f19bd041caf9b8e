use crate::domain::model::CommandOutput;
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, ScaffoldError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Production `CommandRunner` backed by `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
        tracing::debug!("Running: {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ScaffoldError::ToolMissing {
                    tool: program.to_string(),
                },
                _ => ScaffoldError::IoError(e),
            })?;

        let result = CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success() {
            tracing::debug!(
                "{} exited with {}: {}",
                program,
                result.status,
                result.stderr.trim()
            );
        }

        Ok(result)
    }

    fn which(&self, program: &str) -> Option<PathBuf> {
        let path_var = std::env::var_os("PATH")?;
        for dir in std::env::split_paths(&path_var) {
            let candidate = dir.join(program);
            if is_executable(&candidate) {
                return Some(candidate);
            }
            // Windows resolves through PATHEXT; .exe covers the tools we call.
            let exe = dir.join(format!("{}.exe", program));
            if is_executable(&exe) {
                return Some(exe);
            }
        }
        None
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let runner = ShellRunner::new();
        let out = runner
            .run("sh", &["-c", "echo hello"], Path::new("."))
            .await
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_missing_program_maps_to_tool_missing() {
        let runner = ShellRunner::new();
        let err = runner
            .run("definitely-not-a-real-binary", &[], Path::new("."))
            .await
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::ToolMissing { .. }));
    }

    #[tokio::test]
    async fn test_run_checked_rejects_nonzero_exit() {
        let runner = ShellRunner::new();
        let err = runner
            .run_checked("sh", &["-c", "exit 3"], Path::new("."))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScaffoldError::CommandFailed { status: 3, .. }
        ));
    }
}
