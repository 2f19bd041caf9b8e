use crate::domain::model::CommandOutput;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Seam for every shell-out (`git`, `gh`, `glab`, `conda`, `dvc`, `datalad`,
/// dataset download commands). Tests substitute a scripted implementation.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command in `cwd` and capture its output, regardless of exit status.
    async fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput>;

    /// Locate an executable on PATH, `which`-style.
    fn which(&self, program: &str) -> Option<PathBuf>;

    /// Run a command and turn a non-zero exit into `CommandFailed`.
    async fn run_checked(&self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
        let output = self.run(program, args, cwd).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(crate::utils::error::ScaffoldError::CommandFailed {
                program: program.to_string(),
                status: output.status,
                stderr: output.stderr,
            })
        }
    }

    fn is_installed(&self, program: &str) -> bool {
        self.which(program).is_some()
    }
}

/// Seam for interactive terminal input. Implementations loop until the answer
/// is valid; `--yes` swaps in an assume-yes implementation.
pub trait Prompter: Send + Sync {
    fn ask_line(&self, question: &str) -> Result<String>;

    fn ask_yes_no(&self, question: &str) -> Result<bool>;

    /// Ask for a non-empty line, re-asking on blank input.
    fn ask_required(&self, question: &str) -> Result<String> {
        loop {
            let answer = self.ask_line(question)?;
            if !answer.trim().is_empty() {
                return Ok(answer.trim().to_string());
            }
            println!("A value is required.");
        }
    }
}
