use crate::domain::ports::Prompter;
use crate::utils::error::{Result, ScaffoldError};
use std::io::{BufRead, Write};

/// Interactive prompter reading from stdin.
#[derive(Debug, Clone, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for TerminalPrompter {
    fn ask_line(&self, question: &str) -> Result<String> {
        print!("{} ", question);
        std::io::stdout().flush()?;

        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(ScaffoldError::PromptError {
                message: "stdin closed while waiting for input".to_string(),
            });
        }
        Ok(line.trim().to_string())
    }

    fn ask_yes_no(&self, question: &str) -> Result<bool> {
        loop {
            let answer = self.ask_line(&format!("{} (yes/no):", question))?;
            match answer.to_lowercase().as_str() {
                "yes" | "y" => return Ok(true),
                "no" | "n" => return Ok(false),
                _ => println!("Invalid response. Please answer with 'yes' or 'no'."),
            }
        }
    }
}

/// Non-interactive prompter used with `--yes`: confirmations are answered
/// true, and anything that genuinely needs typed input becomes an error.
#[derive(Debug, Clone, Default)]
pub struct AssumeYesPrompter;

impl AssumeYesPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for AssumeYesPrompter {
    fn ask_line(&self, question: &str) -> Result<String> {
        Err(ScaffoldError::PromptError {
            message: format!(
                "running with --yes but '{}' requires typed input; provide it via flags or the answers file",
                question
            ),
        })
    }

    fn ask_yes_no(&self, _question: &str) -> Result<bool> {
        Ok(true)
    }
}
