#![allow(dead_code)]

use async_trait::async_trait;
use repro_scaffold::domain::model::CommandOutput;
use repro_scaffold::{CommandRunner, Prompter, Result, ScaffoldError};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// CommandRunner standing in for the real shell: tools are "installed" by
/// fiat, invocations are recorded, and outputs are scripted per command
/// prefix. Everything unscripted succeeds with empty output.
pub struct ScriptedRunner {
    installed: HashSet<String>,
    responses: Vec<(String, CommandOutput)>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(installed: &[&str]) -> Self {
        Self {
            installed: installed.iter().map(|s| s.to_string()).collect(),
            responses: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, prefix: &str, status: i32, stdout: &str, stderr: &str) -> Self {
        self.responses.push((
            prefix.to_string(),
            CommandOutput {
                status,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        ));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ran(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[&str], _cwd: &Path) -> Result<CommandOutput> {
        let invocation = format!("{} {}", program, args.join(" "));
        self.calls.lock().unwrap().push(invocation.clone());

        if !self.installed.contains(program) {
            return Err(ScaffoldError::ToolMissing {
                tool: program.to_string(),
            });
        }

        for (prefix, output) in &self.responses {
            if invocation.starts_with(prefix.as_str()) {
                return Ok(output.clone());
            }
        }
        Ok(CommandOutput {
            status: 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }

    fn which(&self, program: &str) -> Option<PathBuf> {
        if self.installed.contains(program) {
            Some(PathBuf::from(format!("/usr/bin/{}", program)))
        } else {
            None
        }
    }
}

/// Prompter answering from canned queues.
pub struct ScriptedPrompter {
    lines: Mutex<VecDeque<String>>,
    confirmations: Mutex<VecDeque<bool>>,
}

impl ScriptedPrompter {
    pub fn new(lines: &[&str], confirmations: &[bool]) -> Self {
        Self {
            lines: Mutex::new(lines.iter().map(|s| s.to_string()).collect()),
            confirmations: Mutex::new(confirmations.iter().copied().collect()),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask_line(&self, question: &str) -> Result<String> {
        self.lines
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ScaffoldError::PromptError {
                message: format!("no scripted answer left for '{}'", question),
            })
    }

    fn ask_yes_no(&self, _question: &str) -> Result<bool> {
        Ok(self.confirmations.lock().unwrap().pop_front().unwrap_or(true))
    }
}
