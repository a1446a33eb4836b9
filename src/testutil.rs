use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;

use crate::console::Console;
use crate::error::RouterError;
use crate::CommandExecutor;

/// Answers commands from a fixed table and records what it was asked to run.
pub struct ScriptedExecutor {
    responses: HashMap<String, String>,
    reachable: bool,
    pub issued: Vec<String>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            reachable: true,
            issued: Vec::new(),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new()
        }
    }

    pub fn respond(mut self, command: &str, output: &str) -> Self {
        self.responses.insert(command.to_string(), output.to_string());
        self
    }

    pub fn issued_switches(&self) -> Vec<&str> {
        self.issued
            .iter()
            .filter(|c| c.starts_with("interface "))
            .map(String::as_str)
            .collect()
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(&mut self, command: &str) -> Result<String, RouterError> {
        self.issued.push(command.to_string());
        if !self.reachable {
            return Err(RouterError::Timeout("192.0.2.1:22".to_string()));
        }
        Ok(self.responses.get(command).cloned().unwrap_or_default())
    }
}

/// Replays queued answers and keeps everything said to the user.
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    pub transcript: Vec<String>,
}

impl ScriptedConsole {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            transcript: Vec::new(),
        }
    }

    pub fn said(&self, needle: &str) -> bool {
        self.transcript.iter().any(|line| line.contains(needle))
    }

    fn next(&mut self, prompt: &str) -> Result<String, RouterError> {
        self.transcript.push(prompt.to_string());
        self.answers.pop_front().ok_or_else(|| {
            RouterError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "no scripted answer left",
            ))
        })
    }
}

impl Console for ScriptedConsole {
    fn say(&mut self, line: &str) {
        self.transcript.push(line.to_string());
    }

    fn ask(&mut self, prompt: &str) -> Result<String, RouterError> {
        self.next(prompt)
    }

    fn ask_secret(&mut self, prompt: &str) -> Result<String, RouterError> {
        self.next(prompt)
    }
}
