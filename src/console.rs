use std::io::{self, BufRead, Write};

use crate::error::RouterError;

/// Everything the tool says to or asks of the user.
pub trait Console {
    fn say(&mut self, line: &str);
    /// Returns the answer without its trailing newline.
    fn ask(&mut self, prompt: &str) -> Result<String, RouterError>;
    /// Like [`Console::ask`], without echoing the input.
    fn ask_secret(&mut self, prompt: &str) -> Result<String, RouterError>;
}

pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn say(&mut self, line: &str) {
        println!("{}", line);
    }

    fn ask(&mut self, prompt: &str) -> Result<String, RouterError> {
        print!("{}", prompt);
        io::stdout().flush()?;
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer)? == 0 {
            return Err(RouterError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "standard input closed",
            )));
        }
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }

    fn ask_secret(&mut self, prompt: &str) -> Result<String, RouterError> {
        Ok(rpassword::prompt_password(prompt)?)
    }
}

/// Answer to "do it?". `Change` is only offered when the managed interface can be switched.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Confirmation {
    Yes,
    No,
    Change,
}

impl Confirmation {
    pub fn parse(answer: &str, allow_change: bool) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "y" => Confirmation::Yes,
            "c" if allow_change => Confirmation::Change,
            _ => Confirmation::No,
        }
    }
}
