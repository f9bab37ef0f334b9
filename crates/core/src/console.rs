use colored::Colorize;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Line-oriented operator console: progress text, warnings and prompts.
pub trait Console {
    fn say(&mut self, line: &str);

    fn write_warning(&mut self, message: &str);

    /// Shows `prompt` and reads one line of input. `Ok(None)` means the input
    /// was closed or interrupted before an answer arrived.
    fn read_answer(&mut self, prompt: &str) -> io::Result<Option<String>>;

    fn warn(&mut self, message: &str) {
        log::debug!("warning: {message}");
        self.write_warning(message);
    }
}

/// Console backed by the process's stdin/stdout/stderr.
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn say(&mut self, line: &str) {
        println!("{line}");
    }

    fn write_warning(&mut self, message: &str) {
        eprintln!("{}", format!("Warning: {message}").yellow());
    }

    fn read_answer(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(line)),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Console that answers prompts from a fixed script and records everything
/// written to it. Running out of answers behaves like closed input.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    pub output: Vec<String>,
    pub warnings: Vec<String>,
    pub prompts: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn remaining_answers(&self) -> usize {
        self.answers.len()
    }

    pub fn said(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }
}

impl Console for ScriptedConsole {
    fn say(&mut self, line: &str) {
        self.output.push(line.to_string());
    }

    fn write_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn read_answer(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }
}
