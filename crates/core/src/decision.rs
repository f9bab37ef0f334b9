use crate::console::Console;
use crate::error::Abort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Always,
    Quit,
}

impl Answer {
    pub fn key(self) -> &'static str {
        match self {
            Answer::Yes => "y",
            Answer::No => "n",
            Answer::Always => "a",
            Answer::Quit => "q",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt {
    pub question: &'static str,
    pub options: &'static [Answer],
    /// Used when the operator just presses enter.
    pub default: Answer,
}

pub const RENAME_PROMPT: Prompt = Prompt {
    question: "Rename?",
    options: &[Answer::Yes, Answer::No, Answer::Always, Answer::Quit],
    default: Answer::Yes,
};

pub const MOVE_PROMPT: Prompt = Prompt {
    question: "Move file?",
    options: &[Answer::Yes, Answer::No, Answer::Quit],
    default: Answer::Yes,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Rename,
    Skip,
    /// Rename this one and stop asking for the rest of the batch.
    Escalate,
    Quit,
}

impl Decision {
    pub fn renames(self) -> bool {
        matches!(self, Decision::Rename | Decision::Escalate)
    }
}

/// State that lives for one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunState {
    pub always_rename: bool,
}

impl Prompt {
    /// `([y]/n/a/q) ` with the default in brackets.
    pub fn options_label(&self) -> String {
        let labels = self
            .options
            .iter()
            .map(|option| {
                if *option == self.default {
                    format!("[{}]", option.key())
                } else {
                    option.key().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("/");
        format!("({labels}) ")
    }

    fn parse(&self, input: &str) -> Option<Answer> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Some(self.default);
        }
        self.options
            .iter()
            .copied()
            .find(|option| option.key() == trimmed)
    }
}

/// Asks until one of the prompt's options (or an empty line) is entered.
/// Closed or interrupted input aborts the batch.
pub fn ask(console: &mut dyn Console, prompt: &Prompt) -> Result<Answer, Abort> {
    let label = prompt.options_label();
    loop {
        console.say(prompt.question);
        let line = match console.read_answer(&label) {
            Ok(Some(line)) => line,
            Ok(None) => return Err(Abort::Interrupted),
            Err(err) => {
                log::debug!("reading answer failed: {err}");
                return Err(Abort::Interrupted);
            }
        };
        if let Some(answer) = prompt.parse(&line) {
            return Ok(answer);
        }
        log::debug!("unrecognised answer {:?}, asking again", line.trim());
    }
}

/// Rename confirmation. Skips the prompt entirely once `always_rename` is set
/// and sets it when the operator answers "always".
pub fn decide_rename(console: &mut dyn Console, run: &mut RunState) -> Result<Decision, Abort> {
    if run.always_rename {
        return Ok(Decision::Rename);
    }

    let decision = match ask(console, &RENAME_PROMPT)? {
        Answer::Yes => {
            console.say("Renaming");
            Decision::Rename
        }
        Answer::No => {
            console.say("Skipping");
            Decision::Skip
        }
        Answer::Always => {
            console.say("Always renaming");
            run.always_rename = true;
            Decision::Escalate
        }
        Answer::Quit => {
            console.say("Quitting");
            Decision::Quit
        }
    };
    Ok(decision)
}

/// Move confirmation. Independent of `always_rename`; only asks when
/// `confirm` is on.
pub fn decide_move(console: &mut dyn Console, confirm: bool) -> Result<Decision, Abort> {
    if !confirm {
        return Ok(Decision::Rename);
    }

    let decision = match ask(console, &MOVE_PROMPT)? {
        Answer::Yes | Answer::Always => Decision::Rename,
        Answer::No => Decision::Skip,
        Answer::Quit => {
            console.say("Quitting");
            Decision::Quit
        }
    };
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;

    #[test]
    fn label_marks_default() {
        assert_eq!(RENAME_PROMPT.options_label(), "([y]/n/a/q) ");
        assert_eq!(MOVE_PROMPT.options_label(), "([y]/n/q) ");
    }

    #[test]
    fn empty_answer_takes_default() {
        let mut console = ScriptedConsole::new(["   \n"]);
        assert_eq!(ask(&mut console, &RENAME_PROMPT), Ok(Answer::Yes));
    }

    #[test]
    fn invalid_answers_reprompt() {
        let mut console = ScriptedConsole::new(["maybe", "Y", "n\n"]);
        assert_eq!(ask(&mut console, &RENAME_PROMPT), Ok(Answer::No));
        assert_eq!(console.prompts.len(), 3);
    }

    #[test]
    fn always_is_not_offered_for_moves() {
        let mut console = ScriptedConsole::new(["a", "q"]);
        assert_eq!(ask(&mut console, &MOVE_PROMPT), Ok(Answer::Quit));
        assert_eq!(console.prompts.len(), 2);
    }

    #[test]
    fn closed_input_is_an_interrupt() {
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        assert_eq!(ask(&mut console, &RENAME_PROMPT), Err(Abort::Interrupted));
    }

    #[test]
    fn always_escalates_and_sticks() {
        let mut run = RunState::default();
        let mut console = ScriptedConsole::new(["a"]);
        assert_eq!(
            decide_rename(&mut console, &mut run),
            Ok(Decision::Escalate)
        );
        assert!(run.always_rename);

        assert_eq!(decide_rename(&mut console, &mut run), Ok(Decision::Rename));
        assert_eq!(console.prompts.len(), 1);
    }

    #[test]
    fn quit_is_reported_as_decision() {
        let mut run = RunState::default();
        let mut console = ScriptedConsole::new(["q"]);
        assert_eq!(decide_rename(&mut console, &mut run), Ok(Decision::Quit));
        assert!(!run.always_rename);
    }

    #[test]
    fn move_without_confirmation_never_prompts() {
        let mut console = ScriptedConsole::new(Vec::<String>::new());
        assert_eq!(decide_move(&mut console, false), Ok(Decision::Rename));
        assert!(console.prompts.is_empty());
    }
}
