//! Terminal prompts for the interactive configuration layer.

use std::io::{self, BufRead, Write};

use crate::error::Result;

/// Source of answers for interactive questions.
pub trait Prompter {
    /// Ask a question and return the trimmed answer.
    fn ask(&mut self, question: &str) -> Result<String>;

    /// Ask without echoing the answer.
    fn ask_secret(&mut self, question: &str) -> Result<String>;
}

/// Reads answers from stdin; secrets go through `rpassword`.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, question: &str) -> Result<String> {
        println!("{}", question);
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn ask_secret(&mut self, question: &str) -> Result<String> {
        let answer = rpassword::prompt_password(masked_label(question))?;
        Ok(answer.trim().to_string())
    }
}

/// The question itself labels the masked input line.
fn masked_label(question: &str) -> String {
    format!("{} ", question.trim_end())
}

/// Replays canned answers.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    pub asked: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    fn next(&mut self, question: &str) -> Result<String> {
        self.asked.push(question.to_string());
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answer left").into()
        })
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> Result<String> {
        self.next(question)
    }

    fn ask_secret(&mut self, question: &str) -> Result<String> {
        self.next(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Field;

    #[test]
    fn test_masked_label_names_the_field() {
        assert_eq!(
            masked_label(&Field::BitgetApiSecret.prompt()),
            "Enter the bitget api secret: "
        );
        assert_eq!(masked_label("Please confirm the password:"), "Please confirm the password: ");
    }

    #[test]
    fn test_scripted_answers_run_out() {
        let mut prompter = ScriptedPrompter::new(["a"]);
        assert_eq!(prompter.ask("first").unwrap(), "a");
        assert!(prompter.ask_secret("second").is_err());
        assert_eq!(prompter.asked, vec!["first".to_string(), "second".to_string()]);
    }
}
