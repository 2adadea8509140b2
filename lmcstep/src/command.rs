//! # Operator commands
//! Three commands drive a session:
//! - `q` quits right away,
//! - `s` steps without input,
//! - any integer steps with that integer as input.
//!
//! Commands come from a [`CommandSource`], one line at a time. This is the only
//! place the session blocks on the operator.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use crate::{Error, Result};

pub const PROMPT: &str = "Enter input: ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    Step,
    /// Step, feeding this value to the machine. Inputs are 16 bit on the service side.
    Input(i16),
}

impl Command {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        match trimmed {
            "q" => Ok(Self::Quit),
            "s" => Ok(Self::Step),
            _ => trimmed.parse().map(Self::Input).map_err(|err| Error::Parse {
                input: trimmed.to_owned(),
                reason: err.to_string(),
            }),
        }
    }

    /// The input list sent along with the step: empty or a single value.
    pub fn input(&self) -> Option<i16> {
        match self {
            Self::Input(value) => Some(*value),
            _ => None,
        }
    }
}

/// Yields raw operator commands. `Ok(None)` means there will be no more.
pub trait CommandSource {
    fn next_line(&mut self) -> Result<Option<String>>;
}

/// Reads commands line by line, printing a prompt before each.
pub struct LineCommands<R, W> {
    reader: R,
    prompt: W,
}

impl<R: BufRead, W: Write> LineCommands<R, W> {
    pub fn new(reader: R, prompt: W) -> Self {
        Self { reader, prompt }
    }
}

impl<R: BufRead, W: Write> CommandSource for LineCommands<R, W> {
    fn next_line(&mut self) -> Result<Option<String>> {
        write!(self.prompt, "{PROMPT}")?;
        self.prompt.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// A fixed queue of commands, handy for tests and piping a session from a script.
#[derive(Clone, Debug, Default)]
pub struct ScriptedCommands {
    lines: VecDeque<String>,
}

impl ScriptedCommands {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl CommandSource for ScriptedCommands {
    fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("q").unwrap(), Command::Quit);
        assert_eq!(Command::parse("s\n").unwrap(), Command::Step);
        assert_eq!(Command::parse(" 42 ").unwrap(), Command::Input(42));
        assert_eq!(Command::parse("-7").unwrap(), Command::Input(-7));
    }

    #[test]
    fn parse_rejects_garbage() {
        for raw in ["", "quit", "S", "1.5", "99999", "5 6"] {
            assert!(
                matches!(Command::parse(raw), Err(Error::Parse { .. })),
                "{raw:?} should not parse"
            );
        }
    }

    #[test]
    fn input_is_singleton() {
        assert_eq!(Command::Input(3).input(), Some(3));
        assert_eq!(Command::Step.input(), None);
        assert_eq!(Command::Quit.input(), None);
    }

    #[test]
    fn line_commands_prompt_and_eof() {
        let mut prompt = Vec::new();
        let mut source = LineCommands::new(Cursor::new("5\ns\n"), &mut prompt);
        assert_eq!(source.next_line().unwrap().as_deref(), Some("5\n"));
        assert_eq!(source.next_line().unwrap().as_deref(), Some("s\n"));
        assert_eq!(source.next_line().unwrap(), None);
        assert_eq!(String::from_utf8(prompt).unwrap(), PROMPT.repeat(3));
    }
}
