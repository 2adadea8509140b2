//! # Console reporting
//! What the operator sees after each command. The session emits
//! [`SessionEvent`]s and a [`Reporter`] decides how to show them.

use std::io::Write;
use std::time::Duration;

use crate::{
    protocol::{OutputValue, StepOutcome},
    state::MachineState,
    Error,
};

#[derive(Debug)]
pub enum SessionEvent<'a> {
    /// The program was assembled. `input_required` is only known under the
    /// prospective contract.
    Assembled {
        state: &'a MachineState,
        input_required: Option<bool>,
    },
    Stepped {
        outcome: &'a StepOutcome,
        elapsed: Duration,
    },
    /// `s` was issued while the machine waits for a value. Nothing was sent.
    NoInputProvided,
    InvalidCommand(&'a Error),
    /// The step could not be carried out; the session state is unchanged.
    StepFailed(&'a Error),
    Halted,
}

pub trait Reporter {
    fn report(&mut self, event: &SessionEvent<'_>) -> std::io::Result<()>;
}

/// Prints events as plain text lines.
pub struct WriteReporter<W> {
    out: W,
}

impl<W: Write> WriteReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for WriteReporter<W> {
    fn report(&mut self, event: &SessionEvent<'_>) -> std::io::Result<()> {
        match event {
            SessionEvent::Assembled {
                state,
                input_required,
            } => {
                writeln!(self.out, "{state}")?;
                if let Some(required) = input_required {
                    writeln!(self.out, "Next requires input: {required}")?;
                }
            }
            SessionEvent::Stepped { outcome, elapsed } => {
                writeln!(self.out, "Step time: {:.6}", elapsed.as_secs_f64())?;
                writeln!(self.out, "{}", outcome.state)?;
                writeln!(self.out, "Output: {}", format_output(&outcome.output))?;
                writeln!(self.out, "{}", outcome.disposition)?;
            }
            SessionEvent::NoInputProvided => writeln!(self.out, "No input provided.")?,
            SessionEvent::InvalidCommand(err) => writeln!(self.out, "Invalid command: {err}")?,
            SessionEvent::StepFailed(err) => writeln!(self.out, "Step failed: {err}")?,
            SessionEvent::Halted => writeln!(self.out, "Machine halted.")?,
        }
        self.out.flush()
    }
}

fn format_output(output: &[OutputValue]) -> String {
    let values: Vec<String> = output.iter().map(ToString::to_string).collect();
    format!("[{}]", values.join(", "))
}
