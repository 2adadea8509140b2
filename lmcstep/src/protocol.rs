//! # Response contracts
//! The service has been seen speaking two dialects that differ only in how they
//! tell the client about input:
//! - [`Profile::Prospective`]: every response carries `next_requires_input`,
//!   so the client knows *before* stepping whether the next instruction reads input.
//! - [`Profile::Retrospective`]: step responses carry `input_success`, telling
//!   *after* the fact whether the instruction got the input it wanted. Assembly
//!   responses say nothing, so the first step is always attempted.
//!
//! Which one a server speaks is configuration. Responses are never probed to
//! guess it.

use core::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{state::MachineState, Error, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Profile {
    #[default]
    Prospective,
    Retrospective,
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prospective" | "a" => Ok(Self::Prospective),
            "retrospective" | "b" => Ok(Self::Retrospective),
            other => Err(format!(
                "unknown profile {other:?}, expected `prospective` or `retrospective`"
            )),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Prospective => "prospective",
            Self::Retrospective => "retrospective",
        })
    }
}

/// What a step response says about input, in the dialect of its [`Profile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputDisposition {
    Prospective { next_requires_input: bool },
    Retrospective { last_input_succeeded: bool },
}

impl InputDisposition {
    /// Whether the next step must be given a value before being attempted.
    /// Only the prospective dialect can know this in advance.
    pub fn next_requires_input(&self) -> bool {
        match self {
            Self::Prospective {
                next_requires_input,
            } => *next_requires_input,
            Self::Retrospective { .. } => false,
        }
    }
}

impl fmt::Display for InputDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prospective {
                next_requires_input,
            } => write!(f, "Next requires input: {next_requires_input}"),
            Self::Retrospective {
                last_input_succeeded,
            } => write!(f, "Input success: {last_input_succeeded}"),
        }
    }
}

/// Body of a `step` call: the current state, verbatim, plus at most one input.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepRequest {
    pub state: MachineState,
    pub input: Vec<i16>,
}

impl StepRequest {
    pub fn new(state: MachineState, input: Option<i16>) -> Self {
        Self {
            state,
            input: input.into_iter().collect(),
        }
    }
}

/// A value emitted by an `OUT` instruction. Servers are expected to send plain
/// numbers, anything else is kept as-is and printed as JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputValue {
    Number(i64),
    Other(Value),
}

impl fmt::Display for OutputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}

/// Decoded response to `assemble`.
#[derive(Clone, Debug, PartialEq)]
pub struct Assembled {
    pub state: MachineState,
    pub input_required: bool,
}

/// Decoded response to `step`.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub state: MachineState,
    pub output: Vec<OutputValue>,
    pub disposition: InputDisposition,
}

impl Profile {
    pub fn decode_assembly(&self, body: &str) -> Result<Assembled> {
        let mut fields = response_object(body)?;
        let state = take_state(&mut fields)?;
        let input_required = match self {
            Self::Prospective => take_bool(&mut fields, "next_requires_input")?,
            Self::Retrospective => false,
        };
        Ok(Assembled {
            state,
            input_required,
        })
    }

    /// Decodes a step response. `input_sent` tells whether the request carried
    /// a value: under the retrospective contract a `null` `input_success` means
    /// the instruction read nothing, which only counts as success if nothing
    /// was offered.
    pub fn decode_step(&self, body: &str, input_sent: bool) -> Result<StepOutcome> {
        let mut fields = response_object(body)?;
        let state = take_state(&mut fields)?;
        let output = match fields.remove("output") {
            Some(output) => serde_json::from_value(output)?,
            None => return Err(Error::protocol("response has no output field")),
        };
        let disposition = match self {
            Self::Prospective => InputDisposition::Prospective {
                next_requires_input: take_bool(&mut fields, "next_requires_input")?,
            },
            Self::Retrospective => match fields.remove("input_success") {
                // The instruction did not read input at all.
                Some(Value::Null) => InputDisposition::Retrospective {
                    last_input_succeeded: !input_sent,
                },
                Some(Value::Bool(last_input_succeeded)) => InputDisposition::Retrospective {
                    last_input_succeeded,
                },
                Some(other) => {
                    return Err(Error::protocol(format!(
                        "input_success must be a boolean, got {other}"
                    )))
                }
                None => return Err(Error::protocol("response has no input_success field")),
            },
        };
        Ok(StepOutcome {
            state,
            output,
            disposition,
        })
    }
}

fn response_object(body: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(body)? {
        Value::Object(fields) => Ok(fields),
        other => Err(Error::protocol(format!(
            "response must be a JSON object, got {other}"
        ))),
    }
}

fn take_state(fields: &mut Map<String, Value>) -> Result<MachineState> {
    let state = fields
        .remove("state")
        .ok_or_else(|| Error::protocol("response has no state field"))?;
    MachineState::from_value(state)
}

fn take_bool(fields: &mut Map<String, Value>, name: &str) -> Result<bool> {
    match fields.remove(name) {
        Some(Value::Bool(b)) => Ok(b),
        Some(other) => Err(Error::protocol(format!(
            "{name} must be a boolean, got {other}"
        ))),
        None => Err(Error::protocol(format!("response has no {name} field"))),
    }
}
