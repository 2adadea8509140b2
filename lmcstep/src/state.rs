//! # Machine state
//! The snapshot of registers and memory exchanged with the service on every
//! step. Its shape belongs to the server: we keep it as a plain JSON object so
//! that fields we do not know about survive the round trip untouched.

use core::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Program counter value the service uses to signal a halted machine.
pub const HALT_PC: i64 = -1;

/// Server-owned machine state. Only [`MachineState::pc`] is interpreted.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MachineState(Map<String, Value>);

impl MachineState {
    /// Wraps a state received from the service, checking that it carries an
    /// integer program counter.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(Error::protocol(format!(
                "machine state must be an object, got {value}"
            )));
        };
        match fields.get("pc") {
            Some(pc) if pc.is_i64() => Ok(Self(fields)),
            Some(pc) => Err(Error::protocol(format!(
                "machine state has a non-integer pc: {pc}"
            ))),
            None => Err(Error::protocol("machine state has no pc field")),
        }
    }

    pub fn pc(&self) -> i64 {
        // Checked on construction.
        self.0.get("pc").and_then(Value::as_i64).unwrap_or(HALT_PC)
    }

    pub fn is_halted(&self) -> bool {
        self.pc() == HALT_PC
    }
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}
