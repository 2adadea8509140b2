//! # Service calls
//! The two remote operations the session relies on. Implementors deal with
//! transport and hand back the raw reply; interpreting it is the session's job.

use crate::{protocol::StepRequest, Result};

/// Raw response to a call. Error statuses are replies too, as some of them
/// carry a meaningful body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

pub trait LmcService {
    /// Submits program text for assembly.
    fn assemble(&mut self, source: &str) -> Result<Reply>;
    /// Executes exactly one instruction from the given state.
    fn step(&mut self, request: &StepRequest) -> Result<Reply>;
}

impl<S: LmcService + ?Sized> LmcService for &mut S {
    fn assemble(&mut self, source: &str) -> Result<Reply> {
        (**self).assemble(source)
    }
    fn step(&mut self, request: &StepRequest) -> Result<Reply> {
        (**self).step(request)
    }
}
