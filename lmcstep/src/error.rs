//! # Session errors
//! Every failure the stepper can run into. Only a few of them end a session:
//! see [`Error::is_retryable`] for the ones worth trying again.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The service refused to assemble the program. Carries its message verbatim.
    #[error("assembly failed: {0}")]
    Compile(String),

    /// The request never got a response: connection refused, reset, DNS...
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    /// A non-success status that is not part of either response contract.
    #[error("server rejected request ({status}): {message}")]
    ServerRejected { status: u16, message: String },

    /// The response does not match the configured contract.
    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(String),

    /// The operator typed something that is not a command.
    #[error("invalid command {input:?}: {reason}")]
    Parse { input: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Transport failures, timeouts and server-side (5xx) errors may go away
    /// on their own. Everything else will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout => true,
            Self::ServerRejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolMismatch(message.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ProtocolMismatch(format!("malformed response: {err}"))
    }
}
