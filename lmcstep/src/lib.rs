//! # LmcStep: single-stepping a remote Little Man Computer
//! Client side of an LMC assembler/VM service. The service assembles a program
//! into a machine state, then executes exactly one instruction per `step` call.
//! This crate owns everything in between: the machine-state snapshot, the
//! operator command grammar, and the decision of when input is required.
//!
//! The machine state is server-defined and opaque: only `pc` is ever read, and
//! the whole value is sent back verbatim on the next step.
//!
//! Two response contracts exist in the wild, see [`protocol::Profile`]. The
//! network itself sits behind the [`service::LmcService`] trait, so the session
//! can be driven by an HTTP client, or by a scripted stub in tests.
//! ```rust
//! # use lmcstep::{command::ScriptedCommands, report::WriteReporter, retry::RetryPolicy};
//! # use lmcstep::{protocol::Profile, session::Stepper, service::LmcService};
//! # fn run(service: impl LmcService) -> lmcstep::Result<()> {
//! let mut stepper = Stepper::assemble(
//!     service,
//!     Profile::Prospective,
//!     RetryPolicy::default(),
//!     "INP\nOUT\nHLT",
//! )?;
//! let mut commands = ScriptedCommands::new(["5", "s", "s"]);
//! stepper.run(&mut commands, &mut WriteReporter::new(std::io::stdout()))?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod error;
pub mod protocol;
pub mod report;
pub mod retry;
pub mod service;
pub mod session;
pub mod state;

pub use error::{Error, Result};
