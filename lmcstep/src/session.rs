//! # Stepper session
//! Holds the one authoritative machine state between steps and runs the
//! command loop:
//! ```text
//!            ┌──────────────── step sent ◄──────────────┐
//!            ▼                                          │
//! assemble ─► Running ──► AwaitingCommand ──────────────┘
//!            │               │    ▲   │
//!            │ pc == -1      │    └───┘ `s` while input is pending,
//!            ▼               │          invalid command, failed step
//!          Halted            ▼ `q` or end of commands
//!                           Quit
//! ```
//! A halted machine is never stepped, and nothing is sent after `q`.

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::{
    command::{Command, CommandSource},
    protocol::{InputDisposition, Profile, StepOutcome, StepRequest},
    report::{Reporter, SessionEvent},
    retry::RetryPolicy,
    service::{LmcService, Reply},
    state::MachineState,
    Error, Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    AwaitingCommand,
    Halted,
    Quit,
}

/// The state of one run. Replaced as a whole after every successful step.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    state: MachineState,
    pending_input: bool,
}

impl Session {
    pub fn state(&self) -> &MachineState {
        &self.state
    }

    /// Whether the next step needs a value from the operator. Always `false`
    /// under the retrospective contract, which cannot know in advance.
    pub fn pending_input(&self) -> bool {
        self.pending_input
    }
}

/// What became of a step request.
#[derive(Clone, Debug, PartialEq)]
pub enum StepResult {
    Stepped {
        outcome: StepOutcome,
        elapsed: Duration,
    },
    /// No input was given but the machine is waiting for one. Nothing was sent.
    NoInputProvided,
    /// The machine had already halted. Nothing was sent.
    Halted,
}

pub struct Stepper<S> {
    service: S,
    profile: Profile,
    retry: RetryPolicy,
    session: Session,
}

impl<S: LmcService> Stepper<S> {
    /// Assembles `source` and starts a session on the resulting state.
    ///
    /// The service answers a program it cannot assemble with a client error,
    /// which becomes [`Error::Compile`].
    pub fn assemble(mut service: S, profile: Profile, retry: RetryPolicy, source: &str) -> Result<Self> {
        debug!("assembling {} bytes of source", source.len());
        let reply = retry.run("assemble", || {
            let reply = service.assemble(source)?;
            if reply.is_success() {
                Ok(reply)
            } else if reply.is_client_error() {
                Err(Error::Compile(reply.body))
            } else {
                Err(rejected(reply))
            }
        })?;
        let assembled = profile.decode_assembly(&reply.body)?;
        info!(
            "program assembled, pc = {}, profile = {profile}",
            assembled.state.pc()
        );

        Ok(Self {
            service,
            profile,
            retry,
            session: Session {
                state: assembled.state,
                pending_input: assembled.input_required,
            },
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Executes one instruction, feeding it `input` if any.
    ///
    /// The current state is sent verbatim. On success it is replaced by the
    /// returned one; on error the session is left as it was.
    pub fn step(&mut self, input: Option<i16>) -> Result<StepResult> {
        if self.session.state.is_halted() {
            return Ok(StepResult::Halted);
        }
        if input.is_none() && self.session.pending_input {
            return Ok(StepResult::NoInputProvided);
        }

        let request = StepRequest::new(self.session.state.clone(), input);
        let profile = self.profile;
        let input_sent = input.is_some();
        let service = &mut self.service;
        debug!("stepping from pc = {} with input {:?}", request.state.pc(), request.input);

        let started = Instant::now();
        let outcome = self.retry.run("step", || {
            let reply = service.step(&request)?;
            if reply.is_success() {
                return profile.decode_step(&reply.body, input_sent);
            }
            if reply.is_client_error() {
                // A step that wanted input and got none is answered with a
                // client error, but still carries a full step body.
                if let Ok(outcome) = profile.decode_step(&reply.body, input_sent) {
                    debug!("step answered with status {}, body accepted", reply.status);
                    return Ok(outcome);
                }
            }
            Err(rejected(reply))
        })?;
        let elapsed = started.elapsed();
        debug!("step took {elapsed:?}, pc = {}", outcome.state.pc());

        if let InputDisposition::Retrospective {
            last_input_succeeded: false,
        } = outcome.disposition
        {
            warn!("service reports the instruction did not consume the input it was given");
        }

        self.session = Session {
            state: outcome.state.clone(),
            pending_input: outcome.disposition.next_requires_input(),
        };
        Ok(StepResult::Stepped { outcome, elapsed })
    }

    /// Runs the command loop until the machine halts or the operator quits,
    /// returning which of the two happened.
    ///
    /// Invalid commands and steps that failed in transport are reported and
    /// the operator is prompted again. A response that breaks the contract
    /// ends the run with an error.
    pub fn run(
        &mut self,
        commands: &mut impl CommandSource,
        reporter: &mut impl Reporter,
    ) -> Result<LoopState> {
        let input_required = match self.profile {
            Profile::Prospective => Some(self.session.pending_input),
            Profile::Retrospective => None,
        };
        reporter.report(&SessionEvent::Assembled {
            state: &self.session.state,
            input_required,
        })?;

        let mut loop_state = LoopState::Running;
        loop {
            loop_state = match loop_state {
                LoopState::Running if self.session.state.is_halted() => LoopState::Halted,
                LoopState::Running => LoopState::AwaitingCommand,
                LoopState::AwaitingCommand => self.handle_command(commands, reporter)?,
                LoopState::Halted => {
                    info!("machine halted");
                    reporter.report(&SessionEvent::Halted)?;
                    return Ok(LoopState::Halted);
                }
                LoopState::Quit => {
                    info!("session ended by operator");
                    return Ok(LoopState::Quit);
                }
            }
        }
    }

    fn handle_command(
        &mut self,
        commands: &mut impl CommandSource,
        reporter: &mut impl Reporter,
    ) -> Result<LoopState> {
        let Some(line) = commands.next_line()? else {
            debug!("no more commands");
            return Ok(LoopState::Quit);
        };
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                reporter.report(&SessionEvent::InvalidCommand(&err))?;
                return Ok(LoopState::AwaitingCommand);
            }
        };
        if command == Command::Quit {
            return Ok(LoopState::Quit);
        }

        match self.step(command.input()) {
            Ok(StepResult::Stepped { outcome, elapsed }) => {
                reporter.report(&SessionEvent::Stepped {
                    outcome: &outcome,
                    elapsed,
                })?;
                Ok(LoopState::Running)
            }
            Ok(StepResult::NoInputProvided) => {
                reporter.report(&SessionEvent::NoInputProvided)?;
                Ok(LoopState::AwaitingCommand)
            }
            Ok(StepResult::Halted) => Ok(LoopState::Halted),
            Err(err @ (Error::Transport(_) | Error::Timeout | Error::ServerRejected { .. })) => {
                reporter.report(&SessionEvent::StepFailed(&err))?;
                Ok(LoopState::AwaitingCommand)
            }
            Err(err) => Err(err),
        }
    }
}

fn rejected(reply: Reply) -> Error {
    Error::ServerRejected {
        status: reply.status,
        message: reply.body,
    }
}
