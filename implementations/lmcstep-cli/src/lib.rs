use std::{
    io::{stdin, stdout},
    time::Duration,
};

use lmcstep::{
    command::LineCommands,
    protocol::{Profile, StepRequest},
    report::WriteReporter,
    retry::RetryPolicy,
    service::{LmcService, Reply},
    session::{LoopState, Stepper},
    Error, Result,
};

pub const DEFAULT_URL: &str = "http://api.lmc.ethancoward.dev/";

/// Adds two inputs and prints the sum.
pub const DEMO_PROGRAM: &str = "
INP
STA FIRST
INP
ADD FIRST
OUT
HLT

FIRST DAT 0
";

/// Talks to the LMC service over HTTP, through a single reused agent.
pub struct HttpService {
    agent: ureq::Agent,
    assemble_url: String,
    step_url: String,
}
impl HttpService {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            assemble_url: endpoint(base_url, "assemble"),
            step_url: endpoint(base_url, "step"),
        }
    }

    fn post(&self, url: &str, content_type: &str, body: &str) -> Result<Reply> {
        log::debug!("POST {url} ({} bytes)", body.len());
        let response = match self
            .agent
            .post(url)
            .set("Content-Type", content_type)
            .send_string(body)
        {
            Ok(response) => response,
            // Error statuses still carry a body we want to look at.
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => return Err(transport_error(&transport)),
        };
        let status = response.status();
        let body = response
            .into_string()
            .map_err(|err| Error::Transport(format!("reading response: {err}")))?;
        log::debug!("{url} answered {status}");
        Ok(Reply::new(status, body))
    }
}
impl LmcService for HttpService {
    fn assemble(&mut self, source: &str) -> Result<Reply> {
        self.post(&self.assemble_url, "text/plain", source)
    }
    fn step(&mut self, request: &StepRequest) -> Result<Reply> {
        let body = serde_json::to_string(request)?;
        self.post(&self.step_url, "application/json", &body)
    }
}

fn endpoint(base_url: &str, name: &str) -> String {
    format!("{}/{name}", base_url.trim_end_matches('/'))
}

fn transport_error(transport: &ureq::Transport) -> Error {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(transport);
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ) {
                return Error::Timeout;
            }
        }
        source = err.source();
    }
    Error::Transport(transport.to_string())
}

#[derive(Clone, Debug)]
pub struct Config {
    pub url: String,
    pub profile: Profile,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

/// Assembles `source` on the configured service, then steps it interactively
/// from stdin until it halts or the operator quits.
pub fn run(config: &Config, source: &str) -> Result<LoopState> {
    log::info!("using {} ({} profile)", config.url, config.profile);
    let service = HttpService::new(&config.url, config.timeout);
    let mut stepper = Stepper::assemble(service, config.profile, config.retry.clone(), source)?;

    let mut commands = LineCommands::new(stdin().lock(), stdout());
    let mut reporter = WriteReporter::new(stdout());
    stepper.run(&mut commands, &mut reporter)
}
