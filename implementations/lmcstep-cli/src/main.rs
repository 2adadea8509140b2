use std::{fs, path::PathBuf, time::Duration};

use anyhow::Context;
use clap::Parser;
use lmcstep::{protocol::Profile, retry::RetryPolicy, session::LoopState};
use lmcstep_cli::{run, Config, DEFAULT_URL, DEMO_PROGRAM};

/// Steps a Little Man Computer program one instruction at a time on a remote
/// service. Type a number to feed it as input, `s` to step without input, `q` to quit.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Arguments {
    /// LMC assembly source. A small adder is used when omitted.
    program: Option<PathBuf>,
    /// Base URL of the service.
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,
    /// Response contract the service speaks: `prospective` or `retrospective`.
    #[arg(long, default_value_t = Profile::Prospective)]
    profile: Profile,
    /// Timeout of each request, in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,
    /// Attempts per request before giving up on a transport failure.
    #[arg(long, default_value_t = 3)]
    retries: u32,
    #[arg(long, default_value_t = 200)]
    backoff_initial_ms: u64,
    #[arg(long, default_value_t = 2_000)]
    backoff_max_ms: u64,
    /// Log requests and timings.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();
    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(level));

    let source = match &args.program {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?,
        None => DEMO_PROGRAM.to_owned(),
    };
    let config = Config {
        url: args.url,
        profile: args.profile,
        timeout: Duration::from_millis(args.timeout_ms),
        retry: RetryPolicy {
            attempts: args.retries,
            initial_backoff: Duration::from_millis(args.backoff_initial_ms),
            max_backoff: Duration::from_millis(args.backoff_max_ms),
        },
    };

    match run(&config, &source)? {
        LoopState::Halted => log::info!("program finished"),
        state => log::info!("stopped in state {state:?}"),
    }
    Ok(())
}
