mod handlers;
mod logging;
mod report;
mod router;
mod scenario;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use plumber_flow::config::FlowConfig;
use plumber_flow::records::{FixtureRepository, JobRepository};
use plumber_flow::tracker::{TransitionPolicy, TransitionTable};

use logging::LogFormat;
use scenario::Scenario;
use state::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file to replay (defaults to the built-in walkthrough)
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Job records fixture (defaults to the bundled records)
    #[arg(short, long)]
    records: Option<PathBuf>,

    /// Where to write the session report
    #[arg(short, long, default_value = "session.json")]
    output: PathBuf,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    /// Only allow staying put or advancing one status at a time
    #[arg(long)]
    guarded: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    logging::init_logging(args.log_format);

    let config = FlowConfig::from_env()?;
    let repo: Arc<dyn JobRepository> = match &args.records {
        Some(path) => Arc::new(FixtureRepository::from_path(path)?),
        None => Arc::new(FixtureRepository::bundled()?),
    };
    let scenario = match &args.scenario {
        Some(path) => Scenario::from_path(path)?,
        None => Scenario::walkthrough()?,
    };
    let policy = if args.guarded {
        TransitionPolicy::Guarded(TransitionTable::forward_only())
    } else {
        TransitionPolicy::Open
    };

    let mut state = AppState::new(config, policy, repo);
    let report = report::run(&mut state, &scenario).await;
    info!(
        steps = report.steps.len(),
        failed = report.failures(),
        final_screen = %report.final_screen,
        "scenario finished"
    );
    report::save_json(&report, &args.output)?;

    Ok(())
}
