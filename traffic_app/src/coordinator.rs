use std::{io, net::SocketAddr, path::PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;
use traffic::{coordinator, group, input, report, Config, MalformedPolicy};

/// Ranks the most congested traffic lights in a traffic-event log.
#[derive(Debug, Parser)]
#[command(name = "coordinator")]
struct Args {
    /// Input log, one `timestamp,location,count` record per line.
    #[arg(short, long, default_value = "traffic_data.txt")]
    input: PathBuf,

    /// Participants including the coordinator.
    #[arg(short = 'n', long, env = "TRAFFIC_GROUP_SIZE", default_value_t = 4)]
    group_size: usize,

    /// Number of locations in the ranking.
    #[arg(short = 'k', long, default_value_t = 3)]
    top: usize,

    #[arg(long, value_enum, default_value_t = MalformedPolicy::Abort)]
    on_malformed: MalformedPolicy,

    /// Wait for worker processes on this address instead of running the
    /// workers in-process.
    #[arg(long, env = "TRAFFIC_LISTEN")]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::new(args.group_size)
        .with_top_k(args.top)
        .with_policy(args.on_malformed);
    config.validate()?;

    let path = args.input;
    let load = || input::read_records(&path);
    let outcome = match args.listen {
        Some(addr) => {
            let listener = group::bind(addr).await?;
            coordinator::run_tcp(config.clone(), listener, load).await?
        }
        None => coordinator::run_local(config.clone(), load).await?,
    };

    report::write_report(io::stdout().lock(), &outcome.ranking, config.top_k)?;
    Ok(())
}
