use std::{io, net::SocketAddr};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use traffic::{group, worker};

/// Joins a coordinator's group and tallies the records it is sent.
#[derive(Debug, Parser)]
#[command(name = "worker")]
struct Args {
    /// Address the coordinator listens on.
    #[arg(short, long, env = "TRAFFIC_COORDINATOR", default_value = "[::1]:50051")]
    coordinator: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let link = group::connect(args.coordinator).await?;
    info!(coordinator = %args.coordinator, "connected");
    let summary = worker::run(link).await?;
    info!(rank = summary.rank, records = summary.records, "worker finished");
    Ok(())
}
