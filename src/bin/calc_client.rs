//! Interactive calculator client.

use std::{net::SocketAddr, time::Duration};

use calcnet::{calculator::CalculatorClient, cli, RpcConfig, DEFAULT_ADDR};
use clap::Parser;
use tokio::io::{self, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "calc-client", about = "Talk to the remote calculator")]
struct Args {
    /// Server address.
    #[arg(long, env = "CALCNET_ADDR", default_value = DEFAULT_ADDR)]
    addr: SocketAddr,

    /// Seconds to wait for each response.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Quiet by default so log lines don't interleave with the menu.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = RpcConfig::new("0.0.0.0:0")
        .with_request_timeout(Duration::from_secs(args.timeout_secs));

    let client = CalculatorClient::connect(args.addr, config).await?;
    cli::run_session(&client, BufReader::new(io::stdin()), io::stdout()).await?;
    Ok(())
}
