//! Calculator server.

use calcnet::{
    calculator::{CalculatorServer, CalculatorService},
    runtime, RpcConfig, DEFAULT_ADDR, DEFAULT_MAX_CONCURRENT_REQUESTS,
};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "calc-server", about = "Serve the remote calculator")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "CALCNET_ADDR", default_value = DEFAULT_ADDR)]
    addr: String,

    /// Upper bound on calculations running at once.
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT_REQUESTS)]
    max_concurrent_requests: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let args = Args::parse();
    let worker_threads = runtime::server_worker_threads();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    rt.block_on(async move {
        let config = RpcConfig::new(args.addr)
            .with_max_concurrent_requests(args.max_concurrent_requests);

        let mut server = CalculatorServer::new(CalculatorService, config);
        let listener = server.bind().await?;
        if let Some(addr) = server.local_addr() {
            info!(%addr, worker_threads, "calculator server started");
        }

        server.run(listener, shutdown_signal()).await?;
        info!("calculator server stopped");
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(%e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(%e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C"),
        _ = terminate => info!("received SIGTERM"),
    }
}
