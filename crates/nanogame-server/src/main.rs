use std::path::PathBuf;

use clap::Parser;
use nanogame_server::config::ServerConfig;
use nanogame_server::server::Server;
use tokio::io::AsyncBufReadExt;
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Port to listen on, overriding the config file
    port: Option<u16>,
    /// Path to the TOML config file
    #[arg(short, long, default_value = "nanogame.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = match ServerConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", args.config.display());
            std::process::exit(1);
        }
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(
        "nanogame v{} starting on {}:{}",
        env!("CARGO_PKG_VERSION"),
        config.server.address,
        config.server.port
    );
    info!(
        "Max connections: {}, keepalive every {} ticks of {} ms",
        config.server.max_connections,
        config.game.keepalive_interval_ticks,
        config.network.tick_interval_ms
    );

    let addr = match config.bind_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    // Handle Ctrl+C
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    // Console: read lines from stdin
    let (console_tx, console_rx) = tokio::sync::mpsc::channel::<String>(32);
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    if let Err(e) = Server::new(config).run(listener, shutdown_rx, console_rx).await {
        error!("Server error: {e}");
        std::process::exit(1);
    }
    info!("Server shut down.");
}
