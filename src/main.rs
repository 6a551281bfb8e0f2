//! Crashline server binary
//!
//! Runs one game on the real clock and serves it over HTTP and WebSocket.

use clap::Parser;
use crashline::{
    api::ApiServer,
    config::{generate_sample_config, ConfigLoader},
    GameRuntime,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "crashline")]
#[command(about = "Crash game engine with HTTP and WebSocket API", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Override the API host
    #[arg(long)]
    host: Option<String>,

    /// Override the API port
    #[arg(long)]
    port: Option<u16>,

    /// Write a sample configuration to this path and exit
    #[arg(long)]
    generate_config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = args.generate_config {
        generate_sample_config(&path)?;
        println!("Sample configuration written to {}", path);
        return Ok(());
    }

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();

    info!("Starting crashline v{}", env!("CARGO_PKG_VERSION"));
    info!(
        betting_window_ms = config.game.betting_window_ms,
        crashed_delay_ms = config.game.crashed_delay_ms,
        starting_balance = config.game.starting_balance,
        "game configuration"
    );

    let runtime = GameRuntime::from_config(&config);
    let result = ApiServer::new(config.api.clone(), runtime.handle()).run().await;
    runtime.shutdown().await;

    result?;
    Ok(())
}
