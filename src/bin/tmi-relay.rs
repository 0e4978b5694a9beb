//! Relay server binary
//!
//! Runs the relay on the configured address until interrupted.

use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tmi_relay::{RelayServer, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "tmi-relay", version, about = "Channel-based chat relay speaking a minimal Twitch IRC subset")]
struct Args {
    /// Address to bind the relay server to
    #[arg(long, default_value = "0.0.0.0")]
    address: IpAddr,

    /// Port to bind the relay server to
    #[arg(long, default_value_t = tmi_relay::protocol::DEFAULT_PORT)]
    port: u16,

    /// Enable verbose (per-line) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "tmi_relay=debug"
    } else {
        "tmi_relay=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let config = ServerConfig::with_addr(SocketAddr::new(args.address, args.port));
    let server = RelayServer::new(config);

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("Interrupted, exiting");
    Ok(())
}
