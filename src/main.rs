//! multi-listener echo server.
//!
//! Binds every configured address, echoes each accepted connection back to
//! its peer, and closes all listeners on SIGINT/SIGTERM.
//!
//! ```text
//! multi-listener --listen tcp=127.0.0.1:7000 --listen tcp6=[::1]:7000
//! multi-listener --config multi-listener.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use futures_util::StreamExt;

use multi_listener::config::validation::validate_config;
use multi_listener::config::{load_config, ConfigError, MultiListenerConfig};
use multi_listener::lifecycle::signals;
use multi_listener::observability::logging;
use multi_listener::{MultiListener, NetStream};

#[derive(Parser)]
#[command(name = "multi-listener")]
#[command(about = "Echo server listening on several addresses at once", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, replaces the configured listeners (repeatable)
    #[arg(short, long, value_name = "NETWORK=ADDRESS", value_parser = parse_listen)]
    listen: Vec<(String, String)>,
}

fn parse_listen(s: &str) -> Result<(String, String), String> {
    let (network, address) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NETWORK=ADDRESS, got {:?}", s))?;
    Ok((network.to_string(), address.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => MultiListenerConfig::default(),
    };

    if !cli.listen.is_empty() {
        config.listeners.clear();
        for (network, address) in cli.listen {
            config.listeners.entry(network).or_default().push(address);
        }
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init(&config.logging)?;

    tracing::info!("multi-listener v{} starting", env!("CARGO_PKG_VERSION"));

    let listener = Arc::new(MultiListener::bind(&config.listeners).await?);

    tracing::info!(
        network = %listener.addr().network(),
        address = %listener.addr(),
        "Listening for connections"
    );

    let server = {
        let listener = Arc::clone(&listener);
        tokio::spawn(async move { serve(&listener).await })
    };

    signals::terminate().await?;

    if let Err(e) = listener.close() {
        tracing::warn!(error = %e, "Errors while closing listeners");
    }
    server.await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn serve(listener: &MultiListener) {
    let mut incoming = std::pin::pin!(listener.incoming());

    while let Some(res) = incoming.next().await {
        match res {
            Ok(stream) => {
                tokio::spawn(echo(stream));
            }
            Err(e) => tracing::warn!(error = %e, "Accept failed"),
        }
    }
}

async fn echo(stream: NetStream) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_default();
    tracing::debug!(peer = %peer, "Connection accepted");

    let (mut reader, mut writer) = tokio::io::split(stream);
    match tokio::io::copy(&mut reader, &mut writer).await {
        Ok(bytes) => tracing::debug!(peer = %peer, bytes, "Connection closed"),
        Err(e) => tracing::debug!(peer = %peer, error = %e, "Connection failed"),
    }
}
