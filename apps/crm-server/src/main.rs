//! Customer CRUD REST API server.
//!
//! Builds the seeded in-memory store, wires it into the router,
//! and serves HTTP until interrupted.

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use crm_api::{router::Router, server::Server};
use crm_core::{config::ServerConfig, CustomerStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the customer server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Directory served for paths outside /customers
    #[arg(long, default_value = "./static")]
    static_dir: PathBuf,

    /// Request body read timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    request_timeout_ms: u64,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            static_dir: args.static_dir,
            request_timeout_ms: args.request_timeout_ms,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(ServerConfig::from(args));
    let addr = config.bind_address();

    let store = Arc::new(CustomerStore::new());
    let router = Router::new(store, Arc::clone(&config));
    let server = Server::new(addr, router);

    println!("Server is starting on port {}...", config.port);
    tracing::info!(
        host = %config.host,
        port = config.port,
        static_dir = %config.static_dir.display(),
        "Starting customer server"
    );

    let mut server_handle = tokio::spawn(async move { server.serve().await });

    tokio::select! {
        result = &mut server_handle => {
            result
                .context("Server task failed")?
                .context("Server error")?;
        }
        result = signal::ctrl_c() => {
            result.context("Failed to listen for ctrl_c")?;
            println!("\nShutting down server...");
            server_handle.abort();
        }
    }

    Ok(())
}
