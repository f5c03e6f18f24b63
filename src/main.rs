//! solo-ftpd - Entry Point
//!
//! A single-user FTP server supporting passive-mode downloads and listings.

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::info;
use std::io::Write;

use solo_ftp_server::cli::Cli;
use solo_ftp_server::{Server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize the logger with a custom format
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    let mut config =
        ServerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    // The port given on the command line always wins
    config.control_port = args.port;

    info!("Launching FTP server...");
    let server = Server::bind(config)
        .await
        .context("Failed to start FTP server")?;

    tokio::select! {
        _ = server.run() => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            info!("Shutting down");
        }
    }

    Ok(())
}
