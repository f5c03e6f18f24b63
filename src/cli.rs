use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "solo-ftpd", about = "A single-user passive-mode FTP server.")]
pub struct Cli {
    /// Port the control connection listens on
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
