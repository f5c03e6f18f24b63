pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod listing;
pub mod middleware;
pub mod navigate;
pub mod protocol;
pub mod server;
pub mod transfer;
pub mod utils;

pub use config::ServerConfig;
pub use server::Server;
