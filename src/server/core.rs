use log::{error, info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

use crate::client::{Session, handle_client};
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::middleware::logging::log_connection;
use crate::protocol::Dispatcher;

/// Accepts control connections and runs one session per connection.
pub struct Server {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    config: Arc<ServerConfig>,
    root: PathBuf,
}

impl Server {
    /// Resolves the server root and binds the control socket.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let root = config
            .server_root_path()
            .canonicalize()
            .map_err(|e| ServerError::ServerRoot(config.server_root.clone(), e))?;
        if !root.is_dir() {
            return Err(ServerError::ServerRoot(
                config.server_root.clone(),
                std::io::Error::other("not a directory"),
            ));
        }

        let control_socket = config.control_socket();
        let listener = TcpListener::bind(&control_socket)
            .await
            .map_err(|e| ServerError::Bind(control_socket.clone(), e))?;
        info!("Server bound to {}", control_socket);
        info!("Server root directory: {}", root.display());

        let config = Arc::new(config);
        Ok(Self {
            listener,
            dispatcher: Arc::new(Dispatcher::new(Arc::clone(&config))),
            config,
            root,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept loop. Runs until the task is cancelled.
    pub async fn run(self) {
        info!(
            "Starting FTP server on {} ({})",
            self.config.control_socket(),
            if self.config.serialize_sessions {
                "one session at a time"
            } else {
                "concurrent sessions"
            }
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    log_connection(&addr);
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let session = Session::new(self.root.clone());

                    if self.config.serialize_sessions {
                        serve_connection(stream, addr, dispatcher, session).await;
                    } else {
                        // Spawn a task for each client so accept loop doesn't block
                        tokio::spawn(serve_connection(stream, addr, dispatcher, session));
                    }
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

async fn serve_connection(
    stream: TcpStream,
    client_addr: SocketAddr,
    dispatcher: Arc<Dispatcher>,
    session: Session,
) {
    if let Err(e) = stream.set_nodelay(true) {
        warn!("Failed to set TCP_NODELAY for {}: {}", client_addr, e);
    }
    let (read_half, write_half) = stream.into_split();
    handle_client(read_half, write_half, client_addr, &dispatcher, session).await;
}
