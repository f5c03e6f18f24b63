//! Module `data_channel`
//!
//! Allocates passive-mode listeners and accepts the single data connection
//! each PASV request allows.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::ops::Range;
use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;
use socket2::{Domain, SockRef, Socket, Type};
use tokio::net::{TcpListener, TcpStream};

use crate::error::TransferError;
use crate::utils::network::pasv_tuple;

/// Ports a passive listener may be bound to.
pub const DATA_PORT_RANGE: Range<u16> = 1024..65535;

/// Picks a random port from [`DATA_PORT_RANGE`].
pub fn random_data_port() -> u16 {
    rand::thread_rng().gen_range(DATA_PORT_RANGE)
}

/// A passive-mode listening endpoint waiting for its one data connection.
#[derive(Debug)]
pub struct PassiveChannel {
    listener: TcpListener,
    local_addr: SocketAddrV4,
}

impl PassiveChannel {
    /// Binds a listener on `ip:port` with address reuse and a backlog of one.
    pub fn open(ip: Ipv4Addr, port: u16) -> Result<Self, TransferError> {
        let data_socket = SocketAddrV4::new(ip, port);

        let socket = Socket::new(Domain::IPV4, Type::STREAM, None)
            .map_err(TransferError::ListenerConfigurationFailed)?;
        socket
            .set_reuse_address(true)
            .map_err(TransferError::ListenerConfigurationFailed)?;
        socket
            .bind(&SocketAddr::V4(data_socket).into())
            .map_err(|e| TransferError::PortBindingFailed(SocketAddr::V4(data_socket), e))?;
        socket
            .listen(1)
            .map_err(TransferError::ListenerConfigurationFailed)?;
        socket
            .set_nonblocking(true)
            .map_err(TransferError::ListenerConfigurationFailed)?;

        let listener = TcpListener::from_std(std::net::TcpListener::from(socket))
            .map_err(TransferError::ListenerConfigurationFailed)?;
        let local_addr = match listener
            .local_addr()
            .map_err(TransferError::ListenerConfigurationFailed)?
        {
            SocketAddr::V4(addr) => addr,
            SocketAddr::V6(_) => data_socket,
        };

        debug!("Passive listener bound to {}", local_addr);
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Binds a listener on a random port, picking a new port when the chosen
    /// one is already taken.
    pub fn allocate(ip: Ipv4Addr, attempts: usize) -> Result<Self, TransferError> {
        let attempts = attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            let port = random_data_port();
            match Self::open(ip, port) {
                Ok(channel) => return Ok(channel),
                Err(TransferError::PortBindingFailed(addr, e)) => {
                    warn!(
                        "Passive bind to {} failed (attempt {}/{}): {}",
                        addr, attempt, attempts, e
                    );
                    last_error = Some(TransferError::PortBindingFailed(addr, e));
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(TransferError::NoInterfaceAddress))
    }

    pub fn local_addr(&self) -> SocketAddrV4 {
        self.local_addr
    }

    /// The `227` line advertising this listener.
    pub fn pasv_reply(&self) -> String {
        format!(
            "227 Entering Passive Mode ({})\r\n",
            pasv_tuple(self.local_addr)
        )
    }

    /// Waits up to `timeout` for the data connection.
    ///
    /// Consumes the channel: the listener is closed once this returns, so a
    /// passive request never yields a second connection.
    pub async fn accept(self, timeout: Duration) -> Result<TcpStream, TransferError> {
        let (stream, peer) = match tokio::time::timeout(timeout, self.listener.accept()).await {
            Ok(Ok(accepted)) => accepted,
            Ok(Err(e)) => return Err(TransferError::AcceptFailed(e)),
            Err(_) => return Err(TransferError::ConnectionTimeout(timeout)),
        };

        if let Some(e) = pending_error(&self.listener) {
            return Err(TransferError::AcceptFailed(e));
        }
        if let Some(e) = pending_error(&stream) {
            return Err(TransferError::AcceptFailed(e));
        }

        info!(
            "Data connection accepted from {} on {}",
            peer, self.local_addr
        );
        Ok(stream)
    }
}

/// Reads and clears `SO_ERROR` on a socket.
fn pending_error<S>(socket: &S) -> Option<io::Error>
where
    S: std::os::fd::AsFd,
{
    match SockRef::from(socket).take_error() {
        Ok(None) => None,
        Ok(Some(e)) | Err(e) => Some(e),
    }
}
