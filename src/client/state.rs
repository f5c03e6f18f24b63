//! Module `state`
//!
//! Defines the per-connection `Session`: login status, representation type,
//! the root boundary and working directory, and the pending passive channel.

use std::path::{Path, PathBuf};

use log::debug;

use crate::transfer::{PassiveChannel, RepresentationType};

/// State of one control connection. Never shared between connections.
#[derive(Debug)]
pub struct Session {
    is_logged_in: bool,
    representation: RepresentationType,
    root: PathBuf,
    current_dir: PathBuf,
    passive: Option<PassiveChannel>,
}

impl Session {
    /// Creates a session confined to `root`, which must be canonical.
    pub fn new(root: PathBuf) -> Self {
        Self {
            is_logged_in: false,
            representation: RepresentationType::default(),
            current_dir: root.clone(),
            root,
            passive: None,
        }
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    pub fn representation(&self) -> RepresentationType {
        self.representation
    }

    /// The directory this session may not leave.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// Returns whether a PASV listener is waiting for its data connection.
    pub fn has_passive_channel(&self) -> bool {
        self.passive.is_some()
    }

    // --------------------
    // Setter methods
    // --------------------

    pub fn set_logged_in(&mut self, logged_in: bool) {
        self.is_logged_in = logged_in;
    }

    pub fn set_representation(&mut self, representation: RepresentationType) {
        self.representation = representation;
    }

    pub fn set_current_dir(&mut self, dir: PathBuf) {
        self.current_dir = dir;
    }

    // --------------------
    // Passive channel lifecycle
    // --------------------

    /// Stores a new passive channel, closing any previous one first.
    pub fn replace_passive_channel(&mut self, channel: PassiveChannel) {
        self.close_passive_channel();
        self.passive = Some(channel);
    }

    /// Closes the pending passive listener, if any.
    pub fn close_passive_channel(&mut self) {
        if let Some(channel) = self.passive.take() {
            debug!("Closing passive listener on {}", channel.local_addr());
        }
    }

    /// Hands the pending passive channel to a transfer. A second call returns
    /// `None` until the next PASV.
    pub fn take_passive_channel(&mut self) -> Option<PassiveChannel> {
        self.passive.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_new_session_defaults() {
        let session = Session::new(PathBuf::from("/srv/ftp"));
        assert!(!session.is_logged_in());
        assert_eq!(session.representation(), RepresentationType::Image);
        assert_eq!(session.current_dir(), Path::new("/srv/ftp"));
        assert_eq!(session.root(), Path::new("/srv/ftp"));
        assert!(!session.has_passive_channel());
    }

    #[tokio::test]
    async fn test_passive_channel_is_taken_once() {
        let mut session = Session::new(PathBuf::from("/srv/ftp"));
        let channel = PassiveChannel::allocate(Ipv4Addr::LOCALHOST, 8).unwrap();
        session.replace_passive_channel(channel);

        assert!(session.take_passive_channel().is_some());
        assert!(session.take_passive_channel().is_none());
    }

    #[tokio::test]
    async fn test_replacing_passive_channel_closes_previous_listener() {
        let mut session = Session::new(PathBuf::from("/srv/ftp"));
        let first = PassiveChannel::allocate(Ipv4Addr::LOCALHOST, 8).unwrap();
        let first_addr = first.local_addr();
        session.replace_passive_channel(first);

        let second = PassiveChannel::allocate(Ipv4Addr::LOCALHOST, 8).unwrap();
        let second_addr = second.local_addr();
        session.replace_passive_channel(second);

        if first_addr != second_addr {
            assert!(tokio::net::TcpStream::connect(first_addr).await.is_err());
        }
        assert!(tokio::net::TcpStream::connect(second_addr).await.is_ok());
    }
}
