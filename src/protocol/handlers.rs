//! Command handlers module for the FTP server.
//!
//! This module checks command preconditions and dispatches each parsed line
//! to its handler. Handlers write their own replies because RETR and NLST
//! send a preliminary 150 before the transfer result.

use std::sync::Arc;

use log::{error, info, warn};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::auth;
use crate::client::Session;
use crate::config::ServerConfig;
use crate::error::TransferError;
use crate::listing::{DirectoryLister, NameLister};
use crate::navigate;
use crate::protocol::{Command, CommandLine, CommandStatus, Reply, ReplyCode, send_reply};
use crate::transfer::{
    FileStructure, Negotiation, PassiveChannel, RepresentationType, TransferMode,
    TransferOutcome, send_file,
};
use crate::utils::network::first_non_loopback_ipv4;

/// Routes parsed command lines to their handlers for one server.
///
/// Holds only shared, read-only collaborators; all mutable state lives in
/// the [`Session`] passed to [`Dispatcher::dispatch`].
pub struct Dispatcher {
    config: Arc<ServerConfig>,
    lister: Arc<dyn DirectoryLister>,
}

impl Dispatcher {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self::with_lister(config, Arc::new(NameLister))
    }

    /// Uses `lister` for NLST instead of the default name-only listing.
    pub fn with_lister(config: Arc<ServerConfig>, lister: Arc<dyn DirectoryLister>) -> Self {
        Self { config, lister }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Dispatches a received FTP command to its corresponding handler.
    ///
    /// # Arguments
    ///
    /// * `session` - State of the connection the line arrived on.
    /// * `line` - The parsed command line.
    /// * `control` - Control connection replies are written to.
    ///
    /// # Returns
    ///
    /// * `CommandStatus` - Whether the session loop keeps reading.
    pub async fn dispatch<W>(
        &self,
        session: &mut Session,
        line: &CommandLine,
        control: &mut W,
    ) -> CommandStatus
    where
        W: AsyncWrite + Unpin + Send,
    {
        let expected = match (&line.command, line.command.expected_separators()) {
            (Command::USER, _) => return self.handle_cmd_user(session, line, control).await,
            (_, Some(expected)) => expected,
            (Command::UNKNOWN(verb), None) => {
                info!("Unrecognized command {:?}", verb);
                send_reply(control, &Reply::code(ReplyCode::CommandUnrecognized)).await;
                return CommandStatus::Continue;
            }
            (_, None) => return CommandStatus::Continue,
        };

        if let Some(reply) = check_preconditions(session, line, expected) {
            send_reply(control, &reply).await;
            return CommandStatus::Continue;
        }

        match line.command {
            Command::QUIT => {
                send_reply(control, &Reply::code(ReplyCode::ClosingControlConnection)).await;
                return CommandStatus::CloseConnection;
            }
            Command::CWD => self.handle_cmd_cwd(session, line, control).await,
            Command::CDUP => self.handle_cmd_cdup(session, control).await,
            Command::TYPE => self.handle_cmd_type(session, line, control).await,
            Command::MODE => {
                let reply = negotiated_reply(line.argument().map(TransferMode::negotiate)).1;
                send_reply(control, &reply).await;
            }
            Command::STRU => {
                let reply = negotiated_reply(line.argument().map(FileStructure::negotiate)).1;
                send_reply(control, &reply).await;
            }
            Command::PASV => self.handle_cmd_pasv(session, control).await,
            Command::RETR => self.handle_cmd_retr(session, line, control).await,
            Command::NLST => self.handle_cmd_nlst(session, control).await,
            Command::USER | Command::UNKNOWN(_) => {}
        }

        CommandStatus::Continue
    }

    /// Handles USER: logs the session in when the name matches the account.
    async fn handle_cmd_user<W>(
        &self,
        session: &mut Session,
        line: &CommandLine,
        control: &mut W,
    ) -> CommandStatus
    where
        W: AsyncWrite + Unpin + Send,
    {
        if session.is_logged_in() {
            send_reply(control, &Reply::code(ReplyCode::ServiceReady)).await;
            return CommandStatus::Continue;
        }

        let username = match line.argument() {
            Some(username) if line.separators == 1 => username,
            _ => {
                send_reply(control, &Reply::code(ReplyCode::SyntaxErrorInArguments)).await;
                return CommandStatus::Continue;
            }
        };

        let reply = match auth::validate_user(username, &self.config) {
            Ok(()) => {
                session.set_logged_in(true);
                info!("User {} logged in", username);
                Reply::code(ReplyCode::LoggedIn)
            }
            Err(e) => {
                warn!("Login rejected: {}", e);
                match e.reply_code() {
                    ReplyCode::NotLoggedIn => {
                        Reply::new(ReplyCode::NotLoggedIn, "Username is incorrect.")
                    }
                    code => Reply::code(code),
                }
            }
        };
        send_reply(control, &reply).await;
        CommandStatus::Continue
    }

    async fn handle_cmd_cwd<W>(&self, session: &mut Session, line: &CommandLine, control: &mut W)
    where
        W: AsyncWrite + Unpin + Send,
    {
        let Some(target) = line.argument() else {
            send_reply(control, &Reply::code(ReplyCode::SyntaxErrorInArguments)).await;
            return;
        };

        let reply = match navigate::change_directory(session.root(), session.current_dir(), target)
        {
            Ok(dir) => {
                info!("Changed directory to {}", dir.display());
                session.set_current_dir(dir);
                Reply::code(ReplyCode::FileActionOk)
            }
            Err(e) => {
                warn!("CWD {} refused: {}", target, e);
                Reply::code(e.reply_code())
            }
        };
        send_reply(control, &reply).await;
    }

    async fn handle_cmd_cdup<W>(&self, session: &mut Session, control: &mut W)
    where
        W: AsyncWrite + Unpin + Send,
    {
        let shown = navigate::virtual_path(session.root(), session.current_dir());
        let reply = match navigate::parent_directory(session.root(), session.current_dir()) {
            Ok(parent) => {
                session.set_current_dir(parent);
                Reply::new(ReplyCode::CommandOk, shown)
            }
            Err(e) => {
                warn!("CDUP refused: {}", e);
                Reply::new(e.reply_code(), shown)
            }
        };
        send_reply(control, &reply).await;
    }

    async fn handle_cmd_type<W>(&self, session: &mut Session, line: &CommandLine, control: &mut W)
    where
        W: AsyncWrite + Unpin + Send,
    {
        let (accepted, reply) =
            negotiated_reply(line.argument().map(RepresentationType::negotiate));
        if let Some(representation) = accepted {
            session.set_representation(representation);
        }
        send_reply(control, &reply).await;
    }

    /// Handles PASV: replaces any pending passive channel with a new one.
    async fn handle_cmd_pasv<W>(&self, session: &mut Session, control: &mut W)
    where
        W: AsyncWrite + Unpin + Send,
    {
        session.close_passive_channel();

        let channel = self
            .config
            .pasv_ip()
            .or_else(first_non_loopback_ipv4)
            .ok_or(TransferError::NoInterfaceAddress)
            .and_then(|ip| PassiveChannel::allocate(ip, self.config.pasv_bind_attempts));

        match channel {
            Ok(channel) => {
                let reply = Reply::Raw(channel.pasv_reply());
                info!("Passive mode listening on {}", channel.local_addr());
                session.replace_passive_channel(channel);
                send_reply(control, &reply).await;
            }
            Err(e) => {
                error!("PASV failed: {}", e);
                send_reply(control, &Reply::code(e.reply_code())).await;
            }
        }
    }

    /// Handles RETR: streams a file over the pending passive channel.
    async fn handle_cmd_retr<W>(&self, session: &mut Session, line: &CommandLine, control: &mut W)
    where
        W: AsyncWrite + Unpin + Send,
    {
        let Some(name) = line.argument() else {
            send_reply(control, &Reply::code(ReplyCode::SyntaxErrorInArguments)).await;
            return;
        };

        let Some(mut data_stream) = self.open_data_connection(session, control).await else {
            return;
        };

        send_reply(control, &Reply::code(ReplyCode::AboutToOpenDataConnection)).await;

        let outcome =
            match navigate::resolve_file(session.root(), session.current_dir(), name) {
                Ok(path) => send_file(&mut data_stream, &path, self.config.buffer_size).await,
                Err(e) => {
                    warn!("RETR {} refused: {}", name, e);
                    TransferOutcome::OpenFailed(e)
                }
            };

        close_data_connection(data_stream).await;

        match &outcome {
            TransferOutcome::Completed { bytes } => info!("Sent {} ({} bytes)", name, bytes),
            failed => warn!("Transfer of {} ended early: {:?}", name, failed),
        }
        send_reply(control, &outcome.reply()).await;
    }

    /// Handles NLST: lists the working directory over the pending passive channel.
    async fn handle_cmd_nlst<W>(&self, session: &mut Session, control: &mut W)
    where
        W: AsyncWrite + Unpin + Send,
    {
        let Some(mut data_stream) = self.open_data_connection(session, control).await else {
            return;
        };

        send_reply(control, &Reply::code(ReplyCode::AboutToOpenDataConnection)).await;

        let outcome = self
            .lister
            .list(&mut data_stream, session.current_dir())
            .await;

        close_data_connection(data_stream).await;
        send_reply(control, &outcome.reply()).await;
    }

    /// Takes the pending passive channel and waits for the client to connect.
    ///
    /// Replies 425 and returns `None` when there is no channel or the accept
    /// fails. The listener is closed either way.
    async fn open_data_connection<W>(
        &self,
        session: &mut Session,
        control: &mut W,
    ) -> Option<TcpStream>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let accepted = match session.take_passive_channel() {
            Some(channel) => channel.accept(self.config.data_accept_timeout()).await,
            None => Err(TransferError::DataChannelNotInitialized),
        };

        match accepted {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!("No data connection: {}", e);
                send_reply(control, &Reply::code(e.reply_code())).await;
                None
            }
        }
    }
}

/// Login first, then arity.
fn check_preconditions(session: &Session, line: &CommandLine, expected: usize) -> Option<Reply> {
    if !session.is_logged_in() {
        return Some(Reply::code(ReplyCode::NotLoggedIn));
    }
    if line.separators != expected {
        return Some(Reply::code(ReplyCode::SyntaxErrorInArguments));
    }
    None
}

/// Maps a TYPE/MODE/STRU negotiation to its reply. A missing argument is a
/// syntax error.
fn negotiated_reply<T>(negotiation: Option<Negotiation<T>>) -> (Option<T>, Reply) {
    match negotiation {
        Some(Negotiation::Accepted(value)) => (Some(value), Reply::code(ReplyCode::CommandOk)),
        Some(Negotiation::Unimplemented) => {
            (None, Reply::code(ReplyCode::NotImplementedForParameter))
        }
        Some(Negotiation::Invalid) | None => {
            (None, Reply::code(ReplyCode::SyntaxErrorInArguments))
        }
    }
}

async fn close_data_connection(mut data_stream: TcpStream) {
    if let Err(e) = data_stream.shutdown().await {
        warn!("Failed to shut down data connection: {}", e);
    }
}
