use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, BufReader};

use crate::client::Session;
use crate::middleware::logging::log_request;
use crate::protocol::{
    CommandLine, CommandStatus, Dispatcher, Reply, ReplyCode, send_reply, strip_line_ending,
};

/// Runs one control connection to completion.
///
/// - Sends the 220 greeting, then reads newline-terminated lines.
/// - Lines longer than the configured limit are answered with 500; at most
///   one byte past the limit is buffered, the rest of the line is skipped.
/// - Stops on QUIT, peer EOF or a read error; the session and any pending
///   passive listener are dropped on return.
pub async fn handle_client<R, W>(
    reader: R,
    mut writer: W,
    client_addr: SocketAddr,
    dispatcher: &Dispatcher,
    mut session: Session,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send,
{
    let max_command_length = dispatcher.config().max_command_length;
    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::with_capacity(max_command_length);

    send_reply(&mut writer, &Reply::code(ReplyCode::ServiceReady)).await;

    loop {
        buffer.clear();
        let limit = max_command_length as u64 + 1;
        match (&mut reader).take(limit).read_until(b'\n', &mut buffer).await {
            Ok(0) => {
                info!("Connection closed by client {}", client_addr);
                break;
            }
            Ok(_) => {
                if buffer.len() > max_command_length {
                    warn!(
                        "Command from {} exceeds {} bytes",
                        client_addr, max_command_length
                    );
                    send_reply(
                        &mut writer,
                        &Reply::new(ReplyCode::CommandUnrecognized, "Command too long."),
                    )
                    .await;

                    if !buffer.ends_with(b"\n") {
                        if let Err(e) = discard_rest_of_line(&mut reader).await {
                            error!("Failed to read from {}: {}", client_addr, e);
                            break;
                        }
                    }
                    continue;
                }

                let raw = String::from_utf8_lossy(&buffer);
                let trimmed = strip_line_ending(&raw);
                log_request(&client_addr, trimmed);

                let line = CommandLine::parse(trimmed);
                if dispatcher.dispatch(&mut session, &line, &mut writer).await
                    == CommandStatus::CloseConnection
                {
                    info!("Client {} requested to quit", client_addr);
                    break;
                }
            }
            Err(e) => {
                error!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        }
    }

    info!("Client {} disconnected", client_addr);
}

/// Consumes input up to and including the next `\n` without buffering it.
async fn discard_rest_of_line<R>(reader: &mut R) -> io::Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut discarded = 0u64;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(discarded);
        }
        let (used, found) = match available.iter().position(|&byte| byte == b'\n') {
            Some(index) => (index + 1, true),
            None => (available.len(), false),
        };
        reader.consume(used);
        discarded += used as u64;
        if found {
            return Ok(discarded);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::io::{AsyncWriteExt, ReadBuf};

    /// Endless stream of `A` with no newline. Yields between reads so the
    /// other side of the test keeps running.
    struct Flood {
        served: Arc<AtomicU64>,
        yielded: bool,
    }

    impl AsyncRead for Flood {
        fn poll_read(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if !self.yielded {
                self.yielded = true;
                cx.waker().wake_by_ref();
                return Poll::Pending;
            }
            self.yielded = false;
            let n = buf.remaining().min(4096);
            buf.put_slice(&[b'A'; 4096][..n]);
            self.served.fetch_add(n as u64, Ordering::Relaxed);
            Poll::Ready(Ok(()))
        }
    }

    async fn run_script(config: ServerConfig, script: &[u8]) -> String {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let dispatcher = Dispatcher::new(Arc::new(config));

        let (mut client, server) = tokio::io::duplex(8192);
        let (read_half, write_half) = tokio::io::split(server);
        client.write_all(script).await.unwrap();
        client.shutdown().await.unwrap();

        let addr: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        handle_client(read_half, write_half, addr, &dispatcher, Session::new(root)).await;

        let mut transcript = String::new();
        client.read_to_string(&mut transcript).await.unwrap();
        transcript
    }

    #[tokio::test]
    async fn test_greeting_then_login_and_quit() {
        let transcript = run_script(
            ServerConfig::default(),
            b"USER cs317\r\nQUIT\r\nNLST\r\n",
        )
        .await;
        let codes: Vec<&str> = transcript.lines().map(|line| &line[..3]).collect();
        assert_eq!(codes, ["220", "230", "221"]);
    }

    #[tokio::test]
    async fn test_eof_ends_session() {
        let transcript = run_script(ServerConfig::default(), b"USER cs317\n").await;
        let codes: Vec<&str> = transcript.lines().map(|line| &line[..3]).collect();
        assert_eq!(codes, ["220", "230"]);
    }

    #[tokio::test]
    async fn test_overlong_line_is_rejected_and_session_continues() {
        let config = ServerConfig {
            max_command_length: 16,
            ..ServerConfig::default()
        };
        let transcript =
            run_script(config, b"USER cs317 with a very long tail\r\nUSER cs317\r\n").await;
        let codes: Vec<&str> = transcript.lines().map(|line| &line[..3]).collect();
        assert_eq!(codes, ["220", "500", "230"]);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_unrecognized() {
        let transcript = run_script(ServerConfig::default(), b"\xff\xfe\r\n").await;
        let codes: Vec<&str> = transcript.lines().map(|line| &line[..3]).collect();
        assert_eq!(codes, ["220", "500"]);
    }

    #[tokio::test]
    async fn test_unterminated_flood_is_rejected_before_it_ends() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let config = ServerConfig {
            max_command_length: 16,
            ..ServerConfig::default()
        };
        let dispatcher = Arc::new(Dispatcher::new(Arc::new(config)));
        let served = Arc::new(AtomicU64::new(0));
        let flood = Flood {
            served: Arc::clone(&served),
            yielded: false,
        };

        let (client, server) = tokio::io::duplex(1024);
        let addr: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        let session = tokio::spawn(async move {
            handle_client(flood, server, addr, &dispatcher, Session::new(root)).await;
        });

        let mut replies = BufReader::new(client);
        let mut line = String::new();
        for expected in ["220", "500"] {
            line.clear();
            tokio::time::timeout(Duration::from_secs(5), replies.read_line(&mut line))
                .await
                .expect("reply arrives while the line is still streaming")
                .unwrap();
            assert!(line.starts_with(expected), "{line}");
        }

        assert!(served.load(Ordering::Relaxed) > 0);
        session.abort();
    }

    #[tokio::test]
    async fn test_oversized_line_is_skipped_up_to_newline() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let config = ServerConfig {
            max_command_length: 16,
            ..ServerConfig::default()
        };
        let dispatcher = Dispatcher::new(Arc::new(config));

        let input = tokio::io::repeat(b'A')
            .take(1 << 20)
            .chain(&b"\r\nUSER cs317\r\n"[..]);
        let (mut client, server) = tokio::io::duplex(8192);
        let addr: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        handle_client(input, server, addr, &dispatcher, Session::new(root)).await;

        let mut transcript = String::new();
        client.read_to_string(&mut transcript).await.unwrap();
        let codes: Vec<&str> = transcript.lines().map(|line| &line[..3]).collect();
        assert_eq!(codes, ["220", "500", "230"]);
    }

    #[tokio::test]
    async fn test_discard_rest_of_line_stops_after_newline() {
        let mut reader = BufReader::with_capacity(4, &b"AAAAAAAAAA\nQUIT\r\n"[..]);
        assert_eq!(discard_rest_of_line(&mut reader).await.unwrap(), 11);

        let mut rest = String::new();
        reader.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "QUIT\r\n");
    }
}
