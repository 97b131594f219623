//! Connection handling
//!
//! One task per connection runs the read loop; a second task drains the
//! session's outbound queue to the socket. The read loop exits on EOF,
//! transport error, or the session's shutdown signal (kick/ban), and all
//! three paths run the same cleanup.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::AppError;
use crate::router::CommandRouter;
use crate::session::Session;
use crate::types::SessionId;

/// Line sent to every client right after connect
pub const WELCOME: &str = "Welcome to the server! List of commands available: \
\"/create\", \"/join\", \"/leave\", \"/setUsername\"";

/// Line announced to the whole lobby on each reminder tick
pub const REMINDER: &str = "Don't forget to join chat room!";

/// Outbound queue depth per session; a consumer this far behind starts
/// losing its own deliveries.
const OUTBOUND_BUFFER: usize = 64;

/// Handle one accepted TCP connection until it disconnects.
///
/// Registers a session in the lobby, sends the welcome line, and feeds
/// each inbound line through the command router. Cleanup runs no matter
/// how the loop ends, so a kicked or crashed connection leaves no trace
/// in the registry or any room.
pub async fn handle_connection(
    stream: TcpStream,
    router: Arc<CommandRouter>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let (read_half, mut write_half) = stream.into_split();

    let (line_tx, mut line_rx) = mpsc::channel::<String>(OUTBOUND_BUFFER);
    let session = Arc::new(Session::new(SessionId::new(), line_tx));
    let session_id = session.id;

    router.registry().join(session.clone()).await;
    info!("User {} connected from {}", session.name().await, peer_addr);

    // Writer task: session queue -> socket, newline-delimited.
    let writer = tokio::spawn(async move {
        while let Some(line) = line_rx.recv().await {
            if write_half.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if write_half.write_all(b"\n").await.is_err() {
                break;
            }
        }
        let _ = write_half.shutdown().await;
        debug!("Writer task ended for {}", session_id);
    });

    let _ = session.send(WELCOME);

    let mut lines = BufReader::new(read_half).lines();
    let mut read_error = None;
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => router.handle_line(&session, &line).await,
                Ok(None) => break,
                Err(e) => {
                    debug!("Read error for {}: {}", session_id, e);
                    read_error = Some(e);
                    break;
                }
            },
            () = session.shutdown_requested() => {
                debug!("Shutdown signalled for {}", session_id);
                break;
            }
        }
    }

    // A transport error is just a disconnect: cleanup runs first, then
    // the error surfaces to the handler's spawner for logging.
    router.cleanup(&session).await;
    info!("User {} disconnected", session.name().await);

    // Cleanup dropped the registry's handle; dropping ours closes the
    // queue and lets the writer flush out and exit.
    drop(session);
    let _ = writer.await;

    match read_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Periodically nudge the whole lobby to join a room.
pub async fn run_reminder(router: Arc<CommandRouter>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // the first tick completes immediately
    loop {
        ticker.tick().await;
        router.registry().broadcast(REMINDER).await;
    }
}
