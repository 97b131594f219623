//! Line-based TCP Chat Relay - Entry Point
//!
//! Wires the shared core structures together, starts the operator
//! console and reminder tasks, and runs the accept loop until `/stop`.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chat_relay::{
    handle_connection, run_console, run_reminder, AdminController, CommandRouter, Config,
    DenyList, FileHistory, Registry, RoomDirectory,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_relay=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chat_relay=info")),
        )
        .init();

    // Optional config file path as the first argument
    let config = match env::args().nth(1) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    let history = Arc::new(FileHistory::create(&config.history_path)?);

    let registry = Arc::new(Registry::new());
    let rooms = Arc::new(RoomDirectory::new());
    let deny_list = Arc::new(DenyList::new());
    let router = Arc::new(CommandRouter::new(registry.clone(), rooms.clone(), history));
    let admin = Arc::new(AdminController::new(registry, rooms, deny_list));

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);
    info!("Write /help to get command list");

    let shutdown = Arc::new(Notify::new());
    tokio::spawn(run_console(admin, shutdown.clone()));
    tokio::spawn(run_reminder(
        router.clone(),
        Duration::from_secs(config.reminder_interval_secs),
    ));

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    info!("New connection from {}", addr);
                    let router = router.clone();

                    // Deny-list enforcement at accept time is left to the
                    // transport collaborator; the core only maintains the set.
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, router).await {
                            error!("Connection handler error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            },
            () = shutdown.notified() => {
                info!("Shutdown requested, closing listener");
                break;
            }
        }
    }

    Ok(())
}
