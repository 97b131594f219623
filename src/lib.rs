//! Line-based TCP Chat Relay Library
//!
//! A chat relay where clients connect over a stream transport, pick a
//! display name, and exchange newline-delimited messages through named
//! rooms.
//!
//! # Features
//! - Named room creation and joining
//! - Room-scoped message broadcast with timestamps
//! - Lobby-wide announcements
//! - Append-only chat history sink
//! - Operator console: status, kick, ban, stop
//!
//! # Architecture
//! Explicitly owned shared structures behind `tokio::sync::RwLock`:
//! - `Registry` tracks every live session ("the lobby")
//! - `RoomDirectory` maps room names to `Room` member sets
//! - `CommandRouter` classifies inbound lines and is the only mutator of
//!   session membership
//! - Each connection runs a read-loop task plus a writer task draining
//!   the session's bounded outbound queue, so broadcasts never block on
//!   a slow consumer
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use chat_relay::{CommandRouter, MemoryHistory, Registry, RoomDirectory, handle_connection};
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Arc::new(CommandRouter::new(
//!         Arc::new(Registry::new()),
//!         Arc::new(RoomDirectory::new()),
//!         Arc::new(MemoryHistory::new()),
//!     ));
//!
//!     let listener = TcpListener::bind("127.0.0.1:3335").await.unwrap();
//!     while let Ok((stream, _)) = listener.accept().await {
//!         tokio::spawn(handle_connection(stream, router.clone()));
//!     }
//! }
//! ```

pub mod admin;
pub mod config;
pub mod error;
pub mod history;
pub mod registry;
pub mod room;
pub mod router;
pub mod server;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use admin::{run_console, AdminController, AdminOutcome, DenyList};
pub use config::Config;
pub use error::{AppError, SendError};
pub use history::{FileHistory, HistorySink, MemoryHistory};
pub use registry::Registry;
pub use room::{Room, RoomDirectory};
pub use router::{Command, CommandRouter};
pub use server::{handle_connection, run_reminder, REMINDER, WELCOME};
pub use session::{Membership, Session};
pub use types::SessionId;
