//! # panelink-server
//!
//! The async ITv2 session engine: one long-lived byte stream per panel,
//! the fixed encryption handshake, and typed message exchange.
//!
//! ## Features
//! - Four-step establishment handshake with per-direction ECB keying
//! - Protocol-level (`SimpleAck`) and command-level (`CommandSequence`)
//!   transaction correlation through one pending-receiver list
//! - `MultipleMessagePacket` expansion with embedded-response routing
//! - Reconnection quiet-gate (2 s of inbound silence before the first send)
//! - `ConnectionPoll` heartbeat every 100 s
//! - Cooperative cancellation of every await through one token
//!
//! ## Sending
//!
//! ```rust,no_run
//! # async fn demo(session: panelink_server::Session) -> panelink_server::Result<()> {
//! use panelink_wire::{ArmMode, ArmPartition, Message};
//! use panelink_wire::fields::BcdPrefixed;
//!
//! let response = session
//!     .send(Message::from(ArmPartition {
//!         sequence: 0, // stamped by the session
//!         partition: 1,
//!         mode: ArmMode::Away,
//!         access_code: BcdPrefixed("1234".into()),
//!     }))
//!     .await?;
//! # let _ = response; Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

mod errors;
mod gate;
mod handshake;
mod io;
mod listener;
mod receivers;
mod session;
mod settings;

pub use errors::{Error, ErrorKind, Result};
pub use listener::PanelListener;
pub use session::{NotificationStream, Session, SessionState};
pub use settings::Settings;
