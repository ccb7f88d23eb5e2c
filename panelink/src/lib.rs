//! # panelink — TLink/ITv2 alarm-panel session library
//!
//! `panelink` is a modular Rust implementation of the TLink/ITv2 protocol
//! stack spoken by an alarm-panel ecosystem. It consists of four focused
//! sub-crates wired together here for convenience:
//!
//! | Sub-crate         | Role                                               |
//! |-------------------|----------------------------------------------------|
//! | `panelink-wire`   | Message catalog, binary serializer, factory        |
//! | `panelink-crypto` | Type1/Type2 ECB encryption handlers                |
//! | `panelink-itv2`   | TLink framing, length+CRC framing, packet model    |
//! | `panelink-server` | Async session engine, handshake, listener          |
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use panelink::server::{PanelListener, Settings};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> panelink::server::Result<()> {
//! let settings = Settings { listen_port: 3073, ..Default::default() };
//! let cancel = CancellationToken::new();
//! let listener = PanelListener::bind(settings, &cancel).await?;
//!
//! let session = listener.accept().await?;
//! println!("panel {} connected", session.session_id());
//!
//! let mut notifications = session.take_notifications().unwrap();
//! while let Some(message) = notifications.recv().await {
//!     println!("panel says: {message:?}");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Re-export of [`panelink_wire`] — message catalog, serializer, factory.
pub use panelink_wire as wire;

/// Re-export of [`panelink_itv2`] — TLink codec, ITv2 framing, packet model.
pub use panelink_itv2 as itv2;

/// Re-export of [`panelink_crypto`] — Type1/Type2 ECB handlers.
pub use panelink_crypto as crypto;

/// Re-export of [`panelink_server`] — the async session engine.
pub use panelink_server as server;

// ─── Convenience re-exports ───────────────────────────────────────────────────

pub use panelink_crypto::EncryptionHandler;
pub use panelink_itv2::{Packet, SequenceState};
pub use panelink_server::{PanelListener, Session, Settings};
pub use panelink_wire::{Deserializable, Message, MessageBody, Serializable};
