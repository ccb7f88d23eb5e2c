//! ITv2 message types and their binary serializer.
//!
//! Every message that crosses the wire is declared once in [`catalog`] with
//! its command word and an ordered list of typed fields; the field types
//! (see [`fields`]) carry their encodings, and the `wire_struct!` /
//! `wire_enum!` / `bitfield!` macros generate the matching
//! [`Serializable`] / [`Deserializable`] impls. The [`Message`] enum is the
//! factory: a 2-byte command word selects the concrete type, and unknown
//! words pass through as [`DefaultMessage`].
//!
//! # Overview
//!
//! | Module          | Contents                                                |
//! |-----------------|---------------------------------------------------------|
//! | [`serialize`]   | The [`Serializable`] trait and primitive impls          |
//! | [`deserialize`] | [`Cursor`], the error taxonomy, [`Deserializable`]      |
//! | [`fields`]      | Compact ints, UTF-16, BCD, blobs, lists, calendar kinds |
//! | [`bits`]        | Packed bit-field groups                                 |
//! | [`catalog`]     | The panel message catalog                               |
//! | [`message`]     | [`Message`], the factory, envelope types                |

#![deny(unsafe_code)]

pub mod bits;
pub mod catalog;
pub mod deserialize;
pub mod fields;
mod macros;
pub mod message;
pub mod serialize;

pub use catalog::*;
pub use deserialize::{Cursor, Deserializable};
pub use message::{DefaultMessage, Message, MultipleMessage};
pub use serialize::Serializable;

/// Identity and classification of one message type in the catalog.
///
/// Command messages — those carrying the command-correlation byte — set
/// `IS_COMMAND` and surface their leading `sequence` field through
/// [`command_seq`](MessageBody::command_seq); everything else keeps the
/// defaults.
pub trait MessageBody {
    /// The 2-byte command word identifying the type on the wire.
    const WORD: u16;

    /// Whether the payload starts with a command-correlation byte.
    const IS_COMMAND: bool = false;

    /// The command-correlation byte, if this is a command message.
    fn command_seq(&self) -> Option<u8> {
        None
    }

    /// Stamp the command-correlation byte; no-op on non-commands.
    fn set_command_seq(&mut self, _seq: u8) {}
}
