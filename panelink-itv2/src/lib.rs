//! The two wire layers under an ITv2 session.
//!
//! * [`tlink`] — byte-stuffed `header 0x7E payload 0x7F` packets and their
//!   extraction from a streamed byte buffer.
//! * [`framing`] — the length + CRC-16 envelope inside each TLink payload
//!   (applied before encryption on send, after decryption on receive).
//! * [`packet`] — the sequence-byte pair plus optional typed message;
//!   an empty body is a `SimpleAck`.
//! * [`sequence`] — the three per-connection wrapping counters.
//!
//! Everything here is sans-io: the async session engine drives these codecs
//! from its transport pumps.

#![deny(unsafe_code)]

pub mod framing;
pub mod packet;
pub mod sequence;
pub mod tlink;

pub use framing::{FrameError, add_framing, crc16, remove_framing};
pub use packet::{Packet, PacketError};
pub use sequence::SequenceState;
pub use tlink::{Extracted, PacketExtractor, TlinkError, TlinkExtractor, encode_frame, parse_frame};
