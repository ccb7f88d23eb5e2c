//! TLink framing: byte-stuffed `header 0x7E payload 0x7F` packets.
//!
//! The header is opaque at this layer — the session captures the first
//! inbound header (the integration ID) and reuses it for every outbound
//! packet. Three bytes are stuffed inside header and payload regions:
//!
//! | Raw | Encoded |
//! |---|---|
//! | `0x7D` | `0x7D 0x00` |
//! | `0x7E` | `0x7D 0x01` |
//! | `0x7F` | `0x7D 0x02` |
//!
//! The delimiters themselves are never stuffed when acting as delimiters,
//! which is what makes boundary scanning on raw bytes sound.

use std::fmt;

const ESCAPE: u8 = 0x7D;
const HEADER_END: u8 = 0x7E;
const PACKET_END: u8 = 0x7F;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Errors from parsing one TLink packet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TlinkError {
    /// No `0x7E` header delimiter before the packet terminator.
    MissingHeaderDelimiter,
    /// The packet does not end with the `0x7F` terminator.
    MissingTerminator,
    /// A raw delimiter byte appeared inside a stuffed region.
    UnstuffedDelimiter { byte: u8 },
    /// `0x7D` was followed by a byte outside `0x00..=0x02`.
    UnknownEscape { byte: u8 },
    /// The region ended in the middle of an escape pair.
    TruncatedEscape,
}

impl TlinkError {
    /// Whether this is a byte-stuffing violation (as opposed to a framing
    /// problem with the delimiters themselves).
    pub fn is_encoding(&self) -> bool {
        matches!(
            self,
            Self::UnstuffedDelimiter { .. } | Self::UnknownEscape { .. } | Self::TruncatedEscape
        )
    }
}

impl fmt::Display for TlinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeaderDelimiter => write!(f, "missing 0x7E header delimiter"),
            Self::MissingTerminator => write!(f, "missing 0x7F packet terminator"),
            Self::UnstuffedDelimiter { byte } => {
                write!(f, "raw delimiter {byte:#04X} inside stuffed region")
            }
            Self::UnknownEscape { byte } => write!(f, "unknown escape 0x7D {byte:#04X}"),
            Self::TruncatedEscape => write!(f, "dangling 0x7D at end of region"),
        }
    }
}

impl std::error::Error for TlinkError {}

// ─── Packet extraction ───────────────────────────────────────────────────────

/// Result of scanning a receive buffer for one whole packet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extracted {
    /// A whole packet: its bytes (terminator included) and how many bytes of
    /// the buffer it consumed.
    Packet { bytes: Vec<u8>, consumed: usize },
    /// No terminator yet; consume nothing and read more.
    NeedMore,
}

/// Policy for finding packet boundaries in a streamed byte buffer.
///
/// The standard TLink policy scans for the `0x7F` terminator. The DLS
/// variant of the protocol instead strips a 2-byte big-endian length and,
/// once its symmetric cipher is active, must not scan for `0x7F` within
/// the ciphertext — implementations of that variant supply their own
/// extractor here.
pub trait PacketExtractor {
    /// Try to extract one whole packet from the front of `buf`.
    fn try_extract(&self, buf: &[u8]) -> Extracted;
}

/// The standard terminator-scanning extractor.
#[derive(Clone, Copy, Debug, Default)]
pub struct TlinkExtractor;

impl PacketExtractor for TlinkExtractor {
    fn try_extract(&self, buf: &[u8]) -> Extracted {
        match buf.iter().position(|&b| b == PACKET_END) {
            Some(pos) => {
                Extracted::Packet { bytes: buf[..=pos].to_vec(), consumed: pos + 1 }
            }
            None => Extracted::NeedMore,
        }
    }
}

// ─── Stuffing ────────────────────────────────────────────────────────────────

fn stuff(region: &[u8], out: &mut Vec<u8>) {
    for &byte in region {
        match byte {
            ESCAPE => out.extend_from_slice(&[ESCAPE, 0x00]),
            HEADER_END => out.extend_from_slice(&[ESCAPE, 0x01]),
            PACKET_END => out.extend_from_slice(&[ESCAPE, 0x02]),
            other => out.push(other),
        }
    }
}

fn unstuff(region: &[u8]) -> Result<Vec<u8>, TlinkError> {
    let mut out = Vec::with_capacity(region.len());
    let mut iter = region.iter();
    while let Some(&byte) = iter.next() {
        match byte {
            ESCAPE => match iter.next() {
                Some(0x00) => out.push(ESCAPE),
                Some(0x01) => out.push(HEADER_END),
                Some(0x02) => out.push(PACKET_END),
                Some(&other) => return Err(TlinkError::UnknownEscape { byte: other }),
                None => return Err(TlinkError::TruncatedEscape),
            },
            HEADER_END | PACKET_END => {
                return Err(TlinkError::UnstuffedDelimiter { byte });
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

// ─── Frame codec ─────────────────────────────────────────────────────────────

/// Split one extracted packet into its unstuffed header and payload.
pub fn parse_frame(packet: &[u8]) -> Result<(Vec<u8>, Vec<u8>), TlinkError> {
    let body = match packet.split_last() {
        Some((&PACKET_END, body)) => body,
        _ => return Err(TlinkError::MissingTerminator),
    };
    let split = body
        .iter()
        .position(|&b| b == HEADER_END)
        .ok_or(TlinkError::MissingHeaderDelimiter)?;
    let header = unstuff(&body[..split])?;
    let payload = unstuff(&body[split + 1..])?;
    Ok((header, payload))
}

/// Stuff and delimit one packet.
pub fn encode_frame(header: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(header.len() + payload.len() + 2);
    stuff(header, &mut out);
    out.push(HEADER_END);
    stuff(payload, &mut out);
    out.push(PACKET_END);
    out
}

// ─── Tests ───────────────────────────────────────────────────────────────────
