//! The flat error taxonomy every public operation reports through.

use std::{fmt, io};

use panelink_crypto::EncryptionError;
use panelink_itv2::{FrameError, PacketError, TlinkError};

// ─── ErrorKind ────────────────────────────────────────────────────────────────

/// Classification of a session failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller or session cancellation observed.
    Cancelled,
    /// Remote closed, or a transport read/write failed.
    Disconnected,
    /// TLink delimiter missing or misplaced.
    FramingError,
    /// Byte-stuffing violation inside a TLink region.
    EncodingError,
    /// ECB configure/encrypt/decrypt failed.
    EncryptionError,
    /// CRC mismatch, length overflow, or a bad message payload.
    PacketParseError,
    /// Session registry lookup miss (external façade only).
    SessionNotFound,
    /// The handshake received the wrong message type.
    UnexpectedResponse,
    /// A response wait exceeded its budget.
    Timeout,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cancelled => "cancelled",
            Self::Disconnected => "disconnected",
            Self::FramingError => "framing error",
            Self::EncodingError => "encoding error",
            Self::EncryptionError => "encryption error",
            Self::PacketParseError => "packet parse error",
            Self::SessionNotFound => "session not found",
            Self::UnexpectedResponse => "unexpected response",
            Self::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

// ─── Error ────────────────────────────────────────────────────────────────────

/// A session failure: kind, human-readable context, and optionally the
/// offending packet bytes for wire-level diagnostics.
#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    packet: Option<Vec<u8>>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), packet: None }
    }

    /// Attach the raw packet bytes that triggered the failure.
    pub fn with_packet(mut self, packet: &[u8]) -> Self {
        self.packet = Some(packet.to_vec());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The offending packet bytes, when captured.
    pub fn packet(&self) -> Option<&[u8]> {
        self.packet.as_deref()
    }

    pub(crate) fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "operation cancelled")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(packet) = &self.packet {
            write!(f, " [packet:")?;
            for byte in packet {
                write!(f, " {byte:02X}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// Specialized `Result` for session operations.
pub type Result<T> = std::result::Result<T, Error>;

// ─── Conversions ──────────────────────────────────────────────────────────────

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::new(ErrorKind::Disconnected, e.to_string())
    }
}

impl From<TlinkError> for Error {
    fn from(e: TlinkError) -> Self {
        let kind = if e.is_encoding() { ErrorKind::EncodingError } else { ErrorKind::FramingError };
        Self::new(kind, e.to_string())
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::new(ErrorKind::PacketParseError, e.to_string())
    }
}

impl From<PacketError> for Error {
    fn from(e: PacketError) -> Self {
        Self::new(ErrorKind::PacketParseError, e.to_string())
    }
}

impl From<EncryptionError> for Error {
    fn from(e: EncryptionError) -> Self {
        Self::new(ErrorKind::EncryptionError, e.to_string())
    }
}
