//! The [`Message`] sum type and the command-word factory.
//!
//! Every typed payload on the wire is one `Message` variant; the 2-byte
//! big-endian command word in front of the payload selects the variant.
//! Words with no registered type decode to [`DefaultMessage`], which carries
//! the raw payload through untouched so it re-serializes bit-identically.

use crate::catalog::*;
use crate::deserialize::{Buffer, Cursor, Deserializable, Error, Result};
use crate::serialize::Serializable;
use crate::{MessageBody, impl_body};

// ─── DefaultMessage ──────────────────────────────────────────────────────────

/// A message whose command word has no registered type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefaultMessage {
    /// The unrecognized command word.
    pub command: u16,
    /// The raw payload, preserved verbatim.
    pub data: Vec<u8>,
}

// ─── MultipleMessage ─────────────────────────────────────────────────────────

/// An envelope batching several messages into one notification packet.
///
/// Each element is `{u16 big-endian length}{command word + payload}`,
/// repeated until the buffer is exhausted. The envelope itself is a
/// notification: one `SimpleAck` closes its protocol transaction no matter
/// how many sub-messages it carries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultipleMessage {
    pub messages: Vec<Message>,
}

impl Serializable for MultipleMessage {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        for message in &self.messages {
            let bytes = message.to_bytes();
            assert!(bytes.len() <= u16::MAX as usize, "sub-message exceeds 2-byte length prefix");
            (bytes.len() as u16).serialize(buf);
            buf.extend(bytes);
        }
    }
}

impl Deserializable for MultipleMessage {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let mut messages = Vec::new();
        while buf.remaining() > 0 {
            let len = u16::deserialize(buf)? as usize;
            messages.push(Message::from_bytes(buf.read_slice(len)?)?);
        }
        Ok(Self { messages })
    }
}

// ─── Catalog registration ────────────────────────────────────────────────────

macro_rules! catalog {
    ( $( $word:literal => $variant:ident ),+ $(,)? ) => {
        /// A typed ITv2 message.
        ///
        /// `Default` carries any command word not listed in the catalog.
        #[derive(Clone, Debug, PartialEq)]
        pub enum Message {
            $( $variant($variant), )+
            Default(DefaultMessage),
        }

        impl Message {
            /// The 2-byte command word identifying this message on the wire.
            pub fn command_word(&self) -> u16 {
                match self {
                    $( Self::$variant(_) => <$variant as MessageBody>::WORD, )+
                    Self::Default(m) => m.command,
                }
            }

            /// Whether this message carries a command-correlation byte.
            pub fn is_command(&self) -> bool {
                match self {
                    $( Self::$variant(_) => <$variant as MessageBody>::IS_COMMAND, )+
                    Self::Default(_) => false,
                }
            }

            /// The command-correlation byte, for command messages.
            pub fn command_sequence(&self) -> Option<u8> {
                match self {
                    $( Self::$variant(body) => body.command_seq(), )+
                    Self::Default(_) => None,
                }
            }

            /// Stamp the command-correlation byte; no-op on non-commands.
            pub fn set_command_sequence(&mut self, seq: u8) {
                match self {
                    $( Self::$variant(body) => body.set_command_seq(seq), )+
                    Self::Default(_) => {}
                }
            }

            /// Decode a command word plus payload into a typed message.
            ///
            /// The payload must be consumed exactly; unknown words fall back
            /// to [`DefaultMessage`].
            pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
                let mut cursor = Cursor::from_slice(bytes);
                let word = u16::deserialize(&mut cursor)?;
                let message = match word {
                    $( $word => Self::$variant(<$variant>::deserialize(&mut cursor)?), )+
                    other => {
                        log::debug!("unknown command word {other:#06X}, passing through raw");
                        let mut data = Vec::new();
                        cursor.read_to_end(&mut data);
                        Self::Default(DefaultMessage { command: other, data })
                    }
                };
                if cursor.remaining() != 0 {
                    return Err(Error::TrailingBytes { count: cursor.remaining() });
                }
                Ok(message)
            }
        }

        impl Serializable for Message {
            fn serialize(&self, buf: &mut impl Extend<u8>) {
                match self {
                    $(
                        Self::$variant(body) => {
                            <$variant as MessageBody>::WORD.serialize(buf);
                            body.serialize(buf);
                        }
                    )+
                    Self::Default(m) => {
                        m.command.serialize(buf);
                        buf.extend(m.data.iter().copied());
                    }
                }
            }
        }

        $(
            impl From<$variant> for Message {
                fn from(body: $variant) -> Self {
                    Self::$variant(body)
                }
            }
        )+
    };
}

catalog! {
    0x000F => ConnectionPoll,
    0x0052 => StatusRequest,
    0x0101 => MultipleMessage,
    0x0210 => ZoneStatus,
    0x0211 => PartitionStatus,
    0x0212 => TroubleStatus,
    0x0215 => EventReport,
    0x0216 => ClockBroadcast,
    0x0220 => LcdMessage,
    0x0221 => LogMessage,
    0x0230 => DiagnosticDump,
    0x0231 => AccountReport,
    0x0232 => DeviceEnrollment,
    0x0301 => ArmPartition,
    0x0302 => DisarmPartition,
    0x0303 => BypassZone,
    0x0310 => ReadEventBuffer,
    0x0311 => EventBufferResponse,
    0x0320 => ReadZoneLabels,
    0x0321 => ZoneLabelsResponse,
    0x0330 => SetUserCode,
    0x0331 => SetClock,
    0x0340 => WriteConfig,
    0x0400 => OpenSession,
    0x0460 => RequestAccess,
    0x0500 => CommandResponse,
    0x0501 => CommandError,
}

impl_body!(MultipleMessage, 0x0101);

// ─── Tests ───────────────────────────────────────────────────────────────────
