//! The ITv2 packet: two sequence bytes plus an optional typed message.

use std::fmt;

use panelink_wire::{Message, Serializable};

/// One ITv2 packet as carried inside a frame.
///
/// `sender` is the emitting side's transaction sequence, `receiver` echoes
/// the last sequence observed from the peer. A packet with no message is a
/// `SimpleAck` — the two sequence bytes alone close a protocol transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct Packet {
    pub sender: u8,
    pub receiver: u8,
    pub message: Option<Message>,
}

/// Errors from decoding a packet body.
#[derive(Clone, Debug, PartialEq)]
pub enum PacketError {
    /// Fewer than the two mandatory sequence bytes.
    TooShort { len: usize },
    /// A lone byte where the 2-byte command word should start.
    PartialCommandWord,
    /// The message payload failed to decode.
    Message(panelink_wire::deserialize::Error),
}

impl fmt::Display for PacketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { len } => write!(f, "packet is {len} byte(s), need at least 2"),
            Self::PartialCommandWord => write!(f, "truncated command word"),
            Self::Message(e) => write!(f, "bad message payload: {e}"),
        }
    }
}

impl std::error::Error for PacketError {}

impl Packet {
    /// A `SimpleAck` closing the transaction `receiver`.
    pub fn ack(sender: u8, receiver: u8) -> Self {
        Self { sender, receiver, message: None }
    }

    /// Whether this packet is a bare acknowledgement.
    pub fn is_ack(&self) -> bool {
        self.message.is_none()
    }

    /// Decode one framed packet body.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PacketError> {
        let [sender, receiver, rest @ ..] = bytes else {
            return Err(PacketError::TooShort { len: bytes.len() });
        };
        let message = match rest {
            [] => None,
            [_] => return Err(PacketError::PartialCommandWord),
            _ => Some(Message::from_bytes(rest).map_err(PacketError::Message)?),
        };
        Ok(Self { sender: *sender, receiver: *receiver, message })
    }

    /// Encode into a frame-ready body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![self.sender, self.receiver];
        if let Some(message) = &self.message {
            message.serialize(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelink_wire::{ConnectionPoll, StatusRequest};

    #[test]
    fn simple_ack_is_two_bytes() {
        let ack = Packet::ack(0x06, 0x09);
        assert!(ack.is_ack());
        assert_eq!(ack.to_bytes(), [0x06, 0x09]);
        assert_eq!(Packet::from_bytes(&[0x06, 0x09]).unwrap(), ack);
    }

    #[test]
    fn message_packet_roundtrips() {
        let packet = Packet {
            sender: 0x06,
            receiver: 0x09,
            message: Some(Message::from(StatusRequest { sequence: 0x04 })),
        };
        let bytes = packet.to_bytes();
        assert_eq!(bytes, [0x06, 0x09, 0x00, 0x52, 0x04]);
        assert_eq!(Packet::from_bytes(&bytes).unwrap(), packet);
    }

    #[test]
    fn notification_packet_roundtrips() {
        let packet =
            Packet { sender: 1, receiver: 0, message: Some(Message::from(ConnectionPoll {})) };
        assert_eq!(Packet::from_bytes(&packet.to_bytes()).unwrap(), packet);
    }

    #[test]
    fn undersized_bodies_are_rejected() {
        assert_eq!(Packet::from_bytes(&[]).unwrap_err(), PacketError::TooShort { len: 0 });
        assert_eq!(Packet::from_bytes(&[1]).unwrap_err(), PacketError::TooShort { len: 1 });
        assert_eq!(Packet::from_bytes(&[1, 2, 3]).unwrap_err(), PacketError::PartialCommandWord);
    }
}
