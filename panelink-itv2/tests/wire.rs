//! Full send-path assembly: packet → framing → TLink, and back.

use panelink_itv2::{
    Extracted, Packet, PacketExtractor, TlinkExtractor, add_framing, encode_frame, parse_frame,
    remove_framing,
};
use panelink_wire::{Message, StatusRequest, ZoneState, ZoneStatus};

fn assemble(header: &[u8], packet: &Packet) -> Vec<u8> {
    let frame = add_framing(&packet.to_bytes()).unwrap();
    encode_frame(header, &frame)
}

fn disassemble(raw: &[u8]) -> (Vec<u8>, Packet) {
    let (header, payload) = parse_frame(raw).unwrap();
    let body = remove_framing(&payload).unwrap();
    (header, Packet::from_bytes(&body).unwrap())
}

#[test]
fn command_packet_survives_the_full_stack() {
    let packet = Packet {
        sender: 0x06,
        receiver: 0x09,
        message: Some(Message::from(StatusRequest { sequence: 0x04 })),
    };
    let raw = assemble(b"1234567890", &packet);
    let (header, decoded) = disassemble(&raw);
    assert_eq!(header, b"1234567890");
    assert_eq!(decoded, packet);
}

#[test]
fn frames_with_delimiter_bytes_in_the_crc_still_extract() {
    // Zone 0x7E7F forces delimiter bytes into the packet body; stuffing must
    // keep the stream scannable.
    let packet = Packet {
        sender: 0x7D,
        receiver: 0x7F,
        message: Some(Message::from(ZoneStatus { zone: 0x7E7F, state: ZoneState::Open })),
    };
    let raw = assemble(&[0x7E, 0x01], &packet);

    let Extracted::Packet { bytes, consumed } = TlinkExtractor.try_extract(&raw) else {
        panic!("expected a packet");
    };
    assert_eq!(consumed, raw.len());
    let (header, decoded) = disassemble(&bytes);
    assert_eq!(header, [0x7E, 0x01]);
    assert_eq!(decoded, packet);
}

#[test]
fn back_to_back_packets_extract_in_order() {
    let first = assemble(b"ID", &Packet::ack(1, 9));
    let second = assemble(b"ID", &Packet::ack(1, 10));
    let mut stream = first.clone();
    stream.extend_from_slice(&second);

    let Extracted::Packet { bytes, consumed } = TlinkExtractor.try_extract(&stream) else {
        panic!("expected first packet");
    };
    assert_eq!(bytes, first);
    let Extracted::Packet { bytes, .. } = TlinkExtractor.try_extract(&stream[consumed..]) else {
        panic!("expected second packet");
    };
    assert_eq!(bytes, second);
}
