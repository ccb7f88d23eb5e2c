//! The fixed session-establishment sequence.
//!
//! The panel always initiates. Four exchanges run before the session is
//! live, with encryption switching on one direction at a time:
//!
//! 1. receive `OpenSession`, adopt the panel's command counter and the TLink
//!    header, reply `CommandResponse`, collect the closing ack;
//! 2. mirror `OpenSession` back, collect `CommandResponse`, ack it, and
//!    instantiate the encryption handler the panel asked for;
//! 3. receive `RequestAccess`, key *outbound* from its initializer — the
//!    reply is the first encrypted message we send — and collect the
//!    (still plaintext) closing ack;
//! 4. send our own `RequestAccess`; from its `CommandResponse` on, inbound
//!    is encrypted too. Ack it and the session is connected.
//!
//! Anything unexpected — wrong message type, CRC failure, undecodable
//! payload — aborts establishment and discards the connection.

use panelink_crypto::EncryptionHandler;
use panelink_itv2::{Packet, SequenceState, add_framing, parse_frame, remove_framing};
use panelink_wire::fields::Blob8;
use panelink_wire::{
    CommandResponse, EncryptionType, Message, OpenSession, RequestAccess, ResponseCode,
};
use tokio_util::sync::CancellationToken;

use crate::errors::{Error, ErrorKind, Result};
use crate::io::{FrameReader, FrameWriter};
use crate::session::SessionState;
use crate::settings::Settings;

/// Everything the live session needs, produced by a completed handshake.
pub(crate) struct Established {
    pub(crate) reader: FrameReader,
    pub(crate) writer: FrameWriter,
    pub(crate) crypto: EncryptionHandler,
    pub(crate) seq: SequenceState,
    pub(crate) session_id: String,
}

pub(crate) struct Handshake<'a> {
    reader: FrameReader,
    writer: FrameWriter,
    seq: SequenceState,
    settings: &'a Settings,
    cancel: CancellationToken,
    session_id: Option<String>,
}

impl<'a> Handshake<'a> {
    pub(crate) fn new(
        reader: FrameReader,
        writer: FrameWriter,
        settings: &'a Settings,
        cancel: CancellationToken,
    ) -> Self {
        Self { reader, writer, seq: SequenceState::new(), settings, cancel, session_id: None }
    }

    pub(crate) async fn run(mut self) -> Result<Established> {
        // ── 1: the panel opens ────────────────────────────────────────────
        tracing::debug!(state = ?SessionState::WaitingForOpenSession, "handshake");
        let packet = self.recv(None).await?;
        let open = match &packet.message {
            Some(Message::OpenSession(open)) => open.clone(),
            other => return Err(unexpected("OpenSession", other)),
        };
        self.seq.observe_remote(packet.sender);
        self.seq.adopt_command(open.sequence);

        // Reply within the panel's transaction: local sequence unchanged.
        let response = CommandResponse { sequence: open.sequence, code: ResponseCode::Success };
        self.send(reply(&self.seq, packet.sender, response.into()), None).await?;
        self.expect_ack(None).await?;

        // ── 2: mirror the open back ───────────────────────────────────────
        let sender = self.seq.next_local();
        let mirror = OpenSession { sequence: self.seq.next_command(), ..open.clone() };
        let expected = mirror.sequence;
        self.send(initiate(&self.seq, sender, mirror.into()), None).await?;

        let packet = self.recv(None).await?;
        match &packet.message {
            Some(Message::CommandResponse(r)) if r.sequence == expected => {}
            other => return Err(unexpected("CommandResponse", other)),
        }
        self.seq.observe_remote(packet.sender);
        self.send(Packet::ack(self.seq.local(), packet.sender), None).await?;

        let mut crypto = match open.encryption_type {
            EncryptionType::Type1 => EncryptionHandler::type1(&self.settings.type1_access_code)?,
            EncryptionType::Type2 => EncryptionHandler::type2(&self.settings.type2_access_code)?,
        };

        // ── 3: the panel requests access ──────────────────────────────────
        tracing::debug!(state = ?SessionState::WaitingForRequestAccess, "handshake");
        let packet = self.recv(None).await?;
        let request = match &packet.message {
            Some(Message::RequestAccess(r)) => r.clone(),
            other => return Err(unexpected("RequestAccess", other)),
        };
        self.seq.observe_remote(packet.sender);
        // The command counter is shared: the panel's transaction advanced it.
        self.seq.adopt_command(request.sequence);
        crypto.configure_outbound(&request.initializer.0)?;

        let response = CommandResponse { sequence: request.sequence, code: ResponseCode::Success };
        self.send(reply(&self.seq, packet.sender, response.into()), Some(&crypto)).await?;
        self.expect_ack(None).await?;

        // ── 4: we request access ──────────────────────────────────────────
        let initializer = Blob8(crypto.configure_inbound()?);
        let sender = self.seq.next_local();
        let request = RequestAccess { sequence: self.seq.next_command(), initializer };
        let expected = request.sequence;
        self.send(initiate(&self.seq, sender, request.into()), Some(&crypto)).await?;

        let packet = self.recv(Some(&crypto)).await?;
        match &packet.message {
            Some(Message::CommandResponse(r)) if r.sequence == expected => {}
            other => return Err(unexpected("CommandResponse", other)),
        }
        self.seq.observe_remote(packet.sender);
        self.send(Packet::ack(self.seq.local(), packet.sender), Some(&crypto)).await?;

        let session_id = self.session_id.take().unwrap_or_default();
        tracing::info!(%session_id, state = ?SessionState::Connected, "handshake complete");
        Ok(Established {
            reader: self.reader,
            writer: self.writer,
            crypto,
            seq: self.seq,
            session_id,
        })
    }

    /// Read, unframe, and decode one packet, capturing the integration ID
    /// from the first inbound header.
    async fn recv(&mut self, crypto: Option<&EncryptionHandler>) -> Result<Packet> {
        let raw = tokio::select! {
            _ = self.cancel.cancelled() => return Err(Error::cancelled()),
            raw = tokio::time::timeout(self.settings.response_timeout, self.reader.next_raw()) => {
                raw.map_err(|_| Error::new(ErrorKind::Timeout, "handshake message not received"))??
            }
        };
        let (header, payload) = parse_frame(&raw)?;
        if self.session_id.is_none() {
            self.session_id = Some(String::from_utf8_lossy(&header).into_owned());
            self.writer.set_header(header);
        }
        let payload = match crypto {
            Some(crypto) => crypto.decrypt_inbound(&payload)?,
            None => payload,
        };
        let body = remove_framing(&payload)?;
        Ok(Packet::from_bytes(&body)?)
    }

    async fn send(&mut self, packet: Packet, crypto: Option<&EncryptionHandler>) -> Result<()> {
        let framed = add_framing(&packet.to_bytes())?;
        let payload = match crypto {
            Some(crypto) => crypto.encrypt_outbound(&framed)?,
            None => framed,
        };
        tokio::select! {
            _ = self.cancel.cancelled() => Err(Error::cancelled()),
            result = self.writer.write_payload(&payload) => result,
        }
    }

    async fn expect_ack(&mut self, crypto: Option<&EncryptionHandler>) -> Result<()> {
        let packet = self.recv(crypto).await?;
        if !packet.is_ack() {
            return Err(unexpected("SimpleAck", &packet.message));
        }
        Ok(())
    }
}

/// A reply within the remote's transaction: local sequence is not advanced.
fn reply(seq: &SequenceState, remote_sender: u8, message: Message) -> Packet {
    Packet { sender: seq.local(), receiver: remote_sender, message: Some(message) }
}

/// A locally initiated transaction (the caller advanced `sender` already).
fn initiate(seq: &SequenceState, sender: u8, message: Message) -> Packet {
    Packet { sender, receiver: seq.remote(), message: Some(message) }
}

fn unexpected(wanted: &str, got: &Option<Message>) -> Error {
    let got = match got {
        Some(message) => format!("{:#06X}", message.command_word()),
        None => "SimpleAck".to_owned(),
    };
    Error::new(
        ErrorKind::UnexpectedResponse,
        format!("handshake expected {wanted}, got message {got}"),
    )
}
