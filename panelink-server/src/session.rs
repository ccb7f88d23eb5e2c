//! The live ITv2 session: send path, receive pump, heartbeat, lifecycle.

use std::sync::{Arc, Mutex as StdMutex};

use panelink_crypto::EncryptionHandler;
use panelink_itv2::{Packet, SequenceState, add_framing, remove_framing, parse_frame};
use panelink_wire::{ConnectionPoll, Message};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::errors::{Error, ErrorKind, Result};
use crate::gate::QuietGate;
use crate::handshake::{Established, Handshake};
use crate::io::{FrameReader, FrameWriter};
use crate::receivers::{Completion, PendingList};
use crate::settings::Settings;

// ─── Lifecycle ────────────────────────────────────────────────────────────────

/// Where a connection is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Uninit,
    WaitingForOpenSession,
    WaitingForRequestAccess,
    Connected,
    Closed,
}

// ─── Session ──────────────────────────────────────────────────────────────────

/// A connected panel session.
///
/// Owns the transport, the sequence counters, the encryption handler and the
/// pending-receiver list for the life of one connection. Nothing survives a
/// reconnect; the listener hands out a fresh `Session` per connection.
pub struct Session {
    inner: Arc<Inner>,
    notifications: StdMutex<Option<mpsc::UnboundedReceiver<Message>>>,
}

struct Inner {
    session_id: String,
    settings: Settings,
    /// The send lock: sequence increments, receiver registration and the
    /// wire write happen under it. Response waits do not.
    shared: Mutex<Shared>,
    pending: StdMutex<PendingList>,
    gate: QuietGate,
    cancel: CancellationToken,
    state: StdMutex<SessionState>,
}

struct Shared {
    writer: FrameWriter,
    crypto: EncryptionHandler,
    seq: SequenceState,
}

impl Session {
    /// Run the establishment handshake over `stream` and spin up the live
    /// session on success.
    ///
    /// The returned session is tied to a child of `cancel`; cancelling the
    /// parent disposes the session.
    pub async fn establish<S>(
        stream: S,
        settings: Settings,
        cancel: &CancellationToken,
    ) -> Result<Session>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let reader = FrameReader::new(Box::new(read_half));
        let writer = FrameWriter::new(Box::new(write_half));

        let cancel = cancel.child_token();
        let handshake = Handshake::new(reader, writer, &settings, cancel.clone());
        let established = handshake.run().await?;
        Ok(Self::spawn(established, settings, cancel))
    }

    fn spawn(established: Established, settings: Settings, cancel: CancellationToken) -> Session {
        let Established { reader, writer, crypto, seq, session_id } = established;
        let (notif_tx, notif_rx) = mpsc::unbounded_channel();
        let gate = QuietGate::start(settings.quiet_gate, cancel.clone());

        let inner = Arc::new(Inner {
            session_id,
            settings,
            shared: Mutex::new(Shared { writer, crypto, seq }),
            pending: StdMutex::new(PendingList::default()),
            gate,
            cancel,
            state: StdMutex::new(SessionState::Connected),
        });

        tokio::spawn(receive_pump(inner.clone(), reader, notif_tx));
        tokio::spawn(heartbeat(inner.clone()));

        Session { inner, notifications: StdMutex::new(Some(notif_rx)) }
    }

    /// The integration ID: the first inbound TLink header, decoded as UTF-8.
    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.inner.state.lock().unwrap()
    }

    /// Send one message and await its completion.
    ///
    /// Notifications resolve to `Ok(None)` once the panel acknowledges them;
    /// commands resolve to `Ok(Some(response))` — note a well-formed
    /// rejection (`CommandResponse` with a failure code, or `CommandError`)
    /// is a *successful* round trip the caller classifies by payload.
    ///
    /// Waits for the reconnection quiet-gate before touching the wire.
    /// Dropping the returned future deregisters the pending receiver.
    pub async fn send(&self, message: Message) -> Result<Option<Message>> {
        send_message(&self.inner, message).await
    }

    /// Hand out the notification stream. Single-consumer: the first call
    /// wins and later calls return `None`.
    pub fn take_notifications(&self) -> Option<NotificationStream> {
        let rx = self.notifications.lock().unwrap().take()?;
        Some(NotificationStream { rx })
    }

    /// Cooperative shutdown: cancels every await, completes the pending
    /// receivers as cancelled, ends the notification stream and drops the
    /// transport.
    pub fn close(&self) {
        self.inner.cancel.cancel();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.inner.cancel.cancel();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("session_id", &self.inner.session_id)
            .field("state", &self.state())
            .finish()
    }
}

// ─── Notifications ────────────────────────────────────────────────────────────

/// Inbound messages not claimed by any pending receiver.
///
/// Finite: ends when the session closes.
pub struct NotificationStream {
    rx: mpsc::UnboundedReceiver<Message>,
}

impl NotificationStream {
    /// The next notification, or `None` once the session is closed.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }
}

// ─── Send path ────────────────────────────────────────────────────────────────

/// Deregisters a pending receiver when its awaiting caller goes away.
struct ReceiverGuard {
    inner: Arc<Inner>,
    id: u64,
}

impl Drop for ReceiverGuard {
    fn drop(&mut self) {
        self.inner.pending.lock().unwrap().remove(self.id);
    }
}

async fn send_message(inner: &Arc<Inner>, message: Message) -> Result<Option<Message>> {
    tokio::select! {
        _ = inner.cancel.cancelled() => return Err(Error::cancelled()),
        _ = inner.gate.opened() => {}
    }
    if inner.cancel.is_cancelled() {
        return Err(Error::cancelled());
    }

    let (id, rx) = register_and_write(inner, message).await?;
    let guard = ReceiverGuard { inner: inner.clone(), id };
    let completion = await_completion(inner, rx).await;
    drop(guard);
    completion
}

/// The critical region: sequence increments, receiver registration and the
/// wire write, all under the send lock.
async fn register_and_write(
    inner: &Arc<Inner>,
    mut message: Message,
) -> Result<(u64, oneshot::Receiver<Completion>)> {
    let mut shared = inner.shared.lock().await;

    let sender_seq = shared.seq.next_local();
    let command_seq = if message.is_command() {
        let seq = shared.seq.next_command();
        message.set_command_sequence(seq);
        Some(seq)
    } else {
        None
    };

    let (id, rx) = inner.pending.lock().unwrap().register(sender_seq, command_seq);
    let packet =
        Packet { sender: sender_seq, receiver: shared.seq.remote(), message: Some(message) };
    if let Err(e) = write_packet(&mut shared, &packet).await {
        inner.pending.lock().unwrap().remove(id);
        return Err(e);
    }
    Ok((id, rx))
}

async fn await_completion(
    inner: &Arc<Inner>,
    rx: oneshot::Receiver<Completion>,
) -> Result<Option<Message>> {
    tokio::select! {
        _ = inner.cancel.cancelled() => Err(Error::cancelled()),
        outcome = tokio::time::timeout(inner.settings.response_timeout, rx) => match outcome {
            Err(_) => Err(Error::new(ErrorKind::Timeout, "response not received within budget")),
            Ok(Err(_)) => Err(Error::cancelled()),
            Ok(Ok(completion)) => Ok(completion),
        },
    }
}

async fn write_packet(shared: &mut Shared, packet: &Packet) -> Result<()> {
    let framed = add_framing(&packet.to_bytes())?;
    let payload = if shared.crypto.outbound_active() {
        shared.crypto.encrypt_outbound(&framed)?
    } else {
        framed
    };
    shared.writer.write_payload(&payload).await
}

// ─── Receive pump ─────────────────────────────────────────────────────────────

async fn receive_pump(
    inner: Arc<Inner>,
    mut reader: FrameReader,
    notif_tx: mpsc::UnboundedSender<Message>,
) {
    loop {
        let raw = tokio::select! {
            _ = inner.cancel.cancelled() => break,
            raw = reader.next_raw() => match raw {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::debug!(session_id = %inner.session_id, error = %e, "pump stopping");
                    break;
                }
            },
        };

        if let Err(e) = handle_raw(&inner, &notif_tx, &raw).await {
            match e.kind() {
                ErrorKind::Disconnected | ErrorKind::Cancelled => break,
                _ => tracing::warn!(
                    session_id = %inner.session_id,
                    error = %e,
                    "inbound packet skipped"
                ),
            }
        }
    }

    // Pump exit is session death: cancel the awaiters, drop the pending
    // receivers, end the notification stream (notif_tx drops here).
    inner.cancel.cancel();
    *inner.state.lock().unwrap() = SessionState::Closed;
    inner.pending.lock().unwrap().clear();
    tracing::info!(session_id = %inner.session_id, "session closed");
}

async fn handle_raw(
    inner: &Arc<Inner>,
    notif_tx: &mpsc::UnboundedSender<Message>,
    raw: &[u8],
) -> Result<()> {
    let (_header, payload) = parse_frame(raw).map_err(|e| Error::from(e).with_packet(raw))?;

    let (packet, accepted) = {
        let mut shared = inner.shared.lock().await;
        let payload = if shared.crypto.inbound_active() {
            shared.crypto.decrypt_inbound(&payload)?
        } else {
            payload
        };
        let body =
            remove_framing(&payload).map_err(|e| Error::from(e).with_packet(&payload))?;
        let packet = Packet::from_bytes(&body).map_err(|e| Error::from(e).with_packet(&body))?;

        inner.gate.record_activity();
        if !packet.is_ack() {
            shared.seq.observe_remote(packet.sender);
            // Protocol-level ack; replies never advance the local sequence.
            let ack = Packet::ack(shared.seq.local(), packet.sender);
            write_packet(&mut shared, &ack).await?;
        }

        let accepted = inner.pending.lock().unwrap().offer(&packet);
        if !accepted {
            // A remote-initiated command transaction advances the shared
            // command counter. Responses never do: matched ones already
            // advanced it at send time, late ones must not rewind it.
            if let Some(message) = &packet.message {
                let response = matches!(
                    message,
                    Message::CommandResponse(_) | Message::CommandError(_)
                );
                if !response {
                    if let Some(seq) = message.command_sequence() {
                        shared.seq.adopt_command(seq);
                    }
                }
            }
        }
        (packet, accepted)
    };

    if accepted {
        return Ok(());
    }

    match packet.message {
        None => tracing::debug!(session_id = %inner.session_id, "unmatched SimpleAck dropped"),
        Some(Message::MultipleMessage(envelope)) => {
            let mut routed = 0usize;
            for sub in envelope.messages {
                if sub.is_command() && inner.pending.lock().unwrap().offer_command(&sub) {
                    routed += 1;
                    if routed > 1 {
                        tracing::warn!(
                            session_id = %inner.session_id,
                            routed,
                            "multiple command responses in one envelope"
                        );
                    }
                } else {
                    let _ = notif_tx.send(sub);
                }
            }
        }
        Some(message) => {
            let _ = notif_tx.send(message);
        }
    }
    Ok(())
}

// ─── Heartbeat ────────────────────────────────────────────────────────────────

async fn heartbeat(inner: Arc<Inner>) {
    tokio::select! {
        _ = inner.cancel.cancelled() => return,
        _ = inner.gate.opened() => {}
    }

    loop {
        tokio::select! {
            _ = inner.cancel.cancelled() => return,
            _ = tokio::time::sleep(inner.settings.heartbeat) => {}
        }
        match send_message(&inner, Message::from(ConnectionPoll {})).await {
            Ok(_) => {}
            Err(e) => match e.kind() {
                ErrorKind::Cancelled | ErrorKind::Disconnected => return,
                _ => tracing::warn!(session_id = %inner.session_id, error = %e, "heartbeat"),
            },
        }
    }
}
