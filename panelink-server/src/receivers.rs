//! Pending-receiver correlation.
//!
//! Every in-flight send registers a receiver here before its packet hits the
//! wire. The receive pump offers each inbound packet to the receivers in
//! insertion order; the first acceptor wins:
//!
//! * a notification receiver accepts the `SimpleAck` echoing its sender
//!   sequence and completes empty;
//! * a command receiver records that same ack without completing, and
//!   completes on any command message carrying its command sequence — in
//!   the same protocol transaction or a later one.

use panelink_itv2::Packet;
use panelink_wire::Message;
use tokio::sync::oneshot;

/// What a completed receiver resolves to: `None` for an acknowledged
/// notification, `Some` for a command completion.
pub(crate) type Completion = Option<Message>;

struct PendingReceiver {
    id: u64,
    sender_seq: u8,
    command_seq: Option<u8>,
    acked: bool,
    tx: oneshot::Sender<Completion>,
}

/// The session's ordered list of in-flight receivers.
#[derive(Default)]
pub(crate) struct PendingList {
    next_id: u64,
    receivers: Vec<PendingReceiver>,
}

impl PendingList {
    /// Register a receiver for an outbound transaction; `command_seq` is set
    /// for command messages.
    pub(crate) fn register(
        &mut self,
        sender_seq: u8,
        command_seq: Option<u8>,
    ) -> (u64, oneshot::Receiver<Completion>) {
        let (tx, rx) = oneshot::channel();
        let id = self.next_id;
        self.next_id += 1;
        self.receivers.push(PendingReceiver { id, sender_seq, command_seq, acked: false, tx });
        (id, rx)
    }

    /// Deregister (used when the awaiting caller gives up).
    pub(crate) fn remove(&mut self, id: u64) {
        self.receivers.retain(|r| r.id != id);
    }

    /// Offer an inbound packet; returns whether a receiver accepted it.
    pub(crate) fn offer(&mut self, packet: &Packet) -> bool {
        self.receivers.retain(|r| !r.tx.is_closed());
        match &packet.message {
            None => self.offer_ack(packet.receiver),
            Some(message) => self.offer_command(message),
        }
    }

    fn offer_ack(&mut self, receiver_seq: u8) -> bool {
        let Some(index) =
            self.receivers.iter().position(|r| r.sender_seq == receiver_seq && !r.acked)
        else {
            return false;
        };
        if self.receivers[index].command_seq.is_none() {
            let receiver = self.receivers.remove(index);
            let _ = receiver.tx.send(None);
        } else {
            self.receivers[index].acked = true;
        }
        true
    }

    /// Offer a command message (from a packet or a multi-message envelope);
    /// completes the receiver with the matching command sequence.
    pub(crate) fn offer_command(&mut self, message: &Message) -> bool {
        let Some(seq) = message.command_sequence() else {
            return false;
        };
        let Some(index) = self.receivers.iter().position(|r| r.command_seq == Some(seq)) else {
            return false;
        };
        let receiver = self.receivers.remove(index);
        let _ = receiver.tx.send(Some(message.clone()));
        true
    }

    /// Drop every receiver; their holders observe cancellation.
    pub(crate) fn clear(&mut self) {
        self.receivers.clear();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.receivers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelink_wire::{CommandResponse, ConnectionPoll, ResponseCode, StatusRequest};

    fn response(seq: u8) -> Message {
        Message::from(CommandResponse { sequence: seq, code: ResponseCode::Success })
    }

    #[test]
    fn notification_receiver_completes_on_matching_ack() {
        let mut list = PendingList::default();
        let (_, mut rx) = list.register(6, None);

        assert!(!list.offer(&Packet::ack(9, 5)), "wrong receiver sequence must not match");
        assert!(list.offer(&Packet::ack(9, 6)));
        assert_eq!(rx.try_recv().unwrap(), None);
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn duplicate_ack_matches_nothing() {
        let mut list = PendingList::default();
        let (_, _rx) = list.register(6, None);
        assert!(list.offer(&Packet::ack(9, 6)));
        assert!(!list.offer(&Packet::ack(10, 6)));
    }

    #[test]
    fn ack_with_sequence_zero_matches() {
        let mut list = PendingList::default();
        let (_, mut rx) = list.register(0, None);
        assert!(list.offer(&Packet::ack(1, 0)));
        assert_eq!(rx.try_recv().unwrap(), None);
    }

    #[test]
    fn command_receiver_survives_its_ack_and_completes_on_response() {
        let mut list = PendingList::default();
        let (_, mut rx) = list.register(6, Some(4));

        // Protocol-level ack is recorded, not completed.
        assert!(list.offer(&Packet::ack(10, 6)));
        assert!(rx.try_recv().is_err());
        assert_eq!(list.len(), 1);

        // Response in a later transaction completes it.
        let packet = Packet { sender: 11, receiver: 7, message: Some(response(4)) };
        assert!(list.offer(&packet));
        assert_eq!(rx.try_recv().unwrap(), Some(response(4)));
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn command_match_is_by_command_sequence_not_receiver() {
        let mut list = PendingList::default();
        let (_, mut rx) = list.register(6, Some(4));
        let packet = Packet { sender: 11, receiver: 99, message: Some(response(4)) };
        assert!(list.offer(&packet));
        assert_eq!(rx.try_recv().unwrap(), Some(response(4)));
    }

    #[test]
    fn offers_go_to_the_oldest_receiver_first() {
        let mut list = PendingList::default();
        let (_, mut first) = list.register(6, None);
        let (_, mut second) = list.register(6, None);

        assert!(list.offer(&Packet::ack(9, 6)));
        assert_eq!(first.try_recv().unwrap(), None);
        assert!(second.try_recv().is_err());
    }

    #[test]
    fn non_command_notifications_match_nothing() {
        let mut list = PendingList::default();
        let (_, _rx) = list.register(6, Some(4));
        let packet =
            Packet { sender: 11, receiver: 6, message: Some(Message::from(ConnectionPoll {})) };
        assert!(!list.offer(&packet));
    }

    #[test]
    fn command_with_unknown_sequence_matches_nothing() {
        let mut list = PendingList::default();
        let (_, _rx) = list.register(6, Some(4));
        let packet = Packet {
            sender: 11,
            receiver: 6,
            message: Some(Message::from(StatusRequest { sequence: 9 })),
        };
        assert!(!list.offer(&packet));
    }

    #[test]
    fn dropped_holders_are_pruned() {
        let mut list = PendingList::default();
        let (_, rx) = list.register(6, None);
        drop(rx);
        assert!(!list.offer(&Packet::ack(9, 6)));
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn clear_cancels_holders() {
        let mut list = PendingList::default();
        let (_, mut rx) = list.register(6, Some(1));
        list.clear();
        assert!(matches!(rx.try_recv(), Err(oneshot::error::TryRecvError::Closed)));
    }
}
