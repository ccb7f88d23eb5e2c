//! Per-connection sequence counters.

/// The three 8-bit wrapping counters every ITv2 connection tracks.
///
/// `local` advances once per locally initiated transaction — replies within
/// a transaction (including every `SimpleAck`) reuse the current value.
/// `command` advances once per command transaction regardless of initiator.
/// `remote` mirrors the sender sequence of the last inbound non-ack packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequenceState {
    local: u8,
    remote: u8,
    command: u8,
}

impl SequenceState {
    /// Counters at connection establishment.
    pub fn new() -> Self {
        Self { local: 1, remote: 0, command: 0 }
    }

    /// Current local sequence, as used by replies.
    pub fn local(&self) -> u8 {
        self.local
    }

    /// Advance and return the local sequence for a new transaction.
    pub fn next_local(&mut self) -> u8 {
        self.local = self.local.wrapping_add(1);
        self.local
    }

    /// Last observed remote sender sequence.
    pub fn remote(&self) -> u8 {
        self.remote
    }

    /// Record the sender sequence of an inbound non-ack packet.
    pub fn observe_remote(&mut self, sender: u8) {
        self.remote = sender;
    }

    /// Current command sequence.
    pub fn command(&self) -> u8 {
        self.command
    }

    /// Adopt the peer's command counter (handshake step 1).
    pub fn adopt_command(&mut self, seq: u8) {
        self.command = seq;
    }

    /// Advance and return the command sequence for a new command transaction.
    pub fn next_command(&mut self) -> u8 {
        self.command = self.command.wrapping_add(1);
        self.command
    }
}

impl Default for SequenceState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_values() {
        let seq = SequenceState::new();
        assert_eq!((seq.local(), seq.remote(), seq.command()), (1, 0, 0));
    }

    #[test]
    fn local_advances_per_transaction_only() {
        let mut seq = SequenceState::new();
        assert_eq!(seq.next_local(), 2);
        // Replies read without advancing.
        assert_eq!(seq.local(), 2);
        assert_eq!(seq.local(), 2);
        assert_eq!(seq.next_local(), 3);
    }

    #[test]
    fn counters_wrap_modulo_256() {
        let mut seq = SequenceState::new();
        for _ in 0..254 {
            seq.next_local();
        }
        assert_eq!(seq.local(), 255);
        assert_eq!(seq.next_local(), 0);
        assert_eq!(seq.next_local(), 1);

        seq.adopt_command(255);
        assert_eq!(seq.next_command(), 0);
    }

    #[test]
    fn remote_tracks_last_observation() {
        let mut seq = SequenceState::new();
        seq.observe_remote(9);
        seq.observe_remote(10);
        assert_eq!(seq.remote(), 10);
    }
}
