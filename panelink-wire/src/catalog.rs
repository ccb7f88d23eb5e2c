//! The panel message catalog: payload structs, wire enums, and flag groups.
//!
//! Command messages declare `pub sequence: u8` as their first field — that
//! byte is the command-correlation sequence the session stamps on send and
//! matches on receive. The serializer needs no special knowledge of it; it
//! is simply the first field written after the command word.

use crate::fields::{
    Bcd, BcdPrefixed, BcdRest, Blob8, Blob16, Compact, Prefixed8, Rest, Utf16Array, Utf16Long,
    Utf16Short, WireDate, WireDateTime, WireTime,
};
use crate::{bitfield, impl_body, wire_enum, wire_struct};

// ─── Wire enums ──────────────────────────────────────────────────────────────

wire_enum! {
    /// Encryption scheme requested by the panel in `OpenSession`.
    pub enum EncryptionType: u8 {
        Type1 = 0x01,
        Type2 = 0x02,
    }
}

wire_enum! {
    /// Result code carried by `CommandResponse`.
    ///
    /// Any value other than `Success` is a panel-level rejection: the round
    /// trip itself succeeded and the caller classifies the payload.
    pub enum ResponseCode: u8 {
        Success = 0x00,
        Busy = 0x01,
        UnknownCommand = 0x02,
        InvalidData = 0x03,
        NotAllowed = 0x04,
        SequenceMismatch = 0x05,
    }
}

impl ResponseCode {
    /// Whether the panel accepted the command.
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

wire_enum! {
    /// Failure class carried by `CommandError` (the command-level NACK).
    pub enum CommandFault: u8 {
        Malformed = 0x01,
        Unsupported = 0x02,
        WrongState = 0x03,
        ChecksumFailed = 0x04,
    }
}

wire_enum! {
    /// Reported state of a single zone.
    pub enum ZoneState: u8 {
        Restored = 0x00,
        Open = 0x01,
        Tamper = 0x02,
        Fault = 0x03,
        LowBattery = 0x04,
        Bypassed = 0x05,
    }
}

wire_enum! {
    /// Arming level of a partition.
    pub enum ArmMode: u8 {
        Disarmed = 0x00,
        Away = 0x01,
        Stay = 0x02,
        Night = 0x03,
    }
}

wire_enum! {
    /// Broad classification of a logged panel event.
    pub enum EventCategory: u8 {
        Alarm = 0x01,
        Restore = 0x02,
        Opening = 0x03,
        Closing = 0x04,
        Trouble = 0x05,
        Test = 0x06,
    }
}

wire_enum! {
    /// Hardware family of an enrolled bus module.
    pub enum ModuleType: u16 {
        Keypad = 0x0101,
        ZoneExpander = 0x0102,
        PowerSupply = 0x0103,
        WirelessReceiver = 0x0201,
        Communicator = 0x0301,
    }
}

// ─── Flag groups ─────────────────────────────────────────────────────────────

bitfield! {
    /// Summary bits reported with every partition status.
    pub struct PartitionFlags: u8 {
        pub ready: bool @ 0..1,
        pub armed: bool @ 1..2,
        pub alarm_in_memory: bool @ 2..3,
        pub trouble: bool @ 3..4,
        pub chime_enabled: bool @ 4..5,
    }
}

bitfield! {
    /// System trouble summary.
    pub struct TroubleFlags: u16 {
        pub ac_failure: bool @ 0..1,
        pub battery_low: bool @ 1..2,
        pub bell_circuit: bool @ 2..3,
        pub phone_line: bool @ 3..4,
        pub fail_to_communicate: bool @ 4..5,
        pub zone_tamper: bool @ 5..6,
        pub zone_low_battery: bool @ 6..7,
        pub clock_loss: bool @ 7..8,
    }
}

bitfield! {
    /// Runtime state lanes reported in diagnostic dumps.
    pub struct SystemFlags: u32 {
        pub online: bool @ 0..1,
        pub walk_test: bool @ 1..2,
        pub installer_mode: bool @ 2..3,
        pub language: u8 @ 8..12,
        pub firmware_bank: u8 @ 12..14,
    }
}

// ─── Nested records ──────────────────────────────────────────────────────────

wire_struct! {
    /// One entry of the panel's event buffer.
    pub struct EventRecord {
        pub timestamp: WireDateTime,
        pub category: EventCategory,
        pub code: u16,
        pub partition: u8,
        pub zone: u16,
    }
}

// ─── Handshake commands ──────────────────────────────────────────────────────

wire_struct! {
    /// Opens an ITv2 session. The panel sends this first; the server mirrors
    /// it back with the same encryption type to accept.
    pub struct OpenSession {
        pub sequence: u8,
        pub device_type: u8,
        pub device_id: u16,
        pub protocol_version: u16,
        pub software_version: Compact<u32>,
        pub encryption_type: EncryptionType,
    }
}
impl_body!(OpenSession, 0x0400, command);

wire_struct! {
    /// Carries one side's key-schedule initializer; the first message each
    /// side encrypts follows its peer's `RequestAccess`.
    pub struct RequestAccess {
        pub sequence: u8,
        pub initializer: Blob8,
    }
}
impl_body!(RequestAccess, 0x0460, command);

wire_struct! {
    /// Positive completion of a command transaction.
    pub struct CommandResponse {
        pub sequence: u8,
        pub code: ResponseCode,
    }
}
impl_body!(CommandResponse, 0x0500, command);

wire_struct! {
    /// Command-level NACK. Completes the transaction exactly like
    /// `CommandResponse`; callers classify by the fault code.
    pub struct CommandError {
        pub sequence: u8,
        pub fault: CommandFault,
    }
}
impl_body!(CommandError, 0x0501, command);

// ─── Operator commands ───────────────────────────────────────────────────────

wire_struct! {
    /// Asks the panel to report current global status.
    pub struct StatusRequest {
        pub sequence: u8,
    }
}
impl_body!(StatusRequest, 0x0052, command);

wire_struct! {
    /// Arms one partition at the given level.
    pub struct ArmPartition {
        pub sequence: u8,
        pub partition: u8,
        pub mode: ArmMode,
        pub access_code: BcdPrefixed,
    }
}
impl_body!(ArmPartition, 0x0301, command);

wire_struct! {
    /// Disarms one partition.
    pub struct DisarmPartition {
        pub sequence: u8,
        pub partition: u8,
        pub access_code: BcdPrefixed,
    }
}
impl_body!(DisarmPartition, 0x0302, command);

wire_struct! {
    /// Sets or clears the bypass flag of a zone.
    pub struct BypassZone {
        pub sequence: u8,
        pub zone: u16,
        pub bypassed: u8,
    }
}
impl_body!(BypassZone, 0x0303, command);

wire_struct! {
    /// Requests a slice of the event buffer starting at the given index.
    pub struct ReadEventBuffer {
        pub sequence: u8,
        pub start: Compact<u32>,
        pub count: u8,
    }
}
impl_body!(ReadEventBuffer, 0x0310, command);

wire_struct! {
    /// The requested event-buffer slice.
    pub struct EventBufferResponse {
        pub sequence: u8,
        pub events: Prefixed8<EventRecord>,
    }
}
impl_body!(EventBufferResponse, 0x0311, command);

wire_struct! {
    /// Requests programmed zone labels starting at the given zone.
    pub struct ReadZoneLabels {
        pub sequence: u8,
        pub start_zone: u16,
        pub count: u8,
    }
}
impl_body!(ReadZoneLabels, 0x0320, command);

wire_struct! {
    /// The requested zone labels, one fixed-width cell per zone.
    pub struct ZoneLabelsResponse {
        pub sequence: u8,
        pub labels: Utf16Array,
    }
}
impl_body!(ZoneLabelsResponse, 0x0321, command);

wire_struct! {
    /// Programs one user's access code.
    pub struct SetUserCode {
        pub sequence: u8,
        pub user: Compact<u16>,
        pub code: Bcd<4>,
    }
}
impl_body!(SetUserCode, 0x0330, command);

wire_struct! {
    /// Sets the panel clock.
    pub struct SetClock {
        pub sequence: u8,
        pub timestamp: WireDateTime,
    }
}
impl_body!(SetClock, 0x0331, command);

wire_struct! {
    /// Writes a run of configuration bytes at the given offset.
    pub struct WriteConfig {
        pub sequence: u8,
        pub offset: u32,
        pub data: Blob16,
    }
}
impl_body!(WriteConfig, 0x0340, command);

// ─── Notifications ───────────────────────────────────────────────────────────

wire_struct! {
    /// Keep-alive. Acknowledged like any notification; no payload.
    pub struct ConnectionPoll {}
}
impl_body!(ConnectionPoll, 0x000F);

wire_struct! {
    /// State change of a single zone.
    pub struct ZoneStatus {
        pub zone: u16,
        pub state: ZoneState,
    }
}
impl_body!(ZoneStatus, 0x0210);

wire_struct! {
    /// Arming level and summary flags of one partition.
    pub struct PartitionStatus {
        pub partition: u8,
        pub mode: ArmMode,
        pub flags: PartitionFlags,
    }
}
impl_body!(PartitionStatus, 0x0211);

wire_struct! {
    /// System-wide trouble summary.
    pub struct TroubleStatus {
        pub flags: TroubleFlags,
    }
}
impl_body!(TroubleStatus, 0x0212);

wire_struct! {
    /// A single event pushed as it is logged.
    pub struct EventReport {
        pub event: EventRecord,
    }
}
impl_body!(EventReport, 0x0215);

wire_struct! {
    /// Periodic clock broadcast with the panel's measured drift.
    pub struct ClockBroadcast {
        pub date: WireDate,
        pub time: WireTime,
        pub utc_offset_minutes: i16,
        pub drift_seconds: Compact<i32>,
    }
}
impl_body!(ClockBroadcast, 0x0216);

wire_struct! {
    /// Mirror of one keypad LCD line.
    pub struct LcdMessage {
        pub line: u8,
        pub text: Utf16Short,
    }
}
impl_body!(LcdMessage, 0x0220);

wire_struct! {
    /// Free-form diagnostic text from the panel.
    pub struct LogMessage {
        pub severity: u8,
        pub text: Utf16Long,
    }
}
impl_body!(LogMessage, 0x0221);

wire_struct! {
    /// Opaque diagnostic block; the payload format depends on `kind`.
    pub struct DiagnosticDump {
        pub kind: u8,
        pub flags: SystemFlags,
        pub data: Rest,
    }
}
impl_body!(DiagnosticDump, 0x0230);

wire_struct! {
    /// Central-station account digits programmed for a partition.
    pub struct AccountReport {
        pub partition: u8,
        pub account: BcdRest,
    }
}
impl_body!(AccountReport, 0x0231);

wire_struct! {
    /// A bus module announcing itself after enrollment.
    pub struct DeviceEnrollment {
        pub module: ModuleType,
        pub mac: [u8; 6],
        pub serial: Bcd<5>,
    }
}
impl_body!(DeviceEnrollment, 0x0232);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Deserializable, Serializable};

    #[test]
    fn open_session_layout() {
        let body = OpenSession {
            sequence: 0x21,
            device_type: 0x05,
            device_id: 0x1234,
            protocol_version: 0x0200,
            software_version: Compact(0x0103),
            encryption_type: EncryptionType::Type2,
        };
        assert_eq!(
            body.to_bytes(),
            [0x21, 0x05, 0x12, 0x34, 0x02, 0x00, 0x02, 0x01, 0x03, 0x02]
        );
    }

    #[test]
    fn event_record_roundtrips_inside_response() {
        let body = EventBufferResponse {
            sequence: 1,
            events: Prefixed8(vec![
                EventRecord {
                    timestamp: WireDateTime(None),
                    category: EventCategory::Alarm,
                    code: 0x1130,
                    partition: 1,
                    zone: 12,
                },
                EventRecord {
                    timestamp: WireDateTime(None),
                    category: EventCategory::Restore,
                    code: 0x3130,
                    partition: 1,
                    zone: 12,
                },
            ]),
        };
        let decoded = EventBufferResponse::from_bytes_exact(&body.to_bytes()).unwrap();
        assert_eq!(decoded, body);
    }

    #[test]
    fn nested_field_error_names_the_inner_field() {
        // EventReport → EventRecord with a bad category discriminant.
        let mut bytes = vec![0xFFu8; 7];
        bytes.push(0x7E);
        bytes.extend_from_slice(&[0x11, 0x30, 0x01, 0x00, 0x0C]);
        let err = EventReport::from_bytes(&bytes).unwrap_err();
        assert_eq!(
            err,
            crate::deserialize::Error::UnknownDiscriminant { value: 0x7E }
                .for_field("category")
                .for_field("event")
        );
    }
}
