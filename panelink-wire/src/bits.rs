//! Packed bit-field groups.
//!
//! A [`bitfield!`] group stores several named lanes in one 1/2/4-byte
//! big-endian word. Each lane is addressed by a `lo..hi` bit range
//! (`lo` inclusive, `hi` exclusive, bit 0 = least significant); `bool`
//! lanes use a width-1 range.
//!
//! ```
//! panelink_wire::bitfield! {
//!     /// Sounder control bits.
//!     pub struct SounderFlags: u8 {
//!         pub bell: bool @ 0..1,
//!         pub volume: u8 @ 1..4,
//!     }
//! }
//! ```

/// A value that can occupy a lane of a bit-field group.
pub trait BitLane: Copy {
    fn into_bits(self) -> u32;
    fn from_bits(bits: u32) -> Self;
}

impl BitLane for bool {
    fn into_bits(self) -> u32 {
        self as u32
    }
    fn from_bits(bits: u32) -> Self {
        bits != 0
    }
}

macro_rules! impl_bit_lane {
    ($($t:ty),+) => {
        $(
            impl BitLane for $t {
                fn into_bits(self) -> u32 { self as u32 }
                fn from_bits(bits: u32) -> Self { bits as $t }
            }
        )+
    };
}

impl_bit_lane!(u8, u16, u32);

/// Declare a bit-field group over 1/2/4-byte big-endian storage.
///
/// Generates the struct, lane packing/unpacking, and the wire impls.
/// Bits not covered by any lane write as zero and are ignored on read.
#[macro_export]
macro_rules! bitfield {
    (
        $(#[$meta:meta])*
        pub struct $name:ident : $storage:ty {
            $(
                $(#[$fmeta:meta])*
                pub $field:ident : $fty:tt @ $lo:literal .. $hi:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $fty, )+
        }

        impl $name {
            /// Pack every lane into the storage word.
            pub fn pack(&self) -> $storage {
                let mut bits: u32 = 0;
                $(
                    bits |= ($crate::bits::BitLane::into_bits(self.$field)
                        & $crate::bits::lane_mask($lo, $hi)) << $lo;
                )+
                bits as $storage
            }

            /// Unpack every lane from the storage word.
            pub fn unpack(word: $storage) -> Self {
                let bits = word as u32;
                Self {
                    $(
                        $field: $crate::bits::BitLane::from_bits(
                            (bits >> $lo) & $crate::bits::lane_mask($lo, $hi),
                        ),
                    )+
                }
            }
        }

        impl $crate::Serializable for $name {
            fn serialize(&self, buf: &mut impl Extend<u8>) {
                $crate::Serializable::serialize(&self.pack(), buf);
            }
        }

        impl $crate::Deserializable for $name {
            fn deserialize(
                buf: $crate::deserialize::Buffer<'_, '_>,
            ) -> $crate::deserialize::Result<Self> {
                Ok(Self::unpack(<$storage as $crate::Deserializable>::deserialize(buf)?))
            }
        }
    };
}

/// Mask for a `lo..hi` lane, already shifted down to bit 0.
pub const fn lane_mask(lo: u32, hi: u32) -> u32 {
    let width = hi - lo;
    if width >= 32 { u32::MAX } else { (1u32 << width) - 1 }
}

#[cfg(test)]
mod tests {
    use crate::{Deserializable, Serializable};

    bitfield! {
        pub struct Sample: u16 {
            pub on: bool @ 0..1,
            pub level: u8 @ 1..5,
            pub high: bool @ 15..16,
        }
    }

    #[test]
    fn packs_lanes_into_big_endian_storage() {
        let s = Sample { on: true, level: 0b1010, high: true };
        assert_eq!(s.pack(), 0b1000_0000_0001_0101);
        assert_eq!(s.to_bytes(), [0x80, 0x15]);
    }

    #[test]
    fn unpack_ignores_unmapped_bits() {
        let s = Sample::unpack(0b0000_0000_0110_0000);
        assert_eq!(s, Sample { on: false, level: 0, high: false });
    }

    #[test]
    fn roundtrips() {
        let s = Sample { on: false, level: 7, high: true };
        assert_eq!(Sample::from_bytes(&s.to_bytes()).unwrap(), s);
    }

    #[test]
    fn truncates_oversized_lane_values() {
        let s = Sample { on: false, level: 0xFF, high: false };
        // Only 4 bits of `level` fit the lane.
        assert_eq!(s.pack(), 0b0001_1110);
    }
}
