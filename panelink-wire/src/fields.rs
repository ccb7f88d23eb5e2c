//! Wire field kinds beyond plain integers.
//!
//! Each type in this module *is* its wire encoding: a message declares
//! `pub code: Bcd<4>` and the generated impls produce exactly the bytes the
//! panel expects. The encodings are contractual:
//!
//! | Type | Encoding |
//! |---|---|
//! | [`Compact<T>`] | 1-byte length `L`, then the `L`-byte minimal big-endian body |
//! | [`Utf16Short`] / [`Utf16Long`] | 1-/2-byte big-endian byte length, UTF-16LE |
//! | [`Utf16Array`] | compact per-element byte width, UTF-16BE zero-padded, to end of buffer |
//! | [`Bcd<N>`] / [`BcdRest`] / [`BcdPrefixed`] | two digits per byte, high nibble first |
//! | [`Blob8`] / [`Blob16`] / [`Rest`] | 1-/2-byte length-prefixed or unbounded byte runs |
//! | [`Prefixed8<T>`] / [`Prefixed16<T>`] | 1-/2-byte count, each element serialized in turn |
//! | [`WireDateTime`] / [`WireDate`] / [`WireTime`] | fixed calendar bodies, all-`0xFF` = null |

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::deserialize::{Buffer, Deserializable, Error, Result};
use crate::serialize::Serializable;

// ─── Compact integers ────────────────────────────────────────────────────────

/// A compact integer: 1-byte length prefix, then the minimal big-endian body.
///
/// Unsigned values strip every leading `0x00` (zero encodes as length 0).
/// Signed values strip leading `0x00`/`0xFF` only while the following byte
/// preserves the sign bit, and are sign-extended on read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Compact<T>(pub T);

macro_rules! impl_compact_unsigned {
    ($t:ty) => {
        impl Serializable for Compact<$t> {
            fn serialize(&self, buf: &mut impl Extend<u8>) {
                let bytes = self.0.to_be_bytes();
                let skip = bytes.iter().take_while(|&&b| b == 0x00).count();
                buf.extend([(bytes.len() - skip) as u8]);
                buf.extend(bytes[skip..].iter().copied());
            }
        }

        impl Deserializable for Compact<$t> {
            fn deserialize(buf: Buffer) -> Result<Self> {
                const WIDTH: usize = std::mem::size_of::<$t>();
                let len = buf.read_byte()? as usize;
                if len > WIDTH {
                    return Err(Error::LengthOverflow { len, max: WIDTH });
                }
                let mut body = [0u8; WIDTH];
                buf.read_exact(&mut body[WIDTH - len..])?;
                Ok(Self(<$t>::from_be_bytes(body)))
            }
        }
    };
}

macro_rules! impl_compact_signed {
    ($t:ty) => {
        impl Serializable for Compact<$t> {
            fn serialize(&self, buf: &mut impl Extend<u8>) {
                let bytes = self.0.to_be_bytes();
                let pad: u8 = if self.0 < 0 { 0xFF } else { 0x00 };
                let mut skip = 0;
                while skip < bytes.len() && bytes[skip] == pad {
                    match bytes.get(skip + 1) {
                        // The retained body must still decode with the right sign.
                        Some(&next) => {
                            if (next & 0x80 != 0) == (pad == 0xFF) {
                                skip += 1;
                            } else {
                                break;
                            }
                        }
                        // Zero strips to nothing; -1 keeps its final 0xFF.
                        None if pad == 0x00 => skip += 1,
                        None => break,
                    }
                }
                buf.extend([(bytes.len() - skip) as u8]);
                buf.extend(bytes[skip..].iter().copied());
            }
        }

        impl Deserializable for Compact<$t> {
            fn deserialize(buf: Buffer) -> Result<Self> {
                const WIDTH: usize = std::mem::size_of::<$t>();
                let len = buf.read_byte()? as usize;
                if len > WIDTH {
                    return Err(Error::LengthOverflow { len, max: WIDTH });
                }
                let mut body = [0u8; WIDTH];
                buf.read_exact(&mut body[WIDTH - len..])?;
                if len > 0 && len < WIDTH && body[WIDTH - len] & 0x80 != 0 {
                    for b in &mut body[..WIDTH - len] {
                        *b = 0xFF;
                    }
                }
                Ok(Self(<$t>::from_be_bytes(body)))
            }
        }
    };
}

impl_compact_unsigned!(u16);
impl_compact_unsigned!(u32);
impl_compact_signed!(i16);
impl_compact_signed!(i32);

// ─── UTF-16 strings ──────────────────────────────────────────────────────────

fn utf16le_units(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() * 2);
    for unit in s.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

fn string_from_utf16(units: &[u16]) -> Result<String> {
    String::from_utf16(units).map_err(|_| Error::InvalidText)
}

fn read_utf16le(bytes: &[u8]) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::InvalidText);
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    string_from_utf16(&units)
}

/// UTF-16LE text with a 1-byte big-endian byte-length prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Utf16Short(pub String);

impl Serializable for Utf16Short {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        let bytes = utf16le_units(&self.0);
        assert!(bytes.len() <= u8::MAX as usize, "UTF-16 text exceeds 1-byte length prefix");
        buf.extend([bytes.len() as u8]);
        buf.extend(bytes);
    }
}

impl Deserializable for Utf16Short {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let len = buf.read_byte()? as usize;
        Ok(Self(read_utf16le(buf.read_slice(len)?)?))
    }
}

/// UTF-16LE text with a 2-byte big-endian byte-length prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Utf16Long(pub String);

impl Serializable for Utf16Long {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        let bytes = utf16le_units(&self.0);
        assert!(bytes.len() <= u16::MAX as usize, "UTF-16 text exceeds 2-byte length prefix");
        (bytes.len() as u16).serialize(buf);
        buf.extend(bytes);
    }
}

impl Deserializable for Utf16Long {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let len = u16::deserialize(buf)? as usize;
        Ok(Self(read_utf16le(buf.read_slice(len)?)?))
    }
}

/// An unbounded array of fixed-width UTF-16BE strings.
///
/// A leading [`Compact<u32>`] carries the byte width of each element; elements
/// are zero-padded up to that width and read until the buffer is exhausted,
/// trimming trailing NULs. Must be the last field of its message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Utf16Array(pub Vec<String>);

impl Serializable for Utf16Array {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        let width = self
            .0
            .iter()
            .map(|s| s.encode_utf16().count() * 2)
            .max()
            .map(|w| w.max(2))
            .unwrap_or(0);
        Compact(width as u32).serialize(buf);
        for s in &self.0 {
            let mut written = 0;
            for unit in s.encode_utf16() {
                buf.extend(unit.to_be_bytes());
                written += 2;
            }
            buf.extend(std::iter::repeat(0u8).take(width - written));
        }
    }
}

impl Deserializable for Utf16Array {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let width = Compact::<u32>::deserialize(buf)?.0 as usize;
        if width == 0 || width % 2 != 0 {
            if width == 0 && buf.remaining() == 0 {
                return Ok(Self(Vec::new()));
            }
            return Err(Error::InvalidText);
        }
        let mut labels = Vec::new();
        while buf.remaining() >= width {
            let mut units: Vec<u16> = buf
                .read_slice(width)?
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            while units.last() == Some(&0) {
                units.pop();
            }
            labels.push(string_from_utf16(&units)?);
        }
        if buf.remaining() != 0 {
            return Err(Error::TrailingBytes { count: buf.remaining() });
        }
        Ok(Self(labels))
    }
}

// ─── BCD strings ─────────────────────────────────────────────────────────────

fn pack_bcd(digits: &str, out: &mut impl Extend<u8>) {
    let digits = digits.as_bytes();
    assert!(
        digits.iter().all(|d| d.is_ascii_digit()),
        "BCD field contains a non-digit character"
    );
    for pair in digits.chunks(2) {
        let hi = pair[0] - b'0';
        let lo = if pair.len() == 2 { pair[1] - b'0' } else { 0 };
        out.extend([(hi << 4) | lo]);
    }
}

fn unpack_bcd(bytes: &[u8]) -> Result<String> {
    let mut digits = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        for nibble in [b >> 4, b & 0x0F] {
            if nibble > 9 {
                return Err(Error::BadBcdDigit { nibble });
            }
            digits.push((b'0' + nibble) as char);
        }
    }
    Ok(digits)
}

fn padded_even(digits: &str) -> String {
    let mut s = digits.to_owned();
    if s.len() % 2 != 0 {
        s.push('0');
    }
    s
}

/// A fixed-size BCD digit string packed into `N` bytes (`2·N` digits).
///
/// Shorter strings are right-padded with `'0'` on write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bcd<const N: usize>(pub String);

impl<const N: usize> Serializable for Bcd<N> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        assert!(self.0.len() <= 2 * N, "BCD field exceeds {N} bytes");
        let mut digits = self.0.clone();
        while digits.len() < 2 * N {
            digits.push('0');
        }
        pack_bcd(&digits, buf);
    }
}

impl<const N: usize> Deserializable for Bcd<N> {
    fn deserialize(buf: Buffer) -> Result<Self> {
        Ok(Self(unpack_bcd(buf.read_slice(N)?)?))
    }
}

/// An unbounded BCD digit string consuming the rest of the buffer.
///
/// Must be the last field of its message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BcdRest(pub String);

impl Serializable for BcdRest {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        pack_bcd(&padded_even(&self.0), buf);
    }
}

impl Deserializable for BcdRest {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let mut bytes = Vec::new();
        buf.read_to_end(&mut bytes);
        Ok(Self(unpack_bcd(&bytes)?))
    }
}

/// A BCD digit string with a 1-byte prefix counting the packed bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BcdPrefixed(pub String);

impl Serializable for BcdPrefixed {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        let digits = padded_even(&self.0);
        let bytes = digits.len() / 2;
        assert!(bytes <= u8::MAX as usize, "BCD field exceeds 1-byte length prefix");
        buf.extend([bytes as u8]);
        pack_bcd(&digits, buf);
    }
}

impl Deserializable for BcdPrefixed {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let len = buf.read_byte()? as usize;
        Ok(Self(unpack_bcd(buf.read_slice(len)?)?))
    }
}

// ─── Byte runs ───────────────────────────────────────────────────────────────

/// Bytes with a 1-byte length prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Blob8(pub Vec<u8>);

impl Serializable for Blob8 {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        assert!(self.0.len() <= u8::MAX as usize, "byte run exceeds 1-byte length prefix");
        buf.extend([self.0.len() as u8]);
        buf.extend(self.0.iter().copied());
    }
}

impl Deserializable for Blob8 {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let len = buf.read_byte()? as usize;
        Ok(Self(buf.read_slice(len)?.to_vec()))
    }
}

/// Bytes with a 2-byte big-endian length prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Blob16(pub Vec<u8>);

impl Serializable for Blob16 {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        assert!(self.0.len() <= u16::MAX as usize, "byte run exceeds 2-byte length prefix");
        (self.0.len() as u16).serialize(buf);
        buf.extend(self.0.iter().copied());
    }
}

impl Deserializable for Blob16 {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let len = u16::deserialize(buf)? as usize;
        Ok(Self(buf.read_slice(len)?.to_vec()))
    }
}

/// Bytes consuming the rest of the buffer. Must be the last field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rest(pub Vec<u8>);

impl Serializable for Rest {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        buf.extend(self.0.iter().copied());
    }
}

impl Deserializable for Rest {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let mut bytes = Vec::new();
        buf.read_to_end(&mut bytes);
        Ok(Self(bytes))
    }
}

// ─── Object arrays ───────────────────────────────────────────────────────────

/// A list of records with a 1-byte count prefix.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Prefixed8<T>(pub Vec<T>);

impl<T: Serializable> Serializable for Prefixed8<T> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        assert!(self.0.len() <= u8::MAX as usize, "record list exceeds 1-byte count prefix");
        buf.extend([self.0.len() as u8]);
        for item in &self.0 {
            item.serialize(buf);
        }
    }
}

impl<T: Deserializable> Deserializable for Prefixed8<T> {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let count = buf.read_byte()? as usize;
        let items = (0..count).map(|_| T::deserialize(buf)).collect::<Result<_>>()?;
        Ok(Self(items))
    }
}

/// A list of records with a 2-byte big-endian count prefix.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Prefixed16<T>(pub Vec<T>);

impl<T: Serializable> Serializable for Prefixed16<T> {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        assert!(self.0.len() <= u16::MAX as usize, "record list exceeds 2-byte count prefix");
        (self.0.len() as u16).serialize(buf);
        for item in &self.0 {
            item.serialize(buf);
        }
    }
}

impl<T: Deserializable> Deserializable for Prefixed16<T> {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let count = u16::deserialize(buf)? as usize;
        let items = (0..count).map(|_| T::deserialize(buf)).collect::<Result<_>>()?;
        Ok(Self(items))
    }
}

// ─── Calendar fields ─────────────────────────────────────────────────────────

/// A nullable timestamp: `{year u16, month, day, hour, minute, second}`,
/// with an all-`0xFF` body encoding null.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WireDateTime(pub Option<NaiveDateTime>);

impl Serializable for WireDateTime {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        match self.0 {
            Some(dt) => {
                (dt.year() as u16).serialize(buf);
                buf.extend([
                    dt.month() as u8,
                    dt.day() as u8,
                    dt.hour() as u8,
                    dt.minute() as u8,
                    dt.second() as u8,
                ]);
            }
            None => buf.extend([0xFFu8; 7]),
        }
    }
}

impl Deserializable for WireDateTime {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let body: [u8; 7] = <[u8; 7]>::deserialize(buf)?;
        if body == [0xFF; 7] {
            return Ok(Self(None));
        }
        let year = u16::from_be_bytes([body[0], body[1]]);
        let date = NaiveDate::from_ymd_opt(year as i32, body[2] as u32, body[3] as u32)
            .ok_or(Error::InvalidCalendar)?;
        let dt = date
            .and_hms_opt(body[4] as u32, body[5] as u32, body[6] as u32)
            .ok_or(Error::InvalidCalendar)?;
        Ok(Self(Some(dt)))
    }
}

/// A nullable date: `{year u16, month, day}`, all-`0xFF` = null.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WireDate(pub Option<NaiveDate>);

impl Serializable for WireDate {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        match self.0 {
            Some(d) => {
                (d.year() as u16).serialize(buf);
                buf.extend([d.month() as u8, d.day() as u8]);
            }
            None => buf.extend([0xFFu8; 4]),
        }
    }
}

impl Deserializable for WireDate {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let body: [u8; 4] = <[u8; 4]>::deserialize(buf)?;
        if body == [0xFF; 4] {
            return Ok(Self(None));
        }
        let year = u16::from_be_bytes([body[0], body[1]]);
        let date = NaiveDate::from_ymd_opt(year as i32, body[2] as u32, body[3] as u32)
            .ok_or(Error::InvalidCalendar)?;
        Ok(Self(Some(date)))
    }
}

/// A nullable time of day: `{hour, minute, second}`, all-`0xFF` = null.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WireTime(pub Option<NaiveTime>);

impl Serializable for WireTime {
    fn serialize(&self, buf: &mut impl Extend<u8>) {
        match self.0 {
            Some(t) => buf.extend([t.hour() as u8, t.minute() as u8, t.second() as u8]),
            None => buf.extend([0xFFu8; 3]),
        }
    }
}

impl Deserializable for WireTime {
    fn deserialize(buf: Buffer) -> Result<Self> {
        let body: [u8; 3] = <[u8; 3]>::deserialize(buf)?;
        if body == [0xFF; 3] {
            return Ok(Self(None));
        }
        let time = NaiveTime::from_hms_opt(body[0] as u32, body[1] as u32, body[2] as u32)
            .ok_or(Error::InvalidCalendar)?;
        Ok(Self(Some(time)))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: Serializable + Deserializable + PartialEq + std::fmt::Debug>(value: T) {
        let bytes = value.to_bytes();
        assert_eq!(T::from_bytes_exact(&bytes).unwrap(), value, "bytes: {bytes:02X?}");
    }

    #[test]
    fn compact_unsigned_strips_leading_zeros() {
        assert_eq!(Compact(0u32).to_bytes(), [0x00]);
        assert_eq!(Compact(0x7Fu32).to_bytes(), [0x01, 0x7F]);
        assert_eq!(Compact(0x80u32).to_bytes(), [0x01, 0x80]);
        assert_eq!(Compact(0x1234u32).to_bytes(), [0x02, 0x12, 0x34]);
        assert_eq!(Compact(u32::MAX).to_bytes(), [0x04, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn compact_signed_preserves_sign_bit() {
        assert_eq!(Compact(0i32).to_bytes(), [0x00]);
        assert_eq!(Compact(127i32).to_bytes(), [0x01, 0x7F]);
        // 128 needs a leading 0x00 so it doesn't read back negative.
        assert_eq!(Compact(128i32).to_bytes(), [0x02, 0x00, 0x80]);
        assert_eq!(Compact(-1i32).to_bytes(), [0x01, 0xFF]);
        assert_eq!(Compact(-129i32).to_bytes(), [0x02, 0xFF, 0x7F]);
        assert_eq!(Compact(-128i32).to_bytes(), [0x01, 0x80]);
    }

    #[test]
    fn compact_roundtrips() {
        for v in [0u32, 1, 127, 128, 255, 256, 0xFFFF, 0x0001_0000, u32::MAX] {
            roundtrip(Compact(v));
        }
        for v in [0i32, 1, -1, 127, 128, -127, -128, -129, i32::MIN, i32::MAX] {
            roundtrip(Compact(v));
        }
        for v in [0u16, 255, 256, u16::MAX] {
            roundtrip(Compact(v));
        }
        for v in [0i16, -1, i16::MIN, i16::MAX] {
            roundtrip(Compact(v));
        }
    }

    #[test]
    fn compact_rejects_oversized_body() {
        let err = Compact::<u16>::from_bytes(&[0x03, 0x01, 0x02, 0x03]).unwrap_err();
        assert_eq!(err, Error::LengthOverflow { len: 3, max: 2 });
    }

    #[test]
    fn utf16_short_layout() {
        let bytes = Utf16Short("AB".into()).to_bytes();
        assert_eq!(bytes, [0x04, 0x41, 0x00, 0x42, 0x00]);
        roundtrip(Utf16Short("partition one".into()));
        roundtrip(Utf16Short(String::new()));
    }

    #[test]
    fn utf16_long_roundtrips_non_ascii() {
        roundtrip(Utf16Long("zone \u{00e9}tage — ok".into()));
    }

    #[test]
    fn utf16_odd_length_is_invalid() {
        assert_eq!(Utf16Short::from_bytes(&[0x01, 0x41]).unwrap_err(), Error::InvalidText);
    }

    #[test]
    fn utf16_array_pads_to_widest_element() {
        let labels = Utf16Array(vec!["AB".into(), "C".into()]);
        let bytes = labels.to_bytes();
        // width = 4 as a compact u32, then two 4-byte UTF-16BE cells
        assert_eq!(
            bytes,
            [0x01, 0x04, 0x00, 0x41, 0x00, 0x42, 0x00, 0x43, 0x00, 0x00]
        );
        roundtrip(labels);
        roundtrip(Utf16Array(Vec::new()));
    }

    #[test]
    fn bcd_fixed_pads_right() {
        assert_eq!(Bcd::<2>("12".into()).to_bytes(), [0x12, 0x00]);
        assert_eq!(Bcd::<2>("1234".into()).to_bytes(), [0x12, 0x34]);
        roundtrip(Bcd::<4>("12345678".into()));
    }

    #[test]
    fn bcd_rejects_bad_nibble() {
        assert_eq!(
            Bcd::<1>::from_bytes(&[0x1A]).unwrap_err(),
            Error::BadBcdDigit { nibble: 0x0A }
        );
    }

    #[test]
    fn bcd_prefixed_counts_bytes() {
        assert_eq!(BcdPrefixed("123456".into()).to_bytes(), [0x03, 0x12, 0x34, 0x56]);
        roundtrip(BcdPrefixed("1234".into()));
        roundtrip(BcdPrefixed(String::new()));
    }

    #[test]
    fn bcd_rest_consumes_everything() {
        assert_eq!(BcdRest("9876".into()).to_bytes(), [0x98, 0x76]);
        roundtrip(BcdRest("001122".into()));
    }

    #[test]
    fn blobs_roundtrip() {
        roundtrip(Blob8(vec![1, 2, 3]));
        roundtrip(Blob8(Vec::new()));
        roundtrip(Blob16(vec![0xAA; 300]));
        roundtrip(Rest(vec![9, 8, 7]));
    }

    #[test]
    fn prefixed_lists_roundtrip() {
        roundtrip(Prefixed8(vec![1u16, 2, 3]));
        roundtrip(Prefixed16(vec![Blob8(vec![0x01]), Blob8(vec![0x02, 0x03])]));
    }

    #[test]
    fn calendar_fields_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let time = NaiveTime::from_hms_opt(23, 59, 58).unwrap();
        roundtrip(WireDateTime(Some(date.and_time(time))));
        roundtrip(WireDateTime(None));
        roundtrip(WireDate(Some(date)));
        roundtrip(WireDate(None));
        roundtrip(WireTime(Some(time)));
        roundtrip(WireTime(None));
    }

    #[test]
    fn calendar_rejects_impossible_date() {
        let bytes = [0x07, 0xE8, 13, 1, 0, 0, 0];
        assert_eq!(WireDateTime::from_bytes(&bytes).unwrap_err(), Error::InvalidCalendar);
    }
}
