//! Primitive and tagged-value reads from a byte cursor.
//!
//! Wire conventions (little-endian throughout):
//!
//! ```text
//! bool      1 byte, 0 = false, nonzero = true
//! i32/i64   fixed-width LE
//! f32/f64   IEEE-754 LE
//! string    unsigned LEB128 byte count, then UTF-8 bytes
//! guid      16 bytes, .NET GUID byte order
//! datetime  i64 tick count (100 ns since 0001-01-01T00:00:00) + 1 kind byte
//! ```
//!
//! A tagged value is one tag byte (`N`, `S`, `I`, `L`, `F`, `B`, `D`)
//! followed by the payload of that primitive; `N` has no payload. Any other
//! tag byte is a fatal decode error naming the tag.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use pagetree_shared::{PageTreeError, PropertyValue, Result};

pub const TAG_NULL: u8 = b'N';
pub const TAG_STRING: u8 = b'S';
pub const TAG_INT: u8 = b'I';
pub const TAG_LONG: u8 = b'L';
pub const TAG_FLOAT: u8 = b'F';
pub const TAG_DOUBLE: u8 = b'B';
pub const TAG_DATE: u8 = b'D';

pub(crate) const TICKS_PER_SECOND: i64 = 10_000_000;

/// Timestamp origin of the tick encoding.
pub(crate) fn tick_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .expect("valid epoch date")
        .and_hms_opt(0, 0, 0)
        .expect("valid epoch time")
}

/// Convert a tick count to a timestamp, full 100 ns precision retained.
pub(crate) fn datetime_from_ticks(ticks: i64) -> Result<NaiveDateTime> {
    let secs = ticks.div_euclid(TICKS_PER_SECOND);
    let rem = ticks.rem_euclid(TICKS_PER_SECOND);
    tick_epoch()
        .checked_add_signed(Duration::seconds(secs))
        .and_then(|dt| dt.checked_add_signed(Duration::nanoseconds(rem * 100)))
        .ok_or_else(|| PageTreeError::decode(format!("tick count {ticks} is out of range")))
}

// ---------------------------------------------------------------------------
// ByteCursor
// ---------------------------------------------------------------------------

/// Forward-only reader over a byte slice. All decoding goes through here so
/// truncation errors carry the offset and what was being read.
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current byte offset from the start of the slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_exact(&mut self, count: usize, what: &str) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(PageTreeError::decode(format!(
                "unexpected end of stream reading {what} at offset {} ({} of {count} bytes left)",
                self.pos,
                self.remaining(),
            )));
        }
        let slice = &self.buf[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    pub fn read_u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.read_exact(1, what)?[0])
    }

    pub fn read_bool(&mut self, what: &str) -> Result<bool> {
        Ok(self.read_u8(what)? != 0)
    }

    pub fn read_i32(&mut self, what: &str) -> Result<i32> {
        let bytes = self.read_exact(4, what)?;
        Ok(i32::from_le_bytes(bytes.try_into().expect("4-byte slice")))
    }

    pub fn read_u32(&mut self, what: &str) -> Result<u32> {
        let bytes = self.read_exact(4, what)?;
        Ok(u32::from_le_bytes(bytes.try_into().expect("4-byte slice")))
    }

    pub fn read_i64(&mut self, what: &str) -> Result<i64> {
        let bytes = self.read_exact(8, what)?;
        Ok(i64::from_le_bytes(bytes.try_into().expect("8-byte slice")))
    }

    pub fn read_f32(&mut self, what: &str) -> Result<f32> {
        let bytes = self.read_exact(4, what)?;
        Ok(f32::from_le_bytes(bytes.try_into().expect("4-byte slice")))
    }

    pub fn read_f64(&mut self, what: &str) -> Result<f64> {
        let bytes = self.read_exact(8, what)?;
        Ok(f64::from_le_bytes(bytes.try_into().expect("8-byte slice")))
    }

    /// 16-byte guid in .NET byte order.
    pub fn read_uuid(&mut self, what: &str) -> Result<Uuid> {
        let bytes = self.read_exact(16, what)?;
        Ok(Uuid::from_bytes_le(
            bytes.try_into().expect("16-byte slice"),
        ))
    }

    /// Unsigned LEB128 length prefix.
    fn read_varint(&mut self, what: &str) -> Result<usize> {
        let mut value: usize = 0;
        let mut shift: u32 = 0;
        loop {
            let byte = self.read_u8(what)?;
            value |= ((byte & 0x7f) as usize) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift >= 35 {
                return Err(PageTreeError::decode(format!(
                    "length prefix for {what} at offset {} is malformed",
                    self.pos
                )));
            }
        }
    }

    /// Length-prefixed UTF-8 string.
    pub fn read_string(&mut self, what: &str) -> Result<String> {
        let len = self.read_varint(what)?;
        let bytes = self.read_exact(len, what)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| {
            PageTreeError::decode(format!("{what} at offset {} is not valid UTF-8", self.pos))
        })
    }

    /// Tick-encoded timestamp; the kind discriminator is read and dropped.
    pub fn read_datetime(&mut self, what: &str) -> Result<NaiveDateTime> {
        let ticks = self.read_i64(what)?;
        let _kind = self.read_u8(what)?;
        datetime_from_ticks(ticks)
    }
}

// ---------------------------------------------------------------------------
// Tagged values
// ---------------------------------------------------------------------------

/// Read one tagged value of any supported type.
pub fn read_value(cur: &mut ByteCursor<'_>) -> Result<PropertyValue> {
    let tag = cur.read_u8("value tag")?;
    match tag {
        TAG_NULL => Ok(PropertyValue::Null),
        TAG_STRING => Ok(PropertyValue::Text(cur.read_string("string value")?)),
        TAG_INT => Ok(PropertyValue::Int(cur.read_i32("integer value")?)),
        TAG_LONG => Ok(PropertyValue::Long(cur.read_i64("long value")?)),
        TAG_FLOAT => Ok(PropertyValue::Float(cur.read_f32("float value")?)),
        TAG_DOUBLE => Ok(PropertyValue::Double(cur.read_f64("double value")?)),
        TAG_DATE => Ok(PropertyValue::Date(cur.read_datetime("date value")?)),
        other => Err(PageTreeError::decode(format!(
            "cannot decode value tagged '{}'",
            char::from(other)
        ))),
    }
}

/// Read a nullable string: `N` yields `None`, `S` yields the text, anything
/// else is a decode error naming both tags.
pub fn read_string_opt(cur: &mut ByteCursor<'_>) -> Result<Option<String>> {
    let tag = cur.read_u8("value tag")?;
    match tag {
        TAG_NULL => Ok(None),
        TAG_STRING => Ok(Some(cur.read_string("string value")?)),
        other => Err(PageTreeError::decode(format!(
            "cannot decode value tagged '{}', expected '{}'",
            char::from(other),
            char::from(TAG_STRING)
        ))),
    }
}

// ---------------------------------------------------------------------------
// Test encoders
// ---------------------------------------------------------------------------
