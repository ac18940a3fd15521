//! Bit buffer and fixed-offset field extraction.
//!
//! AIS field offsets are given in bits from the start of the reassembled
//! payload, most significant bit first. `BitBuf` packs bits into bytes and the
//! `extract_*` functions read `[start, end)` ranges out of it.

use crate::armor;
use crate::types::{AisError, Result};

/// Growable MSB-first bit sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuf {
    bytes: Vec<u8>,
    len: usize,
}

impl BitBuf {
    pub fn new() -> Self {
        BitBuf::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        BitBuf {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            len: 0,
        }
    }

    /// Parse a string of `'0'`/`'1'` characters. Returns `None` on any other character.
    pub fn from_binary_str(s: &str) -> Option<Self> {
        let mut buf = BitBuf::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '0' => buf.push(false),
                '1' => buf.push(true),
                _ => return None,
            }
        }
        Some(buf)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, bit: bool) {
        let offset = self.len % 8;
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 0x80 >> offset;
        }
        self.len += 1;
    }

    /// Append the low `width` bits of `value`, most significant first.
    pub fn push_bits(&mut self, value: u64, width: usize) {
        debug_assert!(width <= 64);
        for i in (0..width).rev() {
            self.push((value >> i) & 1 == 1);
        }
    }

    /// Append another buffer's bits.
    pub fn extend(&mut self, other: &BitBuf) {
        for i in 0..other.len {
            self.push(other.bit(i));
        }
    }

    /// Drop bits past `len`. No-op if `len >= self.len()`.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        self.len = len;
        self.bytes.truncate(len.div_ceil(8));
        let offset = len % 8;
        if offset != 0 {
            if let Some(last) = self.bytes.last_mut() {
                *last &= 0xFF << (8 - offset);
            }
        }
    }

    pub fn get(&self, idx: usize) -> Option<bool> {
        if idx < self.len {
            Some(self.bit(idx))
        } else {
            None
        }
    }

    fn bit(&self, idx: usize) -> bool {
        (self.bytes[idx / 8] >> (7 - idx % 8)) & 1 == 1
    }

    /// Copy of bits `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<BitBuf> {
        check_range(self, start, end)?;
        let mut out = BitBuf::with_capacity(end - start);
        for i in start..end {
            out.push(self.bit(i));
        }
        Ok(out)
    }

    /// Render as a string of `'0'`/`'1'` characters.
    pub fn to_binary_string(&self) -> String {
        (0..self.len)
            .map(|i| if self.bit(i) { '1' } else { '0' })
            .collect()
    }

    /// Render as uppercase hex. A trailing partial nibble is zero-padded on the right.
    pub fn to_hex(&self) -> String {
        const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";
        let nibbles = self.len.div_ceil(4);
        let mut s = String::with_capacity(nibbles);
        for n in 0..nibbles {
            let byte = self.bytes[n / 2];
            let nibble = if n % 2 == 0 { byte >> 4 } else { byte & 0x0F };
            s.push(HEX_CHARS[nibble as usize] as char);
        }
        s
    }
}

fn check_range(bits: &BitBuf, start: usize, end: usize) -> Result<()> {
    if start > end || end > bits.len() {
        return Err(AisError::SegmentOutOfRange {
            start,
            end,
            len: bits.len(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Field extraction
// ---------------------------------------------------------------------------

/// Read bits `[start, end)` as an unsigned integer. Width must not exceed 64.
pub fn extract_unsigned(bits: &BitBuf, start: usize, end: usize) -> Result<u64> {
    check_range(bits, start, end)?;
    debug_assert!(end - start <= 64);
    let mut value = 0u64;
    for i in start..end {
        value = (value << 1) | bits.bit(i) as u64;
    }
    Ok(value)
}

/// Read bits `[start, end)` as a two's-complement signed integer.
///
/// If the top bit is set the result is `value - 2^width`.
pub fn extract_signed(bits: &BitBuf, start: usize, end: usize) -> Result<i64> {
    let value = extract_unsigned(bits, start, end)?;
    let width = end - start;
    if width == 0 || width >= 64 {
        return Ok(value as i64);
    }
    if (value >> (width - 1)) & 1 == 1 {
        Ok(value as i64 - (1i64 << width))
    } else {
        Ok(value as i64)
    }
}

/// Read bits `[start, end)` as packed 6-bit text, cut at the first `@` and
/// with trailing whitespace removed.
pub fn extract_text(bits: &BitBuf, start: usize, end: usize) -> Result<String> {
    let segment = bits.slice(start, end)?;
    Ok(trim_text(&armor::bits_to_ascii_text(&segment)))
}

/// Trim AIS text padding: everything from the first `@`, then trailing spaces.
pub fn trim_text(text: &str) -> String {
    let cut = text.split('@').next().unwrap_or("");
    cut.trim_end().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> BitBuf {
        BitBuf::from_binary_str(s).unwrap()
    }

    #[test]
    fn test_from_binary_str() {
        let b = bits("1011");
        assert_eq!(b.len(), 4);
        assert_eq!(b.get(0), Some(true));
        assert_eq!(b.get(1), Some(false));
        assert_eq!(b.get(4), None);
        assert!(BitBuf::from_binary_str("10x1").is_none());
    }

    #[test]
    fn test_extract_signed_twos_complement() {
        assert_eq!(extract_signed(&bits("10000000"), 0, 8).unwrap(), -128);
        assert_eq!(extract_signed(&bits("01111111"), 0, 8).unwrap(), 127);
        assert_eq!(extract_signed(&bits("11111111"), 0, 8).unwrap(), -1);
        assert_eq!(extract_signed(&bits("00000000"), 0, 8).unwrap(), 0);
    }

    #[test]
    fn test_extract_unsigned_at_offset() {
        // 6-bit type 1 followed by repeat indicator 0b10
        let b = bits("00000110");
        assert_eq!(extract_unsigned(&b, 0, 6).unwrap(), 1);
        assert_eq!(extract_unsigned(&b, 6, 8).unwrap(), 2);
    }

    #[test]
    fn test_extract_out_of_range() {
        let b = bits("000001");
        let err = extract_unsigned(&b, 0, 7).unwrap_err();
        assert!(matches!(
            err,
            AisError::SegmentOutOfRange {
                start: 0,
                end: 7,
                len: 6
            }
        ));
        assert!(extract_signed(&b, 4, 3).is_err());
    }

    #[test]
    fn test_push_bits_and_truncate() {
        let mut b = BitBuf::new();
        b.push_bits(0b101, 3);
        b.push_bits(0x3F, 6);
        assert_eq!(b.to_binary_string(), "101111111");

        b.truncate(4);
        assert_eq!(b.to_binary_string(), "1011");

        // Truncated bits must not leak back in when pushing again
        b.push_bits(0, 4);
        assert_eq!(b.to_binary_string(), "10110000");
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(bits("11110000").to_hex(), "F0");
        assert_eq!(bits("101").to_hex(), "A");
        assert_eq!(BitBuf::new().to_hex(), "");
    }

    #[test]
    fn test_slice() {
        let b = bits("0011010");
        assert_eq!(b.slice(2, 5).unwrap().to_binary_string(), "110");
        assert!(b.slice(5, 8).is_err());
    }

    #[test]
    fn test_trim_text() {
        assert_eq!(trim_text("FINNMILL@@@@"), "FINNMILL");
        assert_eq!(trim_text("SCIO   "), "SCIO");
        assert_eq!(trim_text("A@B"), "A");
        assert_eq!(trim_text("@@@@"), "");
    }
}
