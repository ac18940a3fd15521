//! 6-bit armored ASCII payload codec.
//!
//! AIVDM payloads carry 6 bits per character. Valid characters are ASCII
//! 48-87 (`0`..`W`) and 96-119 (`` ` ``..`w`); 88-95 are skipped. Packed text
//! fields inside the payload use a different 6-bit table (`TEXT_CHARSET`).

use crate::bits::BitBuf;
use crate::types::{AisError, Result};

/// Marker for characters outside the armor alphabet.
const INVALID: u8 = 0xFF;

/// AIS packed-text character set, indexed by 6-bit value.
pub const TEXT_CHARSET: &[u8; 64] =
    b"@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_ !\"#$%&'()*+,-./0123456789:;<=>?";

// ---------------------------------------------------------------------------
// Armor lookup table (compile-time)
// ---------------------------------------------------------------------------

const fn build_armor_table() -> [u8; 128] {
    let mut table = [INVALID; 128];
    let mut c = 48;
    while c < 120 {
        if c <= 87 {
            table[c] = (c - 48) as u8;
        } else if c >= 96 {
            table[c] = (c - 56) as u8;
        }
        c += 1;
    }
    table
}

static ARMOR_TABLE: [u8; 128] = build_armor_table();

/// 6-bit value of an armored payload byte, or `None` if outside the alphabet.
pub fn armor_value(byte: u8) -> Option<u8> {
    match ARMOR_TABLE.get(byte as usize) {
        Some(&v) if v != INVALID => Some(v),
        _ => None,
    }
}

/// Armored character for a 6-bit value (only the low 6 bits are used).
pub fn armor_char(value: u8) -> char {
    let v = value & 0x3F;
    if v < 40 {
        (v + 48) as char
    } else {
        (v + 56) as char
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Decode armored payload text into a bitstream.
///
/// `fill_bits` is the number of padding bits at the end of the final
/// character; they are dropped so the result holds only payload data.
pub fn encode_to_bits(armored: &str, fill_bits: u8) -> Result<BitBuf> {
    let mut bits = BitBuf::with_capacity(armored.len() * 6);
    for (position, ch) in armored.chars().enumerate() {
        let value = u8::try_from(ch)
            .ok()
            .and_then(armor_value)
            .ok_or(AisError::InvalidArmorCharacter { ch, position })?;
        bits.push_bits(value as u64, 6);
    }
    let keep = bits.len().saturating_sub(fill_bits as usize);
    bits.truncate(keep);
    Ok(bits)
}

/// Map 6-bit groups to the AIS text character set.
///
/// Padding characters (`@`, spaces) are kept; trailing bits that do not fill
/// a whole group are ignored.
pub fn bits_to_ascii_text(bits: &BitBuf) -> String {
    let groups = bits.len() / 6;
    let mut s = String::with_capacity(groups);
    for g in 0..groups {
        let mut value = 0usize;
        for i in 0..6 {
            value = (value << 1) | bits.get(g * 6 + i).unwrap_or(false) as usize;
        }
        s.push(TEXT_CHARSET[value] as char);
    }
    s
}

/// Re-armor a bitstream. Returns the armored text and the number of zero fill
/// bits appended to complete the last character.
pub fn bits_to_armor(bits: &BitBuf) -> (String, u8) {
    let fill_bits = ((6 - bits.len() % 6) % 6) as u8;
    let mut padded = bits.clone();
    padded.push_bits(0, fill_bits as usize);

    let mut s = String::with_capacity(padded.len() / 6);
    for g in 0..padded.len() / 6 {
        let mut value = 0u8;
        for i in 0..6 {
            value = (value << 1) | padded.get(g * 6 + i).unwrap_or(false) as u8;
        }
        s.push(armor_char(value));
    }
    (s, fill_bits)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
