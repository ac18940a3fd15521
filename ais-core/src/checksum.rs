//! NMEA 0183 sentence checksum.
//!
//! XOR of every byte between the leading `!`/`$` and the `*`, written as two
//! hex digits after the `*`. The decode pipeline never calls this; callers
//! that want to drop corrupted lines opt in.

use crate::types::{AisError, Result};

/// XOR checksum of a sentence body (the bytes between `!`/`$` and `*`).
pub fn compute(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

/// Body and transmitted checksum of a sentence line. A leading tag block is skipped.
fn split(line: &str) -> Result<(&str, &str)> {
    let line = line.trim();
    let sentence = match line.strip_prefix('\\') {
        Some(rest) => rest.split_once('\\').map(|(_, s)| s).unwrap_or(rest),
        None => line,
    };
    let sentence = sentence
        .strip_prefix('!')
        .or_else(|| sentence.strip_prefix('$'))
        .ok_or_else(|| AisError::MalformedSentence(format!("missing start delimiter: {line:?}")))?;
    sentence
        .rsplit_once('*')
        .ok_or_else(|| AisError::MalformedSentence(format!("missing checksum: {line:?}")))
}

/// True when the line's transmitted checksum matches its contents.
pub fn verify(line: &str) -> Result<bool> {
    let (body, hex) = split(line)?;
    let expected = u8::from_str_radix(hex, 16)
        .map_err(|_| AisError::MalformedSentence(format!("bad checksum digits: {line:?}")))?;
    Ok(compute(body) == expected)
}

/// Format a checksum as the two uppercase hex digits NMEA uses.
pub fn to_hex(checksum: u8) -> String {
    format!("{checksum:02X}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_known_sentences() {
        assert_eq!(compute("AIVDM,1,1,,A,13QWhR012COJ`0TDSdkCS2ph0@=j,0"), 0x6C);
        assert_eq!(compute("AIVDM,2,2,5,A,C`888888880,2"), 0x02);
        assert_eq!(compute(""), 0);
    }

    #[test]
    fn test_verify() {
        assert!(verify("!AIVDM,1,1,,A,13QWhR012COJ`0TDSdkCS2ph0@=j,0*6C").unwrap());
        assert!(verify("!AIVDM,1,1,,B,B52K>;h00Fc>jpUlNV@ikwpUoP06,0*4F\r\n").unwrap());
        // Corrupted payload character
        assert!(!verify("!AIVDM,1,1,,A,13QWhR012COJ`0TDSdkCS2ph0@=k,0*6C").unwrap());
    }

    #[test]
    fn test_verify_with_tag_block() {
        assert!(verify("\\c:1693000000*0B\\!AIVDM,2,2,5,A,C`888888880,2*02").unwrap());
    }

    #[test]
    fn test_verify_malformed() {
        assert!(verify("!AIVDM,1,1,,A,13QW,0").is_err());
        assert!(verify("AIVDM,1,1,,A,13QW,0*00").is_err());
        assert!(verify("!AIVDM,1,1,,A,13QW,0*ZZ").is_err());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(0x6C), "6C");
        assert_eq!(to_hex(2), "02");
    }
}
