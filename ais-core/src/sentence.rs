//! Parse one NMEA 0183 line into a structured AIVDM/AIVDO sentence.
//!
//! Responsibilities:
//! - Strip an optional leading tag block (`\c:1700000000*5A\!AIVDM,...`)
//! - Split the seven comma fields and validate fragment numbering
//! - Carry the checksum through without verifying it

use crate::types::{AisError, FragmentKey, Result};

/// Largest fragment count a single AIS message may span.
pub const MAX_FRAGMENTS: u8 = 9;

/// One parsed AIVDM/AIVDO sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    /// The input line, trimmed, tag block included
    pub raw: String,
    /// Sentence tag without the leading `!`/`$`, e.g. "AIVDM"
    pub tag: String,
    pub fragment_count: u8,
    /// 1-based fragment index
    pub fragment_number: u8,
    pub sequence_id: Option<u8>,
    /// Radio channel ("A", "B", "1", "2"), may be empty
    pub channel: String,
    /// Armored payload characters, not yet validated
    pub payload: String,
    pub fill_bits: u8,
    /// Transmitted checksum, if any hex digits follow the `*`
    pub checksum: Option<u8>,
    /// Receiver timestamp from a tag block `c:` parameter
    pub received_at: Option<i64>,
}

impl Sentence {
    pub fn key(&self) -> FragmentKey {
        FragmentKey {
            sequence_id: self.sequence_id,
            fragment_count: self.fragment_count,
        }
    }

    pub fn is_single(&self) -> bool {
        self.fragment_count == 1
    }

    /// True for own-ship (`VDO`) sentences.
    pub fn is_own_vessel(&self) -> bool {
        self.tag.ends_with("VDO")
    }
}

fn malformed(line: &str, reason: &str) -> AisError {
    AisError::MalformedSentence(format!("{reason}: {line:?}"))
}

/// Split a leading `\...\` tag block from the sentence.
fn split_tag_block(line: &str) -> Result<(Option<&str>, &str)> {
    let Some(rest) = line.strip_prefix('\\') else {
        return Ok((None, line));
    };
    let end = rest
        .find('\\')
        .ok_or_else(|| malformed(line, "unterminated tag block"))?;
    Ok((Some(&rest[..end]), &rest[end + 1..]))
}

/// Extract the `c:` (UNIX time) parameter from a tag block body.
fn tag_block_time(block: &str) -> Option<i64> {
    let params = block.split('*').next()?;
    params
        .split(',')
        .find_map(|p| p.strip_prefix("c:"))
        .and_then(|v| v.parse().ok())
}

fn parse_fragment_number(line: &str, field: &str, what: &str) -> Result<u8> {
    match field.parse::<u8>() {
        Ok(n) if (1..=MAX_FRAGMENTS).contains(&n) => Ok(n),
        _ => Err(malformed(line, what)),
    }
}

/// Parse a single sentence line.
pub fn parse_sentence(line: &str) -> Result<Sentence> {
    let line = line.trim();
    let (tag_block, body) = split_tag_block(line)?;

    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() != 7 {
        return Err(malformed(
            line,
            &format!("expected 7 fields, found {}", fields.len()),
        ));
    }

    let tag = fields[0]
        .strip_prefix('!')
        .or_else(|| fields[0].strip_prefix('$'))
        .ok_or_else(|| malformed(line, "missing '!' or '$' start"))?;
    if !(tag.ends_with("VDM") || tag.ends_with("VDO")) {
        return Err(malformed(line, "not a VDM/VDO sentence"));
    }

    let fragment_count = parse_fragment_number(line, fields[1], "bad fragment count")?;
    let fragment_number = parse_fragment_number(line, fields[2], "bad fragment number")?;
    if fragment_number > fragment_count {
        return Err(malformed(line, "fragment number exceeds fragment count"));
    }

    let sequence_id = match fields[3] {
        "" => None,
        s => Some(
            s.parse::<u8>()
                .map_err(|_| malformed(line, "bad sequence id"))?,
        ),
    };

    let (fill, checksum) = fields[6]
        .split_once('*')
        .ok_or_else(|| malformed(line, "missing '*' checksum separator"))?;
    let fill_bits = match fill.parse::<u8>() {
        Ok(n) if n <= 5 => n,
        _ => return Err(malformed(line, "bad fill bits")),
    };
    let checksum = match checksum {
        "" => None,
        hex => Some(
            u8::from_str_radix(hex, 16).map_err(|_| malformed(line, "bad checksum digits"))?,
        ),
    };

    Ok(Sentence {
        raw: line.to_string(),
        tag: tag.to_string(),
        fragment_count,
        fragment_number,
        sequence_id,
        channel: fields[4].to_string(),
        payload: fields[5].to_string(),
        fill_bits,
        checksum,
        received_at: tag_block.and_then(tag_block_time),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
