//! Decode a reassembled AIS bitstream into raw and display records.
//!
//! One engine walks the registry schema for the message type:
//! - bits [0,6) select the schema
//! - each field is extracted and passed through its sentinel/unit rule
//! - a branch (type 24 part number, type 25/26 addressed flag) picks the tail
//!
//! A mandatory field that cannot be extracted fails the whole message; partial
//! records are never returned.

use tracing::debug;

use crate::armor;
use crate::bits::{extract_unsigned, BitBuf};
use crate::fields::{evaluate, FieldSpec};
use crate::registry::{message_type_name, schema_for};
use crate::types::*;

/// Decode a complete bitstream.
///
/// A bitstream too short to hold a type code fails as `DecodeFailure` with
/// `msg_type` 0.
pub fn decode(bits: &BitBuf) -> Result<DecodedMessage> {
    let msg_type = extract_unsigned(bits, 0, 6).map_err(|e| failure(0, e))? as u8;
    let schema = schema_for(msg_type)?;
    let wrap = |source: AisError| failure(msg_type, source);

    let mut raw = Record::with_capacity(schema.fields.len());
    let mut display = Record::with_capacity(schema.fields.len());
    apply_fields(bits, schema.fields, &mut raw, &mut display).map_err(wrap)?;

    if let Some(branch) = &schema.branch {
        let discriminator = extract_unsigned(bits, branch.start, branch.end).map_err(wrap)?;
        apply_fields(bits, branch.select(discriminator), &mut raw, &mut display).map_err(wrap)?;
    }

    Ok(DecodedMessage {
        msg_type,
        type_name: message_type_name(msg_type),
        raw,
        display,
    })
}

fn failure(msg_type: u8, source: AisError) -> AisError {
    debug!(msg_type, error = %source, "decode failed");
    AisError::DecodeFailure {
        msg_type,
        source: Box::new(source),
    }
}

/// Decode an armored payload (already reassembled) with its trailing fill bits.
pub fn decode_payload(armored: &str, fill_bits: u8) -> Result<DecodedMessage> {
    let bits = armor::encode_to_bits(armored, fill_bits)?;
    decode(&bits)
}

fn apply_fields(
    bits: &BitBuf,
    fields: &[FieldSpec],
    raw: &mut Record<FieldValue>,
    display: &mut Record<String>,
) -> Result<()> {
    for spec in fields {
        let (value, shown) = evaluate(bits, spec)?;
        raw.push(spec.name, value);
        display.push(spec.name, shown);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
