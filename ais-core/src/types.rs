//! Shared types, error enum, and decoded message records for ais-core.

use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use thiserror::Error;

/// All errors produced by ais-core.
#[derive(Debug, Error)]
pub enum AisError {
    #[error("malformed sentence: {0}")]
    MalformedSentence(String),
    #[error("invalid armor character {ch:?} at position {position}")]
    InvalidArmorCharacter { ch: char, position: usize },
    #[error("bit segment {start}..{end} out of range for {len}-bit payload")]
    SegmentOutOfRange { start: usize, end: usize, len: usize },
    #[error("non-sequential fragment: expected {expected}, got {received}")]
    NonSequentialFragment {
        expected: FragmentKey,
        received: FragmentKey,
    },
    #[error("duplicate fragment {index} for {key}")]
    DuplicateFragment { key: FragmentKey, index: u8 },
    #[error("incomplete message {key}: {received} of {expected} fragments received")]
    IncompleteMessage {
        key: FragmentKey,
        received: usize,
        expected: u8,
    },
    #[error("unsupported message type {0}")]
    UnsupportedMessageType(u8),
    #[error("failed to decode type {msg_type} message: {source}")]
    DecodeFailure {
        msg_type: u8,
        #[source]
        source: Box<AisError>,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AisError>;

// ---------------------------------------------------------------------------
// Fragment identity
// ---------------------------------------------------------------------------

/// Identifies which logical message a fragment belongs to.
///
/// Two fragments belong together only if both the sequence id and the declared
/// fragment count match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FragmentKey {
    pub sequence_id: Option<u8>,
    pub fragment_count: u8,
}

impl fmt::Display for FragmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sequence_id {
            Some(id) => write!(f, "sequence {id} ({} fragments)", self.fragment_count),
            None => write!(f, "unsequenced ({} fragments)", self.fragment_count),
        }
    }
}

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// Display token for a field whose value is not available.
pub const NOT_AVAILABLE: &str = "Not available";

/// Raw-record marker for a field whose value is not available.
pub const NOT_AVAILABLE_RAW: &str = "N/A";

/// A decoded, unit-converted field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
    /// The transmitter sent the field's "not available" sentinel, or the field
    /// is an optional one absent from this variant of the message.
    NotAvailable,
}

impl FieldValue {
    pub fn is_available(&self) -> bool {
        !matches!(self, FieldValue::NotAvailable)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::NotAvailable => f.write_str(NOT_AVAILABLE_RAW),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldValue::Int(v) => serializer.serialize_i64(*v),
            FieldValue::Float(v) => serializer.serialize_f64(*v),
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::NotAvailable => serializer.serialize_str(NOT_AVAILABLE_RAW),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Ordered field name → value record. Keeps schema order; serializes as a map.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    entries: Vec<(&'static str, T)>,
}

impl<T> Record<T> {
    pub fn new() -> Self {
        Record {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(n: usize) -> Self {
        Record {
            entries: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, name: &'static str, value: T) {
        self.entries.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &T)> {
        self.entries.iter().map(|(n, v)| (*n, v))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(n, _)| *n)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Record<T> {
    fn default() -> Self {
        Record::new()
    }
}

impl<T: Serialize> Serialize for Record<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Decoded message
// ---------------------------------------------------------------------------

/// One fully decoded AIS message: raw values plus their display strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedMessage {
    #[serde(rename = "type_code")]
    pub msg_type: u8,
    pub type_name: &'static str,
    #[serde(rename = "raw_fields")]
    pub raw: Record<FieldValue>,
    #[serde(rename = "display_fields")]
    pub display: Record<String>,
}

impl DecodedMessage {
    /// Source MMSI, present in every supported message type.
    pub fn mmsi(&self) -> Option<u32> {
        self.raw
            .get("MMSI")
            .and_then(FieldValue::as_i64)
            .map(|v| v as u32)
    }

    /// Raw value of a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.raw.get(name)
    }

    /// Display string of a field by name.
    pub fn display_field(&self, name: &str) -> Option<&str> {
        self.display.get(name).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
