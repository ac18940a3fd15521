//! Field schemas and the sentinel/unit rules applied to each extracted value.
//!
//! A `FieldSpec` names a bit range and a `Kind`. The kind decides how the bits
//! are read (unsigned, signed, packed text, raw bits) and how the value is
//! scaled, checked against its "not available" sentinel, and rendered.

use crate::bits::{extract_signed, extract_text, extract_unsigned, BitBuf};
use crate::tables::Table;
use crate::types::{AisError, FieldValue, Result, NOT_AVAILABLE};

// ---------------------------------------------------------------------------
// Schema types
// ---------------------------------------------------------------------------

/// A bit offset within the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pos {
    At(usize),
    /// End of the bitstream.
    End,
    /// A fixed number of bits before the end of the bitstream.
    BeforeEnd(usize),
}

impl Pos {
    fn resolve(self, len: usize) -> Option<usize> {
        match self {
            Pos::At(n) => Some(n),
            Pos::End => Some(len),
            Pos::BeforeEnd(n) => len.checked_sub(n),
        }
    }
}

/// Position resolution for longitude/latitude fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// 1/10000 minute (28/27-bit fields).
    TenThousandthMinute,
    /// 1/10 minute (type 27, 18/17-bit fields).
    TenthMinute,
}

impl Resolution {
    fn divisor(self) -> f64 {
        match self {
            Resolution::TenThousandthMinute => 600_000.0,
            Resolution::TenthMinute => 600.0,
        }
    }
}

/// How a field is read and interpreted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kind {
    Uint,
    Int,
    /// Unsigned value with a unit suffix and an optional "not available" code.
    Measure {
        unit: &'static str,
        na: Option<u64>,
    },
    /// Single-bit flag with labels for 0 and 1.
    Flag(&'static str, &'static str),
    Lookup {
        table: Table,
        na: Option<u64>,
    },
    Text,
    Bits,
    Lon(Resolution),
    Lat(Resolution),
    /// Vessel speed over ground in 1/10 knot.
    Speed,
    /// SAR aircraft speed in whole knots.
    SarSpeed,
    /// Type 27 speed in whole knots.
    LongRangeSpeed,
    /// Course over ground in 1/10 degree.
    Course,
    /// Type 27 course in whole degrees.
    LongRangeCourse,
    Heading,
    RateOfTurn,
    /// UTC second of the position fix, with status codes 60..63.
    Second,
    Altitude,
    Draught,
}

/// Raw bit encoding of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Unsigned,
    Signed,
    Text,
    Bits,
}

impl Kind {
    pub fn encoding(&self) -> Encoding {
        match self {
            Kind::Int | Kind::Lon(_) | Kind::Lat(_) | Kind::RateOfTurn => Encoding::Signed,
            Kind::Text => Encoding::Text,
            Kind::Bits => Encoding::Bits,
            _ => Encoding::Unsigned,
        }
    }
}

/// One named field of a message schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub start: Pos,
    pub end: Pos,
    pub kind: Kind,
    /// Present only in longer variants of the message.
    pub optional: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, start: usize, end: usize, kind: Kind) -> Self {
        FieldSpec {
            name,
            start: Pos::At(start),
            end: Pos::At(end),
            kind,
            optional: false,
        }
    }

    pub const fn span(name: &'static str, start: Pos, end: Pos, kind: Kind) -> Self {
        FieldSpec {
            name,
            start,
            end,
            kind,
            optional: false,
        }
    }

    /// Field running from `start` to the end of the bitstream.
    pub const fn rest(name: &'static str, start: usize, kind: Kind) -> Self {
        FieldSpec::span(name, Pos::At(start), Pos::End, kind)
    }

    pub const fn optional(self) -> Self {
        FieldSpec {
            optional: true,
            ..self
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// The shared "not available" outcome: explicit marker plus display token.
pub fn not_available() -> (FieldValue, String) {
    (FieldValue::NotAvailable, NOT_AVAILABLE.to_string())
}

/// Extract one field and apply its sentinel and unit rules.
///
/// Returns the raw value and its display string. An optional field that lies
/// past the end of the bitstream is not available; a mandatory one fails with
/// `SegmentOutOfRange`.
pub fn evaluate(bits: &BitBuf, spec: &FieldSpec) -> Result<(FieldValue, String)> {
    let len = bits.len();
    let range = spec
        .start
        .resolve(len)
        .zip(spec.end.resolve(len))
        .filter(|&(start, end)| start <= end && end <= len);

    let Some((start, end)) = range else {
        if spec.optional {
            return Ok(not_available());
        }
        let start = spec.start.resolve(len).unwrap_or(0);
        let end = spec.end.resolve(len).unwrap_or(0);
        return Err(AisError::SegmentOutOfRange { start, end, len });
    };

    match spec.kind.encoding() {
        Encoding::Text => {
            let text = extract_text(bits, start, end)?;
            Ok((FieldValue::Text(text.clone()), text))
        }
        Encoding::Bits => {
            let segment = bits.slice(start, end)?;
            let display = if segment.is_empty() {
                "0 bits".to_string()
            } else {
                format!("{} ({} bits)", segment.to_hex(), segment.len())
            };
            Ok((FieldValue::Text(segment.to_binary_string()), display))
        }
        Encoding::Signed => {
            let raw = extract_signed(bits, start, end)?;
            Ok(interpret_signed(spec.kind, raw))
        }
        Encoding::Unsigned => {
            let raw = extract_unsigned(bits, start, end)?;
            Ok(interpret_unsigned(spec.kind, raw))
        }
    }
}

fn interpret_signed(kind: Kind, raw: i64) -> (FieldValue, String) {
    match kind {
        Kind::Lon(res) => coordinate(raw, res, 181),
        Kind::Lat(res) => coordinate(raw, res, 91),
        Kind::RateOfTurn => rate_of_turn(raw),
        _ => (FieldValue::Int(raw), raw.to_string()),
    }
}

fn interpret_unsigned(kind: Kind, raw: u64) -> (FieldValue, String) {
    let int = FieldValue::Int(raw as i64);
    match kind {
        Kind::Measure { na: Some(na), .. } | Kind::Lookup { na: Some(na), .. } if raw == na => {
            not_available()
        }
        Kind::Measure { unit, .. } => {
            let display = if unit.is_empty() {
                raw.to_string()
            } else {
                format!("{raw} {unit}")
            };
            (int, display)
        }
        Kind::Flag(zero, one) => (int, if raw == 0 { zero } else { one }.to_string()),
        Kind::Lookup { table, .. } => (int, table.label(raw).to_string()),
        Kind::Speed => match raw {
            1023 => not_available(),
            1022 => (int, "Exceeds 102.2 knots".to_string()),
            _ => {
                let knots = raw as f64 / 10.0;
                (FieldValue::Float(knots), format!("{knots:.1} knots"))
            }
        },
        Kind::SarSpeed => match raw {
            1023 => not_available(),
            1022 => (int, "1022 knots or higher".to_string()),
            _ => (int, format!("{raw} knots")),
        },
        Kind::LongRangeSpeed => match raw {
            63 => not_available(),
            _ => (int, format!("{raw} knots")),
        },
        Kind::Course => match raw {
            3600 => not_available(),
            _ => {
                let degrees = raw as f64 / 10.0;
                (FieldValue::Float(degrees), format!("{degrees:.1}°"))
            }
        },
        Kind::LongRangeCourse | Kind::Heading => match raw {
            511 => not_available(),
            _ => (int, format!("{raw}°")),
        },
        Kind::Second => match raw {
            60 => not_available(),
            61 => (int, "Positioning system in manual input mode".to_string()),
            62 => (int, "Positioning system in dead reckoning mode".to_string()),
            63 => (int, "Positioning system inoperative".to_string()),
            _ => (int, format!("{raw} s")),
        },
        Kind::Altitude => match raw {
            4095 => not_available(),
            4094 => (int, "4094 m or higher".to_string()),
            _ => (int, format!("{raw} m")),
        },
        Kind::Draught => {
            let metres = raw as f64 / 10.0;
            (FieldValue::Float(metres), format!("{metres:.1} m"))
        }
        _ => (int, raw.to_string()),
    }
}

/// Longitude/latitude in degrees. All-ones and the 181°/91° code are not available.
fn coordinate(raw: i64, res: Resolution, na_degrees: i64) -> (FieldValue, String) {
    let divisor = res.divisor();
    // all-ones reads back as -1 in two's complement
    if raw == -1 || raw == na_degrees * divisor as i64 {
        return not_available();
    }
    let degrees = raw as f64 / divisor;
    (FieldValue::Float(degrees), format!("{degrees:.6}°"))
}

/// Rate of turn from the ROT_AIS indicator: `sign * (raw / 4.733)^2` degrees/min.
fn rate_of_turn(raw: i64) -> (FieldValue, String) {
    match raw {
        -128 => not_available(),
        0 => (FieldValue::Float(0.0), "Not turning".to_string()),
        127 => (
            FieldValue::Int(raw),
            "Turning right at more than 5° per 30 s".to_string(),
        ),
        -127 => (
            FieldValue::Int(raw),
            "Turning left at more than 5° per 30 s".to_string(),
        ),
        _ => {
            let rate = (raw as f64 / 4.733).powi(2).copysign(raw as f64);
            let direction = if raw > 0 { "right" } else { "left" };
            (
                FieldValue::Float(rate),
                format!("{:.1}°/min {direction}", rate.abs()),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(value: u64, width: usize) -> BitBuf {
        let mut b = BitBuf::new();
        b.push_bits(value, width);
        b
    }

    fn eval(value: u64, width: usize, kind: Kind) -> (FieldValue, String) {
        let spec = FieldSpec::new("F", 0, width, kind);
        evaluate(&stream(value, width), &spec).unwrap()
    }

    #[test]
    fn test_speed_sentinels() {
        let (v, d) = eval(1023, 10, Kind::Speed);
        assert_eq!(v, FieldValue::NotAvailable);
        assert_eq!(d, NOT_AVAILABLE);

        let (v, d) = eval(1022, 10, Kind::Speed);
        assert_eq!(v, FieldValue::Int(1022));
        assert!(d.contains("102.2"));

        let (v, d) = eval(147, 10, Kind::Speed);
        assert_eq!(v, FieldValue::Float(14.7));
        assert_eq!(d, "14.7 knots");
    }

    #[test]
    fn test_zero_speed_is_available() {
        let (v, d) = eval(0, 10, Kind::Speed);
        assert_eq!(v, FieldValue::Float(0.0));
        assert_eq!(d, "0.0 knots");
    }

    #[test]
    fn test_longitude_all_ones_not_available() {
        let (v, _) = eval((1 << 28) - 1, 28, Kind::Lon(Resolution::TenThousandthMinute));
        assert_eq!(v, FieldValue::NotAvailable);
    }

    #[test]
    fn test_longitude_181_not_available() {
        let (v, _) = eval(181 * 600_000, 28, Kind::Lon(Resolution::TenThousandthMinute));
        assert_eq!(v, FieldValue::NotAvailable);
        let (v, _) = eval(91 * 600_000, 27, Kind::Lat(Resolution::TenThousandthMinute));
        assert_eq!(v, FieldValue::NotAvailable);
        let (v, _) = eval(181 * 600, 18, Kind::Lon(Resolution::TenthMinute));
        assert_eq!(v, FieldValue::NotAvailable);
    }

    #[test]
    fn test_negative_longitude() {
        // -8.1646633° in 1/10000 minute, 28-bit two's complement
        let raw: i64 = -4898798;
        let bits = (raw & ((1 << 28) - 1)) as u64;
        let (v, d) = eval(bits, 28, Kind::Lon(Resolution::TenThousandthMinute));
        let deg = v.as_f64().unwrap();
        assert!((deg - (-8.1646633)).abs() < 1e-6);
        assert!(d.starts_with("-8.16466"));
    }

    #[test]
    fn test_course_and_heading() {
        assert_eq!(eval(3600, 12, Kind::Course).0, FieldValue::NotAvailable);
        assert_eq!(eval(908, 12, Kind::Course).1, "90.8°");
        assert_eq!(eval(511, 9, Kind::Heading).0, FieldValue::NotAvailable);
        assert_eq!(eval(92, 9, Kind::Heading).1, "92°");
    }

    #[test]
    fn test_rate_of_turn() {
        assert_eq!(eval(0x80, 8, Kind::RateOfTurn).0, FieldValue::NotAvailable);
        assert_eq!(eval(0, 8, Kind::RateOfTurn).1, "Not turning");

        let (v, d) = eval(127, 8, Kind::RateOfTurn);
        assert_eq!(v, FieldValue::Int(127));
        assert!(d.contains("right"));
        let (v, d) = eval(0x81, 8, Kind::RateOfTurn);
        assert_eq!(v, FieldValue::Int(-127));
        assert!(d.contains("left"));

        let (v, _) = eval(4, 8, Kind::RateOfTurn);
        assert!((v.as_f64().unwrap() - 0.714).abs() < 1e-3);
        // -4 → same magnitude, negative
        let (v, _) = eval(0xFC, 8, Kind::RateOfTurn);
        assert!((v.as_f64().unwrap() + 0.714).abs() < 1e-3);
    }

    #[test]
    fn test_second_status_codes() {
        assert_eq!(eval(60, 6, Kind::Second).0, FieldValue::NotAvailable);
        assert_eq!(eval(61, 6, Kind::Second).0, FieldValue::Int(61));
        assert!(eval(62, 6, Kind::Second).1.contains("dead reckoning"));
        assert!(eval(63, 6, Kind::Second).1.contains("inoperative"));
        assert_eq!(eval(24, 6, Kind::Second).1, "24 s");
    }

    #[test]
    fn test_sar_fields() {
        assert_eq!(eval(4095, 12, Kind::Altitude).0, FieldValue::NotAvailable);
        assert_eq!(eval(4094, 12, Kind::Altitude).1, "4094 m or higher");
        assert_eq!(eval(1023, 10, Kind::SarSpeed).0, FieldValue::NotAvailable);
        assert_eq!(eval(42, 10, Kind::SarSpeed).1, "42 knots");
    }

    #[test]
    fn test_lookup_and_flag() {
        let kind = Kind::Lookup {
            table: Table::NavigationStatus,
            na: None,
        };
        let (v, d) = eval(5, 4, kind);
        assert_eq!(v, FieldValue::Int(5));
        assert_eq!(d, "Moored");

        let (v, d) = eval(1, 1, Kind::Flag("Not in use", "In use"));
        assert_eq!(v, FieldValue::Int(1));
        assert_eq!(d, "In use");
    }

    #[test]
    fn test_measure_sentinel() {
        let kind = Kind::Measure { unit: "", na: Some(0) };
        assert_eq!(eval(0, 30, kind).0, FieldValue::NotAvailable);
        assert_eq!(eval(9212656, 30, kind).1, "9212656");

        let metres = Kind::Measure { unit: "m", na: None };
        assert_eq!(eval(15, 9, metres).1, "15 m");
    }

    #[test]
    fn test_bits_field_hex_display() {
        let spec = FieldSpec::rest("Data", 0, Kind::Bits);
        let (v, d) = evaluate(&stream(0xAB, 8), &spec).unwrap();
        assert_eq!(v, FieldValue::Text("10101011".into()));
        assert_eq!(d, "AB (8 bits)");
    }

    #[test]
    fn test_optional_field_past_end() {
        let bits = stream(0, 8);
        let spec = FieldSpec::new("Spare", 8, 16, Kind::Uint).optional();
        assert_eq!(evaluate(&bits, &spec).unwrap().0, FieldValue::NotAvailable);

        let spec = FieldSpec::new("Spare", 8, 16, Kind::Uint);
        assert!(matches!(
            evaluate(&bits, &spec),
            Err(AisError::SegmentOutOfRange { start: 8, end: 16, len: 8 })
        ));
    }

    #[test]
    fn test_before_end_positions() {
        let bits = stream(0b1010_1111, 8);
        let data = FieldSpec::span("Data", Pos::At(0), Pos::BeforeEnd(4), Kind::Uint);
        let tail = FieldSpec::span("Tail", Pos::BeforeEnd(4), Pos::End, Kind::Uint);
        assert_eq!(evaluate(&bits, &data).unwrap().0, FieldValue::Int(0b1010));
        assert_eq!(evaluate(&bits, &tail).unwrap().0, FieldValue::Int(0b1111));
    }
}
