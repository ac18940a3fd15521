//! Message type registry: type code → name and declarative field schema.
//!
//! Every layout below is data for the single engine in `decode.rs`. Offsets
//! are bit positions in the reassembled payload, `[start, end)`.

use crate::fields::{FieldSpec as F, Kind, Pos, Resolution};
use crate::tables::Table;
use crate::types::{AisError, Result};

/// Field list for one message type, with an optional discriminated tail.
#[derive(Debug)]
pub struct Schema {
    pub fields: &'static [F],
    pub branch: Option<Branch>,
}

/// Selects the remaining fields from the value of a discriminator range.
#[derive(Debug)]
pub struct Branch {
    pub start: usize,
    pub end: usize,
    pub arms: &'static [(u64, &'static [F])],
    pub otherwise: &'static [F],
}

impl Branch {
    pub fn select(&self, discriminator: u64) -> &'static [F] {
        self.arms
            .iter()
            .find(|(value, _)| *value == discriminator)
            .map(|(_, fields)| *fields)
            .unwrap_or(self.otherwise)
    }
}

pub struct MsgTypeInfo {
    pub name: &'static str,
    /// `None` for types this decoder does not handle.
    pub schema: Option<&'static Schema>,
}

// ---------------------------------------------------------------------------
// Shared field kinds
// ---------------------------------------------------------------------------

const UINT: Kind = Kind::Uint;
const TEXT: Kind = Kind::Text;
const BITS: Kind = Kind::Bits;
const METRES: Kind = Kind::Measure {
    unit: "m",
    na: None,
};
const NAV_STATUS: Kind = Kind::Lookup {
    table: Table::NavigationStatus,
    na: None,
};
const SHIP_TYPE: Kind = Kind::Lookup {
    table: Table::ShipType,
    na: None,
};
const EPFD: Kind = Kind::Lookup {
    table: Table::Epfd,
    na: None,
};
const LON: Kind = Kind::Lon(Resolution::TenThousandthMinute);
const LAT: Kind = Kind::Lat(Resolution::TenThousandthMinute);

const ACCURACY: Kind = Kind::Flag("Low (> 10 m)", "High (<= 10 m)");
const RAIM: Kind = Kind::Flag("Not in use", "In use");
const ASSIGNED: Kind = Kind::Flag("Autonomous mode", "Assigned mode");
const DTE: Kind = Kind::Flag("Data terminal ready", "Data terminal not ready");
const RETRANSMIT: Kind = Kind::Flag("Initial transmission", "Retransmitted");

const fn sentinel(na: u64) -> Kind {
    Kind::Measure { unit: "", na: Some(na) }
}

const MONTH: Kind = Kind::Lookup {
    table: Table::Month,
    na: Some(0),
};

// Every message starts with these three fields.
macro_rules! header {
    () => {
        [
            F::new("Message Type", 0, 6, UINT),
            F::new("Repeat Indicator", 6, 8, UINT),
            F::new("MMSI", 8, 38, UINT),
        ]
    };
}

macro_rules! schema {
    ($name:ident, [$($field:expr),* $(,)?]) => {
        schema!($name, [$($field),*], None);
    };
    ($name:ident, [$($field:expr),* $(,)?], $branch:expr) => {
        static $name: Schema = Schema {
            fields: &{
                let [h0, h1, h2] = header!();
                [h0, h1, h2, $($field),*]
            },
            branch: $branch,
        };
    };
}

// ---------------------------------------------------------------------------
// Position reports
// ---------------------------------------------------------------------------

schema!(POSITION_REPORT_CLASS_A, [
    F::new("Navigation Status", 38, 42, NAV_STATUS),
    F::new("Rate of Turn", 42, 50, Kind::RateOfTurn),
    F::new("Speed Over Ground", 50, 60, Kind::Speed),
    F::new("Position Accuracy", 60, 61, ACCURACY),
    F::new("Longitude", 61, 89, LON),
    F::new("Latitude", 89, 116, LAT),
    F::new("Course Over Ground", 116, 128, Kind::Course),
    F::new("True Heading", 128, 137, Kind::Heading),
    F::new("Timestamp", 137, 143, Kind::Second),
    F::new("Maneuver Indicator", 143, 145, Kind::Lookup { table: Table::Maneuver, na: None }),
    F::new("Spare", 145, 148, UINT),
    F::new("RAIM Flag", 148, 149, RAIM),
    F::new("Radio Status", 149, 168, UINT),
]);

schema!(BASE_STATION_REPORT, [
    F::new("Year (UTC)", 38, 52, sentinel(0)),
    F::new("Month (UTC)", 52, 56, MONTH),
    F::new("Day (UTC)", 56, 61, sentinel(0)),
    F::new("Hour (UTC)", 61, 66, sentinel(24)),
    F::new("Minute (UTC)", 66, 72, sentinel(60)),
    F::new("Second (UTC)", 72, 78, sentinel(60)),
    F::new("Position Accuracy", 78, 79, ACCURACY),
    F::new("Longitude", 79, 107, LON),
    F::new("Latitude", 107, 134, LAT),
    F::new("Type of Electronic Position Fixing Device", 134, 138, EPFD),
    F::new("Spare", 138, 148, UINT),
    F::new("RAIM Flag", 148, 149, RAIM),
    F::new("Radio Status", 149, 168, UINT),
]);

schema!(SAR_AIRCRAFT_POSITION, [
    F::new("Altitude", 38, 50, Kind::Altitude),
    F::new("Speed Over Ground", 50, 60, Kind::SarSpeed),
    F::new("Position Accuracy", 60, 61, ACCURACY),
    F::new("Longitude", 61, 89, LON),
    F::new("Latitude", 89, 116, LAT),
    F::new("Course Over Ground", 116, 128, Kind::Course),
    F::new("Timestamp", 128, 134, Kind::Second),
    F::new("Regional Reserved", 134, 142, UINT),
    F::new("DTE", 142, 143, DTE),
    F::new("Spare", 143, 146, UINT),
    F::new("Assigned Mode Flag", 146, 147, ASSIGNED),
    F::new("RAIM Flag", 147, 148, RAIM),
    F::new("Radio Status", 148, 168, UINT),
]);

schema!(POSITION_REPORT_CLASS_B, [
    F::new("Regional Reserved", 38, 46, UINT),
    F::new("Speed Over Ground", 46, 56, Kind::Speed),
    F::new("Position Accuracy", 56, 57, ACCURACY),
    F::new("Longitude", 57, 85, LON),
    F::new("Latitude", 85, 112, LAT),
    F::new("Course Over Ground", 112, 124, Kind::Course),
    F::new("True Heading", 124, 133, Kind::Heading),
    F::new("Timestamp", 133, 139, Kind::Second),
    F::new("Regional Reserved 2", 139, 141, UINT),
    F::new("CS Unit", 141, 142, Kind::Flag("SOTDMA unit", "Carrier sense unit")),
    F::new("Display Flag", 142, 143, Kind::Flag("No display", "Has display")),
    F::new("DSC Flag", 143, 144, Kind::Flag("No DSC", "DSC equipped")),
    F::new("Band Flag", 144, 145, Kind::Flag("Upper 525 kHz band", "Whole marine band")),
    F::new("Message 22 Flag", 145, 146, Kind::Flag("No frequency management", "Frequency management via message 22")),
    F::new("Assigned Mode Flag", 146, 147, ASSIGNED),
    F::new("RAIM Flag", 147, 148, RAIM),
    F::new("Radio Status", 148, 168, UINT),
]);

schema!(EXTENDED_CLASS_B, [
    F::new("Regional Reserved", 38, 46, UINT),
    F::new("Speed Over Ground", 46, 56, Kind::Speed),
    F::new("Position Accuracy", 56, 57, ACCURACY),
    F::new("Longitude", 57, 85, LON),
    F::new("Latitude", 85, 112, LAT),
    F::new("Course Over Ground", 112, 124, Kind::Course),
    F::new("True Heading", 124, 133, Kind::Heading),
    F::new("Timestamp", 133, 139, Kind::Second),
    F::new("Regional Reserved 2", 139, 143, UINT),
    F::new("Name", 143, 263, TEXT),
    F::new("Type of Ship and Cargo", 263, 271, SHIP_TYPE),
    F::new("Dimension to Bow", 271, 280, METRES),
    F::new("Dimension to Stern", 280, 289, METRES),
    F::new("Dimension to Port", 289, 295, METRES),
    F::new("Dimension to Starboard", 295, 301, METRES),
    F::new("Position Fix Type", 301, 305, EPFD),
    F::new("RAIM Flag", 305, 306, RAIM),
    F::new("DTE", 306, 307, DTE),
    F::new("Assigned Mode Flag", 307, 308, ASSIGNED),
    F::new("Spare", 308, 312, UINT).optional(),
]);

schema!(LONG_RANGE_BROADCAST, [
    F::new("Position Accuracy", 38, 39, ACCURACY),
    F::new("RAIM Flag", 39, 40, RAIM),
    F::new("Navigation Status", 40, 44, NAV_STATUS),
    F::new("Longitude", 44, 62, Kind::Lon(Resolution::TenthMinute)),
    F::new("Latitude", 62, 79, Kind::Lat(Resolution::TenthMinute)),
    F::new("Speed Over Ground", 79, 85, Kind::LongRangeSpeed),
    F::new("Course Over Ground", 85, 94, Kind::LongRangeCourse),
    F::new("GNSS Position Status", 94, 95, Kind::Flag("Current GNSS position", "Not GNSS position")),
    F::new("Spare", 95, 96, UINT).optional(),
]);

// ---------------------------------------------------------------------------
// Static data
// ---------------------------------------------------------------------------

schema!(STATIC_AND_VOYAGE_DATA, [
    F::new("AIS Version", 38, 40, Kind::Lookup { table: Table::AisVersion, na: None }),
    F::new("IMO Number", 40, 70, sentinel(0)),
    F::new("Call Sign", 70, 112, TEXT),
    F::new("Vessel Name", 112, 232, TEXT),
    F::new("Type of Ship and Cargo", 232, 240, SHIP_TYPE),
    F::new("Dimension to Bow", 240, 249, METRES),
    F::new("Dimension to Stern", 249, 258, METRES),
    F::new("Dimension to Port", 258, 264, METRES),
    F::new("Dimension to Starboard", 264, 270, METRES),
    F::new("Position Fixing Device", 270, 274, EPFD),
    F::new("ETA Month", 274, 278, MONTH),
    F::new("ETA Day", 278, 283, sentinel(0)),
    F::new("ETA Hour", 283, 288, sentinel(24)),
    F::new("ETA Minute", 288, 294, sentinel(60)),
    F::new("Draught", 294, 302, Kind::Draught),
    F::new("Destination", 302, 422, TEXT),
    F::new("Data Terminal Ready", 422, 423, DTE),
    F::new("Spare", 423, 424, UINT).optional(),
]);

schema!(AID_TO_NAVIGATION, [
    F::new("Aid Type", 38, 43, Kind::Lookup { table: Table::AidType, na: None }),
    F::new("Name", 43, 163, TEXT),
    F::new("Position Accuracy", 163, 164, ACCURACY),
    F::new("Longitude", 164, 192, LON),
    F::new("Latitude", 192, 219, LAT),
    F::new("Dimension to Bow", 219, 228, METRES),
    F::new("Dimension to Stern", 228, 237, METRES),
    F::new("Dimension to Port", 237, 243, METRES),
    F::new("Dimension to Starboard", 243, 249, METRES),
    F::new("Position Fix Type", 249, 253, EPFD),
    F::new("UTC Second", 253, 259, Kind::Second),
    F::new("Off Position Indicator", 259, 260, Kind::Flag("No", "Yes")),
    F::new("Regional Reserved", 260, 268, UINT),
    F::new("RAIM Flag", 268, 269, RAIM),
    F::new("Virtual Aid Flag", 269, 270, Kind::Flag("Real aid", "Virtual aid")),
    F::new("Assigned Mode Flag", 270, 271, ASSIGNED),
    F::new("Spare", 271, 272, UINT),
    F::rest("Name Extension", 272, TEXT),
]);

const STATIC_PART_A: &[F] = &[
    F::new("Vessel Name", 40, 160, TEXT),
    F::new("Spare", 160, 168, UINT).optional(),
];

const STATIC_PART_B: &[F] = &[
    F::new("Type of Ship and Cargo", 40, 48, SHIP_TYPE),
    F::new("Vendor ID", 48, 66, TEXT),
    F::new("Unit Model Code", 66, 70, UINT),
    F::new("Serial Number", 70, 90, UINT),
    F::new("Call Sign", 90, 132, TEXT),
    F::new("Dimension to Bow", 132, 141, METRES),
    F::new("Dimension to Stern", 141, 150, METRES),
    F::new("Dimension to Port", 150, 156, METRES),
    F::new("Dimension to Starboard", 156, 162, METRES),
    F::new("Spare", 162, 168, UINT).optional(),
];

const STATIC_PART_UNKNOWN: &[F] = &[F::rest("Spare Bits", 40, BITS)];

schema!(
    STATIC_DATA_REPORT,
    [F::new("Part Number", 38, 40, UINT)],
    Some(Branch {
        start: 38,
        end: 40,
        arms: &[(0, STATIC_PART_A), (1, STATIC_PART_B)],
        otherwise: STATIC_PART_UNKNOWN,
    })
);

// ---------------------------------------------------------------------------
// Binary and text messages
// ---------------------------------------------------------------------------

schema!(BINARY_ADDRESSED, [
    F::new("Sequence Number", 38, 40, UINT),
    F::new("Destination MMSI", 40, 70, UINT),
    F::new("Retransmit Flag", 70, 71, RETRANSMIT),
    F::new("Spare", 71, 72, UINT),
    F::new("Designated Area Code", 72, 82, UINT),
    F::new("Functional ID", 82, 88, UINT),
    F::rest("Data", 88, BITS),
]);

schema!(BINARY_ACKNOWLEDGE, [
    F::new("Spare", 38, 40, UINT),
    F::new("MMSI 1", 40, 70, UINT),
    F::new("Sequence Number 1", 70, 72, UINT),
    F::new("MMSI 2", 72, 102, UINT).optional(),
    F::new("Sequence Number 2", 102, 104, UINT).optional(),
    F::new("MMSI 3", 104, 134, UINT).optional(),
    F::new("Sequence Number 3", 134, 136, UINT).optional(),
    F::new("MMSI 4", 136, 166, UINT).optional(),
    F::new("Sequence Number 4", 166, 168, UINT).optional(),
]);

schema!(BINARY_BROADCAST, [
    F::new("Spare", 38, 40, UINT),
    F::new("Designated Area Code", 40, 50, UINT),
    F::new("Functional ID", 50, 56, UINT),
    F::rest("Data", 56, BITS),
]);

schema!(UTC_DATE_INQUIRY, [
    F::new("Spare", 38, 40, UINT),
    F::new("Destination MMSI", 40, 70, UINT),
    F::new("Spare 2", 70, 72, UINT).optional(),
]);

schema!(SAFETY_BROADCAST, [
    F::new("Spare", 38, 40, UINT),
    F::rest("Text", 40, TEXT),
]);

schema!(INTERROGATION, [
    F::new("Spare", 38, 40, UINT),
    F::new("Interrogated MMSI 1", 40, 70, UINT),
    F::new("Message Type 1", 70, 76, UINT),
    F::new("Slot Offset 1", 76, 88, UINT),
    F::new("Spare 2", 88, 90, UINT).optional(),
    F::new("Message Type 2", 90, 96, UINT).optional(),
    F::new("Slot Offset 2", 96, 108, UINT).optional(),
    F::new("Spare 3", 108, 110, UINT).optional(),
    F::new("Interrogated MMSI 2", 110, 140, UINT).optional(),
    F::new("Message Type 3", 140, 146, UINT).optional(),
    F::new("Slot Offset 3", 146, 158, UINT).optional(),
    F::new("Spare 4", 158, 160, UINT).optional(),
]);

schema!(ASSIGNMENT_MODE_COMMAND, [
    F::new("Spare", 38, 40, UINT),
    F::new("Destination A MMSI", 40, 70, UINT),
    F::new("Offset A", 70, 82, UINT),
    F::new("Increment A", 82, 92, UINT),
    F::new("Destination B MMSI", 92, 122, UINT).optional(),
    F::new("Offset B", 122, 134, UINT).optional(),
    F::new("Increment B", 134, 144, UINT).optional(),
]);

const ADDRESSED: Kind = Kind::Flag("Broadcast", "Addressed");
const STRUCTURED: Kind = Kind::Flag("Unstructured", "Structured");

const SINGLE_SLOT_ADDRESSED: &[F] = &[
    F::new("Destination MMSI", 40, 70, UINT),
    F::rest("Data", 70, BITS),
];

const SINGLE_SLOT_BROADCAST: &[F] = &[F::rest("Data", 40, BITS)];

schema!(
    SINGLE_SLOT_BINARY,
    [
        F::new("Addressed", 38, 39, ADDRESSED),
        F::new("Structured", 39, 40, STRUCTURED),
    ],
    Some(Branch {
        start: 38,
        end: 39,
        arms: &[(1, SINGLE_SLOT_ADDRESSED)],
        otherwise: SINGLE_SLOT_BROADCAST,
    })
);

// Type 26 always ends in a 20-bit radio status.
const MULTI_SLOT_ADDRESSED: &[F] = &[
    F::new("Destination MMSI", 40, 70, UINT),
    F::span("Data", Pos::At(70), Pos::BeforeEnd(20), BITS),
    F::span("Radio Status", Pos::BeforeEnd(20), Pos::End, UINT),
];

const MULTI_SLOT_BROADCAST: &[F] = &[
    F::span("Data", Pos::At(40), Pos::BeforeEnd(20), BITS),
    F::span("Radio Status", Pos::BeforeEnd(20), Pos::End, UINT),
];

schema!(
    MULTI_SLOT_BINARY,
    [
        F::new("Addressed", 38, 39, ADDRESSED),
        F::new("Structured", 39, 40, STRUCTURED),
    ],
    Some(Branch {
        start: 38,
        end: 39,
        arms: &[(1, MULTI_SLOT_ADDRESSED)],
        otherwise: MULTI_SLOT_BROADCAST,
    })
);

// ---------------------------------------------------------------------------
// Type table
// ---------------------------------------------------------------------------

const fn info(name: &'static str, schema: &'static Schema) -> MsgTypeInfo {
    MsgTypeInfo {
        name,
        schema: Some(schema),
    }
}

const fn unsupported(name: &'static str) -> MsgTypeInfo {
    MsgTypeInfo { name, schema: None }
}

/// All AIS message types, indexed by type code.
pub static MSG_TYPE_TABLE: &[(u8, MsgTypeInfo)] = &[
    (1, info("Position Report Class A", &POSITION_REPORT_CLASS_A)),
    (2, info("Position Report Class A (Assigned schedule)", &POSITION_REPORT_CLASS_A)),
    (3, info("Position Report Class A (Response to interrogation)", &POSITION_REPORT_CLASS_A)),
    (4, info("Base Station Report", &BASE_STATION_REPORT)),
    (5, info("Static and Voyage Related Data", &STATIC_AND_VOYAGE_DATA)),
    (6, info("Binary Addressed Message", &BINARY_ADDRESSED)),
    (7, info("Binary Acknowledge", &BINARY_ACKNOWLEDGE)),
    (8, info("Binary Broadcast Message", &BINARY_BROADCAST)),
    (9, info("Standard SAR Aircraft Position Report", &SAR_AIRCRAFT_POSITION)),
    (10, info("UTC and Date Inquiry", &UTC_DATE_INQUIRY)),
    (11, info("UTC and Date Response", &BASE_STATION_REPORT)),
    (12, unsupported("Addressed Safety Related Message")),
    (13, info("Safety Related Acknowledge", &BINARY_ACKNOWLEDGE)),
    (14, info("Safety Related Broadcast Message", &SAFETY_BROADCAST)),
    (15, info("Interrogation", &INTERROGATION)),
    (16, info("Assignment Mode Command", &ASSIGNMENT_MODE_COMMAND)),
    (17, unsupported("DGNSS Binary Broadcast Message")),
    (18, info("Standard Class B CS Position Report", &POSITION_REPORT_CLASS_B)),
    (19, info("Extended Class B Equipment Position Report", &EXTENDED_CLASS_B)),
    (20, unsupported("Data Link Management")),
    (21, info("Aid-to-Navigation Report", &AID_TO_NAVIGATION)),
    (22, unsupported("Channel Management")),
    (23, unsupported("Group Assignment Command")),
    (24, info("Static Data Report", &STATIC_DATA_REPORT)),
    (25, info("Single Slot Binary Message", &SINGLE_SLOT_BINARY)),
    (26, info("Multiple Slot Binary Message", &MULTI_SLOT_BINARY)),
    (27, info("Long Range AIS Broadcast Message", &LONG_RANGE_BROADCAST)),
];

fn type_info(code: u8) -> Option<&'static MsgTypeInfo> {
    MSG_TYPE_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, info)| info)
}

/// Human-readable name for any type code.
pub fn message_type_name(code: u8) -> &'static str {
    type_info(code).map(|i| i.name).unwrap_or("Unknown")
}

/// Schema for a supported type code, or `UnsupportedMessageType`.
pub fn schema_for(code: u8) -> Result<&'static Schema> {
    type_info(code)
        .and_then(|i| i.schema)
        .ok_or(AisError::UnsupportedMessageType(code))
}

pub fn is_supported(code: u8) -> bool {
    schema_for(code).is_ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
