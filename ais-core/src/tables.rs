//! Static code → label lookup tables.
//!
//! Codes outside a table resolve to `"Unknown"`; codes the standard reserves
//! resolve to a reserved label. Nothing here allocates.

/// The lookup tables a schema field can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    NavigationStatus,
    ShipType,
    Epfd,
    AisVersion,
    Month,
    AidType,
    Maneuver,
}

pub const UNKNOWN: &str = "Unknown";
pub const RESERVED: &str = "Reserved for future use";

impl Table {
    /// Resolve a raw code to its label.
    pub fn label(self, code: u64) -> &'static str {
        match self {
            Table::NavigationStatus => lookup(NAVIGATION_STATUS, code),
            Table::ShipType => ship_type(code),
            Table::Epfd => epfd(code),
            Table::AisVersion => lookup(AIS_VERSION, code),
            Table::Month => lookup(MONTHS, code),
            Table::AidType => lookup(AID_TYPES, code),
            Table::Maneuver => lookup(MANEUVER, code),
        }
    }
}

fn lookup(table: &'static [&'static str], code: u64) -> &'static str {
    usize::try_from(code)
        .ok()
        .and_then(|i| table.get(i))
        .copied()
        .unwrap_or(UNKNOWN)
}

// ---------------------------------------------------------------------------
// Navigation status (types 1/2/3, 27)
// ---------------------------------------------------------------------------

const NAVIGATION_STATUS: &[&str] = &[
    "Under way using engine",
    "At anchor",
    "Not under command",
    "Restricted maneuverability",
    "Constrained by her draught",
    "Moored",
    "Aground",
    "Engaged in fishing",
    "Under way sailing",
    RESERVED,
    RESERVED,
    "Power-driven vessel towing astern",
    "Power-driven vessel pushing ahead or towing alongside",
    RESERVED,
    "AIS-SART is active",
    "Undefined (default)",
];

// ---------------------------------------------------------------------------
// Ship type (types 5, 19, 24B)
// ---------------------------------------------------------------------------

const SHIP_TYPE_SPECIAL: &[&str] = &[
    "Fishing",
    "Towing",
    "Towing: length exceeds 200m or breadth exceeds 25m",
    "Dredging or underwater ops",
    "Diving ops",
    "Military ops",
    "Sailing",
    "Pleasure Craft",
    "Reserved",
    "Reserved",
];

const SHIP_TYPE_SERVICE: &[&str] = &[
    "Pilot Vessel",
    "Search and Rescue vessel",
    "Tug",
    "Port Tender",
    "Anti-pollution equipment",
    "Law Enforcement",
    "Spare - Local Vessel",
    "Spare - Local Vessel",
    "Medical Transport",
    "Noncombatant ship according to RR Resolution No. 18",
];

/// Ship-type families that share the hazardous-category layout (x0..x9).
struct ShipFamily {
    decade: u64,
    base: &'static str,
    hazard: [&'static str; 4],
    reserved: &'static str,
}

const SHIP_FAMILIES: &[ShipFamily] = &[
    ShipFamily {
        decade: 2,
        base: "Wing in ground (WIG)",
        hazard: [
            "Wing in ground (WIG), Hazardous category A",
            "Wing in ground (WIG), Hazardous category B",
            "Wing in ground (WIG), Hazardous category C",
            "Wing in ground (WIG), Hazardous category D",
        ],
        reserved: "Wing in ground (WIG), Reserved for future use",
    },
    ShipFamily {
        decade: 4,
        base: "High speed craft (HSC)",
        hazard: [
            "High speed craft (HSC), Hazardous category A",
            "High speed craft (HSC), Hazardous category B",
            "High speed craft (HSC), Hazardous category C",
            "High speed craft (HSC), Hazardous category D",
        ],
        reserved: "High speed craft (HSC), Reserved for future use",
    },
    ShipFamily {
        decade: 6,
        base: "Passenger",
        hazard: [
            "Passenger, Hazardous category A",
            "Passenger, Hazardous category B",
            "Passenger, Hazardous category C",
            "Passenger, Hazardous category D",
        ],
        reserved: "Passenger, Reserved for future use",
    },
    ShipFamily {
        decade: 7,
        base: "Cargo",
        hazard: [
            "Cargo, Hazardous category A",
            "Cargo, Hazardous category B",
            "Cargo, Hazardous category C",
            "Cargo, Hazardous category D",
        ],
        reserved: "Cargo, Reserved for future use",
    },
    ShipFamily {
        decade: 8,
        base: "Tanker",
        hazard: [
            "Tanker, Hazardous category A",
            "Tanker, Hazardous category B",
            "Tanker, Hazardous category C",
            "Tanker, Hazardous category D",
        ],
        reserved: "Tanker, Reserved for future use",
    },
    ShipFamily {
        decade: 9,
        base: "Other Type",
        hazard: [
            "Other Type, Hazardous category A",
            "Other Type, Hazardous category B",
            "Other Type, Hazardous category C",
            "Other Type, Hazardous category D",
        ],
        reserved: "Other Type, Reserved for future use",
    },
];

fn ship_type(code: u64) -> &'static str {
    match code {
        0 => "Not available (default)",
        1..=19 => RESERVED,
        30..=39 => SHIP_TYPE_SPECIAL[(code - 30) as usize],
        50..=59 => SHIP_TYPE_SERVICE[(code - 50) as usize],
        99 => "Other Type, no additional information",
        20..=98 => {
            let Some(family) = SHIP_FAMILIES.iter().find(|f| f.decade == code / 10) else {
                return UNKNOWN;
            };
            match code % 10 {
                0 => family.base,
                n @ 1..=4 => family.hazard[(n - 1) as usize],
                // WIG has no generic x9 entry
                9 if family.decade != 2 => family.base,
                _ => family.reserved,
            }
        }
        _ => UNKNOWN,
    }
}

// ---------------------------------------------------------------------------
// Electronic position fixing device
// ---------------------------------------------------------------------------

const EPFD: &[&str] = &[
    "Undefined",
    "GPS",
    "GLONASS",
    "Combined GPS/GLONASS",
    "Loran-C",
    "Chayka",
    "Integrated Navigation System",
    "Surveyed",
    "Galileo",
];

fn epfd(code: u64) -> &'static str {
    match code {
        9..=14 => "Reserved",
        15 => "Internal GNSS",
        _ => lookup(EPFD, code),
    }
}

// ---------------------------------------------------------------------------
// Small tables
// ---------------------------------------------------------------------------

const AIS_VERSION: &[&str] = &["ITU 1371", "Future - 1", "Future - 2", "Future - 3"];

const MONTHS: &[&str] = &[
    "Not available",
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MANEUVER: &[&str] = &[
    "Not available (default)",
    "No special maneuver",
    "Special maneuver",
];

// ---------------------------------------------------------------------------
// Aid-to-navigation type (type 21)
// ---------------------------------------------------------------------------

const AID_TYPES: &[&str] = &[
    "Default, Type of Aid to Navigation not specified",
    "Reference point",
    "RACON (radar transponder marking a navigation hazard)",
    "Fixed structure off shore",
    "Spare, Reserved for future use",
    "Light, without sectors",
    "Light, with sectors",
    "Leading Light Front",
    "Leading Light Rear",
    "Beacon, Cardinal N",
    "Beacon, Cardinal E",
    "Beacon, Cardinal S",
    "Beacon, Cardinal W",
    "Beacon, Port hand",
    "Beacon, Starboard hand",
    "Beacon, Preferred Channel port hand",
    "Beacon, Preferred Channel starboard hand",
    "Beacon, Isolated danger",
    "Beacon, Safe water",
    "Beacon, Special mark",
    "Cardinal Mark N",
    "Cardinal Mark E",
    "Cardinal Mark S",
    "Cardinal Mark W",
    "Port hand Mark",
    "Starboard hand Mark",
    "Preferred Channel Port hand",
    "Preferred Channel Starboard hand",
    "Isolated danger",
    "Safe Water",
    "Special Mark",
    "Light Vessel / LANBY / Rigs",
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_status() {
        assert_eq!(Table::NavigationStatus.label(0), "Under way using engine");
        assert_eq!(Table::NavigationStatus.label(5), "Moored");
        assert_eq!(Table::NavigationStatus.label(9), RESERVED);
        assert_eq!(Table::NavigationStatus.label(15), "Undefined (default)");
        assert_eq!(Table::NavigationStatus.label(16), UNKNOWN);
    }

    #[test]
    fn test_ship_type_families() {
        assert_eq!(Table::ShipType.label(0), "Not available (default)");
        assert_eq!(Table::ShipType.label(7), RESERVED);
        assert_eq!(Table::ShipType.label(30), "Fishing");
        assert_eq!(Table::ShipType.label(52), "Tug");
        assert_eq!(Table::ShipType.label(60), "Passenger");
        assert_eq!(Table::ShipType.label(70), "Cargo");
        assert_eq!(Table::ShipType.label(79), "Cargo");
        assert_eq!(Table::ShipType.label(81), "Tanker, Hazardous category A");
        assert_eq!(Table::ShipType.label(86), "Tanker, Reserved for future use");
        assert_eq!(
            Table::ShipType.label(29),
            "Wing in ground (WIG), Reserved for future use"
        );
        assert_eq!(Table::ShipType.label(99), "Other Type, no additional information");
        assert_eq!(Table::ShipType.label(100), UNKNOWN);
        assert_eq!(Table::ShipType.label(255), UNKNOWN);
    }

    #[test]
    fn test_epfd() {
        assert_eq!(Table::Epfd.label(1), "GPS");
        assert_eq!(Table::Epfd.label(7), "Surveyed");
        assert_eq!(Table::Epfd.label(12), "Reserved");
        assert_eq!(Table::Epfd.label(15), "Internal GNSS");
    }

    #[test]
    fn test_small_tables() {
        assert_eq!(Table::Month.label(3), "March");
        assert_eq!(Table::Month.label(13), UNKNOWN);
        assert_eq!(Table::AisVersion.label(0), "ITU 1371");
        assert_eq!(Table::Maneuver.label(2), "Special maneuver");
        assert_eq!(Table::AidType.label(1), "Reference point");
        assert_eq!(Table::AidType.label(31), "Light Vessel / LANBY / Rigs");
        assert_eq!(Table::AidType.label(32), UNKNOWN);
    }
}
