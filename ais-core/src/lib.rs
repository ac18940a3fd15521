//! ais-core: Pure decode library for AIS messages carried in NMEA 0183 sentences.
//!
//! Pure algorithms with no async and no network I/O. The `ais` CLI in `ais-cli` is a
//! thin shell over `Pipeline`.
//!
//! Data flow: sentence → `Reassembler` → armored payload → `armor` →
//! bitstream → `decode` (registry schema + field rules) → `DecodedMessage`.

pub mod armor;
pub mod bits;
pub mod checksum;
pub mod config;
pub mod decode;
pub mod fields;
pub mod pipeline;
pub mod reassembly;
pub mod registry;
pub mod sentence;
pub mod tables;
pub mod types;

// Re-export commonly used types at crate root
pub use armor::{bits_to_armor, bits_to_ascii_text, encode_to_bits};
pub use bits::{extract_signed, extract_unsigned, BitBuf};
pub use decode::{decode, decode_payload};
pub use pipeline::{AisMessage, Outcome, Pipeline, PipelineStats};
pub use reassembly::{AssembledPayload, Reassembled, Reassembler, ReassemblyState};
pub use registry::{message_type_name, schema_for};
pub use sentence::{parse_sentence, Sentence};
pub use types::*;
