//! Line-by-line decode pipeline.
//!
//! Pure logic, no I/O. Drives sentence parsing, fragment reassembly, armor
//! decoding and schema decoding, and produces `Outcome`s for the caller
//! (CLI or listener) to render. Every failure carries the raw lines that
//! caused it; nothing here aborts the stream.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::decode::decode;
use crate::reassembly::{AssembledPayload, Reassembled, Reassembler};
use crate::sentence::parse_sentence;
use crate::types::*;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// A decoded message with the reassembly context it came from.
#[derive(Debug, Clone, Serialize)]
pub struct AisMessage {
    pub channel: String,
    pub sequence_id: Option<u8>,
    pub fragment_count: u8,
    pub sentences: Vec<String>,
    /// Caller's clock when the message completed
    pub timestamp: f64,
    /// Tag block `c:` time (Unix seconds) when any fragment carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_at: Option<i64>,
    #[serde(flatten)]
    pub decoded: DecodedMessage,
}

#[derive(Debug)]
pub enum Outcome {
    Message(AisMessage),
    Error {
        /// The raw input line(s) that produced the error
        input: Vec<String>,
        error: AisError,
    },
}

impl Outcome {
    pub fn is_message(&self) -> bool {
        matches!(self, Outcome::Message(_))
    }
}

/// Run counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineStats {
    pub lines: u64,
    pub sentences: u64,
    pub malformed: u64,
    pub messages: u64,
    pub reassembly_errors: u64,
    pub unsupported: u64,
    pub decode_errors: u64,
    /// Decoded messages per type code
    pub by_type: BTreeMap<u8, u64>,
}

impl PipelineStats {
    pub fn errors(&self) -> u64 {
        self.malformed + self.reassembly_errors + self.unsupported + self.decode_errors
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct Pipeline {
    reassembler: Reassembler,
    stats: PipelineStats,
}

impl Pipeline {
    /// `idle_timeout` enables eviction of stalled multi-sentence messages.
    pub fn new(idle_timeout: Option<f64>) -> Self {
        let reassembler = match idle_timeout {
            Some(secs) => Reassembler::with_idle_timeout(secs),
            None => Reassembler::new(),
        };
        Pipeline {
            reassembler,
            stats: PipelineStats::default(),
        }
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Feed one input line. Blank lines and `#` comments are skipped.
    ///
    /// `timestamp` is the only clock used for idle eviction; tag block times
    /// are carried through as `AisMessage::received_at`.
    pub fn feed(&mut self, line: &str, timestamp: f64) -> Vec<Outcome> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Vec::new();
        }
        self.stats.lines += 1;

        let sentence = match parse_sentence(line) {
            Ok(s) => s,
            Err(error) => {
                self.stats.malformed += 1;
                debug!(%error, "skipping line");
                return vec![Outcome::Error {
                    input: vec![line.to_string()],
                    error,
                }];
            }
        };
        self.stats.sentences += 1;

        self.reassembler
            .push(sentence, timestamp)
            .into_iter()
            .map(|r| self.resolve(r, timestamp))
            .collect()
    }

    /// Evict a stalled in-flight message if the idle timeout has passed.
    pub fn expire(&mut self, now: f64) -> Option<Outcome> {
        let r = self.reassembler.expire(now)?;
        Some(self.resolve(r, now))
    }

    /// End of input: report any message still waiting for fragments.
    pub fn finish(&mut self) -> Option<Outcome> {
        let r = self.reassembler.finish()?;
        Some(self.resolve(r, 0.0))
    }

    fn resolve(&mut self, r: Reassembled, timestamp: f64) -> Outcome {
        match r {
            Reassembled::Complete(payload) => self.decode_payload(payload, timestamp),
            Reassembled::Discarded { sentences, error } => {
                self.stats.reassembly_errors += 1;
                Outcome::Error {
                    input: sentences,
                    error,
                }
            }
        }
    }

    fn decode_payload(&mut self, payload: AssembledPayload, timestamp: f64) -> Outcome {
        let decoded = payload.to_bits().and_then(|bits| decode(&bits));
        match decoded {
            Ok(decoded) => {
                self.stats.messages += 1;
                *self.stats.by_type.entry(decoded.msg_type).or_default() += 1;
                Outcome::Message(AisMessage {
                    channel: payload.channel,
                    sequence_id: payload.key.sequence_id,
                    fragment_count: payload.key.fragment_count,
                    sentences: payload.sentences,
                    timestamp,
                    received_at: payload.received_at,
                    decoded,
                })
            }
            Err(error) => {
                match error {
                    AisError::UnsupportedMessageType(_) => self.stats.unsupported += 1,
                    _ => self.stats.decode_errors += 1,
                }
                Outcome::Error {
                    input: payload.sentences,
                    error,
                }
            }
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Pipeline::new(None)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
