//! Multi-sentence fragment reassembly.
//!
//! An AIS message longer than one sentence arrives as up to nine fragments
//! sharing a sequence id and fragment count. The reassembler keeps a single
//! in-flight message and reports one of:
//! - a complete payload once fragments {1..N} have all been seen
//! - a discarded message when a fragment conflicts with the one in flight,
//!   repeats an index, or never completes
//!
//! Fragments may arrive in any index order. A conflicting sentence is never
//! lost: after the in-flight message is discarded it is processed from `Idle`.

use tracing::{debug, warn};

use crate::armor;
use crate::bits::BitBuf;
use crate::sentence::Sentence;
use crate::types::{AisError, FragmentKey, Result};

/// Observable reassembler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassemblyState {
    Idle,
    Awaiting { received: usize, expected: u8 },
    /// The last sentence completed a message.
    Complete,
    /// The last sentence discarded an in-flight message and left nothing pending.
    Errored,
}

/// A fully reassembled armored payload, ready for the armor codec.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPayload {
    pub key: FragmentKey,
    pub channel: String,
    /// Fragment payloads concatenated in index order
    pub payload: String,
    /// Fill bits of the last fragment
    pub fill_bits: u8,
    /// Raw sentence lines in index order
    pub sentences: Vec<String>,
    /// Message type from the first payload character, if it is valid armor
    pub msg_type: Option<u8>,
    /// Earliest tag block `c:` time among the fragments, Unix seconds
    pub received_at: Option<i64>,
}

impl AssembledPayload {
    pub fn to_bits(&self) -> Result<BitBuf> {
        armor::encode_to_bits(&self.payload, self.fill_bits)
    }
}

/// Output of feeding one sentence to the reassembler.
#[derive(Debug)]
pub enum Reassembled {
    Complete(AssembledPayload),
    /// An in-flight message was dropped. `sentences` are the raw lines it held.
    Discarded {
        sentences: Vec<String>,
        error: AisError,
    },
}

struct InFlight {
    key: FragmentKey,
    channel: String,
    /// Indexed by fragment number - 1
    fragments: Vec<Option<Fragment>>,
    received: usize,
    msg_type: Option<u8>,
    received_at: Option<i64>,
    last_seen: f64,
}

struct Fragment {
    payload: String,
    fill_bits: u8,
    raw: String,
}

impl InFlight {
    fn start(sentence: Sentence, timestamp: f64) -> Self {
        let mut flight = InFlight {
            key: sentence.key(),
            channel: sentence.channel.clone(),
            fragments: (0..sentence.fragment_count).map(|_| None).collect(),
            received: 0,
            msg_type: None,
            received_at: None,
            last_seen: timestamp,
        };
        flight.insert(sentence, timestamp);
        flight
    }

    fn has(&self, index: u8) -> bool {
        self.fragments
            .get(index as usize - 1)
            .is_some_and(Option::is_some)
    }

    fn insert(&mut self, sentence: Sentence, timestamp: f64) {
        if sentence.fragment_number == 1 {
            self.msg_type = sentence.payload.bytes().next().and_then(armor::armor_value);
        }
        self.received_at = match (self.received_at, sentence.received_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        let slot = sentence.fragment_number as usize - 1;
        self.fragments[slot] = Some(Fragment {
            payload: sentence.payload,
            fill_bits: sentence.fill_bits,
            raw: sentence.raw,
        });
        self.received += 1;
        self.last_seen = timestamp;
    }

    /// Full-set rule: every index 1..=N present.
    fn is_complete(&self) -> bool {
        self.fragments.iter().all(Option::is_some)
    }

    fn raw_sentences(&self) -> Vec<String> {
        self.fragments
            .iter()
            .flatten()
            .map(|f| f.raw.clone())
            .collect()
    }

    fn into_payload(self) -> AssembledPayload {
        let fragments: Vec<Fragment> = self.fragments.into_iter().flatten().collect();
        let fill_bits = fragments.last().map(|f| f.fill_bits).unwrap_or(0);
        let payload = fragments.iter().map(|f| f.payload.as_str()).collect();
        let sentences = fragments.into_iter().map(|f| f.raw).collect();
        AssembledPayload {
            key: self.key,
            channel: self.channel,
            payload,
            fill_bits,
            sentences,
            msg_type: self.msg_type,
            received_at: self.received_at,
        }
    }

    fn discard(self, error: AisError) -> Reassembled {
        Reassembled::Discarded {
            sentences: self.raw_sentences(),
            error,
        }
    }

    fn incomplete(self) -> Reassembled {
        let error = AisError::IncompleteMessage {
            key: self.key,
            received: self.received,
            expected: self.key.fragment_count,
        };
        self.discard(error)
    }
}

/// Single-slot fragment reassembler.
pub struct Reassembler {
    in_flight: Option<InFlight>,
    idle_timeout: Option<f64>,
    last: ReassemblyState,
}

impl Reassembler {
    /// Reassembler without idle eviction.
    pub fn new() -> Self {
        Reassembler {
            in_flight: None,
            idle_timeout: None,
            last: ReassemblyState::Idle,
        }
    }

    /// Reassembler that evicts an in-flight message idle for more than `secs`.
    pub fn with_idle_timeout(secs: f64) -> Self {
        Reassembler {
            idle_timeout: Some(secs),
            ..Reassembler::new()
        }
    }

    pub fn state(&self) -> ReassemblyState {
        match &self.in_flight {
            Some(flight) => ReassemblyState::Awaiting {
                received: flight.received,
                expected: flight.key.fragment_count,
            },
            None => self.last,
        }
    }

    /// Key of the message currently being assembled.
    pub fn in_flight(&self) -> Option<FragmentKey> {
        self.in_flight.as_ref().map(|f| f.key)
    }

    /// Feed one parsed sentence. Returns at most one discarded message
    /// followed by at most one completed payload.
    pub fn push(&mut self, sentence: Sentence, timestamp: f64) -> Vec<Reassembled> {
        let mut out = Vec::new();

        if let Some(evicted) = self.expire(timestamp) {
            out.push(evicted);
        }

        if let Some(mut flight) = self.in_flight.take() {
            let key = sentence.key();
            if key != flight.key {
                warn!(expected = %flight.key, received = %key, "non-sequential fragment");
                let error = AisError::NonSequentialFragment {
                    expected: flight.key,
                    received: key,
                };
                out.push(flight.discard(error));
            } else if flight.has(sentence.fragment_number) {
                warn!(%key, index = sentence.fragment_number, "duplicate fragment");
                let error = AisError::DuplicateFragment {
                    key,
                    index: sentence.fragment_number,
                };
                out.push(flight.discard(error));
            } else {
                flight.insert(sentence, timestamp);
                if flight.is_complete() {
                    debug!(key = %flight.key, "message reassembled");
                    out.push(Reassembled::Complete(flight.into_payload()));
                    self.last = ReassemblyState::Complete;
                } else {
                    self.in_flight = Some(flight);
                }
                return out;
            }
        }

        // Idle
        let flight = InFlight::start(sentence, timestamp);
        if flight.is_complete() {
            out.push(Reassembled::Complete(flight.into_payload()));
            self.last = ReassemblyState::Complete;
        } else {
            self.in_flight = Some(flight);
        }
        if out.len() == 1 && matches!(out[0], Reassembled::Discarded { .. }) {
            self.last = ReassemblyState::Errored;
        }
        out
    }

    /// Evict the in-flight message if it has been idle longer than the timeout.
    pub fn expire(&mut self, now: f64) -> Option<Reassembled> {
        let timeout = self.idle_timeout?;
        let stale = self
            .in_flight
            .as_ref()
            .is_some_and(|f| now - f.last_seen > timeout);
        if !stale {
            return None;
        }
        let flight = self.in_flight.take()?;
        warn!(key = %flight.key, received = flight.received, "evicting idle message");
        self.last = ReassemblyState::Errored;
        Some(flight.incomplete())
    }

    /// End of input: surface any in-flight message as incomplete.
    pub fn finish(&mut self) -> Option<Reassembled> {
        let flight = self.in_flight.take()?;
        warn!(key = %flight.key, received = flight.received, "incomplete message at end of input");
        self.last = ReassemblyState::Errored;
        Some(flight.incomplete())
    }
}

impl Default for Reassembler {
    fn default() -> Self {
        Reassembler::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::parse_sentence;

    const FINNMILL_1: &str =
        "!AIVDM,2,1,5,A,53uuBt02<Tg1<<Tv220HTpplThj222222222221?1rc<>Ho<0@0TQCADR0EQ,0*58";
    const FINNMILL_2: &str = "!AIVDM,2,2,5,A,C`888888880,2*02";

    fn frag(count: u8, index: u8, seq: &str, payload: &str) -> Sentence {
        parse_sentence(&format!("!AIVDM,{count},{index},{seq},A,{payload},0*00")).unwrap()
    }

    fn completed(out: &[Reassembled]) -> Vec<&AssembledPayload> {
        out.iter()
            .filter_map(|r| match r {
                Reassembled::Complete(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn errors(out: &[Reassembled]) -> Vec<&AisError> {
        out.iter()
            .filter_map(|r| match r {
                Reassembled::Discarded { error, .. } => Some(error),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_single_fragment_completes_immediately() {
        let mut r = Reassembler::new();
        assert_eq!(r.state(), ReassemblyState::Idle);
        let out = r.push(frag(1, 1, "", "13QW"), 0.0);
        let done = completed(&out);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].payload, "13QW");
        assert_eq!(done[0].msg_type, Some(1));
        assert_eq!(r.state(), ReassemblyState::Complete);
    }

    #[test]
    fn test_two_part_in_order() {
        let mut r = Reassembler::new();
        let out = r.push(parse_sentence(FINNMILL_1).unwrap(), 1.0);
        assert!(out.is_empty());
        assert_eq!(
            r.state(),
            ReassemblyState::Awaiting {
                received: 1,
                expected: 2
            }
        );

        let out = r.push(parse_sentence(FINNMILL_2).unwrap(), 1.1);
        let done = completed(&out);
        assert_eq!(done.len(), 1);
        let p = done[0];
        assert_eq!(p.fill_bits, 2);
        assert_eq!(p.msg_type, Some(5));
        assert_eq!(p.sentences, vec![FINNMILL_1.to_string(), FINNMILL_2.to_string()]);
        assert_eq!(p.to_bits().unwrap().len(), 424);
        assert!(r.in_flight().is_none());
    }

    #[test]
    fn test_every_permutation_completes_once() {
        let payloads = ["AA", "BB", "CC"];
        let orders = [
            [1, 2, 3],
            [1, 3, 2],
            [2, 1, 3],
            [2, 3, 1],
            [3, 1, 2],
            [3, 2, 1],
        ];
        for order in orders {
            let mut r = Reassembler::new();
            let mut done = Vec::new();
            for (i, &idx) in order.iter().enumerate() {
                let out = r.push(frag(3, idx, "7", payloads[idx as usize - 1]), i as f64);
                assert!(errors(&out).is_empty(), "order {order:?}");
                if i < 2 {
                    assert!(completed(&out).is_empty(), "early completion {order:?}");
                }
                done.extend(completed(&out).into_iter().cloned());
            }
            assert_eq!(done.len(), 1, "order {order:?}");
            assert_eq!(done[0].payload, "AABBCC");
        }
    }

    #[test]
    fn test_missing_middle_never_completes() {
        let mut r = Reassembler::new();
        assert!(r.push(frag(3, 1, "4", "AA"), 0.0).is_empty());
        assert!(r.push(frag(3, 3, "4", "CC"), 0.1).is_empty());
        assert_eq!(
            r.state(),
            ReassemblyState::Awaiting {
                received: 2,
                expected: 3
            }
        );

        let leftover = r.finish().unwrap();
        match leftover {
            Reassembled::Discarded { sentences, error } => {
                assert_eq!(sentences.len(), 2);
                assert!(matches!(
                    error,
                    AisError::IncompleteMessage {
                        received: 2,
                        expected: 3,
                        ..
                    }
                ));
            }
            other => panic!("expected discard, got {other:?}"),
        }
        assert_eq!(r.state(), ReassemblyState::Errored);
        assert!(r.finish().is_none());
    }

    #[test]
    fn test_sequence_conflict_discards_exactly_once() {
        let mut r = Reassembler::new();
        r.push(frag(2, 1, "5", "AA"), 0.0);

        let out = r.push(frag(2, 1, "6", "BB"), 0.1);
        let errs = errors(&out);
        assert_eq!(errs.len(), 1);
        match errs[0] {
            AisError::NonSequentialFragment { expected, received } => {
                assert_eq!(expected.sequence_id, Some(5));
                assert_eq!(received.sequence_id, Some(6));
            }
            other => panic!("unexpected {other:?}"),
        }
        // The conflicting sentence starts a new message
        assert_eq!(r.in_flight().unwrap().sequence_id, Some(6));

        let out = r.push(frag(2, 2, "6", "CC"), 0.2);
        assert!(errors(&out).is_empty());
        assert_eq!(completed(&out)[0].payload, "BBCC");
    }

    #[test]
    fn test_count_mismatch_is_conflict() {
        let mut r = Reassembler::new();
        r.push(frag(3, 1, "5", "AA"), 0.0);
        let out = r.push(frag(1, 1, "", "13QW"), 0.1);
        assert_eq!(errors(&out).len(), 1);
        assert_eq!(completed(&out).len(), 1);
        assert_eq!(r.state(), ReassemblyState::Complete);
    }

    #[test]
    fn test_duplicate_fragment() {
        let mut r = Reassembler::new();
        r.push(frag(2, 1, "3", "AA"), 0.0);
        let out = r.push(frag(2, 1, "3", "XX"), 0.1);
        let errs = errors(&out);
        assert_eq!(errs.len(), 1);
        assert!(matches!(errs[0], AisError::DuplicateFragment { index: 1, .. }));

        // Re-evaluated from idle: the duplicate is now fragment 1 in flight
        let out = r.push(frag(2, 2, "3", "BB"), 0.2);
        assert_eq!(completed(&out)[0].payload, "XXBB");
    }

    #[test]
    fn test_idle_timeout_evicts_before_next_sentence() {
        let mut r = Reassembler::with_idle_timeout(5.0);
        r.push(frag(2, 1, "1", "AA"), 0.0);

        // Within timeout: still in flight
        assert!(r.expire(4.0).is_none());

        let out = r.push(frag(2, 1, "2", "BB"), 10.0);
        let errs = errors(&out);
        assert_eq!(errs.len(), 1);
        assert!(matches!(errs[0], AisError::IncompleteMessage { .. }));
        assert_eq!(r.in_flight().unwrap().sequence_id, Some(2));
    }

    #[test]
    fn test_expire_without_timeout_is_noop() {
        let mut r = Reassembler::new();
        r.push(frag(2, 1, "1", "AA"), 0.0);
        assert!(r.expire(1e9).is_none());
        assert!(r.in_flight().is_some());
    }

    #[test]
    fn test_invalid_first_char_has_no_type() {
        let mut r = Reassembler::new();
        let out = r.push(frag(1, 1, "", "[AB"), 0.0);
        let p = completed(&out)[0];
        assert_eq!(p.msg_type, None);
        assert!(p.to_bits().is_err());
    }

    #[test]
    fn test_tag_block_time_carried_not_used_for_eviction() {
        let mut r = Reassembler::with_idle_timeout(60.0);
        r.push(parse_sentence(FINNMILL_1).unwrap(), 0.1);
        let tagged = format!("\\c:1693000000*0B\\{FINNMILL_2}");
        let out = r.push(parse_sentence(&tagged).unwrap(), 0.2);
        assert!(errors(&out).is_empty());
        let done = completed(&out);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].received_at, Some(1693000000));
    }
}
