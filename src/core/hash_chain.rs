// Tamper-evident hash chain over ledger entries.
//
// Purpose
// - Explicit canonical serialization and digest so hashes are reproducible
//   across implementations. Never derived from serde output.
//
// Responsibilities
// - seal: place a draft at the chain tail and compute its entry hash.
// - verify_chain: recompute every hash in sequence and report the first
//   violation. Runs out of band, never on the ingestion hot path.
//
// Boundaries
// - Pure functions, no I/O. The store owning the tail lives behind a port.

use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::core::punch::{PunchDraft, PunchRecord};

/// Well-known prior hash of the first entry in every chain.
pub const GENESIS_HASH: &str = "GENESIS";

/// The (tenant, device) pair whose punches share one hash chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainScope {
    pub tenant_id: Uuid,
    pub device_id: Uuid,
}

impl ChainScope {
    pub fn new(tenant_id: Uuid, device_id: Uuid) -> Self {
        Self {
            tenant_id,
            device_id,
        }
    }
}

/// Last-entry bookkeeping of one chain. Doubles as the optimistic-concurrency
/// token for appends: an append names the tail it expects to extend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainTail {
    pub prior_hash: String,
    pub sequence: u64,
}

impl ChainTail {
    pub fn genesis() -> Self {
        Self {
            prior_hash: GENESIS_HASH.to_string(),
            sequence: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainViolation {
    #[error("entry hash mismatch at sequence {sequence_number}")]
    HashMismatch { sequence_number: u64 },

    #[error("prior hash does not link to the preceding entry at sequence {sequence_number}")]
    BrokenLink { sequence_number: u64 },

    #[error("sequence gap at sequence {sequence_number}, expected {expected}")]
    SequenceGap { sequence_number: u64, expected: u64 },
}

/// Canonical serialization of every hashed field, in fixed order, pipe-joined.
/// The entry hash itself is excluded; the prior hash is appended by the digest.
pub fn canonical_fields(record: &PunchRecord) -> String {
    let employee = record
        .employee_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let reasons = record
        .outcome_reasons
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let evidence = record.evidence_locator.as_deref().unwrap_or("-");
    format!(
        "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
        record.id,
        record.tenant_id,
        record.device_id,
        employee,
        record.device_user_id,
        record.device_serial_number,
        record.punch_type.as_str(),
        record.punch_time.to_rfc3339(),
        record.received_at.to_rfc3339(),
        record.verification_method,
        record.verification_quality,
        record.outcome.as_str(),
        reasons,
        evidence,
        record.sequence_number,
    )
}

/// Digest of the canonical fields chained to the prior hash, hex-encoded.
pub fn entry_hash(record: &PunchRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_fields(record).as_bytes());
    hasher.update(b"|");
    hasher.update(record.prior_hash.as_bytes());
    hex::encode(hasher.finalize())
}

/// Place a draft at the given tail: assign prior hash and sequence number,
/// then compute the entry hash over the finished record.
pub fn seal(draft: PunchDraft, tail: &ChainTail) -> PunchRecord {
    let mut record = PunchRecord {
        id: draft.id,
        tenant_id: draft.tenant_id,
        device_id: draft.device_id,
        employee_id: draft.employee_id,
        device_user_id: draft.device_user_id,
        device_serial_number: draft.device_serial_number,
        punch_type: draft.punch_type,
        punch_time: draft.punch_time,
        received_at: draft.received_at,
        verification_method: draft.verification_method,
        verification_quality: draft.verification_quality,
        outcome: draft.outcome,
        outcome_reasons: draft.outcome_reasons,
        evidence_locator: draft.evidence_locator,
        prior_hash: tail.prior_hash.clone(),
        entry_hash: String::new(),
        sequence_number: tail.sequence + 1,
    };
    record.entry_hash = entry_hash(&record);
    record
}

/// Recompute the whole chain. Entries must be in append order. The first
/// violation poisons the entry and everything after it; nothing is repaired.
pub fn verify_chain(entries: &[PunchRecord]) -> Result<(), ChainViolation> {
    let mut expected_prior = GENESIS_HASH.to_string();
    let mut expected_sequence = 1u64;
    for entry in entries {
        if entry.sequence_number != expected_sequence {
            return Err(ChainViolation::SequenceGap {
                sequence_number: entry.sequence_number,
                expected: expected_sequence,
            });
        }
        if entry.prior_hash != expected_prior {
            return Err(ChainViolation::BrokenLink {
                sequence_number: entry.sequence_number,
            });
        }
        if entry_hash(entry) != entry.entry_hash {
            return Err(ChainViolation::HashMismatch {
                sequence_number: entry.sequence_number,
            });
        }
        expected_prior = entry.entry_hash.clone();
        expected_sequence += 1;
    }
    Ok(())
}

#[cfg(test)]
mod hash_chain_tests {
    use super::*;
    use crate::core::punch::{PunchOutcome, PunchType};
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    fn draft(sequence_hint: u32) -> PunchDraft {
        PunchDraft {
            id: Uuid::from_u128(sequence_hint as u128),
            tenant_id: Uuid::from_u128(1),
            device_id: Uuid::from_u128(2),
            employee_id: Some(Uuid::from_u128(3)),
            device_user_id: "42".to_string(),
            device_serial_number: "ZK-0001".to_string(),
            punch_type: PunchType::CheckIn,
            punch_time: Utc
                .with_ymd_and_hms(2026, 1, 5, 8, sequence_hint, 0)
                .unwrap(),
            received_at: Utc.with_ymd_and_hms(2026, 1, 5, 8, sequence_hint, 2).unwrap(),
            verification_method: "Fingerprint".to_string(),
            verification_quality: 90,
            outcome: PunchOutcome::Accepted,
            outcome_reasons: vec![],
            evidence_locator: None,
        }
    }

    #[fixture]
    fn chain() -> Vec<PunchRecord> {
        let first = seal(draft(0), &ChainTail::genesis());
        let second = seal(
            draft(1),
            &ChainTail {
                prior_hash: first.entry_hash.clone(),
                sequence: first.sequence_number,
            },
        );
        vec![first, second]
    }

    #[rstest]
    fn it_should_anchor_the_genesis_entry_to_the_well_known_constant(chain: Vec<PunchRecord>) {
        assert_eq!(chain[0].prior_hash, GENESIS_HASH);
        assert_eq!(chain[0].sequence_number, 1);
    }

    #[rstest]
    fn it_should_link_consecutive_entries(chain: Vec<PunchRecord>) {
        assert_eq!(chain[1].prior_hash, chain[0].entry_hash);
        assert_eq!(chain[1].sequence_number, 2);
        assert_ne!(chain[1].entry_hash, chain[0].entry_hash);
    }

    #[rstest]
    fn it_should_change_the_hash_when_the_prior_hash_changes() {
        let tail_a = ChainTail::genesis();
        let tail_b = ChainTail {
            prior_hash: "other".to_string(),
            sequence: 0,
        };
        let a = seal(draft(0), &tail_a);
        let b = seal(draft(0), &tail_b);
        assert_ne!(a.entry_hash, b.entry_hash);
    }

    #[rstest]
    fn it_should_verify_an_intact_chain(chain: Vec<PunchRecord>) {
        assert_eq!(verify_chain(&chain), Ok(()));
    }

    #[rstest]
    fn it_should_detect_a_tampered_field(mut chain: Vec<PunchRecord>) {
        chain[0].verification_quality = 10;
        assert_eq!(
            verify_chain(&chain),
            Err(ChainViolation::HashMismatch { sequence_number: 1 })
        );
    }

    #[rstest]
    fn it_should_detect_a_rewritten_link(mut chain: Vec<PunchRecord>) {
        chain[1].prior_hash = GENESIS_HASH.to_string();
        assert_eq!(
            verify_chain(&chain),
            Err(ChainViolation::BrokenLink { sequence_number: 2 })
        );
    }

    #[rstest]
    fn it_should_detect_a_sequence_gap(mut chain: Vec<PunchRecord>) {
        chain[1].sequence_number = 3;
        assert_eq!(
            verify_chain(&chain),
            Err(ChainViolation::SequenceGap {
                sequence_number: 3,
                expected: 2
            })
        );
    }

    #[rstest]
    fn it_should_verify_the_empty_chain() {
        assert_eq!(verify_chain(&[]), Ok(()));
    }
}
