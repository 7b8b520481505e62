// Ledger entry types and the directory entities they reference.
//
// Purpose
// - Define the immutable PunchRecord, the draft it is sealed from, and the
//   enumerated outcome/reason vocabulary of the ledger.
//
// Boundaries
// - Plain data, framework-free. Hashing lives in hash_chain, gating in gate.
//
// Versioning and evolution
// - Hashed fields must never change meaning. Corrections are appended as
//   compensating entries, never edited in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PunchType {
    CheckIn,
    CheckOut,
}

impl PunchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PunchType::CheckIn => "CheckIn",
            PunchType::CheckOut => "CheckOut",
        }
    }
}

/// Terminal classification of a ledger entry. Set once at append time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PunchOutcome {
    Accepted,
    Duplicate,
    Failed,
}

impl PunchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PunchOutcome::Accepted => "Accepted",
            PunchOutcome::Duplicate => "Duplicate",
            PunchOutcome::Failed => "Failed",
        }
    }
}

/// Machine-readable codes explaining an outcome. Order of recording matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasonCode {
    EmployeeNotFound,
    EmployeeInactive,
    DuplicateWindow,
    LowVerificationQuality,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::EmployeeNotFound => "EmployeeNotFound",
            ReasonCode::EmployeeInactive => "EmployeeInactive",
            ReasonCode::DuplicateWindow => "DuplicateWindow",
            ReasonCode::LowVerificationQuality => "LowVerificationQuality",
        }
    }
}

/// One hash-chained ledger entry. Immutable once written; every field except
/// entry_hash participates in the digest (see hash_chain::canonical_fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchRecord {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub device_id: Uuid,
    pub employee_id: Option<Uuid>,
    pub device_user_id: String,
    pub device_serial_number: String,
    pub punch_type: PunchType,
    pub punch_time: DateTime<Utc>,
    pub received_at: DateTime<Utc>,
    pub verification_method: String,
    pub verification_quality: u8,
    pub outcome: PunchOutcome,
    pub outcome_reasons: Vec<ReasonCode>,
    pub evidence_locator: Option<String>,
    pub prior_hash: String,
    pub entry_hash: String,
    pub sequence_number: u64,
}

/// Everything the ingestion pipeline decides about a punch before the chain
/// position is known. hash_chain::seal turns a draft into a PunchRecord.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PunchDraft {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub device_id: Uuid,
    pub employee_id: Option<Uuid>,
    pub device_user_id: String,
    pub device_serial_number: String,
    pub punch_type: PunchType,
    pub punch_time: DateTime<Utc>,
    pub received_at: DateTime<Utc>,
    pub verification_method: String,
    pub verification_quality: u8,
    pub outcome: PunchOutcome,
    pub outcome_reasons: Vec<ReasonCode>,
    pub evidence_locator: Option<String>,
}

/// A registered biometric device, tenant-owned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub serial_number: String,
    pub name: String,
    pub is_active: bool,
}

/// An employee with a biometric enrollment identifier, tenant-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub enrollment_id: String,
    pub display_name: String,
    pub is_active: bool,
}
