// Ports define what the core needs from the outside world, without implementing it.
//
// Purpose
// - Describe abstract capabilities as traits: directories, the chain-owning
//   ledger store, attendance persistence, evidence storage, the clock.
//
// Boundaries
// - No concrete input or output here. Adapters implement these traits.
//
// Testing guidance
// - In-memory implementations live in adapters/in_memory for tests and local
//   development.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::core::attendance::AttendanceRecord;
use crate::core::hash_chain::{ChainScope, ChainTail};
use crate::core::punch::{Device, Employee, PunchRecord, PunchType};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// Tenant-scoped lookup: a device owned by another tenant is absent.
    async fn find_device(
        &self,
        tenant_id: Uuid,
        device_id: Uuid,
    ) -> Result<Option<Device>, DirectoryError>;
}

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Resolve a device-reported biometric identifier within one tenant.
    /// Inactive employees are still returned so the caller can tell
    /// "not enrolled" from "no longer active".
    async fn find_by_enrollment(
        &self,
        tenant_id: Uuid,
        enrollment_id: &str,
    ) -> Result<Option<Employee>, DirectoryError>;
}

#[derive(Debug, Error)]
pub enum LedgerError {
    /// A concurrent append advanced the chain first. The appender must
    /// re-read the tail and retry.
    #[error("chain tail mismatch: expected sequence {expected}, actual {actual}")]
    TailMismatch { expected: u64, actual: u64 },

    #[error("backend error: {0}")]
    Backend(String),
}

/// The append-only ledger. Appends name the tail they expect to extend;
/// the store must make the tail check and the write one atomic unit per
/// chain scope. Scopes never contend with each other.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn tail(&self, scope: &ChainScope) -> Result<ChainTail, LedgerError>;

    async fn append(
        &self,
        scope: &ChainScope,
        expected: &ChainTail,
        record: PunchRecord,
    ) -> Result<(), LedgerError>;

    /// Full chain in append order, for out-of-band verification.
    async fn load_chain(&self, scope: &ChainScope) -> Result<Vec<PunchRecord>, LedgerError>;

    /// Every chain scope a tenant owns.
    async fn chain_scopes(&self, tenant_id: Uuid) -> Result<Vec<ChainScope>, LedgerError>;

    /// Most recent Accepted punch of the given type for one employee,
    /// across all of the tenant's devices. Feeds the duplicate guard.
    async fn last_accepted_of_type(
        &self,
        tenant_id: Uuid,
        employee_id: Uuid,
        punch_type: PunchType,
    ) -> Result<Option<PunchRecord>, LedgerError>;

    /// Appended Accepted and Duplicate punches of one employee on one
    /// calendar day. Feeds the daily cap.
    async fn counted_punches_for_day(
        &self,
        tenant_id: Uuid,
        employee_id: Uuid,
        day: NaiveDate,
    ) -> Result<u32, LedgerError>;
}

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    async fn find(
        &self,
        tenant_id: Uuid,
        employee_id: Uuid,
        work_date: NaiveDate,
    ) -> anyhow::Result<Option<AttendanceRecord>>;

    async fn upsert(&self, record: AttendanceRecord) -> anyhow::Result<()>;
}

/// Opaque binary storage for punch evidence. Returns a locator for the
/// stored object.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
        path: &str,
    ) -> anyhow::Result<String>;
}

/// Clock source for server-side ingestion timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
