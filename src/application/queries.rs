// Read-side access to the ledger for dashboards and device sync.
//
// Purpose
// - Abstract the query surface as traits so different storage backends can
//   implement it.
//
// Notes
// - "Pending" is an explicit operator triage queue, not "all Failed punches":
//   once a failed punch has been linked to an employee or dismissed it leaves
//   the pending set for good.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::punch::PunchRecord;

pub const MAX_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// One stable page of results plus total-count metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
}

/// How an operator resolved a pending punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriageResolution {
    /// Linked to an employee after the fact (a compensating punch follows).
    Linked,
    /// Noise; reviewed and closed without linking.
    Dismissed,
}

/// Normalize pagination inputs the way the read side expects them.
pub fn clamp_page(page: u32, page_size: u32) -> (u32, u32) {
    let page = page.max(1);
    let page_size = match page_size {
        0 => DEFAULT_PAGE_SIZE,
        size => size.min(MAX_PAGE_SIZE),
    };
    (page, page_size)
}

#[async_trait]
pub trait PunchQueries: Send + Sync {
    /// Resolution-failed punches awaiting operator triage, oldest first.
    /// Empty when nothing is pending; never an error.
    async fn pending_punches(&self, tenant_id: Uuid) -> anyhow::Result<Vec<PunchRecord>>;

    /// Remove a punch from the pending set with an explicit resolution.
    async fn mark_triaged(
        &self,
        tenant_id: Uuid,
        punch_id: Uuid,
        resolution: TriageResolution,
    ) -> anyhow::Result<()>;

    /// One ledger entry by id. Absent when the id is unknown or the punch
    /// belongs to another tenant.
    async fn punch_by_id(
        &self,
        tenant_id: Uuid,
        punch_id: Uuid,
    ) -> anyhow::Result<Option<PunchRecord>>;

    /// Newest-first page of one device's punch history, with total count.
    async fn punches_by_device(
        &self,
        device_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        page: u32,
        page_size: u32,
    ) -> anyhow::Result<Page<PunchRecord>>;

    /// Time-ordered punches of one employee inside a date range.
    async fn punches_by_employee(
        &self,
        employee_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> anyhow::Result<Vec<PunchRecord>>;
}
