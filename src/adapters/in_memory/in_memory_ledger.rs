// In memory implementation of the LedgerStore port and the query surface.
//
// Purpose
// - Exercise the full ingestion pipeline and the read side without a database.
//
// Responsibilities
// - Store one append-only Vec per chain scope. The write lock makes the
//   expected-tail check and the append a single atomic unit per scope.
// - Serve the guard queries, the triage queue and the history queries off the
//   same chains.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::queries::{Page, PunchQueries, TriageResolution, clamp_page};
use crate::core::hash_chain::{ChainScope, ChainTail};
use crate::core::ports::{LedgerError, LedgerStore};
use crate::core::punch::{PunchOutcome, PunchRecord, PunchType, ReasonCode};

#[derive(Default)]
pub struct InMemoryLedger {
    chains: RwLock<HashMap<ChainScope, Vec<PunchRecord>>>,
    triaged: RwLock<HashSet<Uuid>>,
    is_offline: bool,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    fn check_online(&self) -> Result<(), LedgerError> {
        if self.is_offline {
            return Err(LedgerError::Backend("ledger store offline".to_string()));
        }
        Ok(())
    }

    fn tail_of(chain: &[PunchRecord]) -> ChainTail {
        match chain.last() {
            Some(last) => ChainTail {
                prior_hash: last.entry_hash.clone(),
                sequence: last.sequence_number,
            },
            None => ChainTail::genesis(),
        }
    }

    fn is_resolution_failure(record: &PunchRecord) -> bool {
        record.outcome == PunchOutcome::Failed
            && record.outcome_reasons.iter().any(|r| {
                matches!(
                    r,
                    ReasonCode::EmployeeNotFound | ReasonCode::EmployeeInactive
                )
            })
    }
}

#[async_trait::async_trait]
impl LedgerStore for InMemoryLedger {
    async fn tail(&self, scope: &ChainScope) -> Result<ChainTail, LedgerError> {
        self.check_online()?;
        let guard = self.chains.read().await;
        Ok(guard
            .get(scope)
            .map(|chain| Self::tail_of(chain))
            .unwrap_or_else(ChainTail::genesis))
    }

    async fn append(
        &self,
        scope: &ChainScope,
        expected: &ChainTail,
        record: PunchRecord,
    ) -> Result<(), LedgerError> {
        self.check_online()?;
        let mut guard = self.chains.write().await;
        let chain = guard.entry(scope.clone()).or_default();
        let actual = Self::tail_of(chain);
        if actual != *expected {
            return Err(LedgerError::TailMismatch {
                expected: expected.sequence,
                actual: actual.sequence,
            });
        }
        chain.push(record);
        Ok(())
    }

    async fn load_chain(&self, scope: &ChainScope) -> Result<Vec<PunchRecord>, LedgerError> {
        self.check_online()?;
        let guard = self.chains.read().await;
        Ok(guard.get(scope).cloned().unwrap_or_default())
    }

    async fn chain_scopes(&self, tenant_id: Uuid) -> Result<Vec<ChainScope>, LedgerError> {
        self.check_online()?;
        let guard = self.chains.read().await;
        Ok(guard
            .keys()
            .filter(|scope| scope.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn last_accepted_of_type(
        &self,
        tenant_id: Uuid,
        employee_id: Uuid,
        punch_type: PunchType,
    ) -> Result<Option<PunchRecord>, LedgerError> {
        self.check_online()?;
        let guard = self.chains.read().await;
        Ok(guard
            .iter()
            .filter(|(scope, _)| scope.tenant_id == tenant_id)
            .flat_map(|(_, chain)| chain.iter())
            .filter(|record| {
                record.employee_id == Some(employee_id)
                    && record.punch_type == punch_type
                    && record.outcome == PunchOutcome::Accepted
            })
            .max_by_key(|record| record.punch_time)
            .cloned())
    }

    async fn counted_punches_for_day(
        &self,
        tenant_id: Uuid,
        employee_id: Uuid,
        day: NaiveDate,
    ) -> Result<u32, LedgerError> {
        self.check_online()?;
        let guard = self.chains.read().await;
        let count = guard
            .iter()
            .filter(|(scope, _)| scope.tenant_id == tenant_id)
            .flat_map(|(_, chain)| chain.iter())
            .filter(|record| {
                record.employee_id == Some(employee_id)
                    && record.punch_time.date_naive() == day
                    && matches!(
                        record.outcome,
                        PunchOutcome::Accepted | PunchOutcome::Duplicate
                    )
            })
            .count();
        Ok(count as u32)
    }
}

#[async_trait::async_trait]
impl PunchQueries for InMemoryLedger {
    async fn pending_punches(&self, tenant_id: Uuid) -> anyhow::Result<Vec<PunchRecord>> {
        self.check_online()?;
        let triaged = self.triaged.read().await;
        let guard = self.chains.read().await;
        let mut pending: Vec<PunchRecord> = guard
            .iter()
            .filter(|(scope, _)| scope.tenant_id == tenant_id)
            .flat_map(|(_, chain)| chain.iter())
            .filter(|record| Self::is_resolution_failure(record) && !triaged.contains(&record.id))
            .cloned()
            .collect();
        pending.sort_by_key(|record| record.punch_time);
        Ok(pending)
    }

    async fn mark_triaged(
        &self,
        tenant_id: Uuid,
        punch_id: Uuid,
        resolution: TriageResolution,
    ) -> anyhow::Result<()> {
        self.check_online()?;
        let exists = {
            let guard = self.chains.read().await;
            guard
                .iter()
                .filter(|(scope, _)| scope.tenant_id == tenant_id)
                .flat_map(|(_, chain)| chain.iter())
                .any(|record| record.id == punch_id && Self::is_resolution_failure(record))
        };
        if !exists {
            anyhow::bail!("punch {punch_id} is not a pending resolution failure");
        }
        self.triaged.write().await.insert(punch_id);
        tracing::info!(%punch_id, ?resolution, "pending punch triaged");
        Ok(())
    }

    async fn punch_by_id(
        &self,
        tenant_id: Uuid,
        punch_id: Uuid,
    ) -> anyhow::Result<Option<PunchRecord>> {
        self.check_online()?;
        let guard = self.chains.read().await;
        Ok(guard
            .iter()
            .filter(|(scope, _)| scope.tenant_id == tenant_id)
            .flat_map(|(_, chain)| chain.iter())
            .find(|record| record.id == punch_id)
            .cloned())
    }

    async fn punches_by_device(
        &self,
        device_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        page: u32,
        page_size: u32,
    ) -> anyhow::Result<Page<PunchRecord>> {
        self.check_online()?;
        let (page, page_size) = clamp_page(page, page_size);
        let guard = self.chains.read().await;
        let mut matching: Vec<PunchRecord> = guard
            .iter()
            .filter(|(scope, _)| scope.device_id == device_id)
            .flat_map(|(_, chain)| chain.iter())
            .filter(|record| {
                from.is_none_or(|from| record.punch_time >= from)
                    && to.is_none_or(|to| record.punch_time <= to)
            })
            .cloned()
            .collect();
        // Newest first; sequence breaks punch-time ties deterministically.
        matching.sort_by(|a, b| {
            b.punch_time
                .cmp(&a.punch_time)
                .then(b.sequence_number.cmp(&a.sequence_number))
        });

        let total_count = matching.len() as u64;
        let start = ((page - 1) as usize).saturating_mul(page_size as usize);
        let items = if start >= matching.len() {
            Vec::new()
        } else {
            let end = start.saturating_add(page_size as usize).min(matching.len());
            matching[start..end].to_vec()
        };
        Ok(Page {
            items,
            total_count,
            page,
            page_size,
        })
    }

    async fn punches_by_employee(
        &self,
        employee_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> anyhow::Result<Vec<PunchRecord>> {
        self.check_online()?;
        let guard = self.chains.read().await;
        let mut matching: Vec<PunchRecord> = guard
            .values()
            .flat_map(|chain| chain.iter())
            .filter(|record| {
                record.employee_id == Some(employee_id)
                    && record.punch_time >= from
                    && record.punch_time <= to
            })
            .cloned()
            .collect();
        matching.sort_by_key(|record| record.punch_time);
        Ok(matching)
    }
}
