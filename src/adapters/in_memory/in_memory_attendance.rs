// In memory implementation of the AttendanceRepository port.
//
// Responsibilities
// - Store day records in a map keyed by (tenant, employee, work date).
// - The reconciler owns read-modify-write serialization; this adapter only
//   persists.

use std::collections::HashMap;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::attendance::AttendanceRecord;
use crate::core::ports::AttendanceRepository;

type DayKey = (Uuid, Uuid, NaiveDate);

#[derive(Default)]
pub struct InMemoryAttendance {
    rows: RwLock<HashMap<DayKey, AttendanceRecord>>,
    is_offline: bool,
}

impl InMemoryAttendance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl AttendanceRepository for InMemoryAttendance {
    async fn find(
        &self,
        tenant_id: Uuid,
        employee_id: Uuid,
        work_date: NaiveDate,
    ) -> anyhow::Result<Option<AttendanceRecord>> {
        if self.is_offline {
            anyhow::bail!("attendance repository offline");
        }
        let guard = self.rows.read().await;
        Ok(guard.get(&(tenant_id, employee_id, work_date)).cloned())
    }

    async fn upsert(&self, record: AttendanceRecord) -> anyhow::Result<()> {
        if self.is_offline {
            anyhow::bail!("attendance repository offline");
        }
        let key = (record.tenant_id, record.employee_id, record.work_date);
        self.rows.write().await.insert(key, record);
        Ok(())
    }
}
