// Attendance reconciler: folds accepted punches into per-day records.
//
// Responsibilities
// - Serialize the read-modify-write per (tenant, employee, work date) so a
//   racing check-in and check-out cannot lose an update.
// - Evict a day's lock entry once no task holds it, so the map does not grow
//   with every finished day.
// - Delegate the actual fold to core::attendance::apply_punch; this layer
//   only owns locking and persistence.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::attendance::{self, AttendanceRecord};
use crate::core::ports::AttendanceRepository;
use crate::core::punch::{PunchOutcome, PunchRecord};

type DayKey = (Uuid, Uuid, NaiveDate);

pub struct AttendanceReconciler {
    repository: Arc<dyn AttendanceRepository>,
    locks: Mutex<HashMap<DayKey, Arc<Mutex<()>>>>,
}

impl AttendanceReconciler {
    pub fn new(repository: Arc<dyn AttendanceRepository>) -> Self {
        Self {
            repository,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Fold one accepted punch into its day record and persist the result.
    pub async fn apply(&self, punch: &PunchRecord) -> anyhow::Result<AttendanceRecord> {
        if punch.outcome != PunchOutcome::Accepted {
            anyhow::bail!("only accepted punches reconcile into attendance");
        }
        let Some(employee_id) = punch.employee_id else {
            anyhow::bail!("accepted punch without a resolved employee");
        };

        let work_date = attendance::work_date(punch.punch_time);
        let key = (punch.tenant_id, employee_id, work_date);
        let day_lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        let folded = {
            let _guard = day_lock.lock().await;
            self.fold(punch, employee_id, work_date).await
        };

        // Two owners means the map entry plus ours: no task waits on this
        // key, so the entry can go. A later punch inserts a fresh lock.
        let mut locks = self.locks.lock().await;
        if locks
            .get(&key)
            .is_some_and(|entry| Arc::strong_count(entry) == 2)
        {
            locks.remove(&key);
        }
        drop(locks);

        folded
    }

    async fn fold(
        &self,
        punch: &PunchRecord,
        employee_id: Uuid,
        work_date: NaiveDate,
    ) -> anyhow::Result<AttendanceRecord> {
        let existing = self
            .repository
            .find(punch.tenant_id, employee_id, work_date)
            .await?;
        let updated = attendance::apply_punch(existing, employee_id, punch);
        self.repository.upsert(updated.clone()).await?;
        tracing::debug!(
            attendance_id = %updated.id,
            %employee_id,
            %work_date,
            punch_type = punch.punch_type.as_str(),
            "attendance reconciled"
        );
        Ok(updated)
    }
}
