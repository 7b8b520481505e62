// Attendance day records and the pure fold from accepted punches.
//
// Purpose
// - AttendanceRecord is a materialized view over the accepted punch stream:
//   recomputable, never authoritative over the ledger.
//
// Responsibilities
// - apply_punch: deterministic transition of the (employee, day) record for
//   one accepted punch. First check-in wins, latest check-out wins.
// - working_hours: fixed lunch policy, strictly more than 5 raw hours deducts
//   exactly 1 hour.
//
// Boundaries
// - No I/O. The reconciler owns persistence and per-key serialization.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::punch::{PunchRecord, PunchType};

/// Raw hours above this threshold trigger the lunch deduction.
pub const LUNCH_BREAK_THRESHOLD_HOURS: f64 = 5.0;

/// Exactly this much is deducted, never prorated.
pub const LUNCH_BREAK_HOURS: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub employee_id: Uuid,
    pub work_date: NaiveDate,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub working_hours: Option<f64>,
    pub source_punch_ids: Vec<Uuid>,
}

/// Calendar day a punch belongs to, in UTC.
pub fn work_date(punch_time: DateTime<Utc>) -> NaiveDate {
    punch_time.date_naive()
}

/// Fractional working hours for a closed day. Raw span above the lunch
/// threshold loses the fixed break; the result clamps at zero and is rounded
/// to two decimals.
pub fn working_hours(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> f64 {
    let raw = (check_out - check_in).num_seconds() as f64 / 3600.0;
    let net = if raw > LUNCH_BREAK_THRESHOLD_HOURS {
        raw - LUNCH_BREAK_HOURS
    } else {
        raw
    };
    (net.max(0.0) * 100.0).round() / 100.0
}

/// Fold one accepted punch into the day record, creating it when absent.
/// A check-out without a captured check-in still opens the record so the
/// punch is not lost (overnight and missed-scan edge cases).
pub fn apply_punch(
    existing: Option<AttendanceRecord>,
    employee_id: Uuid,
    punch: &PunchRecord,
) -> AttendanceRecord {
    let mut record = existing.unwrap_or_else(|| AttendanceRecord {
        id: Uuid::now_v7(),
        tenant_id: punch.tenant_id,
        employee_id,
        work_date: work_date(punch.punch_time),
        check_in_time: None,
        check_out_time: None,
        working_hours: None,
        source_punch_ids: Vec::new(),
    });

    match punch.punch_type {
        PunchType::CheckIn => {
            if record.check_in_time.is_none() {
                record.check_in_time = Some(punch.punch_time);
            }
        }
        PunchType::CheckOut => {
            let extends = record
                .check_out_time
                .is_none_or(|current| punch.punch_time > current);
            if extends {
                record.check_out_time = Some(punch.punch_time);
            }
        }
    }

    if let (Some(check_in), Some(check_out)) = (record.check_in_time, record.check_out_time) {
        record.working_hours = Some(working_hours(check_in, check_out));
    }

    if !record.source_punch_ids.contains(&punch.id) {
        record.source_punch_ids.push(punch.id);
    }

    record
}
