// Ingestion pipeline for one raw device punch.
//
// Responsibilities
// - Validate the claimed device, resolve the employee, apply the duplicate
//   and daily-cap guards and the quality gate, store evidence, append the
//   entry to the device chain, and reconcile accepted punches into the day
//   record.
// - Every punch reaches a terminal outcome: Accepted, Duplicate or Failed in
//   the ledger, or a pre-ledger rejection inside the result. Only
//   infrastructure faults surface as Err, and those are safe to retry.
//
// Concurrency
// - The append is optimistic: read the tail, seal the record against it,
//   append naming that tail, retry from a fresh tail on mismatch. Scopes are
//   independent, so only same-device bursts ever loop here.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::errors::{IngestFault, Rejection};
use crate::application::reconcile::AttendanceReconciler;
use crate::core::gate;
use crate::core::hash_chain::{self, ChainScope};
use crate::core::ports::{Clock, DeviceDirectory, EmployeeDirectory, EvidenceStore, LedgerStore};
use crate::core::punch::{PunchDraft, PunchOutcome, PunchRecord, PunchType, ReasonCode};

const MAX_APPEND_ATTEMPTS: u32 = 5;

/// One punch as reported by a device gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchCapture {
    pub device_user_id: String,
    pub device_serial_number: String,
    pub punch_type: PunchType,
    pub punch_time: DateTime<Utc>,
    pub verification_method: String,
    pub verification_quality: u8,
    pub photo_evidence: Option<String>,
}

/// Synchronous result returned to the device gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IngestResult {
    pub success: bool,
    pub punch_record_id: Option<Uuid>,
    pub attendance_id: Option<Uuid>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl IngestResult {
    fn rejected(rejection: &Rejection) -> Self {
        Self {
            errors: vec![rejection.to_string()],
            ..Self::default()
        }
    }
}

pub struct PunchIngestService {
    devices: Arc<dyn DeviceDirectory>,
    employees: Arc<dyn EmployeeDirectory>,
    ledger: Arc<dyn LedgerStore>,
    evidence: Arc<dyn EvidenceStore>,
    clock: Arc<dyn Clock>,
    reconciler: Arc<AttendanceReconciler>,
}

impl PunchIngestService {
    pub fn new(
        devices: Arc<dyn DeviceDirectory>,
        employees: Arc<dyn EmployeeDirectory>,
        ledger: Arc<dyn LedgerStore>,
        evidence: Arc<dyn EvidenceStore>,
        clock: Arc<dyn Clock>,
        reconciler: Arc<AttendanceReconciler>,
    ) -> Self {
        Self {
            devices,
            employees,
            ledger,
            evidence,
            clock,
            reconciler,
        }
    }

    /// Process one punch to its terminal outcome.
    pub async fn process(
        &self,
        capture: PunchCapture,
        device_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<IngestResult, IngestFault> {
        tracing::info!(
            %device_id,
            device_user_id = %capture.device_user_id,
            punch_type = capture.punch_type.as_str(),
            punch_time = %capture.punch_time,
            "processing punch"
        );

        let device = match self.devices.find_device(tenant_id, device_id).await? {
            Some(device) => device,
            None => {
                tracing::warn!(%device_id, "device not found");
                return Ok(IngestResult::rejected(&Rejection::DeviceNotFound {
                    device_id,
                }));
            }
        };
        if !device.is_active {
            tracing::warn!(%device_id, name = %device.name, "inactive device attempted punch");
            return Ok(IngestResult::rejected(&Rejection::DeviceInactive {
                name: device.name,
            }));
        }

        let received_at = self.clock.now();
        let scope = ChainScope::new(tenant_id, device_id);
        let mut warnings = Vec::new();

        let resolved = self
            .employees
            .find_by_enrollment(tenant_id, &capture.device_user_id)
            .await?;

        // Unresolved or inactive employees are recorded, not dropped: the
        // entry lands in the ledger as Failed and in the triage queue.
        let employee = match resolved {
            None => {
                let error = format!(
                    "Employee not found for device user id: {}",
                    capture.device_user_id
                );
                tracing::warn!(device_user_id = %capture.device_user_id, "employee mapping failed");
                return self
                    .append_failed(
                        &scope, &capture, received_at, None,
                        ReasonCode::EmployeeNotFound, error, warnings,
                    )
                    .await;
            }
            Some(employee) if !employee.is_active => {
                let error = format!("Employee is not active: {}", employee.display_name);
                tracing::warn!(employee_id = %employee.id, "inactive employee attempted punch");
                return self
                    .append_failed(
                        &scope, &capture, received_at, Some(employee.id),
                        ReasonCode::EmployeeInactive, error, warnings,
                    )
                    .await;
            }
            Some(employee) => employee,
        };

        let day = capture.punch_time.date_naive();
        let appended_today = self
            .ledger
            .counted_punches_for_day(tenant_id, employee.id, day)
            .await?;
        if gate::daily_limit_reached(appended_today) {
            tracing::warn!(employee_id = %employee.id, %day, appended_today, "daily punch limit exceeded");
            return Ok(IngestResult::rejected(&Rejection::DailyLimitExceeded));
        }

        let last_same_type = self
            .ledger
            .last_accepted_of_type(tenant_id, employee.id, capture.punch_type)
            .await?;
        let duplicate = last_same_type
            .is_some_and(|last| gate::is_duplicate_of(last.punch_time, capture.punch_time));

        let mut reasons = Vec::new();
        let outcome = if duplicate {
            warnings.push("Duplicate punch within 15-minute window".to_string());
            reasons.push(ReasonCode::DuplicateWindow);
            tracing::warn!(employee_id = %employee.id, punch_type = capture.punch_type.as_str(), "duplicate punch detected");
            PunchOutcome::Duplicate
        } else {
            PunchOutcome::Accepted
        };

        if gate::is_low_quality(capture.verification_quality) {
            warnings.push(format!(
                "Low verification quality: {} (minimum: {})",
                capture.verification_quality,
                gate::MIN_VERIFICATION_QUALITY
            ));
            reasons.push(ReasonCode::LowVerificationQuality);
            tracing::warn!(employee_id = %employee.id, quality = capture.verification_quality, "low verification quality");
        }

        let evidence_locator = self
            .store_evidence(&capture, Some(employee.id), &scope, &mut warnings)
            .await?;

        let draft = PunchDraft {
            id: Uuid::now_v7(),
            tenant_id,
            device_id,
            employee_id: Some(employee.id),
            device_user_id: capture.device_user_id.clone(),
            device_serial_number: capture.device_serial_number.clone(),
            punch_type: capture.punch_type,
            punch_time: capture.punch_time,
            received_at,
            verification_method: capture.verification_method.clone(),
            verification_quality: capture.verification_quality,
            outcome,
            outcome_reasons: reasons,
            evidence_locator,
        };
        let record = self.append_with_retry(&scope, draft).await?;

        let mut attendance_id = None;
        if record.outcome == PunchOutcome::Accepted {
            let attendance = self.reconciler.apply(&record).await?;
            attendance_id = Some(attendance.id);
            tracing::info!(
                punch_record_id = %record.id,
                employee_id = %employee.id,
                attendance_id = %attendance.id,
                "punch processed"
            );
        }

        Ok(IngestResult {
            success: true,
            punch_record_id: Some(record.id),
            attendance_id,
            warnings,
            errors: Vec::new(),
        })
    }

    /// Append a resolution-failed punch. The event is durably preserved for
    /// forensics even though the caller sees an error.
    #[allow(clippy::too_many_arguments)]
    async fn append_failed(
        &self,
        scope: &ChainScope,
        capture: &PunchCapture,
        received_at: DateTime<Utc>,
        employee_id: Option<Uuid>,
        reason: ReasonCode,
        error: String,
        mut warnings: Vec<String>,
    ) -> Result<IngestResult, IngestFault> {
        if gate::is_low_quality(capture.verification_quality) {
            warnings.push(format!(
                "Low verification quality: {} (minimum: {})",
                capture.verification_quality,
                gate::MIN_VERIFICATION_QUALITY
            ));
        }
        let evidence_locator = self
            .store_evidence(capture, employee_id, scope, &mut warnings)
            .await?;
        let draft = PunchDraft {
            id: Uuid::now_v7(),
            tenant_id: scope.tenant_id,
            device_id: scope.device_id,
            employee_id,
            device_user_id: capture.device_user_id.clone(),
            device_serial_number: capture.device_serial_number.clone(),
            punch_type: capture.punch_type,
            punch_time: capture.punch_time,
            received_at,
            verification_method: capture.verification_method.clone(),
            verification_quality: capture.verification_quality,
            outcome: PunchOutcome::Failed,
            outcome_reasons: vec![reason],
            evidence_locator,
        };
        let record = self.append_with_retry(scope, draft).await?;
        Ok(IngestResult {
            success: false,
            punch_record_id: Some(record.id),
            attendance_id: None,
            warnings,
            errors: vec![error],
        })
    }

    async fn append_with_retry(
        &self,
        scope: &ChainScope,
        draft: PunchDraft,
    ) -> Result<PunchRecord, IngestFault> {
        use crate::core::ports::LedgerError;

        for _ in 0..MAX_APPEND_ATTEMPTS {
            let tail = self.ledger.tail(scope).await?;
            let record = hash_chain::seal(draft.clone(), &tail);
            match self.ledger.append(scope, &tail, record.clone()).await {
                Ok(()) => return Ok(record),
                Err(LedgerError::TailMismatch { .. }) => continue,
                Err(fault) => return Err(fault.into()),
            }
        }
        Err(IngestFault::Contended {
            attempts: MAX_APPEND_ATTEMPTS,
        })
    }

    /// Upload evidence when present. The no-evidence path makes zero calls to
    /// the store. Undecodable payloads are discarded with a warning rather
    /// than losing the punch; store faults propagate for retry.
    async fn store_evidence(
        &self,
        capture: &PunchCapture,
        employee_id: Option<Uuid>,
        scope: &ChainScope,
        warnings: &mut Vec<String>,
    ) -> Result<Option<String>, IngestFault> {
        let Some(photo) = capture.photo_evidence.as_deref() else {
            return Ok(None);
        };
        let bytes = match decode_photo(photo) {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::warn!(%error, "failed to decode photo evidence");
                warnings.push("Invalid photo evidence encoding; evidence discarded".to_string());
                return Ok(None);
            }
        };
        let owner = employee_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let filename = format!("{}_{}.jpg", capture.punch_time.format("%Y%m%d%H%M%S"), owner);
        let path = format!(
            "punch-evidence/{}/{}",
            scope.tenant_id, scope.device_id
        );
        let locator = self
            .evidence
            .upload(bytes, &filename, "image/jpeg", &path)
            .await?;
        tracing::info!(%locator, "evidence stored");
        Ok(Some(locator))
    }
}

/// Decode base64 evidence, tolerating a data-URI prefix.
fn decode_photo(photo: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let data = match photo.split_once(',') {
        Some((_, data)) => data,
        None => photo,
    };
    BASE64.decode(data.trim())
}
