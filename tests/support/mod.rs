// Shared harness for the integration suite: the full ingestion pipeline wired
// to in-memory adapters, plus a builder for punch captures.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use punch_ledger::adapters::clock::FixedClock;
use punch_ledger::adapters::in_memory::in_memory_attendance::InMemoryAttendance;
use punch_ledger::adapters::in_memory::in_memory_directory::InMemoryDirectory;
use punch_ledger::adapters::in_memory::in_memory_evidence::InMemoryEvidenceStore;
use punch_ledger::adapters::in_memory::in_memory_ledger::InMemoryLedger;
use punch_ledger::application::ingest::{IngestResult, PunchCapture, PunchIngestService};
use punch_ledger::application::reconcile::AttendanceReconciler;
use punch_ledger::core::hash_chain::ChainScope;
use punch_ledger::core::punch::{Device, Employee, PunchType};

pub const TENANT: Uuid = Uuid::from_u128(0xA1);
pub const DEVICE: Uuid = Uuid::from_u128(0xD1);
pub const INACTIVE_DEVICE: Uuid = Uuid::from_u128(0xD2);
pub const EMPLOYEE: Uuid = Uuid::from_u128(0xE1);
pub const INACTIVE_EMPLOYEE: Uuid = Uuid::from_u128(0xE2);

pub struct Harness {
    pub directory: Arc<InMemoryDirectory>,
    pub ledger: Arc<InMemoryLedger>,
    pub attendance: Arc<InMemoryAttendance>,
    pub evidence: Arc<InMemoryEvidenceStore>,
    pub service: PunchIngestService,
}

impl Harness {
    pub async fn new() -> Self {
        Self::wire(InMemoryLedger::new()).await
    }

    /// Same wiring, but every ledger call fails. Exercises the fault path of
    /// the pipeline end to end.
    pub async fn with_offline_ledger() -> Self {
        let mut ledger = InMemoryLedger::new();
        ledger.toggle_offline();
        Self::wire(ledger).await
    }

    async fn wire(ledger: InMemoryLedger) -> Self {
        let directory = Arc::new(InMemoryDirectory::new());
        let ledger = Arc::new(ledger);
        let attendance = Arc::new(InMemoryAttendance::new());
        let evidence = Arc::new(InMemoryEvidenceStore::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 2).unwrap(),
        ));
        let reconciler = Arc::new(AttendanceReconciler::new(attendance.clone()));
        let service = PunchIngestService::new(
            directory.clone(),
            directory.clone(),
            ledger.clone(),
            evidence.clone(),
            clock,
            reconciler,
        );

        directory
            .add_device(Device {
                id: DEVICE,
                tenant_id: TENANT,
                serial_number: "ZK-0001".to_string(),
                name: "Lobby".to_string(),
                is_active: true,
            })
            .await;
        directory
            .add_device(Device {
                id: INACTIVE_DEVICE,
                tenant_id: TENANT,
                serial_number: "ZK-0002".to_string(),
                name: "Basement".to_string(),
                is_active: false,
            })
            .await;
        directory
            .add_employee(Employee {
                id: EMPLOYEE,
                tenant_id: TENANT,
                enrollment_id: "42".to_string(),
                display_name: "Ada Lovelace".to_string(),
                is_active: true,
            })
            .await;
        directory
            .add_employee(Employee {
                id: INACTIVE_EMPLOYEE,
                tenant_id: TENANT,
                enrollment_id: "77".to_string(),
                display_name: "Grace Hopper".to_string(),
                is_active: false,
            })
            .await;

        Self {
            directory,
            ledger,
            attendance,
            evidence,
            service,
        }
    }

    pub async fn add_employee(&self, enrollment_id: &str, display_name: &str) -> Uuid {
        let id = Uuid::now_v7();
        self.directory
            .add_employee(Employee {
                id,
                tenant_id: TENANT,
                enrollment_id: enrollment_id.to_string(),
                display_name: display_name.to_string(),
                is_active: true,
            })
            .await;
        id
    }

    pub async fn ingest(&self, capture: PunchCapture) -> IngestResult {
        self.service
            .process(capture, DEVICE, TENANT)
            .await
            .expect("ingestion fault")
    }

    pub fn scope(&self) -> ChainScope {
        ChainScope::new(TENANT, DEVICE)
    }
}

pub struct CaptureBuilder {
    inner: PunchCapture,
}

impl Default for CaptureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBuilder {
    pub fn new() -> Self {
        Self {
            inner: PunchCapture {
                device_user_id: "42".to_string(),
                device_serial_number: "ZK-0001".to_string(),
                punch_type: PunchType::CheckIn,
                punch_time: Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap(),
                verification_method: "Fingerprint".to_string(),
                verification_quality: 95,
                photo_evidence: None,
            },
        }
    }

    pub fn user(mut self, device_user_id: impl Into<String>) -> Self {
        self.inner.device_user_id = device_user_id.into();
        self
    }

    pub fn punch_type(mut self, punch_type: PunchType) -> Self {
        self.inner.punch_type = punch_type;
        self
    }

    /// Punch time on the harness day (2026-01-05 UTC).
    pub fn at(mut self, hour: u32, minute: u32) -> Self {
        self.inner.punch_time = Utc.with_ymd_and_hms(2026, 1, 5, hour, minute, 0).unwrap();
        self
    }

    pub fn at_time(mut self, punch_time: DateTime<Utc>) -> Self {
        self.inner.punch_time = punch_time;
        self
    }

    pub fn quality(mut self, verification_quality: u8) -> Self {
        self.inner.verification_quality = verification_quality;
        self
    }

    pub fn photo(mut self, photo_base64: impl Into<String>) -> Self {
        self.inner.photo_evidence = Some(photo_base64.into());
        self
    }

    pub fn build(self) -> PunchCapture {
        self.inner
    }
}
