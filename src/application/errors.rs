// Application-level error taxonomy for the ingestion pipeline.
//
// Responsibilities
// - Rejection: domain outcomes that happen before any ledger write. These are
//   reported inside the IngestResult, never thrown.
// - IngestFault: infrastructure failures that warrant propagation so the
//   device gateway retries the same punch.

use thiserror::Error;
use uuid::Uuid;

use crate::core::gate::MAX_DAILY_PUNCHES;
use crate::core::ports::{DirectoryError, LedgerError};

/// Pre-ledger rejections. No entry is written and no sequence number is
/// consumed, so retrying the same punch is side-effect free.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Device not found: {device_id}")]
    DeviceNotFound { device_id: Uuid },

    #[error("Device is not active: {name}")]
    DeviceInactive { name: String },

    #[error("Daily punch limit exceeded ({MAX_DAILY_PUNCHES} punches per day)")]
    DailyLimitExceeded,
}

#[derive(Debug, Error)]
pub enum IngestFault {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("chain contended: gave up after {attempts} append attempts")]
    Contended { attempts: u32 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
