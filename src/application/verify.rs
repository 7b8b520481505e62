// Out-of-band chain verification for one tenant.
//
// Responsibilities
// - Walk every device chain the tenant owns, recompute each entry hash in
//   sequence, and report the first violation per chain.
// - A violation halts automated trust in that chain; it is surfaced to an
//   operator workflow and never auto-repaired.

use std::sync::Arc;

use uuid::Uuid;

use crate::core::hash_chain::{self, ChainScope, ChainViolation};
use crate::core::ports::{LedgerError, LedgerStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainStatus {
    Intact,
    Tampered { violation: ChainViolation },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    pub scope: ChainScope,
    pub entries: u64,
    pub status: ChainStatus,
}

impl ChainReport {
    pub fn is_intact(&self) -> bool {
        matches!(self.status, ChainStatus::Intact)
    }
}

pub struct ChainVerifier {
    ledger: Arc<dyn LedgerStore>,
}

impl ChainVerifier {
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    /// Verify every chain of the tenant. One report per chain scope.
    pub async fn verify_tenant(&self, tenant_id: Uuid) -> Result<Vec<ChainReport>, LedgerError> {
        let mut reports = Vec::new();
        for scope in self.ledger.chain_scopes(tenant_id).await? {
            let entries = self.ledger.load_chain(&scope).await?;
            let status = match hash_chain::verify_chain(&entries) {
                Ok(()) => ChainStatus::Intact,
                Err(violation) => {
                    tracing::error!(
                        tenant_id = %scope.tenant_id,
                        device_id = %scope.device_id,
                        %violation,
                        "ledger chain tamper evidence"
                    );
                    ChainStatus::Tampered { violation }
                }
            };
            reports.push(ChainReport {
                scope,
                entries: entries.len() as u64,
                status,
            });
        }
        Ok(reports)
    }
}
