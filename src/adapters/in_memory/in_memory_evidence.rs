// In memory implementation of the EvidenceStore port.
//
// Responsibilities
// - Record every upload so tests can assert the exact number of store calls:
//   a punch without evidence must make zero calls, not one with an empty
//   payload.

use tokio::sync::RwLock;

use crate::core::ports::EvidenceStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvidence {
    pub byte_count: usize,
    pub filename: String,
    pub content_type: String,
    pub path: String,
}

#[derive(Default)]
pub struct InMemoryEvidenceStore {
    uploads: RwLock<Vec<StoredEvidence>>,
}

impl InMemoryEvidenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }

    pub async fn uploads(&self) -> Vec<StoredEvidence> {
        self.uploads.read().await.clone()
    }
}

#[async_trait::async_trait]
impl EvidenceStore for InMemoryEvidenceStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
        path: &str,
    ) -> anyhow::Result<String> {
        let locator = format!("{path}/{filename}");
        self.uploads.write().await.push(StoredEvidence {
            byte_count: bytes.len(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            path: path.to_string(),
        });
        Ok(locator)
    }
}
