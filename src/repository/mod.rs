//! Persistence traits for notarization records and certificates.
//!
//! Backends are swappable behind async traits; the in-memory implementations
//! back the default server wiring and the test suite.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::certificate::Certificate;
use crate::error::NotaryResult;
use crate::notarization::NotarizationRecord;

/// Storage for notarization records
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Insert or replace a record. Records are saved at every status
    /// transition, so the latest save wins.
    async fn save(&self, record: &NotarizationRecord) -> NotaryResult<()>;

    /// Load a record by id
    async fn load(&self, id: Uuid) -> NotaryResult<Option<NotarizationRecord>>;

    async fn count(&self) -> NotaryResult<usize>;
}

/// Storage for issued certificates
#[async_trait]
pub trait CertificateRepository: Send + Sync {
    async fn save(&self, certificate: &Certificate) -> NotaryResult<()>;

    async fn load(&self, id: Uuid) -> NotaryResult<Option<Certificate>>;

    /// All certificates, in no particular order; callers sort
    async fn list_all(&self) -> NotaryResult<Vec<Certificate>>;
}

/// In-memory record repository
#[derive(Default)]
pub struct InMemoryRecords {
    records: Arc<RwLock<HashMap<Uuid, NotarizationRecord>>>,
}

impl InMemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordRepository for InMemoryRecords {
    async fn save(&self, record: &NotarizationRecord) -> NotaryResult<()> {
        self.records
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, id: Uuid) -> NotaryResult<Option<NotarizationRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn count(&self) -> NotaryResult<usize> {
        Ok(self.records.read().await.len())
    }
}

/// In-memory certificate repository
#[derive(Default)]
pub struct InMemoryCertificates {
    certificates: Arc<RwLock<HashMap<Uuid, Certificate>>>,
}

impl InMemoryCertificates {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CertificateRepository for InMemoryCertificates {
    async fn save(&self, certificate: &Certificate) -> NotaryResult<()> {
        self.certificates
            .write()
            .await
            .insert(certificate.id, certificate.clone());
        Ok(())
    }

    async fn load(&self, id: Uuid) -> NotaryResult<Option<Certificate>> {
        Ok(self.certificates.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> NotaryResult<Vec<Certificate>> {
        Ok(self.certificates.read().await.values().cloned().collect())
    }
}
