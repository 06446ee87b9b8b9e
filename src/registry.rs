//! Paged, filterable views over issued certificates.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::certificate::{Certificate, CertificateStatus};
use crate::error::NotaryResult;
use crate::repository::CertificateRepository;

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

/// A certificate together with its derived validity status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListedCertificate {
    #[serde(flatten)]
    pub certificate: Certificate,
    pub status: CertificateStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificatePage {
    pub certificates: Vec<ListedCertificate>,
    pub pagination: Pagination,
    /// Registry-wide counts, unaffected by the status filter
    pub stats: RegistryStats,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total: usize,
    pub valid: usize,
    pub expired: usize,
}

pub struct CertificateRegistry {
    certificates: Arc<dyn CertificateRepository>,
}

impl CertificateRegistry {
    pub fn new(certificates: Arc<dyn CertificateRepository>) -> Self {
        Self { certificates }
    }

    /// List certificates, newest first.
    ///
    /// Ordering is stable across calls: issued_at descending with the id as
    /// tiebreak, so pages never shuffle between requests. `page` is
    /// 1-based; out-of-range pages return an empty list with accurate
    /// pagination metadata.
    pub async fn list(
        &self,
        page: usize,
        limit: usize,
        status: Option<CertificateStatus>,
    ) -> NotaryResult<CertificatePage> {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let now = Utc::now();

        let all = self.certificates.list_all().await?;
        let valid = all
            .iter()
            .filter(|c| c.status_at(now) == CertificateStatus::Valid)
            .count();
        let stats = RegistryStats {
            total: all.len(),
            valid,
            expired: all.len() - valid,
        };

        let mut listed: Vec<ListedCertificate> = all
            .into_iter()
            .map(|certificate| ListedCertificate {
                status: certificate.status_at(now),
                certificate,
            })
            .filter(|c| status.map_or(true, |wanted| c.status == wanted))
            .collect();

        listed.sort_by(|a, b| {
            b.certificate
                .issued_at
                .cmp(&a.certificate.issued_at)
                .then_with(|| a.certificate.id.cmp(&b.certificate.id))
        });

        let total = listed.len();
        let total_pages = total.div_ceil(limit);
        let start = (page - 1).saturating_mul(limit);
        let certificates: Vec<ListedCertificate> = listed
            .into_iter()
            .skip(start)
            .take(limit)
            .collect();

        Ok(CertificatePage {
            certificates,
            pagination: Pagination {
                page,
                limit,
                total,
                total_pages,
            },
            stats,
        })
    }

    pub async fn stats(&self) -> NotaryResult<RegistryStats> {
        let now = Utc::now();
        let all = self.certificates.list_all().await?;
        let valid = all
            .iter()
            .filter(|c| c.status_at(now) == CertificateStatus::Valid)
            .count();
        Ok(RegistryStats {
            total: all.len(),
            valid,
            expired: all.len() - valid,
        })
    }
}

/// Default page size for handlers that received no limit
pub fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::LegalWeight;
    use crate::evidence::SignatureInfo;
    use crate::repository::InMemoryCertificates;
    use chrono::Duration;
    use uuid::Uuid;

    fn cert(issued_days_ago: i64, valid_days: i64) -> Certificate {
        let issued_at = Utc::now() - Duration::days(issued_days_ago);
        Certificate {
            id: Uuid::new_v4(),
            notarization_record_id: Uuid::new_v4(),
            legal_weight: LegalWeight::Evidence,
            jurisdictions: vec!["US".to_string()],
            purpose: "audit".to_string(),
            requested_by: "alice".to_string(),
            issued_at,
            expires_at: issued_at + Duration::days(valid_days),
            digital_signature: SignatureInfo {
                algorithm: "Ed25519".to_string(),
                public_key: String::new(),
                signature: String::new(),
                signed_data_hash: String::new(),
            },
        }
    }

    async fn registry_with(certs: Vec<Certificate>) -> CertificateRegistry {
        let repo = Arc::new(InMemoryCertificates::new());
        for c in &certs {
            repo.save(c).await.unwrap();
        }
        CertificateRegistry::new(repo)
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let registry = registry_with(vec![cert(3, 365), cert(1, 365), cert(2, 365)]).await;

        let page = registry.list(1, 10, None).await.unwrap();
        assert_eq!(page.pagination.total, 3);
        let issued: Vec<_> = page
            .certificates
            .iter()
            .map(|c| c.certificate.issued_at)
            .collect();
        assert!(issued.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn test_pagination_windows() {
        let registry =
            registry_with((0..5).map(|i| cert(i as i64, 365)).collect()).await;

        let p1 = registry.list(1, 2, None).await.unwrap();
        let p2 = registry.list(2, 2, None).await.unwrap();
        let p3 = registry.list(3, 2, None).await.unwrap();

        assert_eq!(p1.certificates.len(), 2);
        assert_eq!(p2.certificates.len(), 2);
        assert_eq!(p3.certificates.len(), 1);
        assert_eq!(p1.pagination.total_pages, 3);

        // No overlap between pages
        let ids: Vec<_> = [&p1, &p2, &p3]
            .iter()
            .flat_map(|p| p.certificates.iter().map(|c| c.certificate.id))
            .collect();
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[tokio::test]
    async fn test_out_of_range_page_is_empty() {
        let registry = registry_with(vec![cert(1, 365)]).await;
        let page = registry.list(9, 10, None).await.unwrap();

        assert!(page.certificates.is_empty());
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.pagination.total_pages, 1);
    }

    #[tokio::test]
    async fn test_status_filter() {
        let registry = registry_with(vec![cert(1, 365), cert(400, 30), cert(2, 365)]).await;

        let valid = registry
            .list(1, 10, Some(CertificateStatus::Valid))
            .await
            .unwrap();
        let expired = registry
            .list(1, 10, Some(CertificateStatus::Expired))
            .await
            .unwrap();

        assert_eq!(valid.pagination.total, 2);
        assert_eq!(expired.pagination.total, 1);
        // Stats always cover the whole registry
        assert_eq!(valid.stats.total, 3);
        assert_eq!(expired.stats.total, 3);
        assert!(valid
            .certificates
            .iter()
            .all(|c| c.status == CertificateStatus::Valid));
    }

    #[tokio::test]
    async fn test_limit_is_clamped() {
        let registry = registry_with(vec![cert(1, 365)]).await;
        let page = registry.list(1, 10_000, None).await.unwrap();
        assert_eq!(page.pagination.limit, MAX_PAGE_SIZE);

        let page = registry.list(0, 0, None).await.unwrap();
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.pagination.limit, 1);
    }

    #[tokio::test]
    async fn test_stats() {
        let registry = registry_with(vec![cert(1, 365), cert(400, 30)]).await;
        let stats = registry.stats().await.unwrap();

        assert_eq!(stats.total, 2);
        assert_eq!(stats.valid, 1);
        assert_eq!(stats.expired, 1);
    }
}
