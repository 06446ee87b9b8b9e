use std::sync::Arc;

use serde_json::json;

use veriseal::anchor::{AnchorLedger, InMemoryLedger};
use veriseal::certificate::CertificateIssuer;
use veriseal::config::NotaryConfig;
use veriseal::evidence::IssuerKey;
use veriseal::notarization::{NotarizationEngine, NotarizeInput};
use veriseal::registry::CertificateRegistry;
use veriseal::repository::{InMemoryCertificates, InMemoryRecords};
use veriseal::store::{ContentStore, InMemoryStore};
use veriseal::verification::VerificationService;
use veriseal::{CheckResult, EvidenceLevel, LegalWeight, RecordStatus};

struct Pipeline {
    store: Arc<InMemoryStore>,
    ledger: Arc<InMemoryLedger>,
    engine: NotarizationEngine,
    issuer: CertificateIssuer,
    verifier: VerificationService,
    registry: CertificateRegistry,
}

fn pipeline() -> Pipeline {
    let store = Arc::new(InMemoryStore::new());
    let ledger = Arc::new(InMemoryLedger::new());
    let records = Arc::new(InMemoryRecords::new());
    let certificates = Arc::new(InMemoryCertificates::new());
    let key = Arc::new(IssuerKey::generate());

    Pipeline {
        store: store.clone(),
        ledger: ledger.clone(),
        engine: NotarizationEngine::new(
            store.clone(),
            ledger.clone(),
            records.clone(),
            key.clone(),
            &NotaryConfig::default(),
        ),
        issuer: CertificateIssuer::new(records.clone(), certificates.clone(), key),
        verifier: VerificationService::new(store, ledger, records, certificates.clone()),
        registry: CertificateRegistry::new(certificates),
    }
}

/// Test the complete workflow: notarize, certify, verify, detect tampering
#[tokio::test]
async fn test_complete_notarization_workflow() {
    let pipeline = pipeline();

    // Step 1: Notarize content at the legal evidence tier
    let record = pipeline
        .engine
        .notarize(NotarizeInput {
            capsule_id: "capsule-e2e".to_string(),
            content: b"hello world".to_vec(),
            content_type: "text/plain".to_string(),
            metadata: json!({"title": "t"}),
            evidence_level: EvidenceLevel::Legal,
            jurisdictions: vec!["US".to_string()],
            is_public: false,
            retention_years: Some(50),
        })
        .await
        .unwrap();

    assert_eq!(record.status, RecordStatus::Anchored);
    let proof = record.anchor_proof.clone().unwrap();
    assert!(proof.transaction_id.starts_with("0x"));

    // Step 2: The ledger reports the commitment as included
    assert_eq!(
        pipeline
            .ledger
            .query_inclusion(&proof.transaction_id)
            .await
            .unwrap(),
        veriseal::anchor::InclusionStatus::Included
    );

    // Step 3: Issue a certificate against the anchored record
    let certificate = pipeline
        .issuer
        .issue(record.id, "audit", "alice")
        .await
        .unwrap();
    assert_eq!(certificate.legal_weight, LegalWeight::Notarized);
    assert_eq!(certificate.jurisdictions, vec!["US"]);

    // Step 4: A clean verification passes every check
    let verdict = pipeline
        .verifier
        .verify_certificate(certificate.id)
        .await
        .unwrap();
    assert_eq!(verdict.overall_result, CheckResult::Valid);
    assert!(verdict
        .checks
        .iter()
        .all(|c| c.result == CheckResult::Valid));

    // Step 5: The certificate shows up in the registry
    let page = pipeline.registry.list(1, 10, None).await.unwrap();
    assert_eq!(page.pagination.total, 1);
    assert_eq!(page.certificates[0].certificate.id, certificate.id);

    // Step 6: Tamper with the stored content behind the record's back
    let address = record.content_address.clone().unwrap();
    let mut bytes = pipeline.store.get(&address).await.unwrap().unwrap();
    bytes[0] ^= 0xff;
    pipeline.store.overwrite(&address, bytes).await;

    // Step 7: Verification now condemns the certificate via the hash check
    let verdict = pipeline
        .verifier
        .verify_certificate(certificate.id)
        .await
        .unwrap();
    assert_eq!(verdict.overall_result, CheckResult::Invalid);
    let hash_check = verdict
        .checks
        .iter()
        .find(|c| c.name == "content_hash")
        .unwrap();
    assert_eq!(hash_check.result, CheckResult::Invalid);

    // The signature itself is still genuine; only the content changed
    let signature_check = verdict
        .checks
        .iter()
        .find(|c| c.name == "certificate_signature")
        .unwrap();
    assert_eq!(signature_check.result, CheckResult::Valid);
}

/// Identical content anchors once; distinct submissions share the proof
#[tokio::test]
async fn test_duplicate_content_shares_anchor() {
    let pipeline = pipeline();
    let input = || NotarizeInput {
        capsule_id: "capsule-dup".to_string(),
        content: b"same content".to_vec(),
        content_type: "text/plain".to_string(),
        metadata: json!({"k": 1}),
        evidence_level: EvidenceLevel::Enhanced,
        jurisdictions: vec!["DE".to_string(), "FR".to_string()],
        is_public: true,
        retention_years: None,
    };

    let first = pipeline.engine.notarize(input()).await.unwrap();
    let second = pipeline.engine.notarize(input()).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.content_digest, second.content_digest);
    assert_eq!(
        first.anchor_proof.unwrap().transaction_id,
        second.anchor_proof.unwrap().transaction_id
    );
    assert_eq!(pipeline.ledger.anchor_count().await, 1);
}

/// An anchor failure leaves an auditable failed record but no certificate
#[tokio::test]
async fn test_failed_notarization_cannot_be_certified() {
    let store = Arc::new(InMemoryStore::new());
    let ledger = Arc::new(InMemoryLedger::rejecting());
    let records = Arc::new(InMemoryRecords::new());
    let certificates = Arc::new(InMemoryCertificates::new());
    let key = Arc::new(IssuerKey::generate());

    let engine = NotarizationEngine::new(
        store,
        ledger,
        records.clone(),
        key.clone(),
        &NotaryConfig::default(),
    );
    let issuer = CertificateIssuer::new(records, certificates, key);

    let record = engine
        .notarize(NotarizeInput {
            capsule_id: "capsule-fail".to_string(),
            content: b"doomed".to_vec(),
            content_type: "text/plain".to_string(),
            metadata: json!({}),
            evidence_level: EvidenceLevel::Legal,
            jurisdictions: vec!["US".to_string()],
            is_public: false,
            retention_years: None,
        })
        .await
        .unwrap();

    assert_eq!(record.status, RecordStatus::Failed);
    assert!(record.content_address.is_some());

    let result = issuer.issue(record.id, "audit", "alice").await;
    assert!(matches!(
        result,
        Err(veriseal::NotaryError::RecordNotAnchored(_))
    ));
}
