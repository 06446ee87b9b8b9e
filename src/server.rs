//! HTTP API for the notarization service.
//!
//! Five operations: submit content for notarization, download the proof
//! bundle for an anchored record, generate a certificate, verify a
//! certificate, and browse the certificate registry.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::anchor::InMemoryLedger;
use crate::certificate::{Certificate, CertificateIssuer, CertificateStatus};
use crate::config::NotaryConfig;
use crate::error::NotaryError;
use crate::evidence::IssuerKey;
use crate::notarization::{EvidenceLevel, NotarizationEngine, NotarizeInput, RecordStatus};
use crate::registry::{default_page_size, CertificatePage, CertificateRegistry};
use crate::repository::{InMemoryCertificates, InMemoryRecords};
use crate::store::InMemoryStore;
use crate::verification::{VerificationService, VerificationVerdict};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<NotarizationEngine>,
    pub issuer: Arc<CertificateIssuer>,
    pub verifier: Arc<VerificationService>,
    pub registry: Arc<CertificateRegistry>,
}

impl AppState {
    /// Wire the full service against in-memory backends
    pub fn in_memory(config: &NotaryConfig) -> Self {
        if config.ledger_environment != crate::config::LedgerEnvironment::Mock {
            tracing::warn!(
                environment = ?config.ledger_environment,
                "no adapter for this ledger environment yet, using the in-memory ledger"
            );
        }
        let store = Arc::new(InMemoryStore::new());
        let ledger = Arc::new(InMemoryLedger::new());
        let records = Arc::new(InMemoryRecords::new());
        let certificates = Arc::new(InMemoryCertificates::new());
        let issuer_key = Arc::new(IssuerKey::generate());

        let engine = Arc::new(NotarizationEngine::new(
            store.clone(),
            ledger.clone(),
            records.clone(),
            issuer_key.clone(),
            config,
        ));
        let issuer = Arc::new(CertificateIssuer::new(
            records.clone(),
            certificates.clone(),
            issuer_key,
        ));
        let verifier = Arc::new(VerificationService::new(
            store,
            ledger,
            records,
            certificates.clone(),
        ));
        let registry = Arc::new(CertificateRegistry::new(certificates));

        Self {
            engine,
            issuer,
            verifier,
            registry,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/notarize", post(notarize))
        .route("/notarize/:id/proof", get(download_proof))
        .route("/certificates/generate", post(generate_certificate))
        .route("/certificates/:id/verify", get(verify_certificate))
        .route("/certificates", get(list_certificates))
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(config: NotaryConfig) -> Result<(), NotaryError> {
    let state = AppState::in_memory(&config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "notarization API listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| NotaryError::Internal(format!("server error: {}", e)))
}

// ============================================================================
// Error mapping
// ============================================================================

/// Wire shape for every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub reason: String,
    pub message: String,
}

pub struct ApiError(NotaryError);

impl From<NotaryError> for ApiError {
    fn from(err: NotaryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            NotaryError::Validation(_) => StatusCode::BAD_REQUEST,
            NotaryError::NotFound(_) => StatusCode::NOT_FOUND,
            NotaryError::RecordNotAnchored(_) => StatusCode::CONFLICT,
            NotaryError::IneligibleEvidenceLevel(_) => StatusCode::UNPROCESSABLE_ENTITY,
            NotaryError::StoreUnavailable(_)
            | NotaryError::AnchorRejected(_)
            | NotaryError::LedgerUnreachable(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = ErrorBody {
            reason: self.0.reason_code().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// POST /notarize
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotarizeRequest {
    pub capsule_id: String,
    /// Base64-encoded content bytes
    pub content: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub metadata: Value,
    pub evidence_level: EvidenceLevel,
    pub jurisdictions: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub retention_years: Option<u32>,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

async fn notarize(
    State(state): State<AppState>,
    Json(request): Json<NotarizeRequest>,
) -> ApiResult<Response> {
    let content = BASE64.decode(&request.content).map_err(|e| {
        NotaryError::Validation(format!("content is not valid base64: {}", e))
    })?;

    let record = state
        .engine
        .notarize(NotarizeInput {
            capsule_id: request.capsule_id,
            content,
            content_type: request.content_type,
            metadata: request.metadata,
            evidence_level: request.evidence_level,
            jurisdictions: request.jurisdictions,
            is_public: request.is_public,
            retention_years: request.retention_years,
        })
        .await?;

    // A failed pipeline is a completed request with a Failed record, not
    // an HTTP error
    let status = if record.status == RecordStatus::Anchored {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(record)).into_response())
}

// ============================================================================
// GET /notarize/:id/proof
// ============================================================================

async fn download_proof(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let bundle = state.engine.proof_bundle(id).await?;
    let body = serde_json::to_vec_pretty(&bundle).map_err(NotaryError::from)?;

    let disposition = format!("attachment; filename=\"proof-{}.json\"", bundle.record_id);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

// ============================================================================
// POST /certificates/generate
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCertificateRequest {
    pub notarization_record_id: Uuid,
    pub purpose: String,
    pub requested_by: String,
}

async fn generate_certificate(
    State(state): State<AppState>,
    Json(request): Json<GenerateCertificateRequest>,
) -> ApiResult<(StatusCode, Json<Certificate>)> {
    if request.purpose.trim().is_empty() {
        return Err(NotaryError::Validation("purpose must not be empty".to_string()).into());
    }
    if request.requested_by.trim().is_empty() {
        return Err(NotaryError::Validation("requestedBy must not be empty".to_string()).into());
    }

    let certificate = state
        .issuer
        .issue(
            request.notarization_record_id,
            &request.purpose,
            &request.requested_by,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(certificate)))
}

// ============================================================================
// GET /certificates/:id/verify
// ============================================================================

async fn verify_certificate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<VerificationVerdict>> {
    let verdict = state.verifier.verify_certificate(id).await?;
    Ok(Json(verdict))
}

// ============================================================================
// GET /certificates
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub status: Option<CertificateStatus>,
}

async fn list_certificates(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<CertificatePage>> {
    let page = state
        .registry
        .list(
            query.page.unwrap_or(1),
            query.limit.unwrap_or_else(default_page_size),
            query.status,
        )
        .await?;
    Ok(Json(page))
}
