//! Claims handlers

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::debug;
use uuid::Uuid;

use core_kernel::ClaimId;
use domain_claims::{Actor, ClaimSubmission, DocumentKind, DocumentUpload};

use crate::dto::claims::*;
use crate::{error::ApiError, AppState};

/// Name of the multipart part carrying the JSON submission
pub const CLAIM_PART: &str = "claim";

/// Files a claim
///
/// Expects a multipart body with one `claim` part holding the JSON
/// submission and any number of file parts named after a document kind
/// (`id_proof`, `hospital_bill`, ...).
pub async fn create_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    let mut submission: Option<ClaimSubmission> = None;
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == CLAIM_PART {
            let body = field.bytes().await?;
            let parsed = serde_json::from_slice(&body)
                .map_err(|e| ApiError::BadRequest(format!("'claim' part is not valid JSON: {}", e)))?;
            submission = Some(parsed);
            continue;
        }

        let kind: DocumentKind = name.parse().map_err(ApiError::BadRequest)?;
        let file_name = field.file_name().unwrap_or(kind.field_name()).to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?.to_vec();

        debug!(kind = %kind, file_name = %file_name, size = bytes.len(), "Received document part");
        let upload = DocumentUpload::new(kind, file_name, bytes);
        uploads.push(match content_type {
            Some(content_type) => upload.with_content_type(content_type),
            None => upload,
        });
    }

    let submission = submission
        .ok_or_else(|| ApiError::BadRequest(format!("missing '{}' part", CLAIM_PART)))?;

    let claim = state.lifecycle.create(&actor, submission, uploads).await?;
    Ok((StatusCode::CREATED, Json(claim.into())))
}

/// Lists claims visible to the caller, newest first
pub async fn list_claims(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<ListClaimsParams>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    let claims = state.lifecycle.list(&actor, params.status).await?;
    Ok(Json(claims.into_iter().map(ClaimResponse::from).collect()))
}

pub async fn get_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = state.lifecycle.get(&actor, ClaimId::from_uuid(id)).await?;
    Ok(Json(claim.into()))
}

/// Runs fraud verification
pub async fn verify_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = state.lifecycle.verify(&actor, ClaimId::from_uuid(id)).await?;
    Ok(Json(claim.into()))
}

pub async fn approve_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = state.lifecycle.approve(&actor, ClaimId::from_uuid(id)).await?;
    Ok(Json(claim.into()))
}

pub async fn reject_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<RejectClaimRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = state
        .lifecycle
        .reject(&actor, ClaimId::from_uuid(id), &request.reason)
        .await?;
    Ok(Json(claim.into()))
}

/// Records the bank account an approved claim is paid into
pub async fn add_payout_account(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<PayoutAccountRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = state
        .lifecycle
        .add_payout_account(
            &actor,
            ClaimId::from_uuid(id),
            &request.account_number,
            &request.ifsc_code,
        )
        .await?;
    Ok(Json(claim.into()))
}
