//! Batch handlers: run, inspect, review

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;
use validator::Validate;

use core_kernel::BatchId;
use domain_claims::ClaimLoader;

use crate::dto::{
    BatchCreatedResponse, BatchResponse, FlaggedResponse, OverrideRequest, OverrideResponse,
    RunBatchRequest,
};
use crate::error::ApiError;
use crate::AppState;

fn parse_batch_id(raw: &str) -> Result<BatchId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid batch id {raw:?}")))
}

/// Runs the pipeline over an uploaded claims table
pub async fn run_batch(
    State(state): State<AppState>,
    Json(request): Json<RunBatchRequest>,
) -> Result<Json<BatchCreatedResponse>, ApiError> {
    request.validate()?;

    let loaded = ClaimLoader::default()
        .load_reader(request.claims_csv.as_bytes())
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;
    if loaded.is_empty() {
        return Err(ApiError::BadRequest(
            "claims table contained no rows".to_string(),
        ));
    }

    let report = state.pipeline.run_batch(loaded).await;
    let summary = report.summary();
    let batch_id = state.store.insert(report).await;

    info!(batch = %batch_id, total = summary.total, "Batch stored");
    Ok(Json(BatchCreatedResponse {
        batch_id: batch_id.to_string(),
        summary,
    }))
}

/// Full results table for a batch
pub async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BatchResponse>, ApiError> {
    let batch_id = parse_batch_id(&id)?;
    let (summary, rows) = state
        .store
        .table(batch_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("batch {id}")))?;

    Ok(Json(BatchResponse {
        batch_id: batch_id.to_string(),
        summary,
        rows,
    }))
}

/// Claims in the batch waiting on a reviewer
pub async fn flagged_claims(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FlaggedResponse>, ApiError> {
    let batch_id = parse_batch_id(&id)?;
    let claims = state
        .store
        .flagged(batch_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("batch {id}")))?;

    Ok(Json(FlaggedResponse {
        batch_id: batch_id.to_string(),
        claims,
    }))
}

/// Submits a reviewer override for an escalated claim
pub async fn submit_override(
    State(state): State<AppState>,
    Path((id, claim_number)): Path<(String, String)>,
    Json(request): Json<OverrideRequest>,
) -> Result<Json<OverrideResponse>, ApiError> {
    request.validate()?;
    let batch_id = parse_batch_id(&id)?;
    let verdict = request.verdict().ok_or_else(|| {
        ApiError::Validation("decision must be approve or decline".to_string())
    })?;

    let outcome = state
        .store
        .apply_override(
            batch_id,
            &claim_number,
            verdict,
            &request.reviewer,
            request.comment.clone(),
        )
        .await
        .ok_or_else(|| ApiError::NotFound(format!("batch {id}")))?;

    let claim = outcome?;
    info!(batch = %batch_id, claim = %claim_number, verdict = %verdict, "Reviewer override applied");
    Ok(Json(OverrideResponse { claim }))
}
