use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth;
use crate::db::reviews::ReviewStore;
use crate::db::submissions::SubmissionStore;
use crate::review::{self, ReviewError};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    submission_id: i64,
}

/// POST /api/reviews — run an AI review for one of the caller's submissions.
/// Blocks until the review reaches a terminal state.
pub async fn request_review(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ReviewRequest>,
) -> Result<Json<Value>, ReviewError> {
    let caller = auth::resolve_caller(
        state.pool.as_ref(),
        state.config.auth_mode,
        auth::bearer_token(&headers),
    )
    .await?;

    let completed = review::request_review(
        &state.store,
        &state.store,
        state.llm.as_deref(),
        state.config.max_code_length,
        body.submission_id,
        caller.id,
    )
    .await?;

    Ok(Json(json!({ "success": true, "review": completed })))
}

/// GET /api/reviews/:submission_id — poll path for the caller's review row.
pub async fn get_review(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(submission_id): Path<i64>,
) -> Result<Json<Value>, ReviewError> {
    let caller = auth::resolve_caller(
        state.pool.as_ref(),
        state.config.auth_mode,
        auth::bearer_token(&headers),
    )
    .await?;

    let with_content = state
        .store
        .submission_with_content(submission_id)
        .await
        .map_err(ReviewError::from)?
        .ok_or(ReviewError::NotFound)?;

    auth::verify_ownership(&with_content.submission, caller.id)?;

    let review = state
        .store
        .by_submission_id(submission_id)
        .await
        .map_err(ReviewError::from)?
        .ok_or(ReviewError::NotFound)?;

    Ok(Json(json!({ "success": true, "review": review })))
}
