use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth;
use crate::db::submissions as submissions_db;
use crate::db::SubmissionKind;
use crate::review::ReviewError;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmission {
    content_id: i64,
    submission_kind: SubmissionKind,
    code_content: Option<String>,
    url: Option<String>,
}

/// POST /api/submissions — record the caller's attempt at an exercise.
/// Submissions are immutable once created.
pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateSubmission>,
) -> Result<Json<Value>, ReviewError> {
    let caller = auth::resolve_caller(
        state.pool.as_ref(),
        state.config.auth_mode,
        auth::bearer_token(&headers),
    )
    .await?;

    let (code_content, url) = match body.submission_kind {
        SubmissionKind::Code => {
            let code = body
                .code_content
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    ReviewError::BadRequest("codeContent is required for code submissions".into())
                })?;
            (Some(code), None)
        }
        SubmissionKind::Url => {
            let url = body
                .url
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    ReviewError::BadRequest("url is required for url submissions".into())
                })?;
            (None, Some(url))
        }
    };

    let submission = submissions_db::create_submission(
        state.pool.as_ref(),
        caller.id,
        body.content_id,
        body.submission_kind,
        code_content,
        url,
    )
    .await?;

    Ok(Json(json!({ "success": true, "submission": submission })))
}

/// GET /api/submissions — the caller's submissions with their reviews.
pub async fn list_mine(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ReviewError> {
    let caller = auth::resolve_caller(
        state.pool.as_ref(),
        state.config.auth_mode,
        auth::bearer_token(&headers),
    )
    .await?;

    let rows = submissions_db::list_for_user(state.pool.as_ref(), caller.id).await?;

    Ok(Json(json!({ "success": true, "submissions": rows })))
}

/// GET /api/submissions/all — every learner's submissions with reviews.
/// Admin/maintainer only.
pub async fn list_all(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ReviewError> {
    let caller = auth::resolve_caller(
        state.pool.as_ref(),
        state.config.auth_mode,
        auth::bearer_token(&headers),
    )
    .await?;

    if !caller.can_view_all_submissions() {
        return Err(ReviewError::Forbidden);
    }

    let rows = submissions_db::list_all(state.pool.as_ref()).await?;

    Ok(Json(json!({ "success": true, "submissions": rows })))
}
