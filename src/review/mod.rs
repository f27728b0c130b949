mod error;

pub use error::ReviewError;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::auth;
use crate::db::reviews::{CompletedFields, ReviewStore};
use crate::db::submissions::SubmissionStore;
use crate::db::{ReviewStatus, SubmissionKind};
use crate::llm::LlmClient;

/// Outcome of a successful review request, as returned to the caller.
#[derive(Debug, Serialize)]
pub struct CompletedReview {
    pub id: i64,
    pub status: ReviewStatus,
    pub review_content: String,
    pub overall_score: Option<i32>,
    pub model_used: String,
}

/// Run one review attempt for a submission.
///
/// Preconditions are checked in order and the first failure short-circuits
/// without touching the review record. Once they pass, the record moves
/// through `pending → processing → (completed | failed)`; a repeat request
/// for the same submission re-enters at `pending` and overwrites the previous
/// result entirely. There is no internal retry — callers retry by calling
/// this again.
pub async fn request_review(
    submissions: &dyn SubmissionStore,
    reviews: &dyn ReviewStore,
    llm: Option<&dyn LlmClient>,
    max_code_length: usize,
    submission_id: i64,
    caller_id: i64,
) -> Result<CompletedReview, ReviewError> {
    let with_content = submissions
        .submission_with_content(submission_id)
        .await
        .map_err(ReviewError::from)?
        .ok_or(ReviewError::NotFound)?;

    let submission = &with_content.submission;
    auth::verify_ownership(submission, caller_id)?;

    let instructions = with_content
        .exercise_instructions
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ReviewError::NoExercise)?;

    let content = submission.content().ok_or(ReviewError::EmptySubmission)?;

    // Bounds prompt size and request cost. The prompt builder also truncates,
    // so oversize content never reaches the model in full either way.
    if submission.submission_kind == SubmissionKind::Code
        && content.chars().count() > max_code_length
    {
        return Err(ReviewError::CodeTooLong(max_code_length));
    }

    let llm = llm.ok_or(ReviewError::ServiceUnavailable)?;

    let review_id = reviews.upsert_pending(submission_id).await?;

    // Best-effort: a failed status write here matters less than reaching a
    // terminal state, so the attempt continues.
    if let Err(e) = reviews.mark_processing(review_id).await {
        warn!(error = %e, review_id, "failed to mark review as processing; continuing");
    }

    match llm
        .generate_review(instructions, content, submission.submission_kind)
        .await
    {
        Ok(generated) => {
            reviews
                .mark_completed(
                    review_id,
                    &CompletedFields {
                        review_content: generated.review_content.clone(),
                        overall_score: generated.overall_score,
                        model_used: generated.model_used.clone(),
                        prompt_tokens: generated.prompt_tokens,
                        completion_tokens: generated.completion_tokens,
                    },
                )
                .await?;

            info!(
                submission_id,
                review_id,
                overall_score = ?generated.overall_score,
                "review completed"
            );

            Ok(CompletedReview {
                id: review_id,
                status: ReviewStatus::Completed,
                review_content: generated.review_content,
                overall_score: generated.overall_score,
                model_used: generated.model_used,
            })
        }
        Err(provider_err) => {
            error!(error = %provider_err, submission_id, review_id, "review generation failed");

            if let Err(e) = reviews.mark_failed(review_id, &provider_err.to_string()).await {
                error!(error = %e, review_id, "failed to record review failure");
            }

            Err(ReviewError::Provider(provider_err))
        }
    }
}
