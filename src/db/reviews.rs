use async_trait::async_trait;

use super::{AiReview, PgStore, ReviewStatus, StoreError};

/// Result fields persisted when a review completes.
#[derive(Debug, Clone)]
pub struct CompletedFields {
    pub review_content: String,
    pub overall_score: Option<i32>,
    pub model_used: String,
    pub prompt_tokens: Option<i32>,
    pub completion_tokens: Option<i32>,
}

/// Write/read access to the per-submission review record. The orchestrator is
/// the only writer; `submission_id` is unique, so `upsert_pending` is the only
/// way a row comes into existence.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Insert-or-reset the review row for a submission to `pending`, clearing
    /// any previous result/error fields. Returns the review id.
    async fn upsert_pending(&self, submission_id: i64) -> Result<i64, StoreError>;

    async fn mark_processing(&self, review_id: i64) -> Result<(), StoreError>;

    async fn mark_completed(
        &self,
        review_id: i64,
        fields: &CompletedFields,
    ) -> Result<(), StoreError>;

    async fn mark_failed(&self, review_id: i64, message: &str) -> Result<(), StoreError>;

    async fn by_submission_id(&self, submission_id: i64) -> Result<Option<AiReview>, StoreError>;
}

#[async_trait]
impl ReviewStore for PgStore {
    async fn upsert_pending(&self, submission_id: i64) -> Result<i64, StoreError> {
        // Atomic insert-or-update keyed on submission_id; avoids duplicate
        // rows under concurrent requests.
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO ai_reviews (submission_id, status)
            VALUES ($1, $2)
            ON CONFLICT (submission_id) DO UPDATE
            SET status = EXCLUDED.status,
                review_content = NULL,
                overall_score = NULL,
                model_used = NULL,
                prompt_tokens = NULL,
                completion_tokens = NULL,
                error_message = NULL,
                reviewed_at = NULL,
                updated_at = now()
            RETURNING id
            "#,
        )
        .bind(submission_id)
        .bind(ReviewStatus::Pending)
        .fetch_one(self.pool())
        .await?;

        Ok(id)
    }

    async fn mark_processing(&self, review_id: i64) -> Result<(), StoreError> {
        sqlx::query("UPDATE ai_reviews SET status = $2, updated_at = now() WHERE id = $1")
            .bind(review_id)
            .bind(ReviewStatus::Processing)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    async fn mark_completed(
        &self,
        review_id: i64,
        fields: &CompletedFields,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE ai_reviews
            SET status = $2, review_content = $3, overall_score = $4, model_used = $5,
                prompt_tokens = $6, completion_tokens = $7, error_message = NULL,
                reviewed_at = now(), updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(review_id)
        .bind(ReviewStatus::Completed)
        .bind(&fields.review_content)
        .bind(fields.overall_score)
        .bind(&fields.model_used)
        .bind(fields.prompt_tokens)
        .bind(fields.completion_tokens)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    async fn mark_failed(&self, review_id: i64, message: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE ai_reviews
            SET status = $2, error_message = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(review_id)
        .bind(ReviewStatus::Failed)
        .bind(message)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    async fn by_submission_id(&self, submission_id: i64) -> Result<Option<AiReview>, StoreError> {
        let review = sqlx::query_as::<_, AiReview>(
            "SELECT * FROM ai_reviews WHERE submission_id = $1",
        )
        .bind(submission_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(review)
    }
}
