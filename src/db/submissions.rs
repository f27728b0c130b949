use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    PgStore, StoreError, Submission, SubmissionKind, SubmissionReviewAdminRow, SubmissionReviewRow,
};

/// A submission joined with the exercise instructions of its content item.
/// The instructions are `None` when the content is not an exercise.
#[derive(Debug, Clone)]
pub struct SubmissionWithContent {
    pub submission: Submission,
    pub exercise_instructions: Option<String>,
}

/// Read-only lookup of submissions with their exercise content.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn submission_with_content(
        &self,
        id: i64,
    ) -> Result<Option<SubmissionWithContent>, StoreError>;
}

#[derive(sqlx::FromRow)]
struct SubmissionContentRow {
    #[sqlx(flatten)]
    submission: Submission,
    exercise_instructions: Option<String>,
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn submission_with_content(
        &self,
        id: i64,
    ) -> Result<Option<SubmissionWithContent>, StoreError> {
        let row = sqlx::query_as::<_, SubmissionContentRow>(
            r#"
            SELECT s.id, s.user_id, s.content_id, s.submission_kind, s.code_content, s.url,
                   s.submitted_at, c.exercise_instructions
            FROM submissions s
            JOIN learning_contents c ON c.id = s.content_id
            WHERE s.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|r| SubmissionWithContent {
            submission: r.submission,
            exercise_instructions: r.exercise_instructions,
        }))
    }
}

pub async fn create_submission(
    pool: &PgPool,
    user_id: i64,
    content_id: i64,
    kind: SubmissionKind,
    code_content: Option<&str>,
    url: Option<&str>,
) -> Result<Submission, StoreError> {
    let submission = sqlx::query_as::<_, Submission>(
        r#"
        INSERT INTO submissions (user_id, content_id, submission_kind, code_content, url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, content_id, submission_kind, code_content, url, submitted_at
        "#,
    )
    .bind(user_id)
    .bind(content_id)
    .bind(kind)
    .bind(code_content)
    .bind(url)
    .fetch_one(pool)
    .await?;

    Ok(submission)
}

pub async fn list_for_user(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<SubmissionReviewRow>, StoreError> {
    let rows = sqlx::query_as::<_, SubmissionReviewRow>(
        r#"
        SELECT s.id, s.user_id, s.content_id, s.submission_kind, s.code_content, s.url,
               s.submitted_at, c.title AS content_title,
               r.status AS review_status, r.review_content, r.overall_score, r.model_used,
               r.reviewed_at
        FROM submissions s
        JOIN learning_contents c ON c.id = s.content_id
        LEFT JOIN ai_reviews r ON r.submission_id = s.id
        WHERE s.user_id = $1
        ORDER BY s.submitted_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<SubmissionReviewAdminRow>, StoreError> {
    let rows = sqlx::query_as::<_, SubmissionReviewAdminRow>(
        r#"
        SELECT s.id, s.user_id, s.content_id, s.submission_kind, s.code_content, s.url,
               s.submitted_at, u.display_name, u.email, c.title AS content_title,
               r.status AS review_status, r.review_content, r.overall_score, r.model_used,
               r.reviewed_at
        FROM submissions s
        JOIN users u ON u.id = s.user_id
        JOIN learning_contents c ON c.id = s.content_id
        LEFT JOIN ai_reviews r ON r.submission_id = s.id
        ORDER BY s.submitted_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
