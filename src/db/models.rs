use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Maintainer,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Pending,
    Active,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "submission_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    Code,
    Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "review_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// A learner's attempt at an exercise. Immutable once created: exactly one of
/// `code_content` / `url` is set, matching `submission_kind` (enforced by a
/// CHECK constraint).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Submission {
    pub id: i64,
    pub user_id: i64,
    pub content_id: i64,
    pub submission_kind: SubmissionKind,
    pub code_content: Option<String>,
    pub url: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    /// The submitted payload for this submission's kind, if non-empty.
    pub fn content(&self) -> Option<&str> {
        let raw = match self.submission_kind {
            SubmissionKind::Code => self.code_content.as_deref(),
            SubmissionKind::Url => self.url.as_deref(),
        };
        raw.map(str::trim).filter(|s| !s.is_empty())
    }
}

/// The single review record for a submission (`submission_id` is unique).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AiReview {
    pub id: i64,
    pub submission_id: i64,
    pub status: ReviewStatus,
    pub review_content: Option<String>,
    pub overall_score: Option<i32>,
    pub model_used: Option<String>,
    pub prompt_tokens: Option<i32>,
    pub completion_tokens: Option<i32>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// A submission joined with its content title and (optional) review, as shown
/// in the learner's submission list.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubmissionReviewRow {
    pub id: i64,
    pub user_id: i64,
    pub content_id: i64,
    pub submission_kind: SubmissionKind,
    pub code_content: Option<String>,
    pub url: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub content_title: String,
    pub review_status: Option<ReviewStatus>,
    pub review_content: Option<String>,
    pub overall_score: Option<i32>,
    pub model_used: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Instructor/admin listing row: every learner's submission with the
/// submitting user attached.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubmissionReviewAdminRow {
    pub id: i64,
    pub user_id: i64,
    pub content_id: i64,
    pub submission_kind: SubmissionKind,
    pub code_content: Option<String>,
    pub url: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub display_name: String,
    pub email: String,
    pub content_title: String,
    pub review_status: Option<ReviewStatus>,
    pub review_content: Option<String>,
    pub overall_score: Option<i32>,
    pub model_used: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(kind: SubmissionKind, code: Option<&str>, url: Option<&str>) -> Submission {
        Submission {
            id: 1,
            user_id: 1,
            content_id: 1,
            submission_kind: kind,
            code_content: code.map(String::from),
            url: url.map(String::from),
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn content_picks_field_for_kind() {
        let code = submission(SubmissionKind::Code, Some("print('x')"), None);
        assert_eq!(code.content(), Some("print('x')"));

        let url = submission(SubmissionKind::Url, None, Some("https://example.com"));
        assert_eq!(url.content(), Some("https://example.com"));
    }

    #[test]
    fn blank_content_is_treated_as_missing() {
        let blank = submission(SubmissionKind::Code, Some("   \n"), None);
        assert_eq!(blank.content(), None);

        let mismatched = submission(SubmissionKind::Code, None, Some("https://example.com"));
        assert_eq!(mismatched.content(), None);
    }
}
