use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use sqlx::PgPool;

use crate::config::AuthMode;
use crate::db::{StoreError, Submission, UserRole, UserStatus};
use crate::review::ReviewError;

/// The resolved identity behind a request.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub id: i64,
    pub role: UserRole,
}

impl Caller {
    pub fn can_view_all_submissions(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Maintainer)
    }
}

/// Pull the bearer token out of the Authorization header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the caller's identity. Read-only; performs no writes.
///
/// In `Real` mode the bearer token must match a live session whose identity
/// maps to a non-deleted user. In `SeededBypass` mode (refused at startup in
/// production) the caller is the lowest-id active user, so local environments
/// work without a portal session.
pub async fn resolve_caller(
    pool: &PgPool,
    mode: AuthMode,
    token: Option<&str>,
) -> Result<Caller, ReviewError> {
    match mode {
        AuthMode::Real => {
            let token = token.ok_or(ReviewError::Unauthenticated)?;

            let auth_id = sqlx::query_scalar::<_, String>(
                "SELECT auth_id FROM sessions WHERE token = $1 AND expires_at > now()",
            )
            .bind(token)
            .fetch_optional(pool)
            .await
            .map_err(StoreError::from)?
            .ok_or(ReviewError::Unauthenticated)?;

            let user = sqlx::query_as::<_, (i64, UserRole)>(
                "SELECT id, role FROM users WHERE auth_id = $1 AND is_deleted = FALSE",
            )
            .bind(&auth_id)
            .fetch_optional(pool)
            .await
            .map_err(StoreError::from)?
            .ok_or(ReviewError::UserNotFound)?;

            Ok(Caller {
                id: user.0,
                role: user.1,
            })
        }
        AuthMode::SeededBypass => {
            let user = sqlx::query_as::<_, (i64, UserRole)>(
                r#"
                SELECT id, role FROM users
                WHERE is_deleted = FALSE AND status = $1
                ORDER BY id ASC
                LIMIT 1
                "#,
            )
            .bind(UserStatus::Active)
            .fetch_optional(pool)
            .await
            .map_err(StoreError::from)?
            .ok_or(ReviewError::NoSeedUser)?;

            Ok(Caller {
                id: user.0,
                role: user.1,
            })
        }
    }
}

/// A caller may only act on their own submission.
pub fn verify_ownership(submission: &Submission, caller_id: i64) -> Result<(), ReviewError> {
    if submission.user_id != caller_id {
        return Err(ReviewError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SubmissionKind;
    use axum::http::HeaderValue;
    use chrono::Utc;

    fn submission(user_id: i64) -> Submission {
        Submission {
            id: 1,
            user_id,
            content_id: 1,
            submission_kind: SubmissionKind::Code,
            code_content: Some("print('x')".to_string()),
            url: None,
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn owner_passes_ownership_check() {
        assert!(verify_ownership(&submission(10), 10).is_ok());
    }

    #[test]
    fn non_owner_is_forbidden() {
        let result = verify_ownership(&submission(10), 11);
        assert!(matches!(result, Err(ReviewError::Forbidden)));
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn role_gates_the_all_submissions_listing() {
        let admin = Caller {
            id: 1,
            role: UserRole::Admin,
        };
        let maintainer = Caller {
            id: 2,
            role: UserRole::Maintainer,
        };
        let member = Caller {
            id: 3,
            role: UserRole::Member,
        };

        assert!(admin.can_view_all_submissions());
        assert!(maintainer.can_view_all_submissions());
        assert!(!member.can_view_all_submissions());
    }
}
