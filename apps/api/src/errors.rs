use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Engine-level failures. Every variant is a local validation failure: the
/// engine never hands back a partially edited bracket.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BracketError {
    #[error("Category '{category}' is short {shortfall} eligible candidate(s)")]
    InsufficientPool { category: String, shortfall: usize },

    /// `viable`: catalog categories that can supply 8 eligible candidates on
    /// their own. `filled`: most categories any draw filled at once (0 when
    /// fewer than four are viable and no draw was attempted).
    #[error(
        "Could fill only {filled} of 4 categories at once; \
         {viable} can each supply 8 eligible candidates on their own"
    )]
    ExhaustedCategories { viable: usize, filled: usize },

    #[error("Candidate '{candidate}' cannot join category '{category}': {reason}")]
    InvalidCandidateForCategory {
        candidate: String,
        category: String,
        reason: String,
    },

    #[error("Unknown reference: {0}")]
    UnknownReference(String),

    #[error("Invalid tournament config: {0}")]
    InvalidConfig(String),

    #[error("Bracket invariant violated: {0}")]
    InvariantViolation(String),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error(transparent)]
    Bracket(#[from] BracketError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Bracket(e) => {
                let (status, code) = match e {
                    BracketError::InsufficientPool { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_POOL")
                    }
                    BracketError::ExhaustedCategories { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "EXHAUSTED_CATEGORIES")
                    }
                    BracketError::InvalidCandidateForCategory { .. } => {
                        (StatusCode::BAD_REQUEST, "INVALID_CANDIDATE_FOR_CATEGORY")
                    }
                    BracketError::UnknownReference(_) => {
                        (StatusCode::NOT_FOUND, "UNKNOWN_REFERENCE")
                    }
                    BracketError::InvalidConfig(_) => (StatusCode::BAD_REQUEST, "INVALID_CONFIG"),
                    BracketError::InvariantViolation(_) => {
                        tracing::error!("Bracket invariant violated: {e}");
                        (StatusCode::INTERNAL_SERVER_ERROR, "INVARIANT_VIOLATION")
                    }
                };
                (status, code, e.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_pool_maps_to_422() {
        let err = AppError::from(BracketError::InsufficientPool {
            category: "martyrs".to_string(),
            shortfall: 1,
        });
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "INSUFFICIENT_POOL");
        assert!(message.contains("martyrs"));
        assert!(message.contains('1'));
    }

    #[test]
    fn test_unknown_reference_maps_to_404() {
        let err = AppError::from(BracketError::UnknownReference("category 'x'".into()));
        assert_eq!(err.parts().0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_invalid_candidate_maps_to_400() {
        let err = AppError::from(BracketError::InvalidCandidateForCategory {
            candidate: "b1".into(),
            category: "martyrs".into(),
            reason: "already in the bracket".into(),
        });
        let (status, code, _) = err.parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "INVALID_CANDIDATE_FOR_CATEGORY");
    }

    #[test]
    fn test_internal_hides_detail() {
        let err = AppError::Internal(anyhow::anyhow!("secret path /etc/x"));
        let (status, _, message) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("secret"));
    }

    #[test]
    fn test_exhausted_categories_message_names_both_counts() {
        let err = BracketError::ExhaustedCategories {
            viable: 4,
            filled: 3,
        };
        let (status, code, message) = AppError::from(err).parts();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "EXHAUSTED_CATEGORIES");
        assert!(message.contains("only 3 of 4"), "{message}");
        assert!(message.contains("4 can each supply"), "{message}");
    }
}
