use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application error taxonomy.
///
/// Every failure that can leave a handler is one of these variants; the
/// `IntoResponse` impl converts them into a structured `{error, detail}`
/// body at the request boundary. Permission failures additionally carry
/// the missing permission code for user-facing messaging.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("You do not have the required permission: {required_permission}")]
    PermissionDenied { required_permission: String },

    #[error("You need one of the following roles: {}", required_roles.join(", "))]
    RoleDenied { required_roles: Vec<String> },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn unauthenticated(detail: impl Into<String>) -> Self {
        Self::Unauthenticated(detail.into())
    }

    pub fn permission_denied(required_permission: impl Into<String>) -> Self {
        Self::PermissionDenied {
            required_permission: required_permission.into(),
        }
    }

    pub fn role_denied(required_roles: &[&str]) -> Self {
        Self::RoleDenied {
            required_roles: required_roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound(detail.into())
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::Conflict(detail.into())
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation(detail.into())
    }

    pub fn invalid_state(detail: impl Into<String>) -> Self {
        Self::InvalidState(detail.into())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(anyhow::anyhow!(detail.into()))
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied { .. } | Self::RoleDenied { .. } => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidState(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "Unauthenticated",
            Self::PermissionDenied { .. } | Self::RoleDenied { .. } => "Permission denied",
            Self::NotFound(_) => "Not found",
            Self::Conflict(_) => "Conflict",
            Self::Validation(_) => "Validation error",
            Self::InvalidState(_) => "Invalid state",
            Self::Database(_) | Self::Internal(_) => "Internal server error",
        }
    }
}

/// True when the error is a Postgres unique-constraint violation.
///
/// Insert paths racing on a unique pair catch this to surface an explicit
/// conflict instead of a bare 500.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Database(ref e) => tracing::error!(error = %e, "Database error"),
            Self::Internal(ref e) => tracing::error!(error = %e, "Internal error"),
            _ => {}
        }

        let mut body = json!({
            "error": self.label(),
            "detail": self.to_string(),
        });

        if let Self::PermissionDenied {
            ref required_permission,
        } = self
        {
            body["required_permission"] = json!(required_permission);
        }
        if let Self::RoleDenied { ref required_roles } = self {
            body["required_roles"] = json!(required_roles);
        }

        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::unauthenticated("no token").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::permission_denied("manage_roles").status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::not_found("missing").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::conflict("duplicate").status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::validation("bad score").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::invalid_state("already completed").status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_permission_denied_carries_code() {
        let err = AppError::permission_denied("grade_submissions");
        match err {
            AppError::PermissionDenied {
                required_permission,
            } => assert_eq!(required_permission, "grade_submissions"),
            _ => panic!("wrong variant"),
        }
    }
}
