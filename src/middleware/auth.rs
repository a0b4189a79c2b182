use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::modules::auth::model::Claims;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// Extractor that validates the bearer token and provides the
/// authenticated user's claims.
///
/// Tokens revoked at logout are rejected here even though their
/// signature is still valid, by checking the `jti` against the
/// blacklist in [`AppState`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Get the user ID as UUID
    pub fn user_id(&self) -> Result<uuid::Uuid, AppError> {
        uuid::Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthenticated("Invalid user ID in token"))
    }

    /// Get the user's email
    pub fn email(&self) -> &str {
        &self.0.email
    }

    /// Role name carried in the token, if the user has one assigned.
    pub fn role(&self) -> Option<&str> {
        self.0.role.as_deref()
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthenticated("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthenticated("Invalid authorization header format"))?;

        let claims = verify_token(token, &state.jwt_config)?;

        if state.token_blacklist.is_revoked(&claims.jti) {
            return Err(AppError::unauthenticated("Token has been revoked"));
        }

        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn create_test_claims(role: Option<&str>) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: role.map(|r| r.to_string()),
            jti: Uuid::new_v4().to_string(),
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn test_role_accessor() {
        let auth_user = AuthUser(create_test_claims(Some("teacher")));
        assert_eq!(auth_user.role(), Some("teacher"));

        let roleless = AuthUser(create_test_claims(None));
        assert_eq!(roleless.role(), None);
    }

    #[test]
    fn test_user_id() {
        let user_id = Uuid::new_v4();
        let mut claims = create_test_claims(None);
        claims.sub = user_id.to_string();
        let auth_user = AuthUser(claims);

        assert_eq!(auth_user.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_invalid_user_id_is_rejected() {
        let mut claims = create_test_claims(None);
        claims.sub = "not-a-uuid".to_string();
        let auth_user = AuthUser(claims);

        assert!(auth_user.user_id().is_err());
    }
}
