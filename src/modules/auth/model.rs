use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// JWT claims. `role` is the user's single role name at login time;
/// `jti` identifies the token for blacklist revocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Option<String>,
    pub jti: String,
    pub exp: usize,
    pub iat: usize,
}

/// Credential row joined with the role name, used only by login.
#[derive(Debug, FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub status: String,
    pub role_name: Option<String>,
}

// DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: ProfileResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub status: String,
    pub role: Option<String>,
    pub permissions: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogoutResponse {
    pub message: String,
}
