use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::modules::roles::service as roles_service;
use crate::modules::users::model::user_status;
use crate::utils::errors::AppError;
use crate::utils::jwt::create_access_token;
use crate::utils::password::verify_password;
use crate::utils::token_blacklist::TokenBlacklist;

use super::model::{Claims, LoginDto, LoginResponse, LogoutResponse, ProfileResponse, UserCredentials};

/// Verifies credentials and issues an access token.
///
/// Invalid email and invalid password produce the same message so the
/// response does not reveal which part failed. Only `active` accounts
/// may log in.
#[instrument(skip(db, jwt_config, dto))]
pub async fn login(
    db: &PgPool,
    jwt_config: &JwtConfig,
    dto: LoginDto,
) -> Result<LoginResponse, AppError> {
    let user: UserCredentials = sqlx::query_as(
        "SELECT u.id, u.full_name, u.email, u.password, u.status, r.name AS role_name
        FROM users u
        LEFT JOIN roles r ON r.id = u.role_id
        WHERE u.email = $1",
    )
    .bind(&dto.email)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::unauthenticated("Invalid email or password"))?;

    if !verify_password(&dto.password, &user.password)? {
        return Err(AppError::unauthenticated("Invalid email or password"));
    }

    if user.status != user_status::ACTIVE {
        return Err(AppError::unauthenticated("Account is not active"));
    }

    let access_token = create_access_token(
        user.id,
        &user.email,
        user.role_name.as_deref(),
        jwt_config,
    )?;

    let permissions = roles_service::user_permission_codes(db, user.id).await?;

    Ok(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: jwt_config.access_token_expiry,
        user: ProfileResponse {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            status: user.status,
            role: user.role_name,
            permissions,
        },
    })
}

/// Revokes the current token by blacklisting its `jti`.
pub fn logout(blacklist: &TokenBlacklist, claims: &Claims) -> LogoutResponse {
    blacklist.revoke(&claims.jti);

    LogoutResponse {
        message: "Logged out successfully".to_string(),
    }
}

#[instrument(skip(db))]
pub async fn get_profile(db: &PgPool, user_id: Uuid) -> Result<ProfileResponse, AppError> {
    let user: UserCredentials = sqlx::query_as(
        "SELECT u.id, u.full_name, u.email, u.password, u.status, r.name AS role_name
        FROM users u
        LEFT JOIN roles r ON r.id = u.role_id
        WHERE u.id = $1",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found("User not found"))?;

    let permissions = roles_service::user_permission_codes(db, user.id).await?;

    Ok(ProfileResponse {
        id: user.id,
        full_name: user.full_name,
        email: user.email,
        status: user.status,
        role: user.role_name,
        permissions,
    })
}
