use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::utils::errors::{AppError, is_unique_violation};
use crate::utils::pagination::PaginationMeta;
use crate::utils::password::hash_password;

use super::model::{
    CreateUserDto, PaginatedUsersResponse, UpdateUserStatusDto, User, UserFilterParams,
    user_status,
};

#[instrument(skip(db, dto))]
pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
    if let Some(role_id) = dto.role_id {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM roles WHERE id = $1)")
            .bind(role_id)
            .fetch_one(db)
            .await?;
        if !exists.0 {
            return Err(AppError::not_found("Role not found"));
        }
    }

    let password_hash = hash_password(&dto.password)?;

    let user: User = sqlx::query_as(
        "INSERT INTO users (full_name, email, password, status, role_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, full_name, email, status, role_id, created_at, updated_at",
    )
    .bind(&dto.full_name)
    .bind(&dto.email)
    .bind(&password_hash)
    .bind(user_status::ACTIVE)
    .bind(dto.role_id)
    .fetch_one(db)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::conflict(format!("Email '{}' is already registered", dto.email))
        } else {
            e.into()
        }
    })?;

    Ok(user)
}

#[instrument(skip(db))]
pub async fn get_users(
    db: &PgPool,
    params: UserFilterParams,
) -> Result<PaginatedUsersResponse, AppError> {
    let limit = params.pagination.limit();
    let offset = params.pagination.offset();

    let users: Vec<User> = sqlx::query_as(
        "SELECT u.id, u.full_name, u.email, u.status, u.role_id, u.created_at, u.updated_at
        FROM users u
        LEFT JOIN roles r ON r.id = u.role_id
        WHERE ($1::text IS NULL OR r.name = $1)
          AND ($2::text IS NULL OR u.status = $2)
        ORDER BY u.created_at DESC
        LIMIT $3 OFFSET $4",
    )
    .bind(&params.role)
    .bind(&params.status)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*)
        FROM users u
        LEFT JOIN roles r ON r.id = u.role_id
        WHERE ($1::text IS NULL OR r.name = $1)
          AND ($2::text IS NULL OR u.status = $2)",
    )
    .bind(&params.role)
    .bind(&params.status)
    .fetch_one(db)
    .await?;

    let has_more = offset + (users.len() as i64) < total.0;

    Ok(PaginatedUsersResponse {
        data: users,
        meta: PaginationMeta {
            total: total.0,
            limit,
            offset,
            has_more,
        },
    })
}

#[instrument(skip(db))]
pub async fn get_user_by_id(db: &PgPool, id: Uuid) -> Result<User, AppError> {
    let user: User = sqlx::query_as(
        "SELECT id, full_name, email, status, role_id, created_at, updated_at
        FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(user)
}

/// Sets the account status. Suspending or deactivating a user does not
/// revoke tokens already issued; those lapse at expiry.
#[instrument(skip(db))]
pub async fn update_user_status(
    db: &PgPool,
    id: Uuid,
    dto: UpdateUserStatusDto,
) -> Result<User, AppError> {
    if !user_status::is_valid(&dto.status) {
        return Err(AppError::validation(format!(
            "Status must be one of: {}",
            user_status::ALL.join(", ")
        )));
    }

    let user: User = sqlx::query_as(
        "UPDATE users SET status = $1, updated_at = NOW()
        WHERE id = $2
        RETURNING id, full_name, email, status, role_id, created_at, updated_at",
    )
    .bind(&dto.status)
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(user)
}
