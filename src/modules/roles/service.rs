use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::utils::errors::{AppError, is_unique_violation};

use super::model::{AssignPermissionDto, CreateRoleDto, Permission, Role, RoleWithPermissions};

// ============ Authorization checks ============

/// Checks whether the user's role grants the given permission code.
///
/// Fails closed: a missing user, a user without a role, or an unknown
/// code all resolve to `false`. Resolution always goes through the
/// user's single `role_id`.
#[instrument(skip(db))]
pub async fn user_has_permission(
    db: &PgPool,
    user_id: Uuid,
    code: &str,
) -> Result<bool, AppError> {
    let exists: (bool,) = sqlx::query_as(
        "SELECT EXISTS (
            SELECT 1
            FROM users u
            JOIN role_permissions rp ON rp.role_id = u.role_id
            JOIN permissions p ON p.id = rp.permission_id
            WHERE u.id = $1 AND p.name = $2
        )",
    )
    .bind(user_id)
    .bind(code)
    .fetch_one(db)
    .await?;

    Ok(exists.0)
}

/// All permission codes granted by the user's role; empty when roleless.
#[instrument(skip(db))]
pub async fn user_permission_codes(db: &PgPool, user_id: Uuid) -> Result<Vec<String>, AppError> {
    let codes: Vec<String> = sqlx::query_scalar(
        "SELECT p.name
        FROM users u
        JOIN role_permissions rp ON rp.role_id = u.role_id
        JOIN permissions p ON p.id = rp.permission_id
        WHERE u.id = $1
        ORDER BY p.name",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(codes)
}

/// Checks role membership by name. A coarser channel than permission
/// codes, used for the admin-only routers.
#[instrument(skip(db))]
pub async fn user_has_any_role(
    db: &PgPool,
    user_id: Uuid,
    role_names: &[&str],
) -> Result<bool, AppError> {
    let names: Vec<String> = role_names.iter().map(|s| s.to_string()).collect();

    let exists: (bool,) = sqlx::query_as(
        "SELECT EXISTS (
            SELECT 1
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE u.id = $1 AND r.name = ANY($2)
        )",
    )
    .bind(user_id)
    .bind(&names)
    .fetch_one(db)
    .await?;

    Ok(exists.0)
}

pub async fn user_has_role(db: &PgPool, user_id: Uuid, role_name: &str) -> Result<bool, AppError> {
    user_has_any_role(db, user_id, &[role_name]).await
}

// ============ Role administration ============

#[instrument(skip(db))]
pub async fn get_all_roles(db: &PgPool) -> Result<Vec<RoleWithPermissions>, AppError> {
    let roles: Vec<Role> = sqlx::query_as(
        "SELECT id, name, description, created_at, updated_at FROM roles ORDER BY name",
    )
    .fetch_all(db)
    .await?;

    let mut result = Vec::with_capacity(roles.len());
    for role in roles {
        let permissions = permissions_for_role(db, role.id).await?;
        result.push(RoleWithPermissions { role, permissions });
    }

    Ok(result)
}

#[instrument(skip(db))]
pub async fn get_role_by_id(db: &PgPool, id: Uuid) -> Result<RoleWithPermissions, AppError> {
    let role: Role = sqlx::query_as(
        "SELECT id, name, description, created_at, updated_at FROM roles WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found("Role not found"))?;

    let permissions = permissions_for_role(db, role.id).await?;

    Ok(RoleWithPermissions { role, permissions })
}

#[instrument(skip(db, dto))]
pub async fn create_role(db: &PgPool, dto: CreateRoleDto) -> Result<RoleWithPermissions, AppError> {
    let mut tx = db.begin().await?;

    let role: Role = sqlx::query_as(
        "INSERT INTO roles (name, description)
        VALUES ($1, $2)
        RETURNING id, name, description, created_at, updated_at",
    )
    .bind(&dto.name)
    .bind(&dto.description)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::conflict(format!("Role '{}' already exists", dto.name))
        } else {
            e.into()
        }
    })?;

    if let Some(permission_ids) = &dto.permission_ids {
        for permission_id in permission_ids {
            sqlx::query(
                "INSERT INTO role_permissions (role_id, permission_id)
                VALUES ($1, $2)
                ON CONFLICT (role_id, permission_id) DO NOTHING",
            )
            .bind(role.id)
            .bind(permission_id)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    let permissions = permissions_for_role(db, role.id).await?;

    Ok(RoleWithPermissions { role, permissions })
}

#[instrument(skip(db))]
pub async fn assign_permission(
    db: &PgPool,
    role_id: Uuid,
    dto: AssignPermissionDto,
) -> Result<RoleWithPermissions, AppError> {
    ensure_role_exists(db, role_id).await?;

    let permission_exists: (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM permissions WHERE id = $1)")
            .bind(dto.permission_id)
            .fetch_one(db)
            .await?;
    if !permission_exists.0 {
        return Err(AppError::not_found("Permission not found"));
    }

    sqlx::query(
        "INSERT INTO role_permissions (role_id, permission_id)
        VALUES ($1, $2)
        ON CONFLICT (role_id, permission_id) DO NOTHING",
    )
    .bind(role_id)
    .bind(dto.permission_id)
    .execute(db)
    .await?;

    get_role_by_id(db, role_id).await
}

#[instrument(skip(db))]
pub async fn remove_permission(
    db: &PgPool,
    role_id: Uuid,
    permission_id: Uuid,
) -> Result<RoleWithPermissions, AppError> {
    ensure_role_exists(db, role_id).await?;

    sqlx::query("DELETE FROM role_permissions WHERE role_id = $1 AND permission_id = $2")
        .bind(role_id)
        .bind(permission_id)
        .execute(db)
        .await?;

    get_role_by_id(db, role_id).await
}

/// Replaces the user's role. Single role per user, so this is an update
/// of one column rather than a link-table insert.
#[instrument(skip(db))]
pub async fn assign_role_to_user(
    db: &PgPool,
    user_id: Uuid,
    role_id: Uuid,
) -> Result<(), AppError> {
    ensure_role_exists(db, role_id).await?;

    let updated = sqlx::query("UPDATE users SET role_id = $1, updated_at = NOW() WHERE id = $2")
        .bind(role_id)
        .bind(user_id)
        .execute(db)
        .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::not_found("User not found"));
    }

    Ok(())
}

#[instrument(skip(db))]
pub async fn get_all_permissions(db: &PgPool) -> Result<Vec<Permission>, AppError> {
    let permissions: Vec<Permission> = sqlx::query_as(
        "SELECT id, name, description, created_at, updated_at FROM permissions ORDER BY name",
    )
    .fetch_all(db)
    .await?;

    Ok(permissions)
}

async fn permissions_for_role(db: &PgPool, role_id: Uuid) -> Result<Vec<Permission>, AppError> {
    let permissions: Vec<Permission> = sqlx::query_as(
        "SELECT p.id, p.name, p.description, p.created_at, p.updated_at
        FROM permissions p
        JOIN role_permissions rp ON rp.permission_id = p.id
        WHERE rp.role_id = $1
        ORDER BY p.name",
    )
    .bind(role_id)
    .fetch_all(db)
    .await?;

    Ok(permissions)
}

async fn ensure_role_exists(db: &PgPool, role_id: Uuid) -> Result<(), AppError> {
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM roles WHERE id = $1)")
        .bind(role_id)
        .fetch_one(db)
        .await?;

    if !exists.0 {
        return Err(AppError::not_found("Role not found"));
    }

    Ok(())
}
