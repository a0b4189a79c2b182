use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{
    AssignPermissionDto, AssignRoleDto, CreateRoleDto, Permission, RoleWithPermissions,
};
use super::service;

#[utoipa::path(
    get,
    path = "/api/roles",
    responses(
        (status = 200, description = "List of roles with their permissions", body = Vec<RoleWithPermissions>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_roles(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<RoleWithPermissions>>, AppError> {
    let roles = service::get_all_roles(&state.db).await?;
    Ok(Json(roles))
}

#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role details", body = RoleWithPermissions),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_role_by_id(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RoleWithPermissions>, AppError> {
    let role = service::get_role_by_id(&state.db, id).await?;
    Ok(Json(role))
}

#[utoipa::path(
    post,
    path = "/api/roles",
    request_body = CreateRoleDto,
    responses(
        (status = 201, description = "Role created successfully", body = RoleWithPermissions),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Role name already taken")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn create_role(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateRoleDto>,
) -> Result<(StatusCode, Json<RoleWithPermissions>), AppError> {
    let role = service::create_role(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

#[utoipa::path(
    post,
    path = "/api/roles/{id}/permissions",
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    request_body = AssignPermissionDto,
    responses(
        (status = 200, description = "Permission assigned", body = RoleWithPermissions),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Role or permission not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn assign_permission(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<AssignPermissionDto>,
) -> Result<Json<RoleWithPermissions>, AppError> {
    let role = service::assign_permission(&state.db, id, dto).await?;
    Ok(Json(role))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{role_id}/permissions/{permission_id}",
    params(
        ("role_id" = Uuid, Path, description = "Role ID"),
        ("permission_id" = Uuid, Path, description = "Permission ID")
    ),
    responses(
        (status = 200, description = "Permission removed", body = RoleWithPermissions),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn remove_permission(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path((role_id, permission_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<RoleWithPermissions>, AppError> {
    let role = service::remove_permission(&state.db, role_id, permission_id).await?;
    Ok(Json(role))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/role",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = AssignRoleDto,
    responses(
        (status = 204, description = "Role assigned"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User or role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn assign_role_to_user(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<AssignRoleDto>,
) -> Result<StatusCode, AppError> {
    service::assign_role_to_user(&state.db, id, dto.role_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/roles/permissions",
    responses(
        (status = 200, description = "List of permissions", body = Vec<Permission>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_permissions(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<Permission>>, AppError> {
    let permissions = service::get_all_permissions(&state.db).await?;
    Ok(Json(permissions))
}
