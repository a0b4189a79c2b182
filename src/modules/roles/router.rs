use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

use super::controller::{
    assign_permission, assign_role_to_user, create_role, get_permissions, get_role_by_id,
    get_roles, remove_permission,
};

pub fn init_roles_router() -> Router<AppState> {
    Router::new()
        .route("/permissions", get(get_permissions))
        .route("/", get(get_roles).post(create_role))
        .route("/{id}", get(get_role_by_id))
        .route("/{id}/permissions", post(assign_permission))
        .route(
            "/{role_id}/permissions/{permission_id}",
            delete(remove_permission),
        )
}

pub fn init_user_role_router() -> Router<AppState> {
    Router::new().route("/{id}/role", post(assign_role_to_user))
}
