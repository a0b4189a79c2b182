//! Permission-map middleware.
//!
//! Each route group declares a static table mapping HTTP methods to the
//! permission code required for that method. A single middleware function
//! enforces the table: it authenticates the caller, looks up the code for
//! the request method, and checks it against the caller's role in the
//! database. Methods not present in the table only require authentication.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use crate::middleware::auth::AuthUser;
use crate::modules::roles::service as roles_service;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Method-to-permission table for one route group.
#[derive(Debug, Clone, Copy)]
pub struct PermissionMap(pub &'static [(Method, &'static str)]);

impl PermissionMap {
    /// Permission code required for `method`, if the table maps it.
    pub fn required(&self, method: &Method) -> Option<&'static str> {
        self.0
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, code)| *code)
    }
}

/// Authenticates the request and enforces the group's permission map.
///
/// Wire up with a `from_fn_with_state` closure capturing the map:
///
/// ```rust,ignore
/// .layer(middleware::from_fn_with_state(
///     state.clone(),
///     |state, req, next| enforce_permission_map(ASSIGNMENT_PERMISSIONS, state, req, next),
/// ))
/// ```
pub async fn enforce_permission_map(
    map: PermissionMap,
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;

    if let Some(code) = map.required(&parts.method) {
        let user_id = auth_user.user_id()?;
        if !roles_service::user_has_permission(&state.db, user_id, code).await? {
            return Err(AppError::permission_denied(code));
        }
    }

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Authenticates the request and requires one of the named roles.
///
/// The role is resolved from the database rather than the token, so a
/// role change takes effect before the old token expires.
pub async fn require_any_role(
    allowed_roles: &'static [&'static str],
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    let user_id = auth_user.user_id()?;

    if !roles_service::user_has_any_role(&state.db, user_id, allowed_roles).await? {
        return Err(AppError::role_denied(allowed_roles));
    }

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: PermissionMap = PermissionMap(&[
        (Method::GET, "view_assignments"),
        (Method::POST, "manage_assignments"),
        (Method::PUT, "manage_assignments"),
    ]);

    #[test]
    fn test_required_looks_up_method() {
        assert_eq!(MAP.required(&Method::GET), Some("view_assignments"));
        assert_eq!(MAP.required(&Method::POST), Some("manage_assignments"));
        assert_eq!(MAP.required(&Method::PUT), Some("manage_assignments"));
    }

    #[test]
    fn test_unmapped_method_requires_no_permission() {
        assert_eq!(MAP.required(&Method::DELETE), None);
        assert_eq!(MAP.required(&Method::PATCH), None);
    }
}
