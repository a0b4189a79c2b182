//! Middleware and extractors for authentication and authorization.
//!
//! - [`auth`]: bearer-token validation and the [`auth::AuthUser`] extractor
//! - [`permission`]: per-route-group permission maps and role gates
//!
//! # Authentication flow
//!
//! 1. Client sends a request with an `Authorization: Bearer <token>` header
//! 2. [`auth::AuthUser`] verifies the JWT and rejects blacklisted tokens
//! 3. The route group's [`permission::PermissionMap`] maps the HTTP method
//!    to a permission code, which is checked against the user's role
//! 4. The handler executes if all checks pass

pub mod auth;
pub mod permission;
