use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};

/// Account status values stored in `users.status`.
///
/// Kept as strings in the database; only `active` accounts can log in.
pub mod user_status {
    pub const ACTIVE: &str = "active";
    pub const INACTIVE: &str = "inactive";
    pub const SUSPENDED: &str = "suspended";

    pub const ALL: &[&str] = &[ACTIVE, INACTIVE, SUSPENDED];

    pub fn is_valid(status: &str) -> bool {
        ALL.contains(&status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub status: String,
    pub role_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Full name must be between 1 and 200 characters"
    ))]
    pub full_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserStatusDto {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserFilterParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    /// Filter by role name
    pub role: Option<String>,
    /// Filter by account status
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<User>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_validity() {
        assert!(user_status::is_valid("active"));
        assert!(user_status::is_valid("inactive"));
        assert!(user_status::is_valid("suspended"));
        assert!(!user_status::is_valid("banned"));
        assert!(!user_status::is_valid("Active"));
    }
}
