//! Command-line setup utilities.
//!
//! The `setup-auth` subcommand seeds the authorization catalog: the four
//! built-in roles, the permission catalog, the role-to-permission grants,
//! and an initial admin account. The seeder is idempotent so it can be
//! re-run after adding new permissions to the catalog.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::permissions;
use crate::utils::password::hash_password;

/// Built-in roles and their descriptions.
const ROLES: &[(&str, &str)] = &[
    ("student", "Learner with access to own assignments and exams"),
    ("teacher", "Instructor who manages assignments, grading and exams"),
    ("manager", "Center staff with user administration access"),
    ("admin", "Full administrative access"),
];

fn grants_for_role(role: &str) -> Vec<&'static str> {
    match role {
        "student" => vec![
            permissions::VIEW_PROFILE,
            permissions::EDIT_PROFILE,
            permissions::VIEW_ASSIGNMENTS,
            permissions::SUBMIT_ASSIGNMENTS,
            permissions::VIEW_SUBMISSIONS,
            permissions::VIEW_EXAMS,
            permissions::TAKE_EXAMS,
        ],
        "teacher" => vec![
            permissions::VIEW_PROFILE,
            permissions::EDIT_PROFILE,
            permissions::VIEW_ASSIGNMENTS,
            permissions::MANAGE_ASSIGNMENTS,
            permissions::VIEW_SUBMISSIONS,
            permissions::GRADE_SUBMISSIONS,
            permissions::VIEW_EXAMS,
            permissions::MANAGE_EXAMS,
            permissions::GENERATE_REPORTS,
        ],
        "manager" => vec![
            permissions::VIEW_PROFILE,
            permissions::EDIT_PROFILE,
            permissions::VIEW_ALL_USERS,
            permissions::EDIT_ALL_USERS,
            permissions::VIEW_ASSIGNMENTS,
            permissions::VIEW_SUBMISSIONS,
            permissions::VIEW_EXAMS,
            permissions::GENERATE_REPORTS,
        ],
        // Admin holds the entire catalog.
        "admin" => permissions::CATALOG.iter().map(|(name, _)| *name).collect(),
        _ => vec![],
    }
}

/// Seeds roles, permissions and grants, then creates the initial admin
/// account. Existing rows are left untouched.
pub async fn setup_auth(
    db: &PgPool,
    admin_email: &str,
    admin_password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut tx = db.begin().await?;

    for (name, description) in permissions::CATALOG {
        sqlx::query(
            "INSERT INTO permissions (name, description) VALUES ($1, $2)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(description)
        .execute(&mut *tx)
        .await?;
    }

    for (name, description) in ROLES {
        sqlx::query(
            "INSERT INTO roles (name, description) VALUES ($1, $2)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(description)
        .execute(&mut *tx)
        .await?;

        for permission in grants_for_role(name) {
            sqlx::query(
                "INSERT INTO role_permissions (role_id, permission_id)
                 SELECT r.id, p.id FROM roles r, permissions p
                 WHERE r.name = $1 AND p.name = $2
                 ON CONFLICT (role_id, permission_id) DO NOTHING",
            )
            .bind(name)
            .bind(permission)
            .execute(&mut *tx)
            .await?;
        }
    }

    create_admin_user(&mut tx, admin_email, admin_password).await?;

    tx.commit().await?;

    Ok(())
}

async fn create_admin_user(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let hashed_password =
        hash_password(password).map_err(|e| format!("Failed to hash password: {}", e))?;

    let admin_role_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM roles WHERE name = 'admin'")
        .fetch_one(&mut **tx)
        .await?;

    let result = sqlx::query(
        "INSERT INTO users (full_name, email, password, status, role_id)
         VALUES ($1, $2, $3, 'active', $4)
         ON CONFLICT (email) DO NOTHING",
    )
    .bind("Administrator")
    .bind(email)
    .bind(hashed_password)
    .bind(admin_role_id)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err("User with this email already exists".into());
    }

    Ok(())
}
