use axum::{
    Router,
    routing::{get, patch},
};

use crate::state::AppState;

use super::controller::{create_user, get_user_by_id, get_users, update_user_status};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_users).post(create_user))
        .route("/{id}", get(get_user_by_id))
        .route("/{id}/status", patch(update_user_status))
}
