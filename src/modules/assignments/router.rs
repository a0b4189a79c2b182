use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    create_answer_key, create_assignment, delete_answer_key, delete_assignment,
    get_answer_keys, get_assignment, get_assignment_stats, get_assignments, get_my_homework,
    get_my_submission, get_my_submissions, get_submission, get_submissions, manual_grade,
    request_resubmit, resubmit, start_homework, submit_assignment, update_assignment,
};

/// Teacher-facing assignment and answer-key management.
pub fn init_assignments_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_assignments).post(create_assignment))
        .route(
            "/{id}",
            get(get_assignment)
                .put(update_assignment)
                .delete(delete_assignment),
        )
        .route(
            "/{id}/answer-keys",
            get(get_answer_keys).post(create_answer_key),
        )
        .route("/{id}/answer-keys/{key_id}", delete(delete_answer_key))
}

/// Teacher-facing submission review and grading.
pub fn init_submissions_router() -> Router<AppState> {
    Router::new()
        .route("/assignment/{assignment_id}", get(get_submissions))
        .route(
            "/assignment/{assignment_id}/stats",
            get(get_assignment_stats),
        )
        .route("/{id}", get(get_submission))
        .route("/{id}/grade", patch(manual_grade))
        .route("/{id}/request-resubmit", post(request_resubmit))
}

/// Student-facing homework list, start and submit.
pub fn init_my_homework_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_my_homework))
        .route("/{id}/start", get(start_homework))
        .route("/{id}/submit", post(submit_assignment))
}

/// Student-facing view of own submissions, plus resubmission.
pub fn init_my_submissions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_my_submissions))
        .route("/{id}", get(get_my_submission))
        .route("/{id}/resubmit", post(resubmit))
}
