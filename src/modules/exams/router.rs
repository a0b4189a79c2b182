use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

use super::controller::{
    add_rule, create_blueprint, create_manual_exam, create_question, create_question_group,
    delete_blueprint, delete_question, delete_question_group, finish_exam, generate_exam,
    get_available_exams, get_blueprint_by_id, get_blueprints, get_instance_by_id, get_instances,
    get_my_results, get_question_by_id, get_question_groups, get_questions,
    get_result_with_answers, get_results_for_student, get_rules, grade_exam, start_exam,
    submit_answer, update_instance_status, update_question,
};

/// Question bank administration.
pub fn init_question_groups_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_question_groups).post(create_question_group))
        .route("/{id}", axum::routing::delete(delete_question_group))
}

pub fn init_questions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_questions).post(create_question))
        .route(
            "/{id}",
            get(get_question_by_id)
                .put(update_question)
                .delete(delete_question),
        )
}

pub fn init_blueprints_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_blueprints).post(create_blueprint))
        .route("/{id}", get(get_blueprint_by_id).delete(delete_blueprint))
        .route("/{id}/rules", get(get_rules).post(add_rule))
}

/// Instance generation and administration.
pub fn init_exam_instances_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_instances))
        .route("/generate", post(generate_exam))
        .route("/manual", post(create_manual_exam))
        .route("/{id}", get(get_instance_by_id))
        .route("/{id}/status", patch(update_instance_status))
}

/// Teacher-facing result review and grading.
pub fn init_exam_results_router() -> Router<AppState> {
    Router::new()
        .route("/student/{student_id}", get(get_results_for_student))
        .route("/{id}", get(get_result_with_answers))
        .route("/{id}/grade", patch(grade_exam))
}

/// Student-facing exam taking.
pub fn init_my_exams_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_available_exams))
        .route("/results", get(get_my_results))
        .route("/{id}/start", post(start_exam))
        .route("/results/{id}/answers", post(submit_answer))
        .route("/results/{id}/finish", post(finish_exam))
}
