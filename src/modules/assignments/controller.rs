use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{
    AnswerKey, Assignment, AssignmentFilterParams, AssignmentStats, CreateAnswerKeyDto,
    CreateAssignmentDto, HomeworkView, ManualGradeDto, PaginatedAssignmentsResponse,
    PaginatedHomeworkResponse, RequestResubmitDto, SubmitAssignmentDto, Submission,
    SubmissionWithAnswers, UpdateAssignmentDto,
};
use super::service;

// ============ Teacher: assignments ============

#[utoipa::path(
    post,
    path = "/api/assignments",
    request_body = CreateAssignmentDto,
    responses(
        (status = 201, description = "Assignment created", body = Assignment),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Class session not found")
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
pub async fn create_assignment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateAssignmentDto>,
) -> Result<(StatusCode, Json<Assignment>), AppError> {
    let assignment = service::create_assignment(&state.db, auth_user.user_id()?, dto).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

#[utoipa::path(
    get,
    path = "/api/assignments",
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("limit" = Option<i64>, Query, description = "Page size"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Assignments in the caller's sessions", body = PaginatedAssignmentsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
pub async fn get_assignments(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<AssignmentFilterParams>,
) -> Result<Json<PaginatedAssignmentsResponse>, AppError> {
    let assignments = service::get_assignments(&state.db, auth_user.user_id()?, params).await?;
    Ok(Json(assignments))
}

#[utoipa::path(
    get,
    path = "/api/assignments/{id}",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment details", body = Assignment),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Assignment not found")
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
pub async fn get_assignment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = service::get_assignment(&state.db, auth_user.user_id()?, id).await?;
    Ok(Json(assignment))
}

#[utoipa::path(
    put,
    path = "/api/assignments/{id}",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body = UpdateAssignmentDto,
    responses(
        (status = 200, description = "Assignment updated", body = Assignment),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Assignment not found"),
        (status = 422, description = "Unknown status value")
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
pub async fn update_assignment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateAssignmentDto>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = service::update_assignment(&state.db, auth_user.user_id()?, id, dto).await?;
    Ok(Json(assignment))
}

#[utoipa::path(
    delete,
    path = "/api/assignments/{id}",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Assignment not found")
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
pub async fn delete_assignment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service::delete_assignment(&state.db, auth_user.user_id()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============ Teacher: answer keys ============

#[utoipa::path(
    post,
    path = "/api/assignments/{id}/answer-keys",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body = CreateAnswerKeyDto,
    responses(
        (status = 201, description = "Answer key created", body = AnswerKey),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Assignment not found")
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
pub async fn create_answer_key(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateAnswerKeyDto>,
) -> Result<(StatusCode, Json<AnswerKey>), AppError> {
    let key = service::create_answer_key(&state.db, auth_user.user_id()?, id, dto).await?;
    Ok((StatusCode::CREATED, Json(key)))
}

#[utoipa::path(
    get,
    path = "/api/assignments/{id}/answer-keys",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Answer keys", body = Vec<AnswerKey>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Assignment not found")
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
pub async fn get_answer_keys(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AnswerKey>>, AppError> {
    let keys = service::get_answer_keys(&state.db, auth_user.user_id()?, id).await?;
    Ok(Json(keys))
}

#[utoipa::path(
    delete,
    path = "/api/assignments/{id}/answer-keys/{key_id}",
    params(
        ("id" = Uuid, Path, description = "Assignment ID"),
        ("key_id" = Uuid, Path, description = "Answer key ID")
    ),
    responses(
        (status = 204, description = "Answer key deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Assignment or answer key not found")
    ),
    tag = "Assignments",
    security(("bearer_auth" = []))
)]
pub async fn delete_answer_key(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, key_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    service::delete_answer_key(&state.db, auth_user.user_id()?, id, key_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============ Teacher: submissions ============

#[utoipa::path(
    get,
    path = "/api/submissions/assignment/{assignment_id}",
    params(("assignment_id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Submissions for the assignment", body = Vec<Submission>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Assignment not found")
    ),
    tag = "Submissions",
    security(("bearer_auth" = []))
)]
pub async fn get_submissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(assignment_id): Path<Uuid>,
) -> Result<Json<Vec<Submission>>, AppError> {
    let submissions =
        service::get_submissions(&state.db, auth_user.user_id()?, assignment_id).await?;
    Ok(Json(submissions))
}

#[utoipa::path(
    get,
    path = "/api/submissions/assignment/{assignment_id}/stats",
    params(("assignment_id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Submission statistics", body = AssignmentStats),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Assignment not found")
    ),
    tag = "Submissions",
    security(("bearer_auth" = []))
)]
pub async fn get_assignment_stats(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(assignment_id): Path<Uuid>,
) -> Result<Json<AssignmentStats>, AppError> {
    let stats =
        service::get_assignment_stats(&state.db, auth_user.user_id()?, assignment_id).await?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/submissions/{id}",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission with answers", body = SubmissionWithAnswers),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Submission not found")
    ),
    tag = "Submissions",
    security(("bearer_auth" = []))
)]
pub async fn get_submission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionWithAnswers>, AppError> {
    let submission = service::get_submission(&state.db, auth_user.user_id()?, id).await?;
    Ok(Json(submission))
}

#[utoipa::path(
    patch,
    path = "/api/submissions/{id}/grade",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = ManualGradeDto,
    responses(
        (status = 200, description = "Submission graded", body = Submission),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Submission not found"),
        (status = 422, description = "Result out of range")
    ),
    tag = "Submissions",
    security(("bearer_auth" = []))
)]
pub async fn manual_grade(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<ManualGradeDto>,
) -> Result<Json<Submission>, AppError> {
    let submission = service::manual_grade(&state.db, auth_user.user_id()?, id, dto).await?;
    Ok(Json(submission))
}

#[utoipa::path(
    post,
    path = "/api/submissions/{id}/request-resubmit",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = RequestResubmitDto,
    responses(
        (status = 200, description = "Resubmission requested", body = Submission),
        (status = 400, description = "Submission is not graded"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Submission not found")
    ),
    tag = "Submissions",
    security(("bearer_auth" = []))
)]
pub async fn request_resubmit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<RequestResubmitDto>,
) -> Result<Json<Submission>, AppError> {
    let submission = service::request_resubmit(&state.db, auth_user.user_id()?, id, dto).await?;
    Ok(Json(submission))
}

// ============ Student: homework ============

#[utoipa::path(
    get,
    path = "/api/my-homework",
    params(
        ("limit" = Option<i64>, Query, description = "Page size"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Published assignments with own submission state", body = PaginatedHomeworkResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Homework",
    security(("bearer_auth" = []))
)]
pub async fn get_my_homework(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<AssignmentFilterParams>,
) -> Result<Json<PaginatedHomeworkResponse>, AppError> {
    let homework = service::get_my_homework(&state.db, auth_user.user_id()?, params).await?;
    Ok(Json(homework))
}

#[utoipa::path(
    get,
    path = "/api/my-homework/{id}/start",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment with existing submission, if any", body = HomeworkView),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Assignment not found")
    ),
    tag = "Homework",
    security(("bearer_auth" = []))
)]
pub async fn start_homework(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<HomeworkView>, AppError> {
    let view = service::start_homework(&state.db, auth_user.user_id()?, id).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/my-homework/{id}/submit",
    params(("id" = Uuid, Path, description = "Assignment ID")),
    request_body = SubmitAssignmentDto,
    responses(
        (status = 201, description = "Submission created and auto-graded", body = SubmissionWithAnswers),
        (status = 400, description = "Assignment is not open for submissions"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Assignment not found"),
        (status = 409, description = "Assignment already submitted")
    ),
    tag = "Homework",
    security(("bearer_auth" = []))
)]
pub async fn submit_assignment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<SubmitAssignmentDto>,
) -> Result<(StatusCode, Json<SubmissionWithAnswers>), AppError> {
    let submission =
        service::submit_assignment(&state.db, auth_user.user_id()?, id, dto).await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

// ============ Student: own submissions ============

#[utoipa::path(
    get,
    path = "/api/my-submissions",
    responses(
        (status = 200, description = "Caller's submissions", body = Vec<Submission>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Homework",
    security(("bearer_auth" = []))
)]
pub async fn get_my_submissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Submission>>, AppError> {
    let submissions = service::get_my_submissions(&state.db, auth_user.user_id()?).await?;
    Ok(Json(submissions))
}

#[utoipa::path(
    get,
    path = "/api/my-submissions/{id}",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission with answers", body = SubmissionWithAnswers),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Submission not found")
    ),
    tag = "Homework",
    security(("bearer_auth" = []))
)]
pub async fn get_my_submission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionWithAnswers>, AppError> {
    let submission = service::get_my_submission(&state.db, auth_user.user_id()?, id).await?;
    Ok(Json(submission))
}

#[utoipa::path(
    post,
    path = "/api/my-submissions/{id}/resubmit",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = SubmitAssignmentDto,
    responses(
        (status = 200, description = "Resubmitted and re-graded", body = SubmissionWithAnswers),
        (status = 400, description = "Submission is not awaiting resubmission"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Submission not found")
    ),
    tag = "Homework",
    security(("bearer_auth" = []))
)]
pub async fn resubmit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<SubmitAssignmentDto>,
) -> Result<Json<SubmissionWithAnswers>, AppError> {
    let submission = service::resubmit(&state.db, auth_user.user_id()?, id, dto).await?;
    Ok(Json(submission))
}
