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
    CreateBlueprintDto, CreateQuestionDto, CreateQuestionGroupDto, CreateRuleDto, ExamAnswer,
    ExamBlueprint, ExamInstance, ExamInstanceWithQuestions, ExamResult, ExamResultWithAnswers,
    ExamRule, ExamSession, GenerateExamDto, GradeExamDto, ManualExamDto,
    PaginatedQuestionsResponse, Question, QuestionFilterParams, QuestionGroup,
    SubmitExamAnswerDto, UpdateInstanceStatusDto, UpdateQuestionDto,
};
use super::service;

// ============ Question groups ============

#[utoipa::path(
    post,
    path = "/api/question-groups",
    request_body = CreateQuestionGroupDto,
    responses(
        (status = 201, description = "Question group created", body = QuestionGroup),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Question Bank",
    security(("bearer_auth" = []))
)]
pub async fn create_question_group(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateQuestionGroupDto>,
) -> Result<(StatusCode, Json<QuestionGroup>), AppError> {
    let group = service::create_question_group(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    get,
    path = "/api/question-groups",
    responses(
        (status = 200, description = "Question groups", body = Vec<QuestionGroup>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Question Bank",
    security(("bearer_auth" = []))
)]
pub async fn get_question_groups(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<QuestionGroup>>, AppError> {
    let groups = service::get_question_groups(&state.db).await?;
    Ok(Json(groups))
}

#[utoipa::path(
    delete,
    path = "/api/question-groups/{id}",
    params(("id" = Uuid, Path, description = "Question group ID")),
    responses(
        (status = 204, description = "Question group deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Question group not found")
    ),
    tag = "Question Bank",
    security(("bearer_auth" = []))
)]
pub async fn delete_question_group(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service::delete_question_group(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============ Questions ============

#[utoipa::path(
    post,
    path = "/api/questions",
    request_body = CreateQuestionDto,
    responses(
        (status = 201, description = "Question created", body = Question),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Unknown difficulty")
    ),
    tag = "Question Bank",
    security(("bearer_auth" = []))
)]
pub async fn create_question(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateQuestionDto>,
) -> Result<(StatusCode, Json<Question>), AppError> {
    let question = service::create_question(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

#[utoipa::path(
    get,
    path = "/api/questions",
    params(
        ("difficulty" = Option<String>, Query, description = "Filter by difficulty"),
        ("group_id" = Option<Uuid>, Query, description = "Filter by question group"),
        ("limit" = Option<i64>, Query, description = "Page size"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Questions", body = PaginatedQuestionsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Question Bank",
    security(("bearer_auth" = []))
)]
pub async fn get_questions(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(params): Query<QuestionFilterParams>,
) -> Result<Json<PaginatedQuestionsResponse>, AppError> {
    let questions = service::get_questions(&state.db, params).await?;
    Ok(Json(questions))
}

#[utoipa::path(
    get,
    path = "/api/questions/{id}",
    params(("id" = Uuid, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Question details", body = Question),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Question not found")
    ),
    tag = "Question Bank",
    security(("bearer_auth" = []))
)]
pub async fn get_question_by_id(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Question>, AppError> {
    let question = service::get_question_by_id(&state.db, id).await?;
    Ok(Json(question))
}

#[utoipa::path(
    put,
    path = "/api/questions/{id}",
    params(("id" = Uuid, Path, description = "Question ID")),
    request_body = UpdateQuestionDto,
    responses(
        (status = 200, description = "Question updated", body = Question),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Question not found"),
        (status = 422, description = "Unknown difficulty")
    ),
    tag = "Question Bank",
    security(("bearer_auth" = []))
)]
pub async fn update_question(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateQuestionDto>,
) -> Result<Json<Question>, AppError> {
    let question = service::update_question(&state.db, id, dto).await?;
    Ok(Json(question))
}

#[utoipa::path(
    delete,
    path = "/api/questions/{id}",
    params(("id" = Uuid, Path, description = "Question ID")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Question not found")
    ),
    tag = "Question Bank",
    security(("bearer_auth" = []))
)]
pub async fn delete_question(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service::delete_question(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============ Blueprints & rules ============

#[utoipa::path(
    post,
    path = "/api/exam-blueprints",
    request_body = CreateBlueprintDto,
    responses(
        (status = 201, description = "Blueprint created", body = ExamBlueprint),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
pub async fn create_blueprint(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateBlueprintDto>,
) -> Result<(StatusCode, Json<ExamBlueprint>), AppError> {
    let blueprint = service::create_blueprint(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(blueprint)))
}

#[utoipa::path(
    get,
    path = "/api/exam-blueprints",
    responses(
        (status = 200, description = "Blueprints", body = Vec<ExamBlueprint>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
pub async fn get_blueprints(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<ExamBlueprint>>, AppError> {
    let blueprints = service::get_blueprints(&state.db).await?;
    Ok(Json(blueprints))
}

#[utoipa::path(
    get,
    path = "/api/exam-blueprints/{id}",
    params(("id" = Uuid, Path, description = "Blueprint ID")),
    responses(
        (status = 200, description = "Blueprint details", body = ExamBlueprint),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Blueprint not found")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
pub async fn get_blueprint_by_id(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ExamBlueprint>, AppError> {
    let blueprint = service::get_blueprint_by_id(&state.db, id).await?;
    Ok(Json(blueprint))
}

#[utoipa::path(
    delete,
    path = "/api/exam-blueprints/{id}",
    params(("id" = Uuid, Path, description = "Blueprint ID")),
    responses(
        (status = 204, description = "Blueprint deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Blueprint not found")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
pub async fn delete_blueprint(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    service::delete_blueprint(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/exam-blueprints/{id}/rules",
    params(("id" = Uuid, Path, description = "Blueprint ID")),
    request_body = CreateRuleDto,
    responses(
        (status = 201, description = "Rule added", body = ExamRule),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Blueprint not found"),
        (status = 422, description = "Unknown difficulty")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
pub async fn add_rule(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CreateRuleDto>,
) -> Result<(StatusCode, Json<ExamRule>), AppError> {
    let rule = service::add_rule(&state.db, id, dto).await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

#[utoipa::path(
    get,
    path = "/api/exam-blueprints/{id}/rules",
    params(("id" = Uuid, Path, description = "Blueprint ID")),
    responses(
        (status = 200, description = "Blueprint rules", body = Vec<ExamRule>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Blueprint not found")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
pub async fn get_rules(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ExamRule>>, AppError> {
    let rules = service::get_rules(&state.db, id).await?;
    Ok(Json(rules))
}

// ============ Instances ============

#[utoipa::path(
    post,
    path = "/api/exam-instances/generate",
    request_body = GenerateExamDto,
    responses(
        (status = 201, description = "Exam instance generated", body = ExamInstanceWithQuestions),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Blueprint not found")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
pub async fn generate_exam(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<GenerateExamDto>,
) -> Result<(StatusCode, Json<ExamInstanceWithQuestions>), AppError> {
    let instance = service::generate_exam(&state.db, auth_user.user_id()?, dto).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

#[utoipa::path(
    post,
    path = "/api/exam-instances/manual",
    request_body = ManualExamDto,
    responses(
        (status = 201, description = "Draft exam instance created", body = ExamInstanceWithQuestions),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "One or more questions not found")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
pub async fn create_manual_exam(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<ManualExamDto>,
) -> Result<(StatusCode, Json<ExamInstanceWithQuestions>), AppError> {
    let instance = service::create_manual_exam(&state.db, auth_user.user_id()?, dto).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

#[utoipa::path(
    get,
    path = "/api/exam-instances",
    responses(
        (status = 200, description = "Exam instances", body = Vec<ExamInstance>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
pub async fn get_instances(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<ExamInstance>>, AppError> {
    let instances = service::get_instances(&state.db).await?;
    Ok(Json(instances))
}

#[utoipa::path(
    get,
    path = "/api/exam-instances/{id}",
    params(("id" = Uuid, Path, description = "Exam instance ID")),
    responses(
        (status = 200, description = "Instance with its questions", body = ExamInstanceWithQuestions),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Exam instance not found")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
pub async fn get_instance_by_id(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ExamInstanceWithQuestions>, AppError> {
    let instance = service::get_instance_by_id(&state.db, id).await?;
    Ok(Json(instance))
}

#[utoipa::path(
    patch,
    path = "/api/exam-instances/{id}/status",
    params(("id" = Uuid, Path, description = "Exam instance ID")),
    request_body = UpdateInstanceStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ExamInstance),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Exam instance not found"),
        (status = 422, description = "Unknown status value")
    ),
    tag = "Exams",
    security(("bearer_auth" = []))
)]
pub async fn update_instance_status(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateInstanceStatusDto>,
) -> Result<Json<ExamInstance>, AppError> {
    let instance = service::update_instance_status(&state.db, id, dto).await?;
    Ok(Json(instance))
}

// ============ Teacher: results ============

#[utoipa::path(
    get,
    path = "/api/exam-results/student/{student_id}",
    params(("student_id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student's exam results", body = Vec<ExamResult>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Exam Results",
    security(("bearer_auth" = []))
)]
pub async fn get_results_for_student(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(student_id): Path<Uuid>,
) -> Result<Json<Vec<ExamResult>>, AppError> {
    let results = service::get_results_for_student(&state.db, student_id).await?;
    Ok(Json(results))
}

#[utoipa::path(
    get,
    path = "/api/exam-results/{id}",
    params(("id" = Uuid, Path, description = "Exam result ID")),
    responses(
        (status = 200, description = "Result with answers", body = ExamResultWithAnswers),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Exam result not found")
    ),
    tag = "Exam Results",
    security(("bearer_auth" = []))
)]
pub async fn get_result_with_answers(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ExamResultWithAnswers>, AppError> {
    let result = service::get_result_with_answers(&state.db, id).await?;
    Ok(Json(result))
}

#[utoipa::path(
    patch,
    path = "/api/exam-results/{id}/grade",
    params(("id" = Uuid, Path, description = "Exam result ID")),
    request_body = GradeExamDto,
    responses(
        (status = 200, description = "Result graded", body = ExamResult),
        (status = 400, description = "Result is not completed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Exam result not found"),
        (status = 422, description = "Score out of range")
    ),
    tag = "Exam Results",
    security(("bearer_auth" = []))
)]
pub async fn grade_exam(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<GradeExamDto>,
) -> Result<Json<ExamResult>, AppError> {
    let result = service::grade_exam(&state.db, id, dto).await?;
    Ok(Json(result))
}

// ============ Student: taking ============

#[utoipa::path(
    get,
    path = "/api/my-exams",
    responses(
        (status = 200, description = "Published exams", body = Vec<ExamInstance>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "My Exams",
    security(("bearer_auth" = []))
)]
pub async fn get_available_exams(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<ExamInstance>>, AppError> {
    let instances = service::get_available_exams(&state.db).await?;
    Ok(Json(instances))
}

#[utoipa::path(
    get,
    path = "/api/my-exams/results",
    responses(
        (status = 200, description = "Caller's exam results", body = Vec<ExamResult>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "My Exams",
    security(("bearer_auth" = []))
)]
pub async fn get_my_results(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<ExamResult>>, AppError> {
    let results = service::get_results_for_student(&state.db, auth_user.user_id()?).await?;
    Ok(Json(results))
}

#[utoipa::path(
    post,
    path = "/api/my-exams/{id}/start",
    params(("id" = Uuid, Path, description = "Exam instance ID")),
    responses(
        (status = 200, description = "New or resumed attempt with questions", body = ExamSession),
        (status = 400, description = "Exam is not open"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Exam instance not found"),
        (status = 409, description = "Exam already completed")
    ),
    tag = "My Exams",
    security(("bearer_auth" = []))
)]
pub async fn start_exam(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ExamSession>, AppError> {
    let session = service::start_exam(&state.db, auth_user.user_id()?, id).await?;
    Ok(Json(session))
}

#[utoipa::path(
    post,
    path = "/api/my-exams/results/{id}/answers",
    params(("id" = Uuid, Path, description = "Exam result ID")),
    request_body = SubmitExamAnswerDto,
    responses(
        (status = 200, description = "Answer recorded", body = ExamAnswer),
        (status = 400, description = "Exam is not in progress"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Result or question not found")
    ),
    tag = "My Exams",
    security(("bearer_auth" = []))
)]
pub async fn submit_answer(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<SubmitExamAnswerDto>,
) -> Result<Json<ExamAnswer>, AppError> {
    let answer = service::submit_answer(&state.db, auth_user.user_id()?, id, dto).await?;
    Ok(Json(answer))
}

#[utoipa::path(
    post,
    path = "/api/my-exams/results/{id}/finish",
    params(("id" = Uuid, Path, description = "Exam result ID")),
    responses(
        (status = 200, description = "Attempt scored and completed", body = ExamResultWithAnswers),
        (status = 400, description = "Exam already completed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Exam result not found")
    ),
    tag = "My Exams",
    security(("bearer_auth" = []))
)]
pub async fn finish_exam(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ExamResultWithAnswers>, AppError> {
    let result = service::finish_exam(&state.db, auth_user.user_id()?, id).await?;
    Ok(Json(result))
}
