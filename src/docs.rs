use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::assignments::model::{
    AnswerKey, Assignment, AssignmentStats, CreateAnswerKeyDto, CreateAssignmentDto, HomeworkView,
    ManualGradeDto, PaginatedAssignmentsResponse, PaginatedHomeworkResponse, RequestResubmitDto,
    StudentAnswer, SubmitAssignmentDto, Submission, SubmissionWithAnswers, SubmittedAnswerDto,
    UpdateAssignmentDto,
};
use crate::modules::auth::model::{LoginDto, LoginResponse, LogoutResponse, ProfileResponse};
use crate::modules::exams::model::{
    CreateBlueprintDto, CreateQuestionDto, CreateQuestionGroupDto, CreateRuleDto, ExamAnswer,
    ExamBlueprint, ExamInstance, ExamInstanceWithQuestions, ExamQuestionView, ExamResult,
    ExamResultWithAnswers, ExamRule, ExamSession, GenerateExamDto, GradeExamDto, ManualExamDto,
    PaginatedQuestionsResponse, Question, QuestionGroup, SubmitExamAnswerDto,
    UpdateInstanceStatusDto, UpdateQuestionDto,
};
use crate::modules::roles::model::{
    AssignPermissionDto, AssignRoleDto, CreateRoleDto, Permission, Role, RoleWithPermissions,
};
use crate::modules::users::model::{
    CreateUserDto, PaginatedUsersResponse, UpdateUserStatusDto, User,
};
use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::me,
        crate::modules::roles::controller::get_roles,
        crate::modules::roles::controller::get_role_by_id,
        crate::modules::roles::controller::create_role,
        crate::modules::roles::controller::assign_permission,
        crate::modules::roles::controller::remove_permission,
        crate::modules::roles::controller::assign_role_to_user,
        crate::modules::roles::controller::get_permissions,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user_by_id,
        crate::modules::users::controller::update_user_status,
        crate::modules::assignments::controller::create_assignment,
        crate::modules::assignments::controller::get_assignments,
        crate::modules::assignments::controller::get_assignment,
        crate::modules::assignments::controller::update_assignment,
        crate::modules::assignments::controller::delete_assignment,
        crate::modules::assignments::controller::create_answer_key,
        crate::modules::assignments::controller::get_answer_keys,
        crate::modules::assignments::controller::delete_answer_key,
        crate::modules::assignments::controller::get_submissions,
        crate::modules::assignments::controller::get_assignment_stats,
        crate::modules::assignments::controller::get_submission,
        crate::modules::assignments::controller::manual_grade,
        crate::modules::assignments::controller::request_resubmit,
        crate::modules::assignments::controller::get_my_homework,
        crate::modules::assignments::controller::start_homework,
        crate::modules::assignments::controller::submit_assignment,
        crate::modules::assignments::controller::get_my_submissions,
        crate::modules::assignments::controller::get_my_submission,
        crate::modules::assignments::controller::resubmit,
        crate::modules::exams::controller::create_question_group,
        crate::modules::exams::controller::get_question_groups,
        crate::modules::exams::controller::delete_question_group,
        crate::modules::exams::controller::create_question,
        crate::modules::exams::controller::get_questions,
        crate::modules::exams::controller::get_question_by_id,
        crate::modules::exams::controller::update_question,
        crate::modules::exams::controller::delete_question,
        crate::modules::exams::controller::create_blueprint,
        crate::modules::exams::controller::get_blueprints,
        crate::modules::exams::controller::get_blueprint_by_id,
        crate::modules::exams::controller::delete_blueprint,
        crate::modules::exams::controller::add_rule,
        crate::modules::exams::controller::get_rules,
        crate::modules::exams::controller::generate_exam,
        crate::modules::exams::controller::create_manual_exam,
        crate::modules::exams::controller::get_instances,
        crate::modules::exams::controller::get_instance_by_id,
        crate::modules::exams::controller::update_instance_status,
        crate::modules::exams::controller::get_results_for_student,
        crate::modules::exams::controller::get_result_with_answers,
        crate::modules::exams::controller::grade_exam,
        crate::modules::exams::controller::get_available_exams,
        crate::modules::exams::controller::get_my_results,
        crate::modules::exams::controller::start_exam,
        crate::modules::exams::controller::submit_answer,
        crate::modules::exams::controller::finish_exam,
    ),
    components(
        schemas(
            LoginDto,
            LoginResponse,
            LogoutResponse,
            ProfileResponse,
            Role,
            Permission,
            RoleWithPermissions,
            CreateRoleDto,
            AssignPermissionDto,
            AssignRoleDto,
            User,
            CreateUserDto,
            UpdateUserStatusDto,
            PaginatedUsersResponse,
            Assignment,
            AnswerKey,
            Submission,
            StudentAnswer,
            CreateAssignmentDto,
            UpdateAssignmentDto,
            CreateAnswerKeyDto,
            SubmittedAnswerDto,
            SubmitAssignmentDto,
            ManualGradeDto,
            RequestResubmitDto,
            HomeworkView,
            SubmissionWithAnswers,
            AssignmentStats,
            PaginatedAssignmentsResponse,
            PaginatedHomeworkResponse,
            QuestionGroup,
            Question,
            ExamQuestionView,
            ExamBlueprint,
            ExamRule,
            ExamInstance,
            ExamResult,
            ExamAnswer,
            CreateQuestionGroupDto,
            CreateQuestionDto,
            UpdateQuestionDto,
            CreateBlueprintDto,
            CreateRuleDto,
            GenerateExamDto,
            ManualExamDto,
            UpdateInstanceStatusDto,
            SubmitExamAnswerDto,
            GradeExamDto,
            ExamInstanceWithQuestions,
            ExamSession,
            ExamResultWithAnswers,
            PaginatedQuestionsResponse,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Authentication and session endpoints"),
        (name = "Roles", description = "Role and permission administration"),
        (name = "Users", description = "User administration"),
        (name = "Assignments", description = "Assignment and answer key management"),
        (name = "Submissions", description = "Submission review and grading"),
        (name = "Homework", description = "Student homework submission"),
        (name = "Question Bank", description = "Question and question group management"),
        (name = "Exams", description = "Exam blueprints, rules and instances"),
        (name = "Exam Results", description = "Exam result review and grading"),
        (name = "My Exams", description = "Student exam taking")
    ),
    info(
        title = "Langcenter API",
        version = "0.1.0",
        description = "Learning-center management REST API built with Rust, Axum, and PostgreSQL: role-based authorization, assignment auto-grading, and exam generation.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
