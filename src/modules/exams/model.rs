use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};

pub mod difficulty {
    pub const EASY: &str = "easy";
    pub const MEDIUM: &str = "medium";
    pub const HARD: &str = "hard";

    pub const ALL: &[&str] = &[EASY, MEDIUM, HARD];

    pub fn is_valid(value: &str) -> bool {
        ALL.contains(&value)
    }
}

pub mod exam_instance_status {
    pub const DRAFT: &str = "draft";
    pub const PUBLISHED: &str = "published";
    pub const ARCHIVED: &str = "archived";

    pub const ALL: &[&str] = &[DRAFT, PUBLISHED, ARCHIVED];

    pub fn is_valid(value: &str) -> bool {
        ALL.contains(&value)
    }
}

/// Result lifecycle: `in_progress` while the student answers,
/// `completed` after finish scores it, `graded` after teacher review.
pub mod exam_result_status {
    pub const IN_PROGRESS: &str = "in_progress";
    pub const COMPLETED: &str = "completed";
    pub const GRADED: &str = "graded";
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct QuestionGroup {
    pub id: Uuid,
    pub part: String,
    pub skill: String,
    pub context: Option<String>,
    pub audio_file: Option<String>,
    pub image_file: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Question {
    pub id: Uuid,
    pub group_id: Option<Uuid>,
    pub text: String,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
    pub correct_answer: String,
    pub difficulty: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Question as shown to a student taking an exam. Never carries the
/// correct answer.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ExamQuestionView {
    pub id: Uuid,
    pub text: String,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
    pub order_number: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ExamBlueprint {
    pub id: Uuid,
    pub exam_type: String,
    pub title: String,
    /// Duration in minutes
    pub duration: i32,
    pub total_questions: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ExamRule {
    pub id: Uuid,
    pub blueprint_id: Uuid,
    pub part: String,
    pub skill: String,
    pub difficulty: String,
    pub num_questions: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ExamInstance {
    pub id: Uuid,
    pub blueprint_id: Option<Uuid>,
    pub title: String,
    pub status: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ExamResult {
    pub id: Uuid,
    pub exam_instance_id: Uuid,
    pub student_id: Uuid,
    pub status: String,
    #[schema(value_type = Option<f64>)]
    pub score: Option<Decimal>,
    pub teacher_comment: Option<String>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ExamAnswer {
    pub id: Uuid,
    pub result_id: Uuid,
    pub question_id: Uuid,
    pub selected_answer: Option<String>,
    pub is_correct: Option<bool>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateQuestionGroupDto {
    #[validate(length(min = 1, max = 100, message = "Part is required"))]
    pub part: String,
    #[validate(length(min = 1, max = 100, message = "Skill is required"))]
    pub skill: String,
    pub context: Option<String>,
    pub audio_file: Option<String>,
    pub image_file: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateQuestionDto {
    pub group_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Question text is required"))]
    pub text: String,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
    #[validate(length(min = 1, message = "Correct answer is required"))]
    pub correct_answer: String,
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateQuestionDto {
    pub group_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Question text must not be empty"))]
    pub text: Option<String>,
    pub option_a: Option<String>,
    pub option_b: Option<String>,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
    #[validate(length(min = 1, message = "Correct answer must not be empty"))]
    pub correct_answer: Option<String>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBlueprintDto {
    #[validate(length(min = 1, max = 100, message = "Exam type is required"))]
    pub exam_type: String,
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(range(min = 1, message = "Duration must be positive"))]
    pub duration: i32,
    #[validate(range(min = 1, message = "Total questions must be positive"))]
    pub total_questions: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRuleDto {
    #[validate(length(min = 1, max = 100, message = "Part is required"))]
    pub part: String,
    #[validate(length(min = 1, max = 100, message = "Skill is required"))]
    pub skill: String,
    #[validate(length(min = 1, message = "Difficulty is required"))]
    pub difficulty: String,
    #[validate(range(min = 1, message = "Number of questions must be positive"))]
    pub num_questions: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateExamDto {
    pub blueprint_id: Uuid,
    /// Defaults to the blueprint title
    pub title: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ManualExamDto {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "At least one question is required"))]
    pub question_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateInstanceStatusDto {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitExamAnswerDto {
    pub question_id: Uuid,
    pub selected_answer: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GradeExamDto {
    /// Optional score override, out of 100
    #[schema(value_type = Option<f64>)]
    pub score: Option<Decimal>,
    pub teacher_comment: Option<String>,
}

// Responses

#[derive(Debug, Serialize, ToSchema)]
pub struct ExamInstanceWithQuestions {
    #[serde(flatten)]
    pub instance: ExamInstance,
    pub questions: Vec<Question>,
}

/// Student view of a started exam: the result row plus the questions
/// without their correct answers.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExamSession {
    pub result: ExamResult,
    pub questions: Vec<ExamQuestionView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExamResultWithAnswers {
    #[serde(flatten)]
    pub result: ExamResult,
    pub answers: Vec<ExamAnswer>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedQuestionsResponse {
    pub data: Vec<Question>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct QuestionFilterParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    /// Filter by difficulty
    pub difficulty: Option<String>,
    /// Filter by question group
    pub group_id: Option<Uuid>,
}
