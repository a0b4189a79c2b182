use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};

pub mod assignment_status {
    pub const DRAFT: &str = "draft";
    pub const PUBLISHED: &str = "published";
    pub const CLOSED: &str = "closed";

    pub const ALL: &[&str] = &[DRAFT, PUBLISHED, CLOSED];

    pub fn is_valid(status: &str) -> bool {
        ALL.contains(&status)
    }
}

/// Submission lifecycle: `submitted` → `graded` happens automatically
/// when the assignment has answer keys; `graded` → `resubmit_required`
/// is a teacher action; resubmission moves the row back through
/// `submitted`.
pub mod submission_status {
    pub const SUBMITTED: &str = "submitted";
    pub const GRADED: &str = "graded";
    pub const RESUBMIT_REQUIRED: &str = "resubmit_required";
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Assignment {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<chrono::NaiveDate>,
    pub status: String,
    pub session_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AnswerKey {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub question_number: i32,
    pub correct_option: String,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Submission {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub student_id: Uuid,
    pub status: String,
    pub content: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub result: Option<Decimal>,
    pub correct_count: Option<i32>,
    pub total_question: Option<i32>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StudentAnswer {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub question_number: i32,
    pub selected_option: Option<i32>,
    /// `NULL` = ungraded, `0` = wrong, `1` = correct
    pub is_correct: Option<i32>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAssignmentDto {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<chrono::NaiveDate>,
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAssignmentDto {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<chrono::NaiveDate>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAnswerKeyDto {
    #[validate(range(min = 1, message = "Question number must be positive"))]
    pub question_number: i32,
    #[validate(length(min = 1, message = "Correct option is required"))]
    pub correct_option: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmittedAnswerDto {
    pub question_number: i32,
    pub selected_option: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitAssignmentDto {
    #[validate(length(min = 1, message = "At least one answer is required"))]
    pub answers: Vec<SubmittedAnswerDto>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ManualGradeDto {
    /// Score out of 100
    #[schema(value_type = f64)]
    pub result: Decimal,
    pub feedback: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RequestResubmitDto {
    pub feedback: Option<String>,
}

// Responses

/// Assignment paired with the caller's own submission, if any.
#[derive(Debug, Serialize, ToSchema)]
pub struct HomeworkView {
    pub assignment: Assignment,
    pub submission: Option<Submission>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionWithAnswers {
    #[serde(flatten)]
    pub submission: Submission,
    pub answers: Vec<StudentAnswer>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentStats {
    pub assignment_id: Uuid,
    pub total_submissions: i64,
    pub graded_count: i64,
    pub resubmit_required_count: i64,
    #[schema(value_type = Option<f64>)]
    pub average_result: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedAssignmentsResponse {
    pub data: Vec<Assignment>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedHomeworkResponse {
    pub data: Vec<HomeworkView>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AssignmentFilterParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
    /// Filter by assignment status
    pub status: Option<String>,
}
