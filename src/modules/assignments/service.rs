use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;
use uuid::Uuid;

use crate::utils::errors::{AppError, is_unique_violation};
use crate::utils::pagination::PaginationMeta;

use super::model::{
    AnswerKey, Assignment, AssignmentFilterParams, AssignmentStats, CreateAnswerKeyDto,
    CreateAssignmentDto, HomeworkView, ManualGradeDto, PaginatedAssignmentsResponse,
    PaginatedHomeworkResponse, RequestResubmitDto, StudentAnswer, SubmitAssignmentDto, Submission,
    SubmissionWithAnswers, UpdateAssignmentDto, assignment_status, submission_status,
};

// ============ Scoring ============

/// Outcome of scoring one submission against the assignment's answer keys.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeOutcome {
    pub correct_count: i32,
    pub total_question: i32,
    pub result: Decimal,
    /// Correctness per submitted answer, in input order: 1 correct, 0 wrong.
    pub correctness: Vec<i32>,
}

/// Scores submitted answers against the answer keys.
///
/// Returns `None` when the assignment has no keys; the submission then
/// stays `submitted` for manual grading. An answer is correct when its
/// selected option, rendered as a string, equals the key's
/// `correct_option` exactly. An answer with no matching key counts as
/// wrong, never skipped. The denominator is the number of keys, so
/// unanswered questions lower the score.
///
/// Deterministic: the same keys and answers always produce the same
/// outcome.
pub fn score_answers(
    keys: &[(i32, String)],
    answers: &[(i32, Option<i32>)],
) -> Option<GradeOutcome> {
    if keys.is_empty() {
        return None;
    }

    let key_map: HashMap<i32, &str> = keys
        .iter()
        .map(|(number, option)| (*number, option.as_str()))
        .collect();

    let correctness: Vec<i32> = answers
        .iter()
        .map(|(number, selected)| {
            let correct = match (key_map.get(number), selected) {
                (Some(expected), Some(selected)) => selected.to_string() == *expected,
                _ => false,
            };
            i32::from(correct)
        })
        .collect();

    let correct_count: i32 = correctness.iter().sum();
    let total_question = keys.len() as i32;

    let result = if total_question == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(correct_count) * Decimal::from(100) / Decimal::from(total_question))
            .round_dp(2)
    };

    Some(GradeOutcome {
        correct_count,
        total_question,
        result,
        correctness,
    })
}

/// Auto-grades a submission inside the caller's transaction.
///
/// Loads the keys and the stored answers, scores them, then writes the
/// per-answer correctness and the submission's score fields in the same
/// transaction as the answers were inserted. No keys → no change.
async fn grade_submission_tx(
    tx: &mut Transaction<'_, Postgres>,
    submission_id: Uuid,
    assignment_id: Uuid,
) -> Result<(), AppError> {
    let keys: Vec<(i32, String)> = sqlx::query_as(
        "SELECT question_number, correct_option FROM answer_keys
        WHERE assignment_id = $1
        ORDER BY question_number",
    )
    .bind(assignment_id)
    .fetch_all(&mut **tx)
    .await?;

    let answers: Vec<(Uuid, i32, Option<i32>)> = sqlx::query_as(
        "SELECT id, question_number, selected_option FROM student_answers
        WHERE submission_id = $1
        ORDER BY question_number",
    )
    .bind(submission_id)
    .fetch_all(&mut **tx)
    .await?;

    let inputs: Vec<(i32, Option<i32>)> = answers
        .iter()
        .map(|(_, number, selected)| (*number, *selected))
        .collect();

    let Some(outcome) = score_answers(&keys, &inputs) else {
        return Ok(());
    };

    for ((answer_id, _, _), is_correct) in answers.iter().zip(&outcome.correctness) {
        sqlx::query(
            "UPDATE student_answers SET is_correct = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(is_correct)
        .bind(answer_id)
        .execute(&mut **tx)
        .await?;
    }

    sqlx::query(
        "UPDATE submissions
        SET status = $1, result = $2, correct_count = $3, total_question = $4
        WHERE id = $5",
    )
    .bind(submission_status::GRADED)
    .bind(outcome.result)
    .bind(outcome.correct_count)
    .bind(outcome.total_question)
    .bind(submission_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// ============ Teacher scoping ============

/// Resolves an assignment only if it belongs to one of the teacher's
/// class sessions. An assignment outside the teacher's scope is
/// indistinguishable from a missing one.
async fn assignment_for_teacher(
    db: &PgPool,
    assignment_id: Uuid,
    teacher_id: Uuid,
) -> Result<Assignment, AppError> {
    let assignment: Assignment = sqlx::query_as(
        "SELECT a.id, a.title, a.description, a.due_date, a.status, a.session_id,
                a.created_at, a.updated_at
        FROM assignments a
        JOIN class_sessions s ON s.id = a.session_id
        WHERE a.id = $1 AND s.teacher_id = $2",
    )
    .bind(assignment_id)
    .bind(teacher_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found("Assignment not found"))?;

    Ok(assignment)
}

async fn submission_for_teacher(
    db: &PgPool,
    submission_id: Uuid,
    teacher_id: Uuid,
) -> Result<Submission, AppError> {
    let submission: Submission = sqlx::query_as(
        "SELECT sub.id, sub.assignment_id, sub.student_id, sub.status, sub.content,
                sub.result, sub.correct_count, sub.total_question, sub.submitted_at
        FROM submissions sub
        JOIN assignments a ON a.id = sub.assignment_id
        JOIN class_sessions s ON s.id = a.session_id
        WHERE sub.id = $1 AND s.teacher_id = $2",
    )
    .bind(submission_id)
    .bind(teacher_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found("Submission not found"))?;

    Ok(submission)
}

// ============ Teacher surface ============

#[instrument(skip(db, dto))]
pub async fn create_assignment(
    db: &PgPool,
    teacher_id: Uuid,
    dto: CreateAssignmentDto,
) -> Result<Assignment, AppError> {
    let owns_session: (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM class_sessions WHERE id = $1 AND teacher_id = $2)",
    )
    .bind(dto.session_id)
    .bind(teacher_id)
    .fetch_one(db)
    .await?;

    if !owns_session.0 {
        return Err(AppError::not_found("Class session not found"));
    }

    let assignment: Assignment = sqlx::query_as(
        "INSERT INTO assignments (title, description, due_date, status, session_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, title, description, due_date, status, session_id, created_at, updated_at",
    )
    .bind(&dto.title)
    .bind(&dto.description)
    .bind(dto.due_date)
    .bind(assignment_status::DRAFT)
    .bind(dto.session_id)
    .fetch_one(db)
    .await?;

    Ok(assignment)
}

#[instrument(skip(db))]
pub async fn get_assignments(
    db: &PgPool,
    teacher_id: Uuid,
    params: AssignmentFilterParams,
) -> Result<PaginatedAssignmentsResponse, AppError> {
    let limit = params.pagination.limit();
    let offset = params.pagination.offset();

    let assignments: Vec<Assignment> = sqlx::query_as(
        "SELECT a.id, a.title, a.description, a.due_date, a.status, a.session_id,
                a.created_at, a.updated_at
        FROM assignments a
        JOIN class_sessions s ON s.id = a.session_id
        WHERE s.teacher_id = $1
          AND ($2::text IS NULL OR a.status = $2)
        ORDER BY a.created_at DESC
        LIMIT $3 OFFSET $4",
    )
    .bind(teacher_id)
    .bind(&params.status)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*)
        FROM assignments a
        JOIN class_sessions s ON s.id = a.session_id
        WHERE s.teacher_id = $1
          AND ($2::text IS NULL OR a.status = $2)",
    )
    .bind(teacher_id)
    .bind(&params.status)
    .fetch_one(db)
    .await?;

    let has_more = offset + (assignments.len() as i64) < total.0;

    Ok(PaginatedAssignmentsResponse {
        data: assignments,
        meta: PaginationMeta {
            total: total.0,
            limit,
            offset,
            has_more,
        },
    })
}

#[instrument(skip(db))]
pub async fn get_assignment(
    db: &PgPool,
    teacher_id: Uuid,
    assignment_id: Uuid,
) -> Result<Assignment, AppError> {
    assignment_for_teacher(db, assignment_id, teacher_id).await
}

#[instrument(skip(db, dto))]
pub async fn update_assignment(
    db: &PgPool,
    teacher_id: Uuid,
    assignment_id: Uuid,
    dto: UpdateAssignmentDto,
) -> Result<Assignment, AppError> {
    assignment_for_teacher(db, assignment_id, teacher_id).await?;

    if let Some(ref status) = dto.status {
        if !assignment_status::is_valid(status) {
            return Err(AppError::validation(format!(
                "Status must be one of: {}",
                assignment_status::ALL.join(", ")
            )));
        }
    }

    let assignment: Assignment = sqlx::query_as(
        "UPDATE assignments
        SET title = COALESCE($1, title),
            description = COALESCE($2, description),
            due_date = COALESCE($3, due_date),
            status = COALESCE($4, status),
            updated_at = NOW()
        WHERE id = $5
        RETURNING id, title, description, due_date, status, session_id, created_at, updated_at",
    )
    .bind(&dto.title)
    .bind(&dto.description)
    .bind(dto.due_date)
    .bind(&dto.status)
    .bind(assignment_id)
    .fetch_one(db)
    .await?;

    Ok(assignment)
}

#[instrument(skip(db))]
pub async fn delete_assignment(
    db: &PgPool,
    teacher_id: Uuid,
    assignment_id: Uuid,
) -> Result<(), AppError> {
    assignment_for_teacher(db, assignment_id, teacher_id).await?;

    sqlx::query("DELETE FROM assignments WHERE id = $1")
        .bind(assignment_id)
        .execute(db)
        .await?;

    Ok(())
}

#[instrument(skip(db, dto))]
pub async fn create_answer_key(
    db: &PgPool,
    teacher_id: Uuid,
    assignment_id: Uuid,
    dto: CreateAnswerKeyDto,
) -> Result<AnswerKey, AppError> {
    assignment_for_teacher(db, assignment_id, teacher_id).await?;

    let key: AnswerKey = sqlx::query_as(
        "INSERT INTO answer_keys (assignment_id, question_number, correct_option, description)
        VALUES ($1, $2, $3, $4)
        RETURNING id, assignment_id, question_number, correct_option, description,
                  created_at, updated_at",
    )
    .bind(assignment_id)
    .bind(dto.question_number)
    .bind(&dto.correct_option)
    .bind(&dto.description)
    .fetch_one(db)
    .await?;

    Ok(key)
}

#[instrument(skip(db))]
pub async fn get_answer_keys(
    db: &PgPool,
    teacher_id: Uuid,
    assignment_id: Uuid,
) -> Result<Vec<AnswerKey>, AppError> {
    assignment_for_teacher(db, assignment_id, teacher_id).await?;

    let keys: Vec<AnswerKey> = sqlx::query_as(
        "SELECT id, assignment_id, question_number, correct_option, description,
                created_at, updated_at
        FROM answer_keys
        WHERE assignment_id = $1
        ORDER BY question_number",
    )
    .bind(assignment_id)
    .fetch_all(db)
    .await?;

    Ok(keys)
}

#[instrument(skip(db))]
pub async fn delete_answer_key(
    db: &PgPool,
    teacher_id: Uuid,
    assignment_id: Uuid,
    key_id: Uuid,
) -> Result<(), AppError> {
    assignment_for_teacher(db, assignment_id, teacher_id).await?;

    let deleted = sqlx::query("DELETE FROM answer_keys WHERE id = $1 AND assignment_id = $2")
        .bind(key_id)
        .bind(assignment_id)
        .execute(db)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::not_found("Answer key not found"));
    }

    Ok(())
}

#[instrument(skip(db))]
pub async fn get_submissions(
    db: &PgPool,
    teacher_id: Uuid,
    assignment_id: Uuid,
) -> Result<Vec<Submission>, AppError> {
    assignment_for_teacher(db, assignment_id, teacher_id).await?;

    let submissions: Vec<Submission> = sqlx::query_as(
        "SELECT id, assignment_id, student_id, status, content, result,
                correct_count, total_question, submitted_at
        FROM submissions
        WHERE assignment_id = $1
        ORDER BY submitted_at DESC",
    )
    .bind(assignment_id)
    .fetch_all(db)
    .await?;

    Ok(submissions)
}

#[instrument(skip(db))]
pub async fn get_submission(
    db: &PgPool,
    teacher_id: Uuid,
    submission_id: Uuid,
) -> Result<SubmissionWithAnswers, AppError> {
    let submission = submission_for_teacher(db, submission_id, teacher_id).await?;
    let answers = answers_for_submission(db, submission.id).await?;

    Ok(SubmissionWithAnswers {
        submission,
        answers,
    })
}

#[instrument(skip(db))]
pub async fn get_assignment_stats(
    db: &PgPool,
    teacher_id: Uuid,
    assignment_id: Uuid,
) -> Result<AssignmentStats, AppError> {
    assignment_for_teacher(db, assignment_id, teacher_id).await?;

    let (total_submissions, graded_count, resubmit_required_count, average_result): (
        i64,
        i64,
        i64,
        Option<Decimal>,
    ) = sqlx::query_as(
        "SELECT COUNT(*),
                COUNT(*) FILTER (WHERE status = 'graded'),
                COUNT(*) FILTER (WHERE status = 'resubmit_required'),
                AVG(result) FILTER (WHERE result IS NOT NULL)
        FROM submissions
        WHERE assignment_id = $1",
    )
    .bind(assignment_id)
    .fetch_one(db)
    .await?;

    Ok(AssignmentStats {
        assignment_id,
        total_submissions,
        graded_count,
        resubmit_required_count,
        average_result: average_result.map(|avg| avg.round_dp(2)),
    })
}

/// Manual grade override. Accepts any submission in the teacher's scope
/// and moves it to `graded` with the given score.
#[instrument(skip(db, dto))]
pub async fn manual_grade(
    db: &PgPool,
    teacher_id: Uuid,
    submission_id: Uuid,
    dto: ManualGradeDto,
) -> Result<Submission, AppError> {
    if dto.result < Decimal::ZERO || dto.result > Decimal::from(100) {
        return Err(AppError::validation("Result must be between 0 and 100"));
    }

    submission_for_teacher(db, submission_id, teacher_id).await?;

    let submission: Submission = sqlx::query_as(
        "UPDATE submissions
        SET status = $1, result = $2, content = COALESCE($3, content)
        WHERE id = $4
        RETURNING id, assignment_id, student_id, status, content, result,
                  correct_count, total_question, submitted_at",
    )
    .bind(submission_status::GRADED)
    .bind(dto.result.round_dp(2))
    .bind(&dto.feedback)
    .bind(submission_id)
    .fetch_one(db)
    .await?;

    Ok(submission)
}

/// Sends a graded submission back to the student. The score fields keep
/// their values; only the status and the feedback change.
#[instrument(skip(db, dto))]
pub async fn request_resubmit(
    db: &PgPool,
    teacher_id: Uuid,
    submission_id: Uuid,
    dto: RequestResubmitDto,
) -> Result<Submission, AppError> {
    let submission = submission_for_teacher(db, submission_id, teacher_id).await?;

    if submission.status != submission_status::GRADED {
        return Err(AppError::invalid_state(
            "Only graded submissions can be sent back for resubmission",
        ));
    }

    let submission: Submission = sqlx::query_as(
        "UPDATE submissions
        SET status = $1, content = COALESCE($2, content)
        WHERE id = $3
        RETURNING id, assignment_id, student_id, status, content, result,
                  correct_count, total_question, submitted_at",
    )
    .bind(submission_status::RESUBMIT_REQUIRED)
    .bind(&dto.feedback)
    .bind(submission_id)
    .fetch_one(db)
    .await?;

    Ok(submission)
}

// ============ Student surface ============

#[instrument(skip(db))]
pub async fn get_my_homework(
    db: &PgPool,
    student_id: Uuid,
    params: AssignmentFilterParams,
) -> Result<PaginatedHomeworkResponse, AppError> {
    let limit = params.pagination.limit();
    let offset = params.pagination.offset();

    let assignments: Vec<Assignment> = sqlx::query_as(
        "SELECT id, title, description, due_date, status, session_id, created_at, updated_at
        FROM assignments
        WHERE status = $1
        ORDER BY due_date NULLS LAST, created_at DESC
        LIMIT $2 OFFSET $3",
    )
    .bind(assignment_status::PUBLISHED)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM assignments WHERE status = $1")
        .bind(assignment_status::PUBLISHED)
        .fetch_one(db)
        .await?;

    let mut data = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        let submission = own_submission(db, assignment.id, student_id).await?;
        data.push(HomeworkView {
            assignment,
            submission,
        });
    }

    let has_more = offset + (data.len() as i64) < total.0;

    Ok(PaginatedHomeworkResponse {
        data,
        meta: PaginationMeta {
            total: total.0,
            limit,
            offset,
            has_more,
        },
    })
}

/// Homework start view: the published assignment plus the caller's
/// existing submission, so the client knows whether this is a first
/// attempt, a duplicate, or a requested resubmission.
#[instrument(skip(db))]
pub async fn start_homework(
    db: &PgPool,
    student_id: Uuid,
    assignment_id: Uuid,
) -> Result<HomeworkView, AppError> {
    let assignment: Assignment = sqlx::query_as(
        "SELECT id, title, description, due_date, status, session_id, created_at, updated_at
        FROM assignments
        WHERE id = $1 AND status = $2",
    )
    .bind(assignment_id)
    .bind(assignment_status::PUBLISHED)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found("Assignment not found"))?;

    let submission = own_submission(db, assignment.id, student_id).await?;

    Ok(HomeworkView {
        assignment,
        submission,
    })
}

/// Creates a submission and auto-grades it in one transaction.
///
/// An existing submission in `resubmit_required` is reused (the old
/// answers are deleted wholesale); any other existing submission is a
/// conflict. The unique (assignment, student) constraint backs this up:
/// a race loser surfaces the same conflict instead of a 500.
#[instrument(skip(db, dto))]
pub async fn submit_assignment(
    db: &PgPool,
    student_id: Uuid,
    assignment_id: Uuid,
    dto: SubmitAssignmentDto,
) -> Result<SubmissionWithAnswers, AppError> {
    let mut tx = db.begin().await?;

    let status: Option<(String,)> = sqlx::query_as("SELECT status FROM assignments WHERE id = $1")
        .bind(assignment_id)
        .fetch_optional(&mut *tx)
        .await?;

    match status {
        None => return Err(AppError::not_found("Assignment not found")),
        Some((status,)) if status != assignment_status::PUBLISHED => {
            return Err(AppError::invalid_state(
                "Assignment is not open for submissions",
            ));
        }
        Some(_) => {}
    }

    let existing: Option<(Uuid, String)> = sqlx::query_as(
        "SELECT id, status FROM submissions
        WHERE assignment_id = $1 AND student_id = $2
        FOR UPDATE",
    )
    .bind(assignment_id)
    .bind(student_id)
    .fetch_optional(&mut *tx)
    .await?;

    let submission_id = match existing {
        Some((_, ref status)) if status != submission_status::RESUBMIT_REQUIRED => {
            return Err(AppError::conflict("Assignment already submitted"));
        }
        Some((id, _)) => {
            sqlx::query("DELETE FROM student_answers WHERE submission_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "UPDATE submissions
                SET status = $1, content = $2, result = NULL, correct_count = NULL,
                    total_question = NULL, submitted_at = NOW()
                WHERE id = $3",
            )
            .bind(submission_status::SUBMITTED)
            .bind(&dto.content)
            .bind(id)
            .execute(&mut *tx)
            .await?;
            id
        }
        None => {
            let row: (Uuid,) = sqlx::query_as(
                "INSERT INTO submissions (assignment_id, student_id, status, content)
                VALUES ($1, $2, $3, $4)
                RETURNING id",
            )
            .bind(assignment_id)
            .bind(student_id)
            .bind(submission_status::SUBMITTED)
            .bind(&dto.content)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::conflict("Assignment already submitted")
                } else {
                    e.into()
                }
            })?;
            row.0
        }
    };

    for answer in &dto.answers {
        sqlx::query(
            "INSERT INTO student_answers (submission_id, question_number, selected_option)
            VALUES ($1, $2, $3)",
        )
        .bind(submission_id)
        .bind(answer.question_number)
        .bind(answer.selected_option)
        .execute(&mut *tx)
        .await?;
    }

    grade_submission_tx(&mut tx, submission_id, assignment_id).await?;

    tx.commit().await?;

    fetch_submission_with_answers(db, submission_id).await
}

/// Student-initiated resubmission of a submission that was sent back.
#[instrument(skip(db, dto))]
pub async fn resubmit(
    db: &PgPool,
    student_id: Uuid,
    submission_id: Uuid,
    dto: SubmitAssignmentDto,
) -> Result<SubmissionWithAnswers, AppError> {
    let mut tx = db.begin().await?;

    let existing: Option<(Uuid, String)> = sqlx::query_as(
        "SELECT assignment_id, status FROM submissions
        WHERE id = $1 AND student_id = $2
        FOR UPDATE",
    )
    .bind(submission_id)
    .bind(student_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (assignment_id, status) =
        existing.ok_or_else(|| AppError::not_found("Submission not found"))?;

    if status != submission_status::RESUBMIT_REQUIRED {
        return Err(AppError::invalid_state(
            "Submission is not awaiting resubmission",
        ));
    }

    sqlx::query("DELETE FROM student_answers WHERE submission_id = $1")
        .bind(submission_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "UPDATE submissions
        SET status = $1, content = $2, result = NULL, correct_count = NULL,
            total_question = NULL, submitted_at = NOW()
        WHERE id = $3",
    )
    .bind(submission_status::SUBMITTED)
    .bind(&dto.content)
    .bind(submission_id)
    .execute(&mut *tx)
    .await?;

    for answer in &dto.answers {
        sqlx::query(
            "INSERT INTO student_answers (submission_id, question_number, selected_option)
            VALUES ($1, $2, $3)",
        )
        .bind(submission_id)
        .bind(answer.question_number)
        .bind(answer.selected_option)
        .execute(&mut *tx)
        .await?;
    }

    grade_submission_tx(&mut tx, submission_id, assignment_id).await?;

    tx.commit().await?;

    fetch_submission_with_answers(db, submission_id).await
}

#[instrument(skip(db))]
pub async fn get_my_submissions(
    db: &PgPool,
    student_id: Uuid,
) -> Result<Vec<Submission>, AppError> {
    let submissions: Vec<Submission> = sqlx::query_as(
        "SELECT id, assignment_id, student_id, status, content, result,
                correct_count, total_question, submitted_at
        FROM submissions
        WHERE student_id = $1
        ORDER BY submitted_at DESC",
    )
    .bind(student_id)
    .fetch_all(db)
    .await?;

    Ok(submissions)
}

#[instrument(skip(db))]
pub async fn get_my_submission(
    db: &PgPool,
    student_id: Uuid,
    submission_id: Uuid,
) -> Result<SubmissionWithAnswers, AppError> {
    let submission: Submission = sqlx::query_as(
        "SELECT id, assignment_id, student_id, status, content, result,
                correct_count, total_question, submitted_at
        FROM submissions
        WHERE id = $1 AND student_id = $2",
    )
    .bind(submission_id)
    .bind(student_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found("Submission not found"))?;

    let answers = answers_for_submission(db, submission.id).await?;

    Ok(SubmissionWithAnswers {
        submission,
        answers,
    })
}

// ============ Shared lookups ============

async fn own_submission(
    db: &PgPool,
    assignment_id: Uuid,
    student_id: Uuid,
) -> Result<Option<Submission>, AppError> {
    let submission: Option<Submission> = sqlx::query_as(
        "SELECT id, assignment_id, student_id, status, content, result,
                correct_count, total_question, submitted_at
        FROM submissions
        WHERE assignment_id = $1 AND student_id = $2",
    )
    .bind(assignment_id)
    .bind(student_id)
    .fetch_optional(db)
    .await?;

    Ok(submission)
}

async fn answers_for_submission(
    db: &PgPool,
    submission_id: Uuid,
) -> Result<Vec<StudentAnswer>, AppError> {
    let answers: Vec<StudentAnswer> = sqlx::query_as(
        "SELECT id, submission_id, question_number, selected_option, is_correct, updated_at
        FROM student_answers
        WHERE submission_id = $1
        ORDER BY question_number",
    )
    .bind(submission_id)
    .fetch_all(db)
    .await?;

    Ok(answers)
}

async fn fetch_submission_with_answers(
    db: &PgPool,
    submission_id: Uuid,
) -> Result<SubmissionWithAnswers, AppError> {
    let submission: Submission = sqlx::query_as(
        "SELECT id, assignment_id, student_id, status, content, result,
                correct_count, total_question, submitted_at
        FROM submissions
        WHERE id = $1",
    )
    .bind(submission_id)
    .fetch_one(db)
    .await?;

    let answers = answers_for_submission(db, submission_id).await?;

    Ok(SubmissionWithAnswers {
        submission,
        answers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn keys(entries: &[(i32, &str)]) -> Vec<(i32, String)> {
        entries
            .iter()
            .map(|(number, option)| (*number, option.to_string()))
            .collect()
    }

    #[test]
    fn test_partial_credit() {
        let keys = keys(&[(1, "2"), (2, "1"), (3, "4")]);
        let answers = vec![(1, Some(2)), (2, Some(3))];

        let outcome = score_answers(&keys, &answers).unwrap();
        assert_eq!(outcome.correct_count, 1);
        assert_eq!(outcome.total_question, 3);
        assert_eq!(outcome.result, dec!(33.33));
        assert_eq!(outcome.correctness, vec![1, 0]);
    }

    #[test]
    fn test_no_keys_means_no_grade() {
        let answers = vec![(1, Some(2))];
        assert_eq!(score_answers(&[], &answers), None);
    }

    #[test]
    fn test_all_correct() {
        let keys = keys(&[(1, "1"), (2, "2")]);
        let answers = vec![(1, Some(1)), (2, Some(2))];

        let outcome = score_answers(&keys, &answers).unwrap();
        assert_eq!(outcome.correct_count, 2);
        assert_eq!(outcome.result, dec!(100.00));
    }

    #[test]
    fn test_unanswered_question_lowers_score() {
        // Two keys, one answer: the denominator is the key count.
        let keys = keys(&[(1, "3"), (2, "1")]);
        let answers = vec![(1, Some(3))];

        let outcome = score_answers(&keys, &answers).unwrap();
        assert_eq!(outcome.correct_count, 1);
        assert_eq!(outcome.total_question, 2);
        assert_eq!(outcome.result, dec!(50.00));
    }

    #[test]
    fn test_answer_without_key_counts_as_wrong() {
        let keys = keys(&[(1, "2")]);
        let answers = vec![(1, Some(2)), (9, Some(1))];

        let outcome = score_answers(&keys, &answers).unwrap();
        assert_eq!(outcome.correct_count, 1);
        assert_eq!(outcome.total_question, 1);
        assert_eq!(outcome.correctness, vec![1, 0]);
        assert_eq!(outcome.result, dec!(100.00));
    }

    #[test]
    fn test_null_selection_is_wrong() {
        let keys = keys(&[(1, "2")]);
        let answers = vec![(1, None)];

        let outcome = score_answers(&keys, &answers).unwrap();
        assert_eq!(outcome.correct_count, 0);
        assert_eq!(outcome.result, dec!(0.00));
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let keys = keys(&[(1, "2"), (2, "1"), (3, "4")]);
        let answers = vec![(1, Some(2)), (2, Some(3)), (3, None)];

        let first = score_answers(&keys, &answers).unwrap();
        let second = score_answers(&keys, &answers).unwrap();
        assert_eq!(first, second);
    }
}
