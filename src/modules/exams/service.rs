use rand::Rng;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::utils::errors::{AppError, is_unique_violation};
use crate::utils::pagination::PaginationMeta;

use super::model::{
    CreateBlueprintDto, CreateQuestionDto, CreateQuestionGroupDto, CreateRuleDto, ExamAnswer,
    ExamBlueprint, ExamInstance, ExamInstanceWithQuestions, ExamQuestionView, ExamResult,
    ExamResultWithAnswers, ExamRule, ExamSession, GenerateExamDto, GradeExamDto, ManualExamDto,
    PaginatedQuestionsResponse, Question, QuestionFilterParams, QuestionGroup,
    SubmitExamAnswerDto, UpdateInstanceStatusDto, UpdateQuestionDto, difficulty,
    exam_instance_status, exam_result_status,
};

// ============ Sampling ============

/// Selects question ids for an exam, rule by rule.
///
/// Each rule draws a uniform random sample without replacement from the
/// bank entries matching its difficulty. A shortfall is tolerated: a
/// rule asking for more questions than are available takes everything
/// that matches. Questions already selected by an earlier rule are not
/// drawn again, so the result never contains duplicates. Selections
/// concatenate in rule order.
///
/// Rule `part` and `skill` are deliberately not selection predicates
/// yet; only difficulty filters the bank.
pub fn sample_questions<R: Rng + ?Sized>(
    rules: &[(String, i32)],
    bank: &[(Uuid, String)],
    rng: &mut R,
) -> Vec<Uuid> {
    let mut selected: Vec<Uuid> = Vec::new();

    for (rule_difficulty, num_questions) in rules {
        let candidates: Vec<Uuid> = bank
            .iter()
            .filter(|(id, d)| d == rule_difficulty && !selected.contains(id))
            .map(|(id, _)| *id)
            .collect();

        let amount = (*num_questions).max(0) as usize;
        let mut drawn: Vec<Uuid> = candidates
            .choose_multiple(rng, amount.min(candidates.len()))
            .copied()
            .collect();
        selected.append(&mut drawn);
    }

    selected
}

/// Outcome of scoring an exam attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamScore {
    pub correct_count: i32,
    pub total_questions: i32,
    pub score: Decimal,
    /// Correctness per instance question, in question order.
    pub per_question: Vec<(Uuid, bool)>,
}

/// Scores an attempt against the instance's questions.
///
/// Every instance question counts in the denominator; an unanswered
/// question is simply wrong. Correctness is an exact string comparison
/// with the question's stored answer. An empty instance scores 0.
pub fn score_exam(
    questions: &[(Uuid, String)],
    answers: &[(Uuid, Option<String>)],
) -> ExamScore {
    let answer_map: std::collections::HashMap<Uuid, &Option<String>> =
        answers.iter().map(|(id, given)| (*id, given)).collect();

    let per_question: Vec<(Uuid, bool)> = questions
        .iter()
        .map(|(id, correct_answer)| {
            let correct = matches!(
                answer_map.get(id),
                Some(Some(given)) if given == correct_answer
            );
            (*id, correct)
        })
        .collect();

    let correct_count = per_question.iter().filter(|(_, c)| *c).count() as i32;
    let total_questions = questions.len() as i32;

    let score = if total_questions == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(correct_count) * Decimal::from(100) / Decimal::from(total_questions))
            .round_dp(2)
    };

    ExamScore {
        correct_count,
        total_questions,
        score,
        per_question,
    }
}

// ============ Question bank ============

#[instrument(skip(db, dto))]
pub async fn create_question_group(
    db: &PgPool,
    dto: CreateQuestionGroupDto,
) -> Result<QuestionGroup, AppError> {
    let group: QuestionGroup = sqlx::query_as(
        "INSERT INTO question_groups (part, skill, context, audio_file, image_file)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, part, skill, context, audio_file, image_file, created_at, updated_at",
    )
    .bind(&dto.part)
    .bind(&dto.skill)
    .bind(&dto.context)
    .bind(&dto.audio_file)
    .bind(&dto.image_file)
    .fetch_one(db)
    .await?;

    Ok(group)
}

#[instrument(skip(db))]
pub async fn get_question_groups(db: &PgPool) -> Result<Vec<QuestionGroup>, AppError> {
    let groups: Vec<QuestionGroup> = sqlx::query_as(
        "SELECT id, part, skill, context, audio_file, image_file, created_at, updated_at
        FROM question_groups
        ORDER BY part, skill",
    )
    .fetch_all(db)
    .await?;

    Ok(groups)
}

#[instrument(skip(db))]
pub async fn delete_question_group(db: &PgPool, id: Uuid) -> Result<(), AppError> {
    let deleted = sqlx::query("DELETE FROM question_groups WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::not_found("Question group not found"));
    }

    Ok(())
}

#[instrument(skip(db, dto))]
pub async fn create_question(db: &PgPool, dto: CreateQuestionDto) -> Result<Question, AppError> {
    let question_difficulty = dto.difficulty.as_deref().unwrap_or(difficulty::MEDIUM);
    if !difficulty::is_valid(question_difficulty) {
        return Err(AppError::validation(format!(
            "Difficulty must be one of: {}",
            difficulty::ALL.join(", ")
        )));
    }

    let question: Question = sqlx::query_as(
        "INSERT INTO questions
            (group_id, text, option_a, option_b, option_c, option_d, correct_answer, difficulty)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, group_id, text, option_a, option_b, option_c, option_d,
                  correct_answer, difficulty, created_at, updated_at",
    )
    .bind(dto.group_id)
    .bind(&dto.text)
    .bind(&dto.option_a)
    .bind(&dto.option_b)
    .bind(&dto.option_c)
    .bind(&dto.option_d)
    .bind(&dto.correct_answer)
    .bind(question_difficulty)
    .fetch_one(db)
    .await?;

    Ok(question)
}

#[instrument(skip(db))]
pub async fn get_questions(
    db: &PgPool,
    params: QuestionFilterParams,
) -> Result<PaginatedQuestionsResponse, AppError> {
    let limit = params.pagination.limit();
    let offset = params.pagination.offset();

    let questions: Vec<Question> = sqlx::query_as(
        "SELECT id, group_id, text, option_a, option_b, option_c, option_d,
                correct_answer, difficulty, created_at, updated_at
        FROM questions
        WHERE ($1::text IS NULL OR difficulty = $1)
          AND ($2::uuid IS NULL OR group_id = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4",
    )
    .bind(&params.difficulty)
    .bind(params.group_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM questions
        WHERE ($1::text IS NULL OR difficulty = $1)
          AND ($2::uuid IS NULL OR group_id = $2)",
    )
    .bind(&params.difficulty)
    .bind(params.group_id)
    .fetch_one(db)
    .await?;

    let has_more = offset + (questions.len() as i64) < total.0;

    Ok(PaginatedQuestionsResponse {
        data: questions,
        meta: PaginationMeta {
            total: total.0,
            limit,
            offset,
            has_more,
        },
    })
}

#[instrument(skip(db))]
pub async fn get_question_by_id(db: &PgPool, id: Uuid) -> Result<Question, AppError> {
    let question: Question = sqlx::query_as(
        "SELECT id, group_id, text, option_a, option_b, option_c, option_d,
                correct_answer, difficulty, created_at, updated_at
        FROM questions WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found("Question not found"))?;

    Ok(question)
}

#[instrument(skip(db, dto))]
pub async fn update_question(
    db: &PgPool,
    id: Uuid,
    dto: UpdateQuestionDto,
) -> Result<Question, AppError> {
    if let Some(ref value) = dto.difficulty {
        if !difficulty::is_valid(value) {
            return Err(AppError::validation(format!(
                "Difficulty must be one of: {}",
                difficulty::ALL.join(", ")
            )));
        }
    }

    let question: Question = sqlx::query_as(
        "UPDATE questions
        SET group_id = COALESCE($1, group_id),
            text = COALESCE($2, text),
            option_a = COALESCE($3, option_a),
            option_b = COALESCE($4, option_b),
            option_c = COALESCE($5, option_c),
            option_d = COALESCE($6, option_d),
            correct_answer = COALESCE($7, correct_answer),
            difficulty = COALESCE($8, difficulty),
            updated_at = NOW()
        WHERE id = $9
        RETURNING id, group_id, text, option_a, option_b, option_c, option_d,
                  correct_answer, difficulty, created_at, updated_at",
    )
    .bind(dto.group_id)
    .bind(&dto.text)
    .bind(&dto.option_a)
    .bind(&dto.option_b)
    .bind(&dto.option_c)
    .bind(&dto.option_d)
    .bind(&dto.correct_answer)
    .bind(&dto.difficulty)
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found("Question not found"))?;

    Ok(question)
}

#[instrument(skip(db))]
pub async fn delete_question(db: &PgPool, id: Uuid) -> Result<(), AppError> {
    let deleted = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::not_found("Question not found"));
    }

    Ok(())
}

// ============ Blueprints & rules ============

#[instrument(skip(db, dto))]
pub async fn create_blueprint(
    db: &PgPool,
    dto: CreateBlueprintDto,
) -> Result<ExamBlueprint, AppError> {
    let blueprint: ExamBlueprint = sqlx::query_as(
        "INSERT INTO exam_blueprints (exam_type, title, duration, total_questions)
        VALUES ($1, $2, $3, $4)
        RETURNING id, exam_type, title, duration, total_questions, created_at, updated_at",
    )
    .bind(&dto.exam_type)
    .bind(&dto.title)
    .bind(dto.duration)
    .bind(dto.total_questions)
    .fetch_one(db)
    .await?;

    Ok(blueprint)
}

#[instrument(skip(db))]
pub async fn get_blueprints(db: &PgPool) -> Result<Vec<ExamBlueprint>, AppError> {
    let blueprints: Vec<ExamBlueprint> = sqlx::query_as(
        "SELECT id, exam_type, title, duration, total_questions, created_at, updated_at
        FROM exam_blueprints
        ORDER BY created_at DESC",
    )
    .fetch_all(db)
    .await?;

    Ok(blueprints)
}

#[instrument(skip(db))]
pub async fn get_blueprint_by_id(db: &PgPool, id: Uuid) -> Result<ExamBlueprint, AppError> {
    let blueprint: ExamBlueprint = sqlx::query_as(
        "SELECT id, exam_type, title, duration, total_questions, created_at, updated_at
        FROM exam_blueprints WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found("Exam blueprint not found"))?;

    Ok(blueprint)
}

#[instrument(skip(db))]
pub async fn delete_blueprint(db: &PgPool, id: Uuid) -> Result<(), AppError> {
    let deleted = sqlx::query("DELETE FROM exam_blueprints WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::not_found("Exam blueprint not found"));
    }

    Ok(())
}

#[instrument(skip(db, dto))]
pub async fn add_rule(
    db: &PgPool,
    blueprint_id: Uuid,
    dto: CreateRuleDto,
) -> Result<ExamRule, AppError> {
    if !difficulty::is_valid(&dto.difficulty) {
        return Err(AppError::validation(format!(
            "Difficulty must be one of: {}",
            difficulty::ALL.join(", ")
        )));
    }

    get_blueprint_by_id(db, blueprint_id).await?;

    let rule: ExamRule = sqlx::query_as(
        "INSERT INTO exam_rules (blueprint_id, part, skill, difficulty, num_questions)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, blueprint_id, part, skill, difficulty, num_questions,
                  created_at, updated_at",
    )
    .bind(blueprint_id)
    .bind(&dto.part)
    .bind(&dto.skill)
    .bind(&dto.difficulty)
    .bind(dto.num_questions)
    .fetch_one(db)
    .await?;

    Ok(rule)
}

#[instrument(skip(db))]
pub async fn get_rules(db: &PgPool, blueprint_id: Uuid) -> Result<Vec<ExamRule>, AppError> {
    get_blueprint_by_id(db, blueprint_id).await?;

    let rules: Vec<ExamRule> = sqlx::query_as(
        "SELECT id, blueprint_id, part, skill, difficulty, num_questions, created_at, updated_at
        FROM exam_rules
        WHERE blueprint_id = $1
        ORDER BY created_at",
    )
    .bind(blueprint_id)
    .fetch_all(db)
    .await?;

    Ok(rules)
}

// ============ Instance generation ============

/// Generates a published exam instance from a blueprint's rules.
///
/// Sampling is random per call; regenerating from the same blueprint
/// produces a different instance.
#[instrument(skip(db, dto))]
pub async fn generate_exam(
    db: &PgPool,
    created_by: Uuid,
    dto: GenerateExamDto,
) -> Result<ExamInstanceWithQuestions, AppError> {
    let blueprint = get_blueprint_by_id(db, dto.blueprint_id).await?;
    let rules = get_rules(db, blueprint.id).await?;

    let rule_specs: Vec<(String, i32)> = rules
        .iter()
        .map(|r| (r.difficulty.clone(), r.num_questions))
        .collect();

    let bank: Vec<(Uuid, String)> = sqlx::query_as("SELECT id, difficulty FROM questions")
        .fetch_all(db)
        .await?;

    let question_ids = sample_questions(&rule_specs, &bank, &mut rand::thread_rng());

    let title = dto.title.unwrap_or_else(|| blueprint.title.clone());

    persist_instance(
        db,
        Some(blueprint.id),
        &title,
        exam_instance_status::PUBLISHED,
        created_by,
        &question_ids,
    )
    .await
}

/// Creates a hand-picked exam instance. Stays `draft` until published.
#[instrument(skip(db, dto))]
pub async fn create_manual_exam(
    db: &PgPool,
    created_by: Uuid,
    dto: ManualExamDto,
) -> Result<ExamInstanceWithQuestions, AppError> {
    let found: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM questions WHERE id = ANY($1)")
            .bind(&dto.question_ids)
            .fetch_one(db)
            .await?;

    if found.0 != dto.question_ids.len() as i64 {
        return Err(AppError::not_found("One or more questions not found"));
    }

    persist_instance(
        db,
        None,
        &dto.title,
        exam_instance_status::DRAFT,
        created_by,
        &dto.question_ids,
    )
    .await
}

async fn persist_instance(
    db: &PgPool,
    blueprint_id: Option<Uuid>,
    title: &str,
    status: &str,
    created_by: Uuid,
    question_ids: &[Uuid],
) -> Result<ExamInstanceWithQuestions, AppError> {
    let mut tx = db.begin().await?;

    let instance: ExamInstance = sqlx::query_as(
        "INSERT INTO exam_instances (blueprint_id, title, status, created_by)
        VALUES ($1, $2, $3, $4)
        RETURNING id, blueprint_id, title, status, generated_at, created_by",
    )
    .bind(blueprint_id)
    .bind(title)
    .bind(status)
    .bind(created_by)
    .fetch_one(&mut *tx)
    .await?;

    for (index, question_id) in question_ids.iter().enumerate() {
        sqlx::query(
            "INSERT INTO exam_instance_questions (exam_instance_id, question_id, order_number)
            VALUES ($1, $2, $3)",
        )
        .bind(instance.id)
        .bind(question_id)
        .bind((index + 1) as i32)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("Duplicate question in exam instance")
            } else {
                e.into()
            }
        })?;
    }

    tx.commit().await?;

    let questions = instance_questions_full(db, instance.id).await?;

    Ok(ExamInstanceWithQuestions {
        instance,
        questions,
    })
}

#[instrument(skip(db))]
pub async fn get_instances(db: &PgPool) -> Result<Vec<ExamInstance>, AppError> {
    let instances: Vec<ExamInstance> = sqlx::query_as(
        "SELECT id, blueprint_id, title, status, generated_at, created_by
        FROM exam_instances
        ORDER BY generated_at DESC",
    )
    .fetch_all(db)
    .await?;

    Ok(instances)
}

#[instrument(skip(db))]
pub async fn get_instance_by_id(
    db: &PgPool,
    id: Uuid,
) -> Result<ExamInstanceWithQuestions, AppError> {
    let instance = fetch_instance(db, id).await?;
    let questions = instance_questions_full(db, instance.id).await?;

    Ok(ExamInstanceWithQuestions {
        instance,
        questions,
    })
}

#[instrument(skip(db, dto))]
pub async fn update_instance_status(
    db: &PgPool,
    id: Uuid,
    dto: UpdateInstanceStatusDto,
) -> Result<ExamInstance, AppError> {
    if !exam_instance_status::is_valid(&dto.status) {
        return Err(AppError::validation(format!(
            "Status must be one of: {}",
            exam_instance_status::ALL.join(", ")
        )));
    }

    let instance: ExamInstance = sqlx::query_as(
        "UPDATE exam_instances SET status = $1
        WHERE id = $2
        RETURNING id, blueprint_id, title, status, generated_at, created_by",
    )
    .bind(&dto.status)
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found("Exam instance not found"))?;

    Ok(instance)
}

// ============ Exam taking ============

#[instrument(skip(db))]
pub async fn get_available_exams(db: &PgPool) -> Result<Vec<ExamInstance>, AppError> {
    let instances: Vec<ExamInstance> = sqlx::query_as(
        "SELECT id, blueprint_id, title, status, generated_at, created_by
        FROM exam_instances
        WHERE status = $1
        ORDER BY generated_at DESC",
    )
    .bind(exam_instance_status::PUBLISHED)
    .fetch_all(db)
    .await?;

    Ok(instances)
}

/// Starts an exam attempt, or resumes one.
///
/// Starting is idempotent for an `in_progress` attempt: the existing
/// result is returned as-is. A completed or graded attempt is a
/// conflict. A race between two concurrent first starts is decided by
/// the unique (instance, student) constraint; the loser resumes the
/// winner's row.
#[instrument(skip(db))]
pub async fn start_exam(
    db: &PgPool,
    student_id: Uuid,
    instance_id: Uuid,
) -> Result<ExamSession, AppError> {
    let instance = fetch_instance(db, instance_id).await?;
    if instance.status != exam_instance_status::PUBLISHED {
        return Err(AppError::invalid_state("Exam is not open"));
    }

    let existing = fetch_own_result(db, instance_id, student_id).await?;

    let result = match existing {
        Some(result) if result.status == exam_result_status::IN_PROGRESS => result,
        Some(_) => return Err(AppError::conflict("Exam already completed")),
        None => {
            let inserted: Result<ExamResult, sqlx::Error> = sqlx::query_as(
                "INSERT INTO exam_results (exam_instance_id, student_id, status)
                VALUES ($1, $2, $3)
                RETURNING id, exam_instance_id, student_id, status, score, teacher_comment,
                          submitted_at, updated_at",
            )
            .bind(instance_id)
            .bind(student_id)
            .bind(exam_result_status::IN_PROGRESS)
            .fetch_one(db)
            .await;

            match inserted {
                Ok(result) => result,
                Err(e) if is_unique_violation(&e) => {
                    // Lost the race; the winner's row decides.
                    let winner = fetch_own_result(db, instance_id, student_id)
                        .await?
                        .ok_or_else(|| AppError::internal("Exam result vanished"))?;
                    if winner.status != exam_result_status::IN_PROGRESS {
                        return Err(AppError::conflict("Exam already completed"));
                    }
                    winner
                }
                Err(e) => return Err(e.into()),
            }
        }
    };

    let questions = instance_questions_for_student(db, instance_id).await?;

    Ok(ExamSession { result, questions })
}

/// Records or replaces the student's answer to one question.
#[instrument(skip(db, dto))]
pub async fn submit_answer(
    db: &PgPool,
    student_id: Uuid,
    result_id: Uuid,
    dto: SubmitExamAnswerDto,
) -> Result<ExamAnswer, AppError> {
    let result = fetch_result_owned(db, result_id, student_id).await?;

    if result.status != exam_result_status::IN_PROGRESS {
        return Err(AppError::invalid_state("Exam is not in progress"));
    }

    let belongs: (bool,) = sqlx::query_as(
        "SELECT EXISTS (
            SELECT 1 FROM exam_instance_questions
            WHERE exam_instance_id = $1 AND question_id = $2
        )",
    )
    .bind(result.exam_instance_id)
    .bind(dto.question_id)
    .fetch_one(db)
    .await?;

    if !belongs.0 {
        return Err(AppError::not_found("Question is not part of this exam"));
    }

    let answer: ExamAnswer = sqlx::query_as(
        "INSERT INTO exam_answers (result_id, question_id, selected_answer)
        VALUES ($1, $2, $3)
        ON CONFLICT (result_id, question_id)
        DO UPDATE SET selected_answer = EXCLUDED.selected_answer, is_correct = NULL
        RETURNING id, result_id, question_id, selected_answer, is_correct, created_at",
    )
    .bind(result_id)
    .bind(dto.question_id)
    .bind(&dto.selected_answer)
    .fetch_one(db)
    .await?;

    Ok(answer)
}

/// Finishes the attempt: scores every instance question, marks each
/// stored answer, and moves the result to `completed`. One transaction.
#[instrument(skip(db))]
pub async fn finish_exam(
    db: &PgPool,
    student_id: Uuid,
    result_id: Uuid,
) -> Result<ExamResultWithAnswers, AppError> {
    let mut tx = db.begin().await?;

    let result: Option<ExamResult> = sqlx::query_as(
        "SELECT id, exam_instance_id, student_id, status, score, teacher_comment,
                submitted_at, updated_at
        FROM exam_results
        WHERE id = $1 AND student_id = $2
        FOR UPDATE",
    )
    .bind(result_id)
    .bind(student_id)
    .fetch_optional(&mut *tx)
    .await?;

    let result = result.ok_or_else(|| AppError::not_found("Exam result not found"))?;

    if result.status != exam_result_status::IN_PROGRESS {
        return Err(AppError::invalid_state("Exam already completed"));
    }

    let questions: Vec<(Uuid, String)> = sqlx::query_as(
        "SELECT q.id, q.correct_answer
        FROM exam_instance_questions eiq
        JOIN questions q ON q.id = eiq.question_id
        WHERE eiq.exam_instance_id = $1
        ORDER BY eiq.order_number NULLS LAST",
    )
    .bind(result.exam_instance_id)
    .fetch_all(&mut *tx)
    .await?;

    let answers: Vec<(Uuid, Option<String>)> = sqlx::query_as(
        "SELECT question_id, selected_answer FROM exam_answers WHERE result_id = $1",
    )
    .bind(result_id)
    .fetch_all(&mut *tx)
    .await?;

    let outcome = score_exam(&questions, &answers);

    for (question_id, is_correct) in &outcome.per_question {
        sqlx::query(
            "UPDATE exam_answers SET is_correct = $1
            WHERE result_id = $2 AND question_id = $3",
        )
        .bind(is_correct)
        .bind(result_id)
        .bind(question_id)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        "UPDATE exam_results
        SET status = $1, score = $2, submitted_at = NOW(), updated_at = NOW()
        WHERE id = $3",
    )
    .bind(exam_result_status::COMPLETED)
    .bind(outcome.score)
    .bind(result_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let result = fetch_result_owned(db, result_id, student_id).await?;
    let answers = answers_for_result(db, result_id).await?;

    Ok(ExamResultWithAnswers { result, answers })
}

/// Teacher review: moves a completed attempt to `graded`, optionally
/// overriding the score and leaving a comment.
#[instrument(skip(db, dto))]
pub async fn grade_exam(
    db: &PgPool,
    result_id: Uuid,
    dto: GradeExamDto,
) -> Result<ExamResult, AppError> {
    if let Some(score) = dto.score {
        if score < Decimal::ZERO || score > Decimal::from(100) {
            return Err(AppError::validation("Score must be between 0 and 100"));
        }
    }

    let result: Option<(String,)> =
        sqlx::query_as("SELECT status FROM exam_results WHERE id = $1")
            .bind(result_id)
            .fetch_optional(db)
            .await?;

    let (status,) = result.ok_or_else(|| AppError::not_found("Exam result not found"))?;

    if status != exam_result_status::COMPLETED {
        return Err(AppError::invalid_state(
            "Only completed exams can be graded",
        ));
    }

    let result: ExamResult = sqlx::query_as(
        "UPDATE exam_results
        SET status = $1,
            score = COALESCE($2, score),
            teacher_comment = COALESCE($3, teacher_comment),
            updated_at = NOW()
        WHERE id = $4
        RETURNING id, exam_instance_id, student_id, status, score, teacher_comment,
                  submitted_at, updated_at",
    )
    .bind(exam_result_status::GRADED)
    .bind(dto.score.map(|s| s.round_dp(2)))
    .bind(&dto.teacher_comment)
    .bind(result_id)
    .fetch_one(db)
    .await?;

    Ok(result)
}

#[instrument(skip(db))]
pub async fn get_results_for_student(
    db: &PgPool,
    student_id: Uuid,
) -> Result<Vec<ExamResult>, AppError> {
    let results: Vec<ExamResult> = sqlx::query_as(
        "SELECT id, exam_instance_id, student_id, status, score, teacher_comment,
                submitted_at, updated_at
        FROM exam_results
        WHERE student_id = $1
        ORDER BY submitted_at DESC",
    )
    .bind(student_id)
    .fetch_all(db)
    .await?;

    Ok(results)
}

#[instrument(skip(db))]
pub async fn get_result_with_answers(
    db: &PgPool,
    result_id: Uuid,
) -> Result<ExamResultWithAnswers, AppError> {
    let result: ExamResult = sqlx::query_as(
        "SELECT id, exam_instance_id, student_id, status, score, teacher_comment,
                submitted_at, updated_at
        FROM exam_results WHERE id = $1",
    )
    .bind(result_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found("Exam result not found"))?;

    let answers = answers_for_result(db, result_id).await?;

    Ok(ExamResultWithAnswers { result, answers })
}

// ============ Shared lookups ============

async fn fetch_instance(db: &PgPool, id: Uuid) -> Result<ExamInstance, AppError> {
    let instance: ExamInstance = sqlx::query_as(
        "SELECT id, blueprint_id, title, status, generated_at, created_by
        FROM exam_instances WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found("Exam instance not found"))?;

    Ok(instance)
}

async fn fetch_own_result(
    db: &PgPool,
    instance_id: Uuid,
    student_id: Uuid,
) -> Result<Option<ExamResult>, AppError> {
    let result: Option<ExamResult> = sqlx::query_as(
        "SELECT id, exam_instance_id, student_id, status, score, teacher_comment,
                submitted_at, updated_at
        FROM exam_results
        WHERE exam_instance_id = $1 AND student_id = $2",
    )
    .bind(instance_id)
    .bind(student_id)
    .fetch_optional(db)
    .await?;

    Ok(result)
}

async fn fetch_result_owned(
    db: &PgPool,
    result_id: Uuid,
    student_id: Uuid,
) -> Result<ExamResult, AppError> {
    let result: ExamResult = sqlx::query_as(
        "SELECT id, exam_instance_id, student_id, status, score, teacher_comment,
                submitted_at, updated_at
        FROM exam_results
        WHERE id = $1 AND student_id = $2",
    )
    .bind(result_id)
    .bind(student_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found("Exam result not found"))?;

    Ok(result)
}

async fn instance_questions_full(
    db: &PgPool,
    instance_id: Uuid,
) -> Result<Vec<Question>, AppError> {
    let questions: Vec<Question> = sqlx::query_as(
        "SELECT q.id, q.group_id, q.text, q.option_a, q.option_b, q.option_c, q.option_d,
                q.correct_answer, q.difficulty, q.created_at, q.updated_at
        FROM exam_instance_questions eiq
        JOIN questions q ON q.id = eiq.question_id
        WHERE eiq.exam_instance_id = $1
        ORDER BY eiq.order_number NULLS LAST",
    )
    .bind(instance_id)
    .fetch_all(db)
    .await?;

    Ok(questions)
}

async fn instance_questions_for_student(
    db: &PgPool,
    instance_id: Uuid,
) -> Result<Vec<ExamQuestionView>, AppError> {
    let questions: Vec<ExamQuestionView> = sqlx::query_as(
        "SELECT q.id, q.text, q.option_a, q.option_b, q.option_c, q.option_d, eiq.order_number
        FROM exam_instance_questions eiq
        JOIN questions q ON q.id = eiq.question_id
        WHERE eiq.exam_instance_id = $1
        ORDER BY eiq.order_number NULLS LAST",
    )
    .bind(instance_id)
    .fetch_all(db)
    .await?;

    Ok(questions)
}

async fn answers_for_result(db: &PgPool, result_id: Uuid) -> Result<Vec<ExamAnswer>, AppError> {
    let answers: Vec<ExamAnswer> = sqlx::query_as(
        "SELECT id, result_id, question_id, selected_answer, is_correct, created_at
        FROM exam_answers
        WHERE result_id = $1
        ORDER BY created_at",
    )
    .bind(result_id)
    .fetch_all(db)
    .await?;

    Ok(answers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bank(entries: &[(&str, usize)]) -> Vec<(Uuid, String)> {
        let mut bank = Vec::new();
        for (difficulty, count) in entries {
            for _ in 0..*count {
                bank.push((Uuid::new_v4(), difficulty.to_string()));
            }
        }
        bank
    }

    #[test]
    fn test_sampling_fills_quotas() {
        let bank = bank(&[("easy", 10), ("medium", 10), ("hard", 10)]);
        let rules = vec![("easy".to_string(), 2), ("medium".to_string(), 3)];

        let selected = sample_questions(&rules, &bank, &mut rand::thread_rng());
        assert_eq!(selected.len(), 5);

        let easy: Vec<_> = bank
            .iter()
            .filter(|(_, d)| d == "easy")
            .map(|(id, _)| *id)
            .collect();
        assert!(selected[..2].iter().all(|id| easy.contains(id)));
    }

    #[test]
    fn test_sampling_tolerates_shortfall() {
        let bank = bank(&[("hard", 2), ("easy", 5)]);
        let rules = vec![("hard".to_string(), 5)];

        let selected = sample_questions(&rules, &bank, &mut rand::thread_rng());
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_sampling_never_duplicates_across_rules() {
        let bank = bank(&[("easy", 3)]);
        let rules = vec![("easy".to_string(), 2), ("easy".to_string(), 2)];

        let selected = sample_questions(&rules, &bank, &mut rand::thread_rng());
        assert_eq!(selected.len(), 3);
        let mut unique = selected.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), selected.len());
    }

    #[test]
    fn test_sampling_empty_bank() {
        let rules = vec![("easy".to_string(), 4)];
        let selected = sample_questions(&rules, &[], &mut rand::thread_rng());
        assert!(selected.is_empty());
    }

    #[test]
    fn test_exam_scoring() {
        let q: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let questions: Vec<(Uuid, String)> = vec![
            (q[0], "A".to_string()),
            (q[1], "B".to_string()),
            (q[2], "C".to_string()),
            (q[3], "D".to_string()),
        ];
        let answers = vec![
            (q[0], Some("A".to_string())),
            (q[1], Some("B".to_string())),
            (q[2], Some("C".to_string())),
            (q[3], Some("A".to_string())),
        ];

        let outcome = score_exam(&questions, &answers);
        assert_eq!(outcome.correct_count, 3);
        assert_eq!(outcome.total_questions, 4);
        assert_eq!(outcome.score, dec!(75.00));
    }

    #[test]
    fn test_unanswered_question_counts_in_total() {
        let q1 = Uuid::new_v4();
        let q2 = Uuid::new_v4();
        let questions = vec![(q1, "A".to_string()), (q2, "B".to_string())];
        let answers = vec![(q1, Some("A".to_string()))];

        let outcome = score_exam(&questions, &answers);
        assert_eq!(outcome.correct_count, 1);
        assert_eq!(outcome.total_questions, 2);
        assert_eq!(outcome.score, dec!(50.00));
        assert_eq!(outcome.per_question, vec![(q1, true), (q2, false)]);
    }

    #[test]
    fn test_exact_string_match_only() {
        let q1 = Uuid::new_v4();
        let questions = vec![(q1, "A".to_string())];
        let answers = vec![(q1, Some("a".to_string()))];

        let outcome = score_exam(&questions, &answers);
        assert_eq!(outcome.correct_count, 0);
    }

    #[test]
    fn test_empty_exam_scores_zero() {
        let outcome = score_exam(&[], &[]);
        assert_eq!(outcome.total_questions, 0);
        assert_eq!(outcome.score, Decimal::ZERO);
    }
}
