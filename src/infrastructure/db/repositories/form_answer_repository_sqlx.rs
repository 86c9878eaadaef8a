use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{MySql, QueryBuilder, Row};

use crate::application::dto::forms::FormAnswer;
use crate::application::ports::form_answer_repository::{FormAnswerRepository, FormSubmissionRow};
use crate::domain::forms::form::FormType;
use crate::infrastructure::db::MySqlPool;

pub struct SqlxFormAnswerRepository {
    pub pool: MySqlPool,
}

impl SqlxFormAnswerRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn form_type(value: &str) -> anyhow::Result<FormType> {
    FormType::parse(value).ok_or_else(|| anyhow::anyhow!("unknown form type {value}"))
}

#[async_trait]
impl FormAnswerRepository for SqlxFormAnswerRepository {
    async fn has_submission(&self, attempt_id: u64, form_id: u32) -> anyhow::Result<bool> {
        let row = sqlx::query(
            "SELECT 1 FROM user_form_submission WHERE attempt_id = ? AND form_id = ? LIMIT 1",
        )
        .bind(attempt_id)
        .bind(form_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    async fn submitted_types(&self, attempt_id: u64) -> anyhow::Result<Vec<FormType>> {
        let rows = sqlx::query(
            r#"SELECT f.type FROM user_form_submission s
               JOIN form f ON f.id = s.form_id
               WHERE s.attempt_id = ?"#,
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|r| form_type(&r.get::<String, _>("type")))
            .collect()
    }

    async fn save_submission(
        &self,
        attempt_id: u64,
        form_id: u32,
        timestamp: DateTime<Utc>,
        answers: &[FormAnswer],
    ) -> anyhow::Result<u64> {
        let mut tx = self.pool.begin().await?;
        let res = sqlx::query(
            "INSERT INTO user_form_submission (attempt_id, form_id, `timestamp`) VALUES (?, ?, ?)",
        )
        .bind(attempt_id)
        .bind(form_id)
        .bind(timestamp.naive_utc())
        .execute(&mut *tx)
        .await?;
        let submission_id = res.last_insert_id();
        if !answers.is_empty() {
            let mut qb: QueryBuilder<MySql> = QueryBuilder::new(
                "INSERT INTO user_form_answer (form_sub_id, question_id, option_id, value, answer) ",
            );
            qb.push_values(answers, |mut b, a| {
                b.push_bind(submission_id)
                    .push_bind(a.question_id)
                    .push_bind(a.option_id)
                    .push_bind(a.value)
                    .push_bind(a.answer.clone());
            });
            qb.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(submission_id)
    }

    async fn list_for_user(&self, user_id: u32) -> anyhow::Result<Vec<FormSubmissionRow>> {
        let rows = sqlx::query(
            r#"SELECT s.id AS submission_id, s.attempt_id, s.form_id, s.`timestamp`,
                      f.type AS form_type, f.config_version,
                      a.question_id, a.option_id, a.value, a.answer
               FROM user_form_submission s
               JOIN user_test_attempt t ON t.id = s.attempt_id
               JOIN form f ON f.id = s.form_id
               LEFT JOIN user_form_answer a ON a.form_sub_id = s.id
               WHERE t.user_id = ?
               ORDER BY s.`timestamp`, s.id, a.id"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out: Vec<FormSubmissionRow> = Vec::new();
        for r in rows {
            let id: u64 = r.get("submission_id");
            if out.last().map(|s| s.id) != Some(id) {
                let timestamp: NaiveDateTime = r.get("timestamp");
                out.push(FormSubmissionRow {
                    id,
                    attempt_id: r.get("attempt_id"),
                    form_id: r.get("form_id"),
                    form_type: form_type(&r.get::<String, _>("form_type"))?,
                    config_version: r.get("config_version"),
                    timestamp: timestamp.and_utc(),
                    answers: Vec::new(),
                });
            }
            let question_id: Option<u32> = r.get("question_id");
            if let (Some(question_id), Some(submission)) = (question_id, out.last_mut()) {
                submission.answers.push(FormAnswer {
                    question_id,
                    option_id: r.get("option_id"),
                    value: r.get("value"),
                    answer: r.get("answer"),
                });
            }
        }
        Ok(out)
    }
}
