use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::Row;

use crate::application::ports::event_log_repository::{
    EventLogRepository, OptionLogRow, QuestionLogRow,
};
use crate::domain::events::option_event::OptionEventType;
use crate::infrastructure::db::MySqlPool;

pub struct SqlxEventLogRepository {
    pub pool: MySqlPool,
}

impl SqlxEventLogRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventLogRepository for SqlxEventLogRepository {
    async fn save_question_log(
        &self,
        attempt_id: u64,
        question_id: u32,
        timestamp: DateTime<Utc>,
        duration: u32,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO user_test_question_log (attempt_id, question_id, `timestamp`, duration)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(attempt_id)
        .bind(question_id)
        .bind(timestamp.naive_utc())
        .bind(duration)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_option_log(
        &self,
        attempt_id: u64,
        option_id: u32,
        kind: OptionEventType,
        timestamp: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO user_test_option_log (attempt_id, option_id, type, `timestamp`)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(attempt_id)
        .bind(option_id)
        .bind(kind.as_str())
        .bind(timestamp.naive_utc())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_question_logs(&self, attempt_id: u64) -> anyhow::Result<Vec<QuestionLogRow>> {
        let rows = sqlx::query(
            r#"SELECT question_id, `timestamp`, duration
               FROM user_test_question_log
               WHERE attempt_id = ?
               ORDER BY `timestamp`, id"#,
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| {
                let timestamp: NaiveDateTime = r.get("timestamp");
                QuestionLogRow {
                    question_id: r.get("question_id"),
                    timestamp: timestamp.and_utc(),
                    duration: r.get("duration"),
                }
            })
            .collect())
    }

    async fn list_option_logs(&self, attempt_id: u64) -> anyhow::Result<Vec<OptionLogRow>> {
        let rows = sqlx::query(
            r#"SELECT l.option_id, o.question_id, o.correct, l.type, l.`timestamp`
               FROM user_test_option_log l
               JOIN test_option o ON o.id = l.option_id
               WHERE l.attempt_id = ?
               ORDER BY l.`timestamp`, l.id"#,
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|r| {
                let kind: String = r.get("type");
                let timestamp: NaiveDateTime = r.get("timestamp");
                Ok(OptionLogRow {
                    option_id: r.get("option_id"),
                    question_id: r.get("question_id"),
                    correct: r.get("correct"),
                    kind: OptionEventType::parse(&kind)
                        .ok_or_else(|| anyhow::anyhow!("unknown option event type {kind}"))?,
                    timestamp: timestamp.and_utc(),
                })
            })
            .collect()
    }
}
