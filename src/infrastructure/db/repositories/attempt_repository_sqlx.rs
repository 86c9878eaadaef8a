use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::Row;
use sqlx::mysql::MySqlRow;

use crate::application::ports::attempt_repository::{AttemptRepository, AttemptRow};
use crate::infrastructure::db::MySqlPool;

const ATTEMPT_SELECT: &str = r#"SELECT a.id, a.user_id, a.group_id, g.label AS group_label,
       g.config_version, a.`start`, a.`end`
FROM user_test_attempt a
JOIN test_group g ON g.id = a.group_id"#;

pub struct SqlxAttemptRepository {
    pub pool: MySqlPool,
}

impl SqlxAttemptRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn attempt_row(r: &MySqlRow) -> AttemptRow {
    let start: NaiveDateTime = r.get("start");
    let end: Option<NaiveDateTime> = r.get("end");
    AttemptRow {
        id: r.get("id"),
        user_id: r.get("user_id"),
        group_id: r.get("group_id"),
        group_label: r.get("group_label"),
        config_version: r.get("config_version"),
        start: start.and_utc(),
        end: end.map(|e| e.and_utc()),
    }
}

#[async_trait]
impl AttemptRepository for SqlxAttemptRepository {
    async fn find_unfinished(
        &self,
        user_id: u32,
        config_version: u32,
    ) -> anyhow::Result<Option<AttemptRow>> {
        let row = sqlx::query(&format!(
            "{ATTEMPT_SELECT} WHERE a.user_id = ? AND g.config_version = ? AND a.`end` IS NULL \
             ORDER BY a.`start` DESC LIMIT 1"
        ))
        .bind(user_id)
        .bind(config_version)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(attempt_row))
    }

    async fn create(
        &self,
        user_id: u32,
        group_id: u32,
        start: DateTime<Utc>,
    ) -> anyhow::Result<u64> {
        let res =
            sqlx::query("INSERT INTO user_test_attempt (user_id, group_id, `start`) VALUES (?, ?, ?)")
                .bind(user_id)
                .bind(group_id)
                .bind(start.naive_utc())
                .execute(&self.pool)
                .await?;
        Ok(res.last_insert_id())
    }

    async fn finish(&self, id: u64, end: DateTime<Utc>) -> anyhow::Result<()> {
        sqlx::query("UPDATE user_test_attempt SET `end` = ? WHERE id = ?")
            .bind(end.naive_utc())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: u64) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for table in [
            "user_test_option_log",
            "user_test_question_log",
            "user_form_submission",
        ] {
            sqlx::query(&format!("DELETE FROM {table} WHERE attempt_id = ?"))
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("DELETE FROM user_test_attempt WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_finished(&self) -> anyhow::Result<Vec<AttemptRow>> {
        let rows = sqlx::query(&format!(
            "{ATTEMPT_SELECT} WHERE a.`end` IS NOT NULL ORDER BY a.`end` DESC, a.id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(attempt_row).collect())
    }

    async fn latest_finished(
        &self,
        user_id: u32,
        config_version: u32,
    ) -> anyhow::Result<Option<AttemptRow>> {
        let row = sqlx::query(&format!(
            "{ATTEMPT_SELECT} WHERE a.user_id = ? AND g.config_version = ? AND a.`end` IS NOT NULL \
             ORDER BY a.`end` DESC, a.id DESC LIMIT 1"
        ))
        .bind(user_id)
        .bind(config_version)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(attempt_row))
    }

    async fn list_by_config(&self, config_version: u32) -> anyhow::Result<Vec<AttemptRow>> {
        let rows = sqlx::query(&format!(
            "{ATTEMPT_SELECT} WHERE g.config_version = ? ORDER BY a.`start`, a.id"
        ))
        .bind(config_version)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(attempt_row).collect())
    }

    async fn list_by_user(&self, user_id: u32) -> anyhow::Result<Vec<AttemptRow>> {
        let rows = sqlx::query(&format!(
            "{ATTEMPT_SELECT} WHERE a.user_id = ? ORDER BY a.`start`, a.id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(attempt_row).collect())
    }
}
