use async_trait::async_trait;
use sqlx::Row;

use crate::application::ports::translation_repository::{TranslationRepository, TranslationRow};
use crate::infrastructure::db::Db;

pub struct SqlxTranslationRepository {
    db: Db,
}

impl SqlxTranslationRepository {
    pub fn new(db: impl Into<Db>) -> Self {
        Self { db: db.into() }
    }
}

#[async_trait]
impl TranslationRepository for SqlxTranslationRepository {
    async fn list_for_config(&self, version: u32) -> anyhow::Result<Vec<TranslationRow>> {
        let rows = sqlx::query(
            r#"SELECT k.id, k.`key`, k.description, k.arguments, v.value
               FROM translation_key k
               LEFT JOIN translation_value v ON v.key_id = k.id AND v.config_version = ?
               ORDER BY k.`key`"#,
        )
        .bind(version)
        .fetch_all(&mut *self.db.conn().await?)
        .await?;
        rows.into_iter()
            .map(|r| {
                let arguments: String = r.get("arguments");
                Ok(TranslationRow {
                    key_id: r.get("id"),
                    key: r.get("key"),
                    description: r.get("description"),
                    // Stored as a JSON array of argument names.
                    arguments: serde_json::from_str(&arguments)?,
                    value: r.get("value"),
                })
            })
            .collect()
    }

    async fn upsert_value(&self, version: u32, key_id: u32, value: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO translation_value (config_version, key_id, value) VALUES (?, ?, ?)
               ON DUPLICATE KEY UPDATE value = VALUES(value)"#,
        )
        .bind(version)
        .bind(key_id)
        .bind(value)
        .execute(&mut *self.db.conn().await?)
        .await?;
        Ok(())
    }
}
