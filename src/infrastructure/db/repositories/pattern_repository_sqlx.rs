use async_trait::async_trait;
use sqlx::Row;

use crate::application::dto::configs::Pattern;
use crate::application::ports::pattern_repository::PatternRepository;
use crate::infrastructure::db::{Db, inserted_id};

pub struct SqlxPatternRepository {
    db: Db,
}

impl SqlxPatternRepository {
    pub fn new(db: impl Into<Db>) -> Self {
        Self { db: db.into() }
    }
}

#[async_trait]
impl PatternRepository for SqlxPatternRepository {
    async fn list_all(&self) -> anyhow::Result<Vec<Pattern>> {
        let rows = sqlx::query("SELECT id, name, `regex` FROM pattern ORDER BY id")
            .fetch_all(&mut *self.db.conn().await?)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| Pattern {
                id: r.get("id"),
                name: r.get("name"),
                regex: r.get("regex"),
            })
            .collect())
    }

    async fn find_by_id(&self, id: u32) -> anyhow::Result<Option<Pattern>> {
        let row = sqlx::query("SELECT id, name, `regex` FROM pattern WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db.conn().await?)
            .await?;
        Ok(row.map(|r| Pattern {
            id: r.get("id"),
            name: r.get("name"),
            regex: r.get("regex"),
        }))
    }

    async fn create(&self, name: &str, regex: &str) -> anyhow::Result<u32> {
        let res = sqlx::query("INSERT INTO pattern (name, `regex`) VALUES (?, ?)")
            .bind(name)
            .bind(regex)
            .execute(&mut *self.db.conn().await?)
            .await?;
        inserted_id(&res)
    }

    async fn update(&self, id: u32, name: &str, regex: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE pattern SET name = ?, `regex` = ? WHERE id = ?")
            .bind(name)
            .bind(regex)
            .bind(id)
            .execute(&mut *self.db.conn().await?)
            .await?;
        Ok(())
    }
}
