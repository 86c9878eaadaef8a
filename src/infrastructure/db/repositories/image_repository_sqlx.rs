use async_trait::async_trait;
use sqlx::{MySql, QueryBuilder, Row};

use crate::application::ports::image_repository::{ImageRepository, ImageRow};
use crate::infrastructure::db::{Db, inserted_id, push_id_list};

pub struct SqlxImageRepository {
    db: Db,
}

impl SqlxImageRepository {
    pub fn new(db: impl Into<Db>) -> Self {
        Self { db: db.into() }
    }
}

#[async_trait]
impl ImageRepository for SqlxImageRepository {
    async fn find(&self, id: u32) -> anyhow::Result<Option<ImageRow>> {
        let row = sqlx::query("SELECT id, path, alt FROM image WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db.conn().await?)
            .await?;
        Ok(row.map(|r| ImageRow {
            id: r.get("id"),
            path: r.get("path"),
            alt: r.get("alt"),
        }))
    }

    async fn find_many(&self, ids: &[u32]) -> anyhow::Result<Vec<ImageRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb: QueryBuilder<MySql> =
            QueryBuilder::new("SELECT id, path, alt FROM image WHERE id IN ");
        push_id_list(&mut qb, ids);
        let rows = qb.build().fetch_all(&mut *self.db.conn().await?).await?;
        Ok(rows
            .into_iter()
            .map(|r| ImageRow {
                id: r.get("id"),
                path: r.get("path"),
                alt: r.get("alt"),
            })
            .collect())
    }

    async fn create(&self, path: &str, alt: &str) -> anyhow::Result<ImageRow> {
        let res = sqlx::query("INSERT INTO image (path, alt) VALUES (?, ?)")
            .bind(path)
            .bind(alt)
            .execute(&mut *self.db.conn().await?)
            .await?;
        Ok(ImageRow {
            id: inserted_id(&res)?,
            path: path.to_string(),
            alt: alt.to_string(),
        })
    }

    async fn update_path(&self, id: u32, path: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE image SET path = ? WHERE id = ?")
            .bind(path)
            .bind(id)
            .execute(&mut *self.db.conn().await?)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: u32) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM image WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db.conn().await?)
            .await?;
        Ok(())
    }

    async fn is_referenced(&self, id: u32) -> anyhow::Result<bool> {
        let row = sqlx::query(
            r#"SELECT 1 FROM config WHERE icon_id = ?
               UNION ALL SELECT 1 FROM home_info_card WHERE icon_id = ?
               UNION ALL SELECT 1 FROM form_question WHERE image_id = ?
               UNION ALL SELECT 1 FROM form_question_option WHERE image_id = ?
               UNION ALL SELECT 1 FROM test_question WHERE image_id = ?
               UNION ALL SELECT 1 FROM test_option WHERE image_id = ?
               LIMIT 1"#,
        )
        .bind(id)
        .bind(id)
        .bind(id)
        .bind(id)
        .bind(id)
        .bind(id)
        .fetch_optional(&mut *self.db.conn().await?)
        .await?;
        Ok(row.is_some())
    }
}
