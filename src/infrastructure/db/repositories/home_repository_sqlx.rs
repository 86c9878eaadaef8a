use async_trait::async_trait;
use sqlx::Row;

use crate::application::ports::home_repository::{FaqRow, HomeRepository, InformationCardRow};
use crate::infrastructure::db::repositories::delete_ids;
use crate::infrastructure::db::{Db, inserted_id};

pub struct SqlxHomeRepository {
    db: Db,
}

impl SqlxHomeRepository {
    pub fn new(db: impl Into<Db>) -> Self {
        Self { db: db.into() }
    }
}

#[async_trait]
impl HomeRepository for SqlxHomeRepository {
    async fn list_cards(&self, version: u32) -> anyhow::Result<Vec<InformationCardRow>> {
        let rows = sqlx::query(
            r#"SELECT id, title, description, color, icon_id
               FROM home_info_card WHERE config_version = ? ORDER BY `order`"#,
        )
        .bind(version)
        .fetch_all(&mut *self.db.conn().await?)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| InformationCardRow {
                id: r.get("id"),
                title: r.get("title"),
                description: r.get("description"),
                color: r.get("color"),
                icon_id: r.get("icon_id"),
            })
            .collect())
    }

    async fn insert_card(
        &self,
        version: u32,
        order: u16,
        card: &InformationCardRow,
    ) -> anyhow::Result<u32> {
        let res = sqlx::query(
            r#"INSERT INTO home_info_card (config_version, `order`, title, description, icon_id, color)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(version)
        .bind(order)
        .bind(&card.title)
        .bind(&card.description)
        .bind(card.icon_id)
        .bind(card.color)
        .execute(&mut *self.db.conn().await?)
        .await?;
        inserted_id(&res)
    }

    async fn update_card(&self, order: u16, card: &InformationCardRow) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE home_info_card
               SET `order` = ?, title = ?, description = ?, icon_id = ?, color = ?
               WHERE id = ?"#,
        )
        .bind(order)
        .bind(&card.title)
        .bind(&card.description)
        .bind(card.icon_id)
        .bind(card.color)
        .bind(card.id)
        .execute(&mut *self.db.conn().await?)
        .await?;
        Ok(())
    }

    async fn delete_cards(&self, ids: &[u32]) -> anyhow::Result<()> {
        delete_ids(&mut *self.db.conn().await?, "home_info_card", ids).await
    }

    async fn list_faq(&self, version: u32) -> anyhow::Result<Vec<FaqRow>> {
        let rows = sqlx::query(
            "SELECT id, question, answer FROM home_faq WHERE config_version = ? ORDER BY `order`",
        )
        .bind(version)
        .fetch_all(&mut *self.db.conn().await?)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| FaqRow {
                id: r.get("id"),
                question: r.get("question"),
                answer: r.get("answer"),
            })
            .collect())
    }

    async fn insert_faq(&self, version: u32, order: u16, faq: &FaqRow) -> anyhow::Result<u32> {
        let res = sqlx::query(
            "INSERT INTO home_faq (config_version, `order`, question, answer) VALUES (?, ?, ?, ?)",
        )
        .bind(version)
        .bind(order)
        .bind(&faq.question)
        .bind(&faq.answer)
        .execute(&mut *self.db.conn().await?)
        .await?;
        inserted_id(&res)
    }

    async fn update_faq(&self, order: u16, faq: &FaqRow) -> anyhow::Result<()> {
        sqlx::query("UPDATE home_faq SET `order` = ?, question = ?, answer = ? WHERE id = ?")
            .bind(order)
            .bind(&faq.question)
            .bind(&faq.answer)
            .bind(faq.id)
            .execute(&mut *self.db.conn().await?)
            .await?;
        Ok(())
    }

    async fn delete_faq(&self, ids: &[u32]) -> anyhow::Result<()> {
        delete_ids(&mut *self.db.conn().await?, "home_faq", ids).await
    }
}
