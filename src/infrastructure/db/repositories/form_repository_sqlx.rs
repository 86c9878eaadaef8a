use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::mysql::MySqlRow;

use crate::application::dto::forms::FormQuestionFields;
use crate::application::ports::form_repository::{
    FormOptionRow, FormQuestionRow, FormRepository, FormRow, SliderLabelRow,
};
use crate::domain::forms::form::{FormQuestionType, FormType};
use crate::infrastructure::db::repositories::{delete_ids, matching_ids};
use crate::infrastructure::db::{Db, inserted_id};

pub struct SqlxFormRepository {
    db: Db,
}

impl SqlxFormRepository {
    pub fn new(db: impl Into<Db>) -> Self {
        Self { db: db.into() }
    }
}

fn question_row(r: &MySqlRow) -> anyhow::Result<FormQuestionRow> {
    let kind: String = r.get("type");
    Ok(FormQuestionRow {
        id: r.get("id"),
        form_id: r.get("form_id"),
        category: r.get("category"),
        text: r.get("text"),
        image_id: r.get("image_id"),
        kind: FormQuestionType::parse(&kind)
            .ok_or_else(|| anyhow::anyhow!("unknown form question type {kind}"))?,
        min: r.get("min"),
        max: r.get("max"),
        step: r.get("step"),
        other: r.get("other"),
        min_length: r.get("min_length"),
        max_length: r.get("max_length"),
        placeholder: r.get("placeholder"),
    })
}

#[async_trait]
impl FormRepository for SqlxFormRepository {
    async fn find_by_config(
        &self,
        version: u32,
        kind: FormType,
    ) -> anyhow::Result<Option<FormRow>> {
        let row = sqlx::query(
            "SELECT id, config_version, title FROM form WHERE config_version = ? AND type = ?",
        )
        .bind(version)
        .bind(kind.as_str())
        .fetch_optional(&mut *self.db.conn().await?)
        .await?;
        Ok(row.map(|r| FormRow {
            id: r.get("id"),
            config_version: r.get("config_version"),
            title: r.get("title"),
            kind,
        }))
    }

    async fn list_questions(&self, form_id: u32) -> anyhow::Result<Vec<FormQuestionRow>> {
        let rows = sqlx::query(
            r#"SELECT id, form_id, category, text, image_id, type, min, max, step, other,
                      min_length, max_length, placeholder
               FROM form_question WHERE form_id = ? ORDER BY `order`"#,
        )
        .bind(form_id)
        .fetch_all(&mut *self.db.conn().await?)
        .await?;
        rows.iter().map(question_row).collect()
    }

    async fn list_options(&self, form_id: u32) -> anyhow::Result<Vec<FormOptionRow>> {
        let rows = sqlx::query(
            r#"SELECT o.id, o.form_question_id, o.text, o.image_id
               FROM form_question_option o
               JOIN form_question q ON q.id = o.form_question_id
               WHERE q.form_id = ?
               ORDER BY q.`order`, o.`order`"#,
        )
        .bind(form_id)
        .fetch_all(&mut *self.db.conn().await?)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| FormOptionRow {
                id: r.get("id"),
                question_id: r.get("form_question_id"),
                text: r.get("text"),
                image_id: r.get("image_id"),
            })
            .collect())
    }

    async fn list_slider_labels(&self, form_id: u32) -> anyhow::Result<Vec<SliderLabelRow>> {
        let rows = sqlx::query(
            r#"SELECT l.id, l.form_question_id, l.number, l.label
               FROM form_question_slider_label l
               JOIN form_question q ON q.id = l.form_question_id
               WHERE q.form_id = ?
               ORDER BY q.`order`, l.number"#,
        )
        .bind(form_id)
        .fetch_all(&mut *self.db.conn().await?)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| SliderLabelRow {
                id: r.get("id"),
                question_id: r.get("form_question_id"),
                number: r.get("number"),
                label: r.get("label"),
            })
            .collect())
    }

    async fn create_form(
        &self,
        version: u32,
        kind: FormType,
        title: Option<&str>,
    ) -> anyhow::Result<u32> {
        let res = sqlx::query("INSERT INTO form (config_version, title, type) VALUES (?, ?, ?)")
            .bind(version)
            .bind(title)
            .bind(kind.as_str())
            .execute(&mut *self.db.conn().await?)
            .await?;
        inserted_id(&res)
    }

    async fn update_form_title(&self, form_id: u32, title: Option<&str>) -> anyhow::Result<()> {
        sqlx::query("UPDATE form SET title = ? WHERE id = ?")
            .bind(title)
            .bind(form_id)
            .execute(&mut *self.db.conn().await?)
            .await?;
        Ok(())
    }

    async fn delete_form(&self, form_id: u32) -> anyhow::Result<()> {
        delete_ids(&mut *self.db.conn().await?, "form", &[form_id]).await
    }

    async fn insert_question(
        &self,
        form_id: u32,
        order: u16,
        fields: &FormQuestionFields,
        image_id: Option<u32>,
    ) -> anyhow::Result<u32> {
        let res = sqlx::query(
            r#"INSERT INTO form_question (form_id, `order`, category, text, image_id, type, min,
                                         max, step, other, min_length, max_length, placeholder)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(form_id)
        .bind(order)
        .bind(&fields.category)
        .bind(&fields.text)
        .bind(image_id)
        .bind(fields.kind.as_str())
        .bind(fields.min)
        .bind(fields.max)
        .bind(fields.step)
        .bind(fields.other)
        .bind(fields.min_length)
        .bind(fields.max_length)
        .bind(&fields.placeholder)
        .execute(&mut *self.db.conn().await?)
        .await?;
        inserted_id(&res)
    }

    async fn update_question(
        &self,
        id: u32,
        order: u16,
        fields: &FormQuestionFields,
        image_id: Option<u32>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE form_question
               SET `order` = ?, category = ?, text = ?, image_id = ?, type = ?, min = ?, max = ?,
                   step = ?, other = ?, min_length = ?, max_length = ?, placeholder = ?
               WHERE id = ?"#,
        )
        .bind(order)
        .bind(&fields.category)
        .bind(&fields.text)
        .bind(image_id)
        .bind(fields.kind.as_str())
        .bind(fields.min)
        .bind(fields.max)
        .bind(fields.step)
        .bind(fields.other)
        .bind(fields.min_length)
        .bind(fields.max_length)
        .bind(&fields.placeholder)
        .bind(id)
        .execute(&mut *self.db.conn().await?)
        .await?;
        Ok(())
    }

    async fn delete_questions(&self, ids: &[u32]) -> anyhow::Result<()> {
        delete_ids(&mut *self.db.conn().await?, "form_question", ids).await
    }

    async fn insert_option(
        &self,
        question_id: u32,
        order: u16,
        text: Option<&str>,
        image_id: Option<u32>,
    ) -> anyhow::Result<u32> {
        let res = sqlx::query(
            r#"INSERT INTO form_question_option (form_question_id, `order`, text, image_id)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(question_id)
        .bind(order)
        .bind(text)
        .bind(image_id)
        .execute(&mut *self.db.conn().await?)
        .await?;
        inserted_id(&res)
    }

    async fn update_option(
        &self,
        id: u32,
        order: u16,
        text: Option<&str>,
        image_id: Option<u32>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE form_question_option SET `order` = ?, text = ?, image_id = ? WHERE id = ?",
        )
        .bind(order)
        .bind(text)
        .bind(image_id)
        .bind(id)
        .execute(&mut *self.db.conn().await?)
        .await?;
        Ok(())
    }

    async fn delete_options(&self, ids: &[u32]) -> anyhow::Result<()> {
        delete_ids(&mut *self.db.conn().await?, "form_question_option", ids).await
    }

    async fn insert_slider_label(
        &self,
        question_id: u32,
        number: u16,
        label: &str,
    ) -> anyhow::Result<u32> {
        let res = sqlx::query(
            "INSERT INTO form_question_slider_label (form_question_id, number, label) VALUES (?, ?, ?)",
        )
        .bind(question_id)
        .bind(number)
        .bind(label)
        .execute(&mut *self.db.conn().await?)
        .await?;
        inserted_id(&res)
    }

    async fn update_slider_label(&self, id: u32, number: u16, label: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE form_question_slider_label SET number = ?, label = ? WHERE id = ?")
            .bind(number)
            .bind(label)
            .bind(id)
            .execute(&mut *self.db.conn().await?)
            .await?;
        Ok(())
    }

    async fn delete_slider_labels(&self, ids: &[u32]) -> anyhow::Result<()> {
        delete_ids(&mut *self.db.conn().await?, "form_question_slider_label", ids).await
    }

    async fn form_has_submissions(&self, form_id: u32) -> anyhow::Result<bool> {
        let row = sqlx::query("SELECT 1 FROM user_form_submission WHERE form_id = ? LIMIT 1")
            .bind(form_id)
            .fetch_optional(&mut *self.db.conn().await?)
            .await?;
        Ok(row.is_some())
    }

    async fn questions_with_answers(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>> {
        matching_ids(
            &mut *self.db.conn().await?,
            "SELECT DISTINCT question_id AS id FROM user_form_answer WHERE question_id IN ",
            ids,
        )
        .await
    }

    async fn options_with_answers(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>> {
        matching_ids(
            &mut *self.db.conn().await?,
            "SELECT DISTINCT option_id AS id FROM user_form_answer WHERE option_id IN ",
            ids,
        )
        .await
    }
}
