use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{MySql, QueryBuilder, Row};
use sqlx::mysql::MySqlRow;

use crate::application::dto::test_groups::TestGroupUpdate;
use crate::application::ports::test_group_repository::{
    PARKED_LABEL_PREFIX, TestGroupRepository, TestGroupRow, TestOptionRow, TestPhaseRow, TestQuestionRow,
};
use crate::infrastructure::db::repositories::{delete_ids, matching_ids};
use crate::infrastructure::db::{Db, inserted_id, push_id_list};

const GROUP_COLUMNS: &str = "id, config_version, label, probability, greeting, allow_previous_phase, allow_previous_question, allow_skip_question, randomize_phases";

/// A question carries user data when it was visited or one of its options has events.
const QUESTION_HAS_LOGS: &str = r#"(EXISTS (SELECT 1 FROM user_test_question_log l WHERE l.question_id = q.id)
     OR EXISTS (SELECT 1 FROM user_test_option_log ol
                JOIN test_option o ON o.id = ol.option_id
                WHERE o.question_id = q.id))"#;

pub struct SqlxTestGroupRepository {
    db: Db,
}

impl SqlxTestGroupRepository {
    pub fn new(db: impl Into<Db>) -> Self {
        Self { db: db.into() }
    }
}

fn group_row(r: &MySqlRow) -> TestGroupRow {
    TestGroupRow {
        id: r.get("id"),
        config_version: r.get("config_version"),
        label: r.get("label"),
        probability: r.get("probability"),
        greeting: r.get("greeting"),
        allow_previous_phase: r.get("allow_previous_phase"),
        allow_previous_question: r.get("allow_previous_question"),
        allow_skip_question: r.get("allow_skip_question"),
        randomize_phases: r.get("randomize_phases"),
    }
}

#[async_trait]
impl TestGroupRepository for SqlxTestGroupRepository {
    async fn list_groups(&self, version: u32) -> anyhow::Result<Vec<TestGroupRow>> {
        let rows = sqlx::query(&format!(
            "SELECT {GROUP_COLUMNS} FROM test_group WHERE config_version = ? ORDER BY id"
        ))
        .bind(version)
        .fetch_all(&mut *self.db.conn().await?)
        .await?;
        Ok(rows.iter().map(group_row).collect())
    }

    async fn find_group(&self, id: u32) -> anyhow::Result<Option<TestGroupRow>> {
        let row = sqlx::query(&format!(
            "SELECT {GROUP_COLUMNS} FROM test_group WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db.conn().await?)
        .await?;
        Ok(row.as_ref().map(group_row))
    }

    async fn list_phases(&self, group_id: u32) -> anyhow::Result<Vec<TestPhaseRow>> {
        let rows = sqlx::query(
            "SELECT id, group_id, randomize_questions FROM test_phase WHERE group_id = ? ORDER BY `order`",
        )
        .bind(group_id)
        .fetch_all(&mut *self.db.conn().await?)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| TestPhaseRow {
                id: r.get("id"),
                group_id: r.get("group_id"),
                randomize_questions: r.get("randomize_questions"),
            })
            .collect())
    }

    async fn list_questions(&self, group_id: u32) -> anyhow::Result<Vec<TestQuestionRow>> {
        let rows = sqlx::query(
            r#"SELECT q.id, q.phase_id, q.text, q.image_id, q.randomize_options
               FROM test_question q
               JOIN test_phase p ON p.id = q.phase_id
               WHERE p.group_id = ?
               ORDER BY p.`order`, q.`order`"#,
        )
        .bind(group_id)
        .fetch_all(&mut *self.db.conn().await?)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| TestQuestionRow {
                id: r.get("id"),
                phase_id: r.get("phase_id"),
                text: r.get("text"),
                image_id: r.get("image_id"),
                randomize_options: r.get("randomize_options"),
            })
            .collect())
    }

    async fn list_options(&self, group_id: u32) -> anyhow::Result<Vec<TestOptionRow>> {
        let rows = sqlx::query(
            r#"SELECT o.id, o.question_id, o.text, o.image_id, o.correct
               FROM test_option o
               JOIN test_question q ON q.id = o.question_id
               JOIN test_phase p ON p.id = q.phase_id
               WHERE p.group_id = ?
               ORDER BY p.`order`, q.`order`, o.`order`"#,
        )
        .bind(group_id)
        .fetch_all(&mut *self.db.conn().await?)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| TestOptionRow {
                id: r.get("id"),
                question_id: r.get("question_id"),
                text: r.get("text"),
                image_id: r.get("image_id"),
                correct: r.get("correct"),
            })
            .collect())
    }

    async fn question_group_id(&self, question_id: u32) -> anyhow::Result<Option<u32>> {
        let row = sqlx::query(
            r#"SELECT p.group_id FROM test_question q
               JOIN test_phase p ON p.id = q.phase_id
               WHERE q.id = ?"#,
        )
        .bind(question_id)
        .fetch_optional(&mut *self.db.conn().await?)
        .await?;
        Ok(row.map(|r| r.get("group_id")))
    }

    async fn option_group_id(&self, option_id: u32) -> anyhow::Result<Option<u32>> {
        let row = sqlx::query(
            r#"SELECT p.group_id FROM test_option o
               JOIN test_question q ON q.id = o.question_id
               JOIN test_phase p ON p.id = q.phase_id
               WHERE o.id = ?"#,
        )
        .bind(option_id)
        .fetch_optional(&mut *self.db.conn().await?)
        .await?;
        Ok(row.map(|r| r.get("group_id")))
    }

    async fn insert_group(&self, version: u32, group: &TestGroupUpdate) -> anyhow::Result<u32> {
        let res = sqlx::query(
            r#"INSERT INTO test_group (config_version, label, probability, greeting,
                                       allow_previous_phase, allow_previous_question,
                                       allow_skip_question, randomize_phases)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(version)
        .bind(&group.label)
        .bind(group.probability)
        .bind(&group.greeting)
        .bind(group.allow_previous_phase)
        .bind(group.allow_previous_question)
        .bind(group.allow_skip_question)
        .bind(group.randomize_phases)
        .execute(&mut *self.db.conn().await?)
        .await?;
        inserted_id(&res)
    }

    async fn update_group(&self, id: u32, group: &TestGroupUpdate) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE test_group
               SET label = ?, probability = ?, greeting = ?, allow_previous_phase = ?,
                   allow_previous_question = ?, allow_skip_question = ?, randomize_phases = ?
               WHERE id = ?"#,
        )
        .bind(&group.label)
        .bind(group.probability)
        .bind(&group.greeting)
        .bind(group.allow_previous_phase)
        .bind(group.allow_previous_question)
        .bind(group.allow_skip_question)
        .bind(group.randomize_phases)
        .bind(id)
        .execute(&mut *self.db.conn().await?)
        .await?;
        Ok(())
    }

    async fn park_labels(&self, ids: &[u32]) -> anyhow::Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut qb: QueryBuilder<MySql> = QueryBuilder::new("UPDATE test_group SET label = CONCAT(");
        qb.push_bind(PARKED_LABEL_PREFIX);
        qb.push(", id) WHERE id IN ");
        push_id_list(&mut qb, ids);
        qb.build().execute(&mut *self.db.conn().await?).await?;
        Ok(())
    }

    async fn delete_groups(&self, ids: &[u32]) -> anyhow::Result<()> {
        delete_ids(&mut *self.db.conn().await?, "test_group", ids).await
    }

    async fn insert_phase(
        &self,
        group_id: u32,
        order: u16,
        randomize_questions: bool,
    ) -> anyhow::Result<u32> {
        let res = sqlx::query(
            "INSERT INTO test_phase (group_id, `order`, randomize_questions) VALUES (?, ?, ?)",
        )
        .bind(group_id)
        .bind(order)
        .bind(randomize_questions)
        .execute(&mut *self.db.conn().await?)
        .await?;
        inserted_id(&res)
    }

    async fn update_phase(
        &self,
        id: u32,
        order: u16,
        randomize_questions: bool,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE test_phase SET `order` = ?, randomize_questions = ? WHERE id = ?")
            .bind(order)
            .bind(randomize_questions)
            .bind(id)
            .execute(&mut *self.db.conn().await?)
            .await?;
        Ok(())
    }

    async fn delete_phases(&self, ids: &[u32]) -> anyhow::Result<()> {
        delete_ids(&mut *self.db.conn().await?, "test_phase", ids).await
    }

    async fn insert_question(
        &self,
        phase_id: u32,
        order: u16,
        text: Option<&str>,
        image_id: Option<u32>,
        randomize_options: bool,
    ) -> anyhow::Result<u32> {
        let res = sqlx::query(
            r#"INSERT INTO test_question (phase_id, `order`, text, image_id, randomize_options)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(phase_id)
        .bind(order)
        .bind(text)
        .bind(image_id)
        .bind(randomize_options)
        .execute(&mut *self.db.conn().await?)
        .await?;
        inserted_id(&res)
    }

    async fn update_question(
        &self,
        id: u32,
        order: u16,
        text: Option<&str>,
        image_id: Option<u32>,
        randomize_options: bool,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE test_question
               SET `order` = ?, text = ?, image_id = ?, randomize_options = ?
               WHERE id = ?"#,
        )
        .bind(order)
        .bind(text)
        .bind(image_id)
        .bind(randomize_options)
        .bind(id)
        .execute(&mut *self.db.conn().await?)
        .await?;
        Ok(())
    }

    async fn delete_questions(&self, ids: &[u32]) -> anyhow::Result<()> {
        delete_ids(&mut *self.db.conn().await?, "test_question", ids).await
    }

    async fn insert_option(
        &self,
        question_id: u32,
        order: u16,
        text: Option<&str>,
        image_id: Option<u32>,
        correct: bool,
    ) -> anyhow::Result<u32> {
        let res = sqlx::query(
            r#"INSERT INTO test_option (question_id, `order`, text, image_id, correct)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(question_id)
        .bind(order)
        .bind(text)
        .bind(image_id)
        .bind(correct)
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
        correct: bool,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE test_option SET `order` = ?, text = ?, image_id = ?, correct = ? WHERE id = ?",
        )
        .bind(order)
        .bind(text)
        .bind(image_id)
        .bind(correct)
        .bind(id)
        .execute(&mut *self.db.conn().await?)
        .await?;
        Ok(())
    }

    async fn delete_options(&self, ids: &[u32]) -> anyhow::Result<()> {
        delete_ids(&mut *self.db.conn().await?, "test_option", ids).await
    }

    async fn groups_with_user_data(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>> {
        matching_ids(
            &mut *self.db.conn().await?,
            "SELECT DISTINCT group_id AS id FROM user_test_attempt WHERE group_id IN ",
            ids,
        )
        .await
    }

    async fn phases_with_user_data(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>> {
        let select = format!(
            "SELECT DISTINCT q.phase_id AS id FROM test_question q WHERE {QUESTION_HAS_LOGS} AND q.phase_id IN "
        );
        matching_ids(&mut *self.db.conn().await?, &select, ids).await
    }

    async fn questions_with_user_data(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>> {
        let select =
            format!("SELECT q.id FROM test_question q WHERE {QUESTION_HAS_LOGS} AND q.id IN ");
        matching_ids(&mut *self.db.conn().await?, &select, ids).await
    }

    async fn options_with_user_data(&self, ids: &[u32]) -> anyhow::Result<HashSet<u32>> {
        matching_ids(
            &mut *self.db.conn().await?,
            "SELECT DISTINCT option_id AS id FROM user_test_option_log WHERE option_id IN ",
            ids,
        )
        .await
    }
}
