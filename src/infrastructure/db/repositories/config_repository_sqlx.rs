use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::{Connection, MySqlConnection, Row};

use crate::application::ports::config_repository::{ConfigFields, ConfigRepository, ConfigRow};
use crate::infrastructure::db::{Db, inserted_id};

const CONFIG_COLUMNS: &str = "version, icon_id, username_pattern_id, title, subtitle, description, informed_consent, anonymous, active";

pub struct SqlxConfigRepository {
    db: Db,
}

impl SqlxConfigRepository {
    pub fn new(db: impl Into<Db>) -> Self {
        Self { db: db.into() }
    }
}

fn config_row(r: &MySqlRow) -> ConfigRow {
    ConfigRow {
        version: r.get("version"),
        icon_id: r.get("icon_id"),
        username_pattern_id: r.get("username_pattern_id"),
        title: r.get("title"),
        subtitle: r.get("subtitle"),
        description: r.get("description"),
        informed_consent: r.get("informed_consent"),
        anonymous: r.get("anonymous"),
        active: r.get("active"),
    }
}

#[async_trait]
impl ConfigRepository for SqlxConfigRepository {
    async fn list(&self) -> anyhow::Result<Vec<ConfigRow>> {
        let rows = sqlx::query(&format!(
            "SELECT {CONFIG_COLUMNS} FROM config ORDER BY version"
        ))
        .fetch_all(&mut *self.db.conn().await?)
        .await?;
        Ok(rows.iter().map(config_row).collect())
    }

    async fn find(&self, version: u32) -> anyhow::Result<Option<ConfigRow>> {
        let row = sqlx::query(&format!(
            "SELECT {CONFIG_COLUMNS} FROM config WHERE version = ?"
        ))
        .bind(version)
        .fetch_optional(&mut *self.db.conn().await?)
        .await?;
        Ok(row.as_ref().map(config_row))
    }

    async fn find_active(&self) -> anyhow::Result<Option<ConfigRow>> {
        let row = sqlx::query(&format!(
            "SELECT {CONFIG_COLUMNS} FROM config WHERE active = TRUE ORDER BY version DESC LIMIT 1"
        ))
        .fetch_optional(&mut *self.db.conn().await?)
        .await?;
        Ok(row.as_ref().map(config_row))
    }

    async fn versions_with_user_data(&self) -> anyhow::Result<HashSet<u32>> {
        let rows = sqlx::query(
            r#"SELECT DISTINCT g.config_version AS version
               FROM user_test_attempt a
               JOIN test_group g ON g.id = a.group_id"#,
        )
        .fetch_all(&mut *self.db.conn().await?)
        .await?;
        Ok(rows.into_iter().map(|r| r.get("version")).collect())
    }

    async fn update_fields(&self, version: u32, fields: &ConfigFields) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE config
               SET title = ?, subtitle = ?, description = ?, informed_consent = ?,
                   anonymous = ?, icon_id = ?, username_pattern_id = ?
               WHERE version = ?"#,
        )
        .bind(&fields.title)
        .bind(&fields.subtitle)
        .bind(&fields.description)
        .bind(&fields.informed_consent)
        .bind(fields.anonymous)
        .bind(fields.icon_id)
        .bind(fields.username_pattern_id)
        .bind(version)
        .execute(&mut *self.db.conn().await?)
        .await?;
        Ok(())
    }

    async fn activate(&self, version: u32) -> anyhow::Result<()> {
        sqlx::query("UPDATE config SET active = (version = ?)")
            .bind(version)
            .execute(&mut *self.db.conn().await?)
            .await?;
        Ok(())
    }

    async fn delete(&self, version: u32) -> anyhow::Result<()> {
        let mut conn = self.db.conn().await?;
        let mut tx = conn.begin().await?;
        // Children cascade from these tables.
        for table in [
            "translation_value",
            "test_group",
            "form",
            "home_faq",
            "home_info_card",
        ] {
            sqlx::query(&format!("DELETE FROM {table} WHERE config_version = ?"))
                .bind(version)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("DELETE FROM config WHERE version = ?")
            .bind(version)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn referenced_image_ids(&self, version: u32) -> anyhow::Result<Vec<u32>> {
        let rows = sqlx::query(
            r#"SELECT icon_id AS id FROM config WHERE version = ?
               UNION
               SELECT icon_id FROM home_info_card WHERE config_version = ?
               UNION
               SELECT q.image_id FROM form_question q
                 JOIN form f ON f.id = q.form_id
                 WHERE f.config_version = ?
               UNION
               SELECT o.image_id FROM form_question_option o
                 JOIN form_question q ON q.id = o.form_question_id
                 JOIN form f ON f.id = q.form_id
                 WHERE f.config_version = ?
               UNION
               SELECT tq.image_id FROM test_question tq
                 JOIN test_phase p ON p.id = tq.phase_id
                 JOIN test_group g ON g.id = p.group_id
                 WHERE g.config_version = ?
               UNION
               SELECT o.image_id FROM test_option o
                 JOIN test_question tq ON tq.id = o.question_id
                 JOIN test_phase p ON p.id = tq.phase_id
                 JOIN test_group g ON g.id = p.group_id
                 WHERE g.config_version = ?"#,
        )
        .bind(version)
        .bind(version)
        .bind(version)
        .bind(version)
        .bind(version)
        .bind(version)
        .fetch_all(&mut *self.db.conn().await?)
        .await?;
        Ok(rows
            .into_iter()
            .filter_map(|r| r.get::<Option<u32>, _>("id"))
            .collect())
    }

    async fn clone_config(&self, version: u32) -> anyhow::Result<u32> {
        let mut conn = self.db.conn().await?;
        let mut tx = conn.begin().await?;
        let res = sqlx::query(
            r#"INSERT INTO config (icon_id, username_pattern_id, title, subtitle, description,
                                   informed_consent, anonymous, active)
               SELECT icon_id, username_pattern_id, title, subtitle, description,
                      informed_consent, anonymous, FALSE
               FROM config WHERE version = ?"#,
        )
        .bind(version)
        .execute(&mut *tx)
        .await?;
        if res.rows_affected() == 0 {
            anyhow::bail!("config {version} not found");
        }
        let new_version = inserted_id(&res)?;

        sqlx::query(
            r#"INSERT INTO home_info_card (config_version, `order`, title, description, icon_id, color)
               SELECT ?, `order`, title, description, icon_id, color
               FROM home_info_card WHERE config_version = ?"#,
        )
        .bind(new_version)
        .bind(version)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            r#"INSERT INTO home_faq (config_version, `order`, question, answer)
               SELECT ?, `order`, question, answer
               FROM home_faq WHERE config_version = ?"#,
        )
        .bind(new_version)
        .bind(version)
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            r#"INSERT INTO translation_value (config_version, key_id, value)
               SELECT ?, key_id, value
               FROM translation_value WHERE config_version = ?"#,
        )
        .bind(new_version)
        .bind(version)
        .execute(&mut *tx)
        .await?;

        clone_forms(&mut tx, version, new_version).await?;
        clone_groups(&mut tx, version, new_version).await?;

        tx.commit().await?;
        Ok(new_version)
    }
}

async fn clone_forms(
    conn: &mut MySqlConnection,
    version: u32,
    new_version: u32,
) -> anyhow::Result<()> {
    let forms = sqlx::query("SELECT id FROM form WHERE config_version = ? ORDER BY id")
        .bind(version)
        .fetch_all(&mut *conn)
        .await?;
    for form in forms {
        let form_id: u32 = form.get("id");
        let res = sqlx::query(
            r#"INSERT INTO form (config_version, title, type)
               SELECT ?, title, type FROM form WHERE id = ?"#,
        )
        .bind(new_version)
        .bind(form_id)
        .execute(&mut *conn)
        .await?;
        let new_form_id = inserted_id(&res)?;

        let questions = sqlx::query("SELECT id FROM form_question WHERE form_id = ? ORDER BY `order`")
            .bind(form_id)
            .fetch_all(&mut *conn)
            .await?;
        for question in questions {
            let question_id: u32 = question.get("id");
            let res = sqlx::query(
                r#"INSERT INTO form_question (form_id, `order`, category, text, image_id, type, min,
                                             max, step, other, min_length, max_length, placeholder)
                   SELECT ?, `order`, category, text, image_id, type, min, max, step, other,
                          min_length, max_length, placeholder
                   FROM form_question WHERE id = ?"#,
            )
            .bind(new_form_id)
            .bind(question_id)
            .execute(&mut *conn)
            .await?;
            let new_question_id = inserted_id(&res)?;

            sqlx::query(
                r#"INSERT INTO form_question_option (form_question_id, `order`, text, image_id)
                   SELECT ?, `order`, text, image_id
                   FROM form_question_option WHERE form_question_id = ?"#,
            )
            .bind(new_question_id)
            .bind(question_id)
            .execute(&mut *conn)
            .await?;
            sqlx::query(
                r#"INSERT INTO form_question_slider_label (form_question_id, number, label)
                   SELECT ?, number, label
                   FROM form_question_slider_label WHERE form_question_id = ?"#,
            )
            .bind(new_question_id)
            .bind(question_id)
            .execute(&mut *conn)
            .await?;
        }
    }
    Ok(())
}

async fn clone_groups(
    conn: &mut MySqlConnection,
    version: u32,
    new_version: u32,
) -> anyhow::Result<()> {
    let groups = sqlx::query("SELECT id FROM test_group WHERE config_version = ? ORDER BY id")
        .bind(version)
        .fetch_all(&mut *conn)
        .await?;
    for group in groups {
        let group_id: u32 = group.get("id");
        let res = sqlx::query(
            r#"INSERT INTO test_group (config_version, label, probability, greeting,
                                       allow_previous_phase, allow_previous_question,
                                       allow_skip_question, randomize_phases)
               SELECT ?, label, probability, greeting, allow_previous_phase,
                      allow_previous_question, allow_skip_question, randomize_phases
               FROM test_group WHERE id = ?"#,
        )
        .bind(new_version)
        .bind(group_id)
        .execute(&mut *conn)
        .await?;
        let new_group_id = inserted_id(&res)?;

        let phases = sqlx::query("SELECT id FROM test_phase WHERE group_id = ? ORDER BY `order`")
            .bind(group_id)
            .fetch_all(&mut *conn)
            .await?;
        for phase in phases {
            let phase_id: u32 = phase.get("id");
            let res = sqlx::query(
                r#"INSERT INTO test_phase (group_id, `order`, randomize_questions)
                   SELECT ?, `order`, randomize_questions FROM test_phase WHERE id = ?"#,
            )
            .bind(new_group_id)
            .bind(phase_id)
            .execute(&mut *conn)
            .await?;
            let new_phase_id = inserted_id(&res)?;

            let questions =
                sqlx::query("SELECT id FROM test_question WHERE phase_id = ? ORDER BY `order`")
                    .bind(phase_id)
                    .fetch_all(&mut *conn)
                    .await?;
            for question in questions {
                let question_id: u32 = question.get("id");
                let res = sqlx::query(
                    r#"INSERT INTO test_question (phase_id, `order`, text, image_id, randomize_options)
                       SELECT ?, `order`, text, image_id, randomize_options
                       FROM test_question WHERE id = ?"#,
                )
                .bind(new_phase_id)
                .bind(question_id)
                .execute(&mut *conn)
                .await?;
                let new_question_id = inserted_id(&res)?;

                sqlx::query(
                    r#"INSERT INTO test_option (question_id, `order`, text, image_id, correct)
                       SELECT ?, `order`, text, image_id, correct
                       FROM test_option WHERE question_id = ?"#,
                )
                .bind(new_question_id)
                .bind(question_id)
                .execute(&mut *conn)
                .await?;
            }
        }
    }
    Ok(())
}
