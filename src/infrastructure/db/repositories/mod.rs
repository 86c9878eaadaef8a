pub mod attempt_repository_sqlx;
pub mod config_repository_sqlx;
pub mod config_unit_of_work_sqlx;
pub mod event_log_repository_sqlx;
pub mod form_answer_repository_sqlx;
pub mod form_repository_sqlx;
pub mod home_repository_sqlx;
pub mod image_repository_sqlx;
pub mod pattern_repository_sqlx;
pub mod test_group_repository_sqlx;
pub mod translation_repository_sqlx;
pub mod user_repository_sqlx;

use std::collections::HashSet;

use sqlx::mysql::MySqlConnection;
use sqlx::{MySql, QueryBuilder, Row};

use crate::infrastructure::db::push_id_list;

/// `DELETE FROM <table> WHERE id IN (...)`.
pub(crate) async fn delete_ids(
    conn: &mut MySqlConnection,
    table: &str,
    ids: &[u32],
) -> anyhow::Result<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let mut qb: QueryBuilder<MySql> = QueryBuilder::new(format!("DELETE FROM {table} WHERE id IN "));
    push_id_list(&mut qb, ids);
    qb.build().execute(conn).await?;
    Ok(())
}

/// Runs `<select> (...)` where `select` yields a single `id` column, returning the matched ids.
pub(crate) async fn matching_ids(
    conn: &mut MySqlConnection,
    select: &str,
    ids: &[u32],
) -> anyhow::Result<HashSet<u32>> {
    if ids.is_empty() {
        return Ok(HashSet::new());
    }
    let mut qb: QueryBuilder<MySql> = QueryBuilder::new(select);
    push_id_list(&mut qb, ids);
    let rows = qb.build().fetch_all(conn).await?;
    Ok(rows.into_iter().map(|r| r.get::<u32, _>("id")).collect())
}
