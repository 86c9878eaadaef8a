use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use anyhow::Context;
use sqlx::mysql::{MySqlConnection, MySqlPoolOptions, MySqlQueryResult};
use sqlx::pool::PoolConnection;
use sqlx::{MySql, Pool, QueryBuilder, Transaction};
use tokio::sync::{Mutex, MutexGuard};

pub type MySqlPool = Pool<MySql>;

pub type SharedTransaction = Arc<Mutex<Transaction<'static, MySql>>>;

/// Where a repository runs its statements: any pooled connection, or one open
/// transaction shared by every repository of a unit of work.
#[derive(Clone)]
pub enum Db {
    Pool(MySqlPool),
    Tx(SharedTransaction),
}

impl From<MySqlPool> for Db {
    fn from(pool: MySqlPool) -> Self {
        Db::Pool(pool)
    }
}

impl Db {
    pub async fn conn(&self) -> anyhow::Result<DbConn<'_>> {
        Ok(match self {
            Db::Pool(pool) => DbConn::Pooled(pool.acquire().await?),
            Db::Tx(tx) => DbConn::Tx(tx.lock().await),
        })
    }
}

/// A connection borrowed for one repository call.
pub enum DbConn<'a> {
    Pooled(PoolConnection<MySql>),
    Tx(MutexGuard<'a, Transaction<'static, MySql>>),
}

impl Deref for DbConn<'_> {
    type Target = MySqlConnection;

    fn deref(&self) -> &MySqlConnection {
        match self {
            DbConn::Pooled(conn) => &**conn,
            DbConn::Tx(tx) => &***tx,
        }
    }
}

impl DerefMut for DbConn<'_> {
    fn deref_mut(&mut self) -> &mut MySqlConnection {
        match self {
            DbConn::Pooled(conn) => &mut **conn,
            DbConn::Tx(tx) => &mut ***tx,
        }
    }
}

pub async fn connect_pool(database_url: &str, max_connections: u32) -> anyhow::Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn migrate(pool: &MySqlPool) -> anyhow::Result<()> {
    // Uses compile-time embedded migrations under ./migrations
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Liveness probe used by the health endpoint.
pub async fn ping(pool: &MySqlPool) -> anyhow::Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Auto-increment id of an `INT UNSIGNED` primary key.
pub(crate) fn inserted_id(res: &MySqlQueryResult) -> anyhow::Result<u32> {
    u32::try_from(res.last_insert_id()).context("inserted id out of range")
}

/// Appends `(?, ?, ...)` binding every id. Callers skip empty slices.
pub(crate) fn push_id_list(qb: &mut QueryBuilder<'_, MySql>, ids: &[u32]) {
    qb.push("(");
    let mut sep = qb.separated(", ");
    for id in ids {
        sep.push_bind(*id);
    }
    sep.push_unseparated(")");
}

pub mod repositories;
