use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::infrastructure::db::{self, MySqlPool};

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResp {
    pub status: &'static str,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    security(()),
    responses((status = 200, body = HealthResp))
)]
pub async fn health(State(pool): State<MySqlPool>) -> Json<HealthResp> {
    let status = match db::ping(&pool).await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = ?e, "database_ping_failed");
            "degraded"
        }
    };
    Json(HealthResp { status })
}

pub fn routes(pool: MySqlPool) -> Router {
    Router::new().route("/health", get(health)).with_state(pool)
}
