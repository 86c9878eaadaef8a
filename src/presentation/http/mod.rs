pub mod admins;
pub mod attempts;
pub mod auth;
pub mod configs;
pub mod error;
pub mod event_logs;
pub mod forms;
pub mod health;
pub mod patterns;
pub mod results;
pub mod summaries;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{Router, routing::get};

use crate::bootstrap::app_context::AppContext;
use crate::presentation::ws;

/// Every route backed by the application context. Health is mounted separately since it only needs the pool.
pub fn api_router(ctx: AppContext) -> Router {
    let ws_router = Router::new()
        .route("/ws/option-event", get(ws::option_event_socket))
        .with_state(ctx.clone());

    Router::new()
        .nest("/api/auth", auth::routes(ctx.clone()))
        .nest("/api/users", users::routes(ctx.clone()))
        .nest("/api/admin", admins::routes(ctx.clone()))
        .nest("/api/patterns", patterns::routes(ctx.clone()))
        .nest("/api/configs", configs::routes(ctx.clone()))
        .nest("/api/forms", forms::routes(ctx.clone()))
        .nest("/api/test", attempts::routes(ctx.clone()))
        .nest("/api/event-logs", event_logs::routes(ctx.clone()))
        .nest("/api/summaries", summaries::routes(ctx.clone()))
        .nest("/api/results", results::routes(ctx))
        .merge(ws_router)
}
