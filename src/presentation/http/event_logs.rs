use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::application::dto::events::{
    NewOptionEventLog, NewQuestionEventLog, QuestionEventLog, QuestionEventLogWithUserId,
};
use crate::application::errors::ApiError;
use crate::application::use_cases::event_logs::list_event_logs::ListEventLogs;
use crate::application::use_cases::event_logs::save_option_event::SaveOptionEvent;
use crate::application::use_cases::event_logs::save_question_event::SaveQuestionEvent;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::{AdminUser, AuthUser};
use crate::presentation::http::error::{ApiJson, ApiPath};

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(list_event_logs))
        .route("/question", post(save_question_event))
        .route("/option", post(save_option_event))
        .route("/:user_id", get(list_user_event_logs))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/event-logs/question", tag = "Event logs",
    request_body = NewQuestionEventLog,
    responses(
        (status = 201),
        (status = 404, body = ApiHttpError),
        (status = 422, body = ApiHttpError)
    ))]
pub async fn save_question_event(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    ApiJson(req): ApiJson<NewQuestionEventLog>,
) -> Result<StatusCode, ApiError> {
    let configs = ctx.config_repo();
    let attempts = ctx.attempt_repo();
    let groups = ctx.test_group_repo();
    let events = ctx.event_log_repo();
    let uc = SaveQuestionEvent {
        configs: configs.as_ref(),
        attempts: attempts.as_ref(),
        groups: groups.as_ref(),
        events: events.as_ref(),
    };
    uc.execute(user.id, &req).await?;
    Ok(StatusCode::CREATED)
}

#[utoipa::path(post, path = "/api/event-logs/option", tag = "Event logs",
    request_body = NewOptionEventLog,
    responses(
        (status = 201),
        (status = 404, body = ApiHttpError),
        (status = 422, body = ApiHttpError)
    ))]
pub async fn save_option_event(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    ApiJson(req): ApiJson<NewOptionEventLog>,
) -> Result<StatusCode, ApiError> {
    save_option(&ctx, user.id, &req).await?;
    Ok(StatusCode::CREATED)
}

/// Entry point shared with the option-event socket.
pub(crate) async fn save_option(
    ctx: &AppContext,
    user_id: u32,
    req: &NewOptionEventLog,
) -> Result<(), ApiError> {
    let configs = ctx.config_repo();
    let attempts = ctx.attempt_repo();
    let groups = ctx.test_group_repo();
    let events = ctx.event_log_repo();
    let uc = SaveOptionEvent {
        configs: configs.as_ref(),
        attempts: attempts.as_ref(),
        groups: groups.as_ref(),
        events: events.as_ref(),
    };
    uc.execute(user_id, req).await
}

#[utoipa::path(get, path = "/api/event-logs", tag = "Event logs", responses(
    (status = 200, body = [QuestionEventLogWithUserId]),
    (status = 403, body = ApiHttpError)
))]
pub async fn list_event_logs(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
) -> Result<Json<Vec<QuestionEventLogWithUserId>>, ApiError> {
    let configs = ctx.config_repo();
    let attempts = ctx.attempt_repo();
    let events = ctx.event_log_repo();
    let uc = ListEventLogs {
        configs: configs.as_ref(),
        attempts: attempts.as_ref(),
        events: events.as_ref(),
    };
    Ok(Json(uc.execute().await?))
}

#[utoipa::path(get, path = "/api/event-logs/{userId}", tag = "Event logs",
    params(("userId" = u32, Path, description = "User id")),
    responses(
        (status = 200, body = [QuestionEventLog]),
        (status = 403, body = ApiHttpError)
    ))]
pub async fn list_user_event_logs(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiPath(user_id): ApiPath<u32>,
) -> Result<Json<Vec<QuestionEventLog>>, ApiError> {
    let configs = ctx.config_repo();
    let attempts = ctx.attempt_repo();
    let events = ctx.event_log_repo();
    let uc = ListEventLogs {
        configs: configs.as_ref(),
        attempts: attempts.as_ref(),
        events: events.as_ref(),
    };
    Ok(Json(uc.for_user(user_id).await?))
}
