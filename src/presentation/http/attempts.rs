use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::application::dto::attempts::UserTestAttempt;
use crate::application::errors::ApiError;
use crate::application::use_cases::attempts::begin_attempt::BeginAttempt;
use crate::application::use_cases::attempts::check_active_attempt::CheckActiveAttempt;
use crate::application::use_cases::attempts::continue_attempt::ContinueAttempt;
use crate::application::use_cases::attempts::discard_attempt::DiscardAttempt;
use crate::application::use_cases::attempts::end_attempt::EndAttempt;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::AuthUser;

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/check-active", post(check_active))
        .route("/begin", post(begin))
        .route("/continue", post(continue_attempt))
        .route("/discard", post(discard))
        .route("/end", post(end))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/test/check-active", tag = "Test", responses(
    (status = 200),
    (status = 404, body = ApiHttpError)
))]
pub async fn check_active(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, ApiError> {
    let configs = ctx.config_repo();
    let attempts = ctx.attempt_repo();
    let uc = CheckActiveAttempt {
        configs: configs.as_ref(),
        attempts: attempts.as_ref(),
    };
    uc.execute(user.id).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(post, path = "/api/test/begin", tag = "Test", responses(
    (status = 201, body = UserTestAttempt),
    (status = 409, body = ApiHttpError)
))]
pub async fn begin(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
) -> Result<(StatusCode, Json<UserTestAttempt>), ApiError> {
    let configs = ctx.config_repo();
    let attempts = ctx.attempt_repo();
    let groups = ctx.test_group_repo();
    let uc = BeginAttempt {
        configs: configs.as_ref(),
        attempts: attempts.as_ref(),
        groups: groups.as_ref(),
        images: ctx.images(),
    };
    let attempt = uc.execute(user.id).await?;
    Ok((StatusCode::CREATED, Json(attempt)))
}

#[utoipa::path(post, path = "/api/test/continue", tag = "Test", responses(
    (status = 200, body = UserTestAttempt),
    (status = 404, body = ApiHttpError)
))]
pub async fn continue_attempt(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserTestAttempt>, ApiError> {
    let configs = ctx.config_repo();
    let attempts = ctx.attempt_repo();
    let groups = ctx.test_group_repo();
    let answers = ctx.form_answer_repo();
    let events = ctx.event_log_repo();
    let uc = ContinueAttempt {
        configs: configs.as_ref(),
        attempts: attempts.as_ref(),
        groups: groups.as_ref(),
        answers: answers.as_ref(),
        events: events.as_ref(),
        images: ctx.images(),
    };
    Ok(Json(uc.execute(user.id).await?))
}

#[utoipa::path(post, path = "/api/test/discard", tag = "Test", responses(
    (status = 204),
    (status = 404, body = ApiHttpError)
))]
pub async fn discard(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, ApiError> {
    let configs = ctx.config_repo();
    let attempts = ctx.attempt_repo();
    let uc = DiscardAttempt {
        configs: configs.as_ref(),
        attempts: attempts.as_ref(),
    };
    uc.execute(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/api/test/end", tag = "Test", responses(
    (status = 200),
    (status = 404, body = ApiHttpError)
))]
pub async fn end(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, ApiError> {
    let configs = ctx.config_repo();
    let attempts = ctx.attempt_repo();
    let uc = EndAttempt {
        configs: configs.as_ref(),
        attempts: attempts.as_ref(),
    };
    uc.execute(user.id).await?;
    Ok(StatusCode::OK)
}
