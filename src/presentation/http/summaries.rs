use axum::{Json, Router, extract::State, routing::get};

use crate::application::dto::attempts::{TestAttemptSummary, TestAttemptsSummary};
use crate::application::errors::ApiError;
use crate::application::use_cases::summaries::get_summaries::GetSummaries;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::{AdminUser, AuthUser};

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(all_summaries))
        .route("/me", get(my_summary))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/summaries", tag = "Summaries", responses(
    (status = 200, body = TestAttemptsSummary),
    (status = 403, body = ApiHttpError)
))]
pub async fn all_summaries(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
) -> Result<Json<TestAttemptsSummary>, ApiError> {
    let configs = ctx.config_repo();
    let users = ctx.user_repo();
    let attempts = ctx.attempt_repo();
    let events = ctx.event_log_repo();
    let uc = GetSummaries {
        configs: configs.as_ref(),
        users: users.as_ref(),
        attempts: attempts.as_ref(),
        events: events.as_ref(),
    };
    Ok(Json(uc.all().await?))
}

#[utoipa::path(get, path = "/api/summaries/me", tag = "Summaries", responses(
    (status = 200, body = TestAttemptSummary),
    (status = 404, body = ApiHttpError)
))]
pub async fn my_summary(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
) -> Result<Json<TestAttemptSummary>, ApiError> {
    let configs = ctx.config_repo();
    let users = ctx.user_repo();
    let attempts = ctx.attempt_repo();
    let events = ctx.event_log_repo();
    let uc = GetSummaries {
        configs: configs.as_ref(),
        users: users.as_ref(),
        attempts: attempts.as_ref(),
        events: events.as_ref(),
    };
    Ok(Json(uc.latest_for(&user).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};

    use crate::domain::users::user::Role;
    use crate::presentation::http::api_router;
    use crate::presentation::http::test_support::{TestApp, empty_request, send};

    #[tokio::test]
    async fn summaries_cover_finished_attempts_only() {
        let app = TestApp::new(true);
        let group = app.store.add_group(1, "control", 100, &[&[&[true]]]);
        let (user, token) = app.user("ana", Role::User);
        let (_, admin_token) = app.user("root", Role::Admin);

        let (status, body) = send(
            api_router(app.ctx.clone()),
            empty_request("GET", "/api/summaries/me", Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["message"],
            format!("User with id {} does not have any completed test attempts", user.id)
        );

        let attempt = app.store.start_attempt(user.id, group);
        {
            let mut s = app.store.lock();
            let row = s.attempts.iter_mut().find(|a| a.id == attempt).unwrap();
            row.end = Some(Utc::now() + Duration::seconds(30));
        }

        let (status, body) = send(
            api_router(app.ctx.clone()),
            empty_request("GET", "/api/summaries/me", Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["group"], "control");
        assert_eq!(body["user"]["username"], "ana");

        let (status, body) = send(
            api_router(app.ctx.clone()),
            empty_request("GET", "/api/summaries", Some(&admin_token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users"].as_array().unwrap().len(), 1);
        assert_eq!(body["totalQuestionsAnswered"], 0);
    }
}
