use axum::{Router, extract::State, http::StatusCode, routing::post};

use crate::application::dto::forms::NewFormAnswers;
use crate::application::errors::ApiError;
use crate::application::use_cases::forms::submit_answers::SubmitFormAnswers;
use crate::bootstrap::app_context::AppContext;
use crate::domain::forms::form::FormType;
use crate::presentation::http::auth::AuthUser;
use crate::presentation::http::error::{ApiJson, ApiPath};

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/:form_type/answers", post(submit_answers))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/forms/{formType}/answers", tag = "Forms",
    params(("formType" = String, Path, description = "`pre` or `post`")),
    request_body = NewFormAnswers,
    responses(
        (status = 201),
        (status = 400, body = ApiHttpError),
        (status = 404, body = ApiHttpError),
        (status = 409, body = ApiHttpError)
    ))]
pub async fn submit_answers(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    ApiPath(form_type): ApiPath<String>,
    ApiJson(req): ApiJson<NewFormAnswers>,
) -> Result<StatusCode, ApiError> {
    let kind = FormType::parse(&form_type)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown form type {form_type}")))?;
    let configs = ctx.config_repo();
    let attempts = ctx.attempt_repo();
    let forms = ctx.form_repo();
    let answers = ctx.form_answer_repo();
    let uc = SubmitFormAnswers {
        configs: configs.as_ref(),
        attempts: attempts.as_ref(),
        forms: forms.as_ref(),
        answers: answers.as_ref(),
    };
    uc.execute(user.id, kind, &req).await?;
    tracing::info!(user_id = user.id, form_type = kind.as_str(), "form_answered");
    Ok(StatusCode::CREATED)
}
