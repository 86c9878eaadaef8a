use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::application::dto::results::{
    FormSubmissionsByUser, ResultsByUser, TestResultsByUser,
};
use crate::application::errors::ApiError;
use crate::application::use_cases::results::export_results::{
    ExportResults, ExportUserResults, ResultsArchive, ResultsKind,
};
use crate::application::use_cases::results::get_user_results::GetUserResults;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::AdminUser;
use crate::presentation::http::error::{ApiPath, ApiQuery};

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(export_all))
        .route("/forms", get(export_forms))
        .route("/tests", get(export_tests))
        .route("/users/:user_id", get(user_results))
        .route("/users/:user_id/forms", get(user_form_results))
        .route("/users/:user_id/tests", get(user_test_results))
        .route("/users/:user_id/csv", get(user_results_csv))
        .route("/users/:user_id/forms/csv", get(user_form_results_csv))
        .route("/users/:user_id/tests/csv", get(user_test_results_csv))
        .with_state(ctx)
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// CSV files instead of JSON inside the archive
    #[serde(default)]
    pub csv: bool,
}

async fn export(ctx: &AppContext, kind: ResultsKind, csv: bool) -> Result<Response, ApiError> {
    let users = ctx.user_repo();
    let uc = ExportResults {
        users: users.as_ref(),
        ports: ctx.result_ports(),
    };
    Ok(gzip_attachment(uc.execute(kind, csv).await?))
}

fn gzip_attachment(archive: ResultsArchive) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/gzip"));
    let disposition = format!("attachment; filename={}", archive.file_name);
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    (headers, archive.bytes).into_response()
}

fn csv_body(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "text/csv")], bytes).into_response()
}

#[utoipa::path(get, path = "/api/results", tag = "Results", params(ExportQuery), responses(
    (status = 200, description = "results.tar.gz", content_type = "application/gzip", body = Vec<u8>),
    (status = 403, body = ApiHttpError)
))]
pub async fn export_all(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiQuery(q): ApiQuery<ExportQuery>,
) -> Result<Response, ApiError> {
    export(&ctx, ResultsKind::All, q.csv).await
}

#[utoipa::path(get, path = "/api/results/forms", tag = "Results", params(ExportQuery), responses(
    (status = 200, description = "form-results.tar.gz", content_type = "application/gzip", body = Vec<u8>),
    (status = 403, body = ApiHttpError)
))]
pub async fn export_forms(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiQuery(q): ApiQuery<ExportQuery>,
) -> Result<Response, ApiError> {
    export(&ctx, ResultsKind::Forms, q.csv).await
}

#[utoipa::path(get, path = "/api/results/tests", tag = "Results", params(ExportQuery), responses(
    (status = 200, description = "test-results.tar.gz", content_type = "application/gzip", body = Vec<u8>),
    (status = 403, body = ApiHttpError)
))]
pub async fn export_tests(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiQuery(q): ApiQuery<ExportQuery>,
) -> Result<Response, ApiError> {
    export(&ctx, ResultsKind::Tests, q.csv).await
}

async fn results_of(ctx: &AppContext, user_id: u32) -> Result<ResultsByUser, ApiError> {
    let users = ctx.user_repo();
    let uc = GetUserResults {
        users: users.as_ref(),
        ports: ctx.result_ports(),
    };
    uc.execute(user_id).await
}

#[utoipa::path(get, path = "/api/results/users/{userId}", tag = "Results",
    params(("userId" = u32, Path, description = "User id")),
    responses(
        (status = 200, body = ResultsByUser),
        (status = 404, body = ApiHttpError)
    ))]
pub async fn user_results(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiPath(user_id): ApiPath<u32>,
) -> Result<Json<ResultsByUser>, ApiError> {
    Ok(Json(results_of(&ctx, user_id).await?))
}

#[utoipa::path(get, path = "/api/results/users/{userId}/forms", tag = "Results",
    params(("userId" = u32, Path, description = "User id")),
    responses(
        (status = 200, body = FormSubmissionsByUser),
        (status = 404, body = ApiHttpError)
    ))]
pub async fn user_form_results(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiPath(user_id): ApiPath<u32>,
) -> Result<Json<FormSubmissionsByUser>, ApiError> {
    Ok(Json(results_of(&ctx, user_id).await?.forms()))
}

#[utoipa::path(get, path = "/api/results/users/{userId}/tests", tag = "Results",
    params(("userId" = u32, Path, description = "User id")),
    responses(
        (status = 200, body = TestResultsByUser),
        (status = 404, body = ApiHttpError)
    ))]
pub async fn user_test_results(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiPath(user_id): ApiPath<u32>,
) -> Result<Json<TestResultsByUser>, ApiError> {
    Ok(Json(results_of(&ctx, user_id).await?.tests()))
}

#[utoipa::path(get, path = "/api/results/users/{userId}/csv", tag = "Results",
    params(("userId" = u32, Path, description = "User id")),
    responses(
        (status = 200, description = "results.tar.gz with forms.csv and test.csv", content_type = "application/gzip", body = Vec<u8>),
        (status = 404, body = ApiHttpError)
    ))]
pub async fn user_results_csv(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiPath(user_id): ApiPath<u32>,
) -> Result<Response, ApiError> {
    let users = ctx.user_repo();
    let uc = ExportUserResults {
        users: users.as_ref(),
        ports: ctx.result_ports(),
    };
    Ok(gzip_attachment(uc.archive(user_id).await?))
}

#[utoipa::path(get, path = "/api/results/users/{userId}/forms/csv", tag = "Results",
    params(("userId" = u32, Path, description = "User id")),
    responses(
        (status = 200, content_type = "text/csv", body = String),
        (status = 404, body = ApiHttpError)
    ))]
pub async fn user_form_results_csv(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiPath(user_id): ApiPath<u32>,
) -> Result<Response, ApiError> {
    let users = ctx.user_repo();
    let uc = ExportUserResults {
        users: users.as_ref(),
        ports: ctx.result_ports(),
    };
    Ok(csv_body(uc.forms_csv(user_id).await?))
}

#[utoipa::path(get, path = "/api/results/users/{userId}/tests/csv", tag = "Results",
    params(("userId" = u32, Path, description = "User id")),
    responses(
        (status = 200, content_type = "text/csv", body = String),
        (status = 404, body = ApiHttpError)
    ))]
pub async fn user_test_results_csv(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiPath(user_id): ApiPath<u32>,
) -> Result<Response, ApiError> {
    let users = ctx.user_repo();
    let uc = ExportUserResults {
        users: users.as_ref(),
        ports: ctx.result_ports(),
    };
    Ok(csv_body(uc.tests_csv(user_id).await?))
}
