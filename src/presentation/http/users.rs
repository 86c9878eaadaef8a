use axum::{Json, Router, extract::State, routing::get};

use crate::application::dto::users::User;
use crate::application::errors::ApiError;
use crate::application::use_cases::users::get_user::GetUser;
use crate::application::use_cases::users::list_users::ListUsers;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::{AdminUser, AuthUser};
use crate::presentation::http::error::ApiPath;

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(me))
        .route("/:username", get(get_user))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/users", tag = "Users", responses(
    (status = 200, body = [User]),
    (status = 403, body = ApiHttpError)
))]
pub async fn list_users(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
) -> Result<Json<Vec<User>>, ApiError> {
    let repo = ctx.user_repo();
    let uc = ListUsers {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute().await?))
}

#[utoipa::path(get, path = "/api/users/me", tag = "Users", responses(
    (status = 200, body = User),
    (status = 401, body = ApiHttpError)
))]
pub async fn me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user.to_user())
}

#[utoipa::path(get, path = "/api/users/{username}", tag = "Users",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, body = User),
        (status = 404, body = ApiHttpError)
    ))]
pub async fn get_user(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<User>, ApiError> {
    let repo = ctx.user_repo();
    let uc = GetUser {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute(&username).await?))
}
