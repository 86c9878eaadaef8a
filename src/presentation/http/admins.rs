use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::application::dto::users::{Admin, NewAdmin};
use crate::application::errors::ApiError;
use crate::application::use_cases::admins::create_admin::CreateAdmin;
use crate::application::use_cases::admins::list_admins::ListAdmins;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::AdminUser;
use crate::presentation::http::error::ApiJson;

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(list_admins).post(create_admin))
        .route("/me", get(me))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/admin", tag = "Admins", responses(
    (status = 200, body = [Admin]),
    (status = 403, body = ApiHttpError)
))]
pub async fn list_admins(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
) -> Result<Json<Vec<Admin>>, ApiError> {
    let repo = ctx.user_repo();
    let uc = ListAdmins {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute().await?))
}

#[utoipa::path(get, path = "/api/admin/me", tag = "Admins", responses(
    (status = 200, body = Admin),
    (status = 403, body = ApiHttpError)
))]
pub async fn me(AdminUser(admin): AdminUser) -> Json<Admin> {
    Json(admin.to_admin())
}

#[utoipa::path(post, path = "/api/admin", tag = "Admins", request_body = NewAdmin, responses(
    (status = 201, body = Admin),
    (status = 422, body = ApiHttpError)
))]
pub async fn create_admin(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiJson(req): ApiJson<NewAdmin>,
) -> Result<(StatusCode, Json<Admin>), ApiError> {
    let repo = ctx.user_repo();
    let uc = CreateAdmin {
        repo: repo.as_ref(),
    };
    let admin = uc.execute(&req).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::domain::users::user::Role;
    use crate::presentation::http::api_router;
    use crate::presentation::http::test_support::{TestApp, empty_request, json_request, send};

    #[tokio::test]
    async fn only_admins_reach_admin_routes() {
        let app = TestApp::new(true);
        let (_, user_token) = app.user("participant", Role::User);
        let (_, admin_token) = app.user("root", Role::Admin);

        let (status, body) = send(api_router(app.ctx.clone()), empty_request("GET", "/api/admin", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 401);

        let (status, _) = send(
            api_router(app.ctx.clone()),
            empty_request("GET", "/api/admin", Some(&user_token)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            api_router(app.ctx.clone()),
            empty_request("GET", "/api/admin/me", Some(&admin_token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "root");
    }

    #[tokio::test]
    async fn creating_an_admin_reports_field_errors() {
        let app = TestApp::new(true);
        let (_, admin_token) = app.user("root", Role::Admin);

        let (status, body) = send(
            api_router(app.ctx.clone()),
            json_request(
                "POST",
                "/api/admin",
                Some(&admin_token),
                json!({"username": "root", "password": "short"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "Invalid admin");
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);

        let (status, body) = send(
            api_router(app.ctx.clone()),
            json_request(
                "POST",
                "/api/admin",
                Some(&admin_token),
                json!({"username": "second", "password": "long-enough-pass"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["username"], "second");
    }
}
