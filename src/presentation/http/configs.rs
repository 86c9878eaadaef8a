use axum::{
    Json, Router,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use utoipa::ToSchema;

use crate::application::dto::configs::{
    ClonedConfig, ConfigPreview, ConfigUpdate, FullConfig, TrimmedConfig,
};
use crate::application::dto::images::{ImageSlot, ImageSlots, UploadedFile};
use crate::application::errors::{ApiError, FieldError};
use crate::application::use_cases::configs::activate_config::ActivateConfig;
use crate::application::use_cases::configs::clone_config::CloneConfig;
use crate::application::use_cases::configs::delete_config::DeleteConfig;
use crate::application::use_cases::configs::get_config::{
    GetActiveConfig, GetActiveFullConfig, GetConfig,
};
use crate::application::use_cases::configs::list_configs::ListConfigs;
use crate::application::use_cases::configs::update_config::{
    ConfigUpdateFiles, UpdateActiveConfig,
};
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::AdminUser;
use crate::presentation::http::error::ApiPath;

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(list_configs))
        .route("/active", get(get_active_config).patch(update_active_config))
        .route("/active/full", get(get_active_full_config))
        .route("/:version", get(get_config).delete(delete_config))
        .route("/:version/activate", post(activate_config))
        .route("/:version/clone", post(clone_config))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/configs", tag = "Configs", responses(
    (status = 200, body = [ConfigPreview]),
    (status = 403, body = ApiHttpError)
))]
pub async fn list_configs(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
) -> Result<Json<Vec<ConfigPreview>>, ApiError> {
    let uc = ListConfigs {
        ports: ctx.config_ports(),
    };
    Ok(Json(uc.execute().await?))
}

#[utoipa::path(get, path = "/api/configs/active", tag = "Configs", security(()), responses(
    (status = 200, body = TrimmedConfig)
))]
pub async fn get_active_config(
    State(ctx): State<AppContext>,
) -> Result<Json<TrimmedConfig>, ApiError> {
    let uc = GetActiveConfig {
        ports: ctx.config_ports(),
    };
    Ok(Json(uc.execute().await?))
}

#[utoipa::path(get, path = "/api/configs/active/full", tag = "Configs", responses(
    (status = 200, body = FullConfig),
    (status = 403, body = ApiHttpError)
))]
pub async fn get_active_full_config(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
) -> Result<Json<FullConfig>, ApiError> {
    let uc = GetActiveFullConfig {
        ports: ctx.config_ports(),
    };
    Ok(Json(uc.execute().await?))
}

#[utoipa::path(get, path = "/api/configs/{version}", tag = "Configs",
    params(("version" = u32, Path, description = "Configuration version")),
    responses(
        (status = 200, body = FullConfig),
        (status = 404, body = ApiHttpError)
    ))]
pub async fn get_config(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiPath(version): ApiPath<u32>,
) -> Result<Json<FullConfig>, ApiError> {
    let uc = GetConfig {
        ports: ctx.config_ports(),
    };
    Ok(Json(uc.execute(version).await?))
}

#[utoipa::path(delete, path = "/api/configs/{version}", tag = "Configs",
    params(("version" = u32, Path, description = "Configuration version")),
    responses(
        (status = 204),
        (status = 404, body = ApiHttpError),
        (status = 409, body = ApiHttpError)
    ))]
pub async fn delete_config(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiPath(version): ApiPath<u32>,
) -> Result<StatusCode, ApiError> {
    let uc = DeleteConfig {
        ports: ctx.config_ports(),
    };
    uc.execute(version).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/api/configs/{version}/activate", tag = "Configs",
    params(("version" = u32, Path, description = "Configuration version")),
    responses(
        (status = 200),
        (status = 404, body = ApiHttpError)
    ))]
pub async fn activate_config(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiPath(version): ApiPath<u32>,
) -> Result<StatusCode, ApiError> {
    let repo = ctx.config_repo();
    let uc = ActivateConfig {
        repo: repo.as_ref(),
    };
    uc.execute(version).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(post, path = "/api/configs/{version}/clone", tag = "Configs",
    params(("version" = u32, Path, description = "Configuration version to copy")),
    responses(
        (status = 201, body = ClonedConfig),
        (status = 404, body = ApiHttpError)
    ))]
pub async fn clone_config(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    ApiPath(version): ApiPath<u32>,
) -> Result<(StatusCode, Json<ClonedConfig>), ApiError> {
    let repo = ctx.config_repo();
    let uc = CloneConfig {
        repo: repo.as_ref(),
    };
    let cloned = uc.execute(version).await?;
    Ok((StatusCode::CREATED, Json(cloned)))
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ConfigUpdateMultipart {
    /// JSON encoded `ConfigUpdate`
    payload: ConfigUpdate,
    /// Application icon; an empty part removes it
    #[schema(value_type = Option<String>, format = Binary)]
    icon: Option<String>,
    /// One part per information card, in order
    #[schema(value_type = Vec<String>, format = Binary)]
    information_card_images: Vec<String>,
    /// One part per pre-test form question, option and slider label, in order
    #[schema(value_type = Vec<String>, format = Binary)]
    pre_test_form_images: Vec<String>,
    /// One part per post-test form question, option and slider label, in order
    #[schema(value_type = Vec<String>, format = Binary)]
    post_test_form_images: Vec<String>,
    /// One part per test question and option, in order
    #[schema(value_type = Vec<String>, format = Binary)]
    group_images: Vec<String>,
}

#[utoipa::path(
    patch,
    path = "/api/configs/active",
    tag = "Configs",
    request_body(content = ConfigUpdateMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Configuration updated"),
        (status = 304, description = "Nothing changed"),
        (status = 400, body = ApiHttpError),
        (status = 409, body = ApiHttpError),
        (status = 422, body = ApiHttpError)
    )
)]
pub async fn update_active_config(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, ApiError> {
    let (update, files) = read_update(multipart?).await?;
    let unit = ctx.config_unit();
    let uc = UpdateActiveConfig {
        ports: ctx.config_ports(),
        unit: unit.as_ref(),
    };
    if uc.execute(&update, files).await? {
        tracing::info!("active_config_updated");
        Ok(StatusCode::OK)
    } else {
        Ok(StatusCode::NOT_MODIFIED)
    }
}

async fn read_update(
    mut multipart: Multipart,
) -> Result<(ConfigUpdate, ConfigUpdateFiles), ApiError> {
    let mut payload: Option<ConfigUpdate> = None;
    let mut icon = ImageSlot::Keep;
    let mut cards = Vec::new();
    let mut pre = Vec::new();
    let mut post = Vec::new();
    let mut groups = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("payload") => {
                let text = field.text().await?;
                let update = serde_json::from_str(&text).map_err(|e| {
                    ApiError::invalid(
                        "Invalid request body",
                        vec![FieldError::new("payload", e.to_string())],
                    )
                })?;
                payload = Some(update);
            }
            Some("icon") => icon = read_slot(field).await?,
            Some("informationCardImages") => cards.push(read_slot(field).await?),
            Some("preTestFormImages") => pre.push(read_slot(field).await?),
            Some("postTestFormImages") => post.push(read_slot(field).await?),
            Some("groupImages") => groups.push(read_slot(field).await?),
            _ => {}
        }
    }

    let update = payload.ok_or_else(|| ApiError::bad_request("Missing payload part"))?;
    let files = ConfigUpdateFiles {
        icon,
        information_cards: ImageSlots::new(cards),
        pre_test_form: ImageSlots::new(pre),
        post_test_form: ImageSlots::new(post),
        groups: ImageSlots::new(groups),
    };
    Ok((update, files))
}

/// An empty part clears the image, anything else replaces it.
async fn read_slot(field: Field<'_>) -> Result<ImageSlot, ApiError> {
    let file_name = field.file_name().map(|s| s.to_string());
    let bytes = field.bytes().await?;
    if bytes.is_empty() {
        return Ok(ImageSlot::Remove);
    }
    Ok(ImageSlot::Replace(UploadedFile {
        file_name,
        bytes: bytes.to_vec(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::json;

    use crate::domain::users::user::Role;
    use crate::presentation::http::api_router;
    use crate::presentation::http::test_support::{TestApp, empty_request, send};

    const BOUNDARY: &str = "pocopi-boundary";

    fn multipart_request(token: &str, parts: &[(&str, Option<&str>, Vec<u8>)]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file_name, bytes) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match file_name {
                Some(file) => format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\n\r\n"
                ),
                None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method("PATCH")
            .uri("/api/configs/active")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body))
            .unwrap()
    }

    fn payload(title: &str) -> Vec<u8> {
        json!({
            "title": title,
            "description": "Welcome",
            "anonymous": true,
            "informedConsent": "Consent",
        })
        .to_string()
        .into_bytes()
    }

    #[tokio::test]
    async fn active_config_is_public() {
        let app = TestApp::new(true);
        let (status, body) = send(
            api_router(app.ctx.clone()),
            empty_request("GET", "/api/configs/active", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "PoCoPI");
        assert_eq!(body["anonymous"], true);
    }

    #[tokio::test]
    async fn patching_reports_whether_anything_changed() {
        let app = TestApp::new(true);
        let (_, token) = app.user("root", Role::Admin);

        let req = multipart_request(&token, &[("payload", None, payload("PoCoPI"))]);
        let (status, _) = send(api_router(app.ctx.clone()), req).await;
        assert_eq!(status, StatusCode::NOT_MODIFIED);

        let req = multipart_request(&token, &[("payload", None, payload("Renamed"))]);
        let (status, _) = send(api_router(app.ctx.clone()), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(app.store.lock().configs[0].title, "Renamed");
    }

    #[tokio::test]
    async fn patching_needs_a_payload_part() {
        let app = TestApp::new(true);
        let (_, token) = app.user("root", Role::Admin);

        let req = multipart_request(&token, &[("icon", Some("icon.png"), Vec::new())]);
        let (status, body) = send(api_router(app.ctx.clone()), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Missing payload part");

        let req = multipart_request(&token, &[("payload", None, b"{\"title\":".to_vec())]);
        let (status, body) = send(api_router(app.ctx.clone()), req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"][0]["field"], "payload");
    }

    #[tokio::test]
    async fn cloned_versions_can_be_activated_and_deleted() {
        let app = TestApp::new(true);
        let (_, token) = app.user("root", Role::Admin);

        let (status, body) = send(
            api_router(app.ctx.clone()),
            empty_request("POST", "/api/configs/1/clone", Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let version = body["version"].as_u64().unwrap();

        let (status, body) = send(
            api_router(app.ctx.clone()),
            empty_request("DELETE", "/api/configs/1", Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "Active configuration cannot be deleted");

        let (status, _) = send(
            api_router(app.ctx.clone()),
            empty_request("DELETE", &format!("/api/configs/{version}"), Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(
            api_router(app.ctx.clone()),
            empty_request("POST", "/api/configs/9/activate", Some(&token)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
