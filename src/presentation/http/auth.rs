use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    routing::{patch, post},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::application::dto::users::{Credentials, CredentialsUpdate, NewUser, Token};
use crate::application::errors::ApiError;
use crate::application::ports::user_repository::UserRow;
use crate::application::use_cases::auth::login::Login;
use crate::application::use_cases::auth::register::Register;
use crate::application::use_cases::auth::update_credentials::UpdateCredentials;
use crate::application::use_cases::users::create_user::CreateUser;
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;
use crate::domain::users::user::Role;
use crate::presentation::http::error::ApiJson;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/logout", post(logout))
        .route("/credentials", patch(update_credentials))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/auth/login", tag = "Auth", request_body = Credentials, security(()), responses(
    (status = 201, body = Token),
    (status = 401, body = ApiHttpError)
))]
pub async fn login(
    State(ctx): State<AppContext>,
    ApiJson(req): ApiJson<Credentials>,
) -> Result<(StatusCode, HeaderMap, Json<Token>), ApiError> {
    let repo = ctx.user_repo();
    let uc = Login {
        repo: repo.as_ref(),
    };
    let user = uc.execute(&req).await?;
    signed_in(&ctx.cfg, &user)
}

#[utoipa::path(post, path = "/api/auth/register", tag = "Auth", request_body = NewUser, security(()), responses(
    (status = 201, body = Token),
    (status = 422, body = ApiHttpError)
))]
pub async fn register(
    State(ctx): State<AppContext>,
    ApiJson(req): ApiJson<NewUser>,
) -> Result<(StatusCode, HeaderMap, Json<Token>), ApiError> {
    let users = ctx.user_repo();
    let configs = ctx.config_repo();
    let patterns = ctx.pattern_repo();
    let uc = Register {
        create: CreateUser {
            users: users.as_ref(),
            configs: configs.as_ref(),
            patterns: patterns.as_ref(),
        },
    };
    let user = uc.execute(&req).await?;
    signed_in(&ctx.cfg, &user)
}

#[utoipa::path(patch, path = "/api/auth/credentials", tag = "Auth", request_body = CredentialsUpdate, responses(
    (status = 200),
    (status = 422, body = ApiHttpError)
))]
pub async fn update_credentials(
    State(ctx): State<AppContext>,
    AuthUser(user): AuthUser,
    ApiJson(req): ApiJson<CredentialsUpdate>,
) -> Result<StatusCode, ApiError> {
    let repo = ctx.user_repo();
    let uc = UpdateCredentials {
        repo: repo.as_ref(),
    };
    uc.execute(&user, &req).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(post, path = "/api/auth/logout", tag = "Auth", security(()), responses((status = 204)))]
pub async fn logout(State(ctx): State<AppContext>) -> (HeaderMap, StatusCode) {
    // Clear cookie by setting it expired
    let mut headers = HeaderMap::new();
    let cookie = build_access_cookie("", 0, ctx.cfg.secure_cookies());
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, value);
    }
    (headers, StatusCode::NO_CONTENT)
}

fn signed_in(
    cfg: &Config,
    user: &UserRow,
) -> Result<(StatusCode, HeaderMap, Json<Token>), ApiError> {
    let token = issue_token(cfg, user.id)?;
    let mut headers = HeaderMap::new();
    let cookie = build_access_cookie(&token, cfg.jwt_expires_secs, cfg.secure_cookies());
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.insert(header::SET_COOKIE, value);
    }
    tracing::info!(user_id = user.id, role = user.role.as_str(), "user_signed_in");
    Ok((StatusCode::CREATED, headers, Json(Token { token })))
}

pub fn issue_token(cfg: &Config, user_id: u32) -> anyhow::Result<String> {
    let now = chrono::Utc::now().timestamp().max(0) as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + (cfg.jwt_expires_secs.max(0) as usize),
    };
    Ok(jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.jwt_secret.as_bytes()),
    )?)
}

/// User id carried by a valid, unexpired token.
pub fn validate_token_str(cfg: &Config, token: &str) -> Option<u32> {
    let data = jsonwebtoken::decode::<Claims>(
        token.trim(),
        &DecodingKey::from_secret(cfg.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;
    data.claims.sub.parse().ok()
}

// --- Bearer extractor ---

pub struct Bearer(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // 1) Prefer Authorization header if present
        if let Some(auth) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(t) = auth.strip_prefix("Bearer ") {
                return Ok(Bearer(t.to_string()));
            }
        }

        // 2) Fallback to HttpOnly cookie `access_token`
        if let Some(token) = cookie_token(&parts.headers) {
            return Ok(Bearer(token));
        }

        Err(ApiError::Unauthorized("Authentication required".into()))
    }
}

pub(crate) fn cookie_token(headers: &HeaderMap) -> Option<String> {
    let cookie_hdr = headers.get(header::COOKIE)?.to_str().ok()?;
    get_cookie(cookie_hdr, "access_token").filter(|t| !t.is_empty())
}

/// Resolves the token to a stored user.
pub async fn authenticate(ctx: &AppContext, token: &str) -> Result<UserRow, ApiError> {
    let unauthorized = || ApiError::Unauthorized("Invalid or expired token".into());
    let user_id = validate_token_str(&ctx.cfg, token).ok_or_else(unauthorized)?;
    ctx.user_repo()
        .find_by_id(user_id)
        .await?
        .ok_or_else(unauthorized)
}

/// Any signed-in account.
pub struct AuthUser(pub UserRow);

#[axum::async_trait]
impl FromRequestParts<AppContext> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let Bearer(token) = Bearer::from_request_parts(parts, ctx).await?;
        Ok(AuthUser(authenticate(ctx, &token).await?))
    }
}

/// A signed-in account with the `ADMIN` role.
pub struct AdminUser(pub UserRow);

#[axum::async_trait]
impl FromRequestParts<AppContext> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, ctx).await?;
        if user.role != Role::Admin {
            return Err(ApiError::Forbidden("Admin privileges are required".into()));
        }
        Ok(AdminUser(user))
    }
}

// --- Cookie helpers ---

fn get_cookie(cookie_header: &str, name: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let kv = part.trim();
        if let Some((k, v)) = kv.split_once('=') {
            if k.trim() == name {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}

fn build_access_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let secure_attr = if secure { "; Secure" } else { "" };
    format!(
        "access_token={}; HttpOnly{}; Path=/; Max-Age={}; SameSite=Lax",
        token,
        secure_attr,
        max_age_secs.max(0)
    )
}
