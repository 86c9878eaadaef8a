use axum::{Json, Router, extract::State, routing::get};

use crate::application::dto::configs::Pattern;
use crate::application::errors::ApiError;
use crate::application::use_cases::patterns::list_patterns::ListPatterns;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::AdminUser;

pub fn routes(ctx: AppContext) -> Router {
    Router::new().route("/", get(list_patterns)).with_state(ctx)
}

#[utoipa::path(get, path = "/api/patterns", tag = "Patterns", responses((status = 200, body = [Pattern])))]
pub async fn list_patterns(
    State(ctx): State<AppContext>,
    _admin: AdminUser,
) -> Result<Json<Vec<Pattern>>, ApiError> {
    let repo = ctx.pattern_repo();
    let uc = ListPatterns {
        repo: repo.as_ref(),
    };
    Ok(Json(uc.execute().await?))
}
