use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::errors::{ApiError, FieldError};

/// Error body returned by every endpoint and by the option-event socket.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiHttpError {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

pub fn status_of(err: &ApiError) -> StatusCode {
    match err {
        ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
        ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        ApiError::Conflict(_) => StatusCode::CONFLICT,
        ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        ApiError::Invalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<&ApiError> for ApiHttpError {
    fn from(err: &ApiError) -> Self {
        let status = status_of(err);
        let (message, errors) = match err {
            ApiError::Invalid { message, errors } => (message.clone(), errors.clone()),
            ApiError::Internal(inner) => {
                tracing::error!(error = ?inner, "unhandled_error");
                ("Internal server error".to_string(), Vec::new())
            }
            other => (other.to_string(), Vec::new()),
        };
        ApiHttpError {
            code: status.as_u16(),
            message,
            errors,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiHttpError::from(&self);
        (status_of(&self), Json(body)).into_response()
    }
}

const JSON_DATA_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// Splits axum's `path: reason` data error text; paths never contain spaces.
fn json_field_error(text: &str) -> Option<FieldError> {
    let rest = text.strip_prefix(JSON_DATA_PREFIX)?;
    let (path, reason) = rest.split_once(": ")?;
    if path.is_empty() || path.contains(' ') || path == "." {
        return None;
    }
    Some(FieldError::new(path, reason))
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => ApiError::invalid(
                "Invalid request body",
                json_field_error(&err.body_text()).into_iter().collect(),
            ),
            JsonRejection::JsonSyntaxError(_) => ApiError::invalid("Invalid request body", Vec::new()),
            JsonRejection::MissingJsonContentType(err) => {
                ApiError::UnsupportedMediaType(err.body_text())
            }
            other => ApiError::bad_request(other.body_text()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge("Request body is too large".into());
        }
        ApiError::bad_request(err.body_text())
    }
}

/// `Json` whose rejections render as `ApiHttpError`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
