use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};
use once_cell::sync::Lazy;
use repository::RepositoryError;
use tracing::error;

use crate::{view, ApiError};

static ERROR_CODES: Lazy<HashMap<String, String>> = Lazy::new(|| {
    serde_json::from_str(include_str!("error-code.json")).unwrap_or_else(|e| {
        error!(task = "load error codes", err = e.to_string());
        HashMap::new()
    })
});

fn describe(error_code: &str) -> String {
    ERROR_CODES
        .get(error_code)
        .cloned()
        .unwrap_or_else(|| "something went wrong".to_string())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, title, message, code) = match self {
            ApiError::AuthError(message) => {
                (StatusCode::UNAUTHORIZED, "Not signed in", message, None)
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, "Not found", message, None)
            }
            ApiError::UpstreamStatus {
                status_code,
                error_code,
            } => (
                StatusCode::BAD_GATEWAY,
                "The database refused the request",
                format!(
                    "{}: the database answered {}.",
                    capitalize(&describe(&error_code)),
                    status_code
                ),
                Some(error_code),
            ),
            ApiError::UpstreamError { error_code } => (
                StatusCode::BAD_GATEWAY,
                "Something went wrong",
                format!(
                    "{}: the database could not be reached.",
                    capitalize(&describe(&error_code))
                ),
                Some(error_code),
            ),
            ApiError::ServerError(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong",
                message,
                None,
            ),
        };

        let mut context = view::context("");
        context.insert("title", title);
        context.insert("message", &message);
        context.insert("code", &code.unwrap_or_default());

        match view::render_raw("error.html", &context) {
            Ok(html) => (status_code, Html(html)).into_response(),
            Err(_) => (status_code, message).into_response(),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub type ApiResponse<T> = Result<T, ApiError>;

pub trait IntoApiResponse<T> {
    fn into_response(self, error_code: &str) -> ApiResponse<T>;
}

impl<T> IntoApiResponse<T> for Result<T, RepositoryError> {
    fn into_response(self, error_code: &str) -> ApiResponse<T> {
        self.map_err(|e| {
            error!(error_code, err = %e);

            match e {
                RepositoryError::InvalidId { id } => {
                    ApiError::NotFound(format!("There is nothing at {id:?}."))
                }
                RepositoryError::FailedStatusCode { status_code, .. } => {
                    ApiError::UpstreamStatus {
                        status_code,
                        error_code: error_code.to_string(),
                    }
                }
                RepositoryError::ReqwestError { .. }
                | RepositoryError::SerdeJsonError { .. }
                | RepositoryError::InvalidBaseUrl { .. } => {
                    ApiError::UpstreamError {
                        error_code: error_code.to_string(),
                    }
                }
            }
        })
    }
}

/// Reads an id the store cannot address as a missing record.
pub(crate) fn missing_on_invalid_id<T>(
    result: Result<Option<T>, RepositoryError>,
) -> Result<Option<T>, RepositoryError> {
    match result {
        Err(RepositoryError::InvalidId { .. }) => Ok(None),
        other => other,
    }
}
