use axum::response::{IntoResponse, Response};

use crate::ApiError;

pub(super) async fn get_404() -> Response {
    ApiError::NotFound("This page does not exist.".to_string()).into_response()
}
