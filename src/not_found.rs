use axum::response::{IntoResponse, Response};

use crate::Error;

/// The fallback for routes that do not exist, responds with a JSON 404.
pub async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
