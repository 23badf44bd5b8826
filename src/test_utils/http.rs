use axum::{body::Body, response::Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Read the response body and parse it as JSON.
pub(crate) async fn parse_json_body<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    serde_json::from_slice(&body).expect("Could not parse response body as JSON")
}

/// Get the message from a `{"error": "..."}` response body.
pub(crate) async fn get_error_message(response: Response<Body>) -> String {
    let body: Value = parse_json_body(response).await;

    body["error"]
        .as_str()
        .expect("Response body is missing the error message")
        .to_owned()
}
