#![allow(missing_docs)]

pub(crate) mod http;

use axum_test::TestServer;
use jsonwebtoken::{EncodingKey, Header, encode};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{AppState, auth::Claims, build_router};

pub(crate) use http::{get_error_message, parse_json_body};

/// The secret used to sign bearer tokens in tests.
pub(crate) const TEST_JWT_SECRET: &str = "not a very secret secret";

/// The current time as a unix timestamp.
pub(crate) fn unix_now() -> u64 {
    OffsetDateTime::now_utc().unix_timestamp() as u64
}

/// Sign a token for `sub` that expires in an hour.
#[track_caller]
pub(crate) fn encode_test_token(sub: &str, email: Option<&str>) -> String {
    let claims = Claims {
        sub: sub.to_owned(),
        email: email.map(str::to_owned),
        exp: unix_now() + 3600,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Could not encode test token")
}

/// App state backed by an empty in-memory database.
#[track_caller]
pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(connection, TEST_JWT_SECRET, None).expect("Could not create app state")
}

/// A test server for the full app router.
#[track_caller]
pub(crate) fn get_test_server() -> TestServer {
    TestServer::try_new(build_router(get_test_app_state())).expect("Could not create test server")
}
