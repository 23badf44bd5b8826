//! Authentication extractor that validates bearer tokens and registers first-time users.

use std::sync::{Arc, Mutex};

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::token::AuthConfig,
    user::{UserId, ensure_user},
};

/// The state needed for the auth extractor
#[derive(Clone)]
pub struct AuthState {
    /// The key and rules for verifying bearer tokens.
    pub auth_config: AuthConfig,
    /// The database connection used to register first-time users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            auth_config: state.auth_config.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The user making the request, as vouched for by a valid bearer token.
///
/// Add this as a route handler argument to require authentication. Requests
/// without a valid `Authorization: Bearer <token>` header are rejected with
/// 401 before the handler runs.
///
/// **Note**: Extracting this creates the user's row in the database on their
/// first request, and refreshes their email on later requests.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    /// The user's ID at the identity provider.
    pub id: UserId,
    /// The user's email, if the token carried one.
    pub email: Option<String>,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|rejection| {
                if rejection.is_missing() {
                    Error::Unauthenticated
                } else {
                    Error::InvalidToken(rejection.to_string())
                }
            })?;

        let state = AuthState::from_ref(state);
        let claims = state.auth_config.decode_claims(bearer.token())?;
        let user = AuthenticatedUser {
            id: UserId::new(&claims.sub),
            email: claims.email,
        };

        let connection = state.db_connection.lock().map_err(|error| {
            tracing::debug!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;
        ensure_user(&user.id, user.email.as_deref(), &connection)?;

        Ok(user)
    }
}
