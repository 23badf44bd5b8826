//! Endpoints for listing a user's assets and fetching a single asset.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    asset::{get_asset, get_assets},
    auth::AuthenticatedUser,
    database_id::AssetId,
};

/// The state needed for reading assets.
#[derive(Debug, Clone)]
pub struct ListAssetsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListAssetsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Respond with every asset owned by the user, newest first.
pub async fn list_assets_endpoint(
    State(state): State<ListAssetsState>,
    user: AuthenticatedUser,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::debug!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_assets(&user.id, &connection) {
        Ok(assets) => Json(assets).into_response(),
        Err(error) => {
            tracing::debug!("Could not list assets for user {}: {error}", user.id);
            error.into_response()
        }
    }
}

/// Respond with a single asset, or 404 if the user does not own it.
pub async fn get_asset_endpoint(
    State(state): State<ListAssetsState>,
    user: AuthenticatedUser,
    asset_id: Result<Path<AssetId>, PathRejection>,
) -> Response {
    let asset_id = match asset_id {
        Ok(Path(asset_id)) => asset_id,
        Err(rejection) => return Error::from(rejection).into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::debug!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_asset(asset_id, &user.id, &connection) {
        Ok(asset) => Json(asset).into_response(),
        Err(error) => error.into_response(),
    }
}
