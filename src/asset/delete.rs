//! Defines the endpoint for deleting an asset.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, Error, asset::delete_asset, auth::AuthenticatedUser, database_id::AssetId,
};

/// The state needed to delete an asset.
#[derive(Debug, Clone)]
pub struct DeleteAssetState {
    /// The database connection for managing assets.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAssetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting an asset and all of its financial records.
///
/// Responds with `{"success": true}`, or 404 if the user does not own the asset.
pub async fn delete_asset_endpoint(
    State(state): State<DeleteAssetState>,
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

    match delete_asset(asset_id, &user.id, &connection) {
        Ok(()) => {
            tracing::info!("User {} deleted asset {asset_id}", user.id);
            Json(json!({ "success": true })).into_response()
        }
        Err(error) => {
            tracing::debug!("Could not delete asset {asset_id}: {error}");
            error.into_response()
        }
    }
}
