//! Defines the endpoint for deleting a financial record.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, Error, auth::AuthenticatedUser, database_id::RecordId,
    financial_record::delete_financial_record,
};

/// The state needed to delete a financial record.
#[derive(Debug, Clone)]
pub struct DeleteRecordState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a financial record, responds with `{"success": true}`.
pub async fn delete_record_endpoint(
    State(state): State<DeleteRecordState>,
    user: AuthenticatedUser,
    record_id: Result<Path<RecordId>, PathRejection>,
) -> Response {
    let record_id = match record_id {
        Ok(Path(record_id)) => record_id,
        Err(rejection) => return Error::from(rejection).into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::debug!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_financial_record(record_id, &user.id, &connection) {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(error) => {
            tracing::debug!("Could not delete financial record {record_id}: {error}");
            error.into_response()
        }
    }
}
