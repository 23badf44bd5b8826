//! Defines the endpoint for creating a new financial record.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::AuthenticatedUser,
    financial_record::{CreateRecordRequest, NewFinancialRecord, create_financial_record},
};

/// The state needed to create a financial record.
#[derive(Debug, Clone)]
pub struct CreateRecordState {
    /// The database connection for managing financial records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new financial record, responds with 201 and the new record.
///
/// The request is validated before the asset's owner is checked, so an
/// invalid request for another user's asset is reported as a validation error.
pub async fn create_record_endpoint(
    State(state): State<CreateRecordState>,
    user: AuthenticatedUser,
    payload: Result<Json<CreateRecordRequest>, JsonRejection>,
) -> Response {
    let new_record = match payload
        .map_err(Error::from)
        .and_then(|Json(request)| NewFinancialRecord::try_from(request))
    {
        Ok(new_record) => new_record,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::debug!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_financial_record(&new_record, &user.id, &connection) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(Error::NotFound) => {
            tracing::debug!(
                "User {} tried to add a record to asset {} which they do not own",
                user.id,
                new_record.asset_id
            );
            Error::NotFound.into_response()
        }
        Err(error) => {
            tracing::debug!("Could not create financial record for user {}: {error}", user.id);
            error.into_response()
        }
    }
}
