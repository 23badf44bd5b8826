//! Defines the endpoint for updating a financial record.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{
        FromRef, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::AuthenticatedUser,
    database_id::RecordId,
    financial_record::{
        FinancialRecord, UpdateRecordRequest, get_financial_record, update_financial_record,
    },
    user::UserId,
};

/// The state needed to edit a financial record.
#[derive(Debug, Clone)]
pub struct EditRecordState {
    /// The database connection for managing financial records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for partially updating a financial record, responds with the updated record.
pub async fn edit_record_endpoint(
    State(state): State<EditRecordState>,
    user: AuthenticatedUser,
    record_id: Result<Path<RecordId>, PathRejection>,
    payload: Result<Json<UpdateRecordRequest>, JsonRejection>,
) -> Response {
    let (record_id, update) = match (record_id, payload) {
        (Ok(Path(record_id)), Ok(Json(update))) => (record_id, update),
        (Err(rejection), _) => return Error::from(rejection).into_response(),
        (_, Err(rejection)) => return Error::from(rejection).into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::debug!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match edit_record(record_id, &user.id, update, &connection) {
        Ok(record) => Json(record).into_response(),
        Err(error) => {
            tracing::debug!("Could not update financial record {record_id}: {error}");
            error.into_response()
        }
    }
}

fn edit_record(
    record_id: RecordId,
    user_id: &UserId,
    update: UpdateRecordRequest,
    connection: &Connection,
) -> Result<FinancialRecord, Error> {
    let transaction = connection.unchecked_transaction()?;

    let current =
        get_financial_record(record_id, user_id, &transaction).map_err(|error| match error {
            Error::NotFound => Error::UpdateMissingRecord,
            error => error,
        })?;
    let updated = update.apply(&current)?;
    update_financial_record(&updated, user_id, &transaction)?;

    transaction.commit()?;

    Ok(updated)
}
