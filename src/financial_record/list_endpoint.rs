//! Defines the endpoint for listing financial records.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Deserializer};

use crate::{
    AppState, Error, auth::AuthenticatedUser, database_id::AssetId,
    financial_record::get_financial_records,
};

/// The state needed to list financial records.
#[derive(Debug, Clone)]
pub struct ListRecordsState {
    /// The database connection for reading financial records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListRecordsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for listing financial records.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRecordsQuery {
    /// Only list the records of this asset. An empty value lists every record.
    #[serde(default, deserialize_with = "blank_as_none")]
    pub asset_id: Option<AssetId>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<AssetId>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid asset ID \"{raw}\""))),
        _ => Ok(None),
    }
}

/// A route handler that responds with the user's financial records, latest first.
pub async fn list_records_endpoint(
    State(state): State<ListRecordsState>,
    user: AuthenticatedUser,
    query: Result<Query<ListRecordsQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return Error::from(rejection).into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::debug!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_financial_records(&user.id, query.asset_id, &connection) {
        Ok(records) => Json(records).into_response(),
        Err(error) => {
            tracing::debug!("Could not list financial records for user {}: {error}", user.id);
            error.into_response()
        }
    }
}
