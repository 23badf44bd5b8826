//! Dashboard HTTP handlers.
//!
//! Totals are recomputed from the financial records on every request.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    asset::{count_assets, get_asset},
    auth::AuthenticatedUser,
    dashboard::aggregation::{FinancialSummary, summarize},
    database_id::AssetId,
    financial_record::{FinancialRecord, get_financial_records},
    user::UserId,
};

/// The state needed for the dashboard endpoints.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading assets and financial records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The summary of every financial record the user can see.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// The number of assets the user owns.
    pub asset_count: i64,
    #[serde(flatten)]
    pub summary: FinancialSummary,
}

/// Respond with the totals over all of the user's assets.
pub async fn get_dashboard_endpoint(
    State(state): State<DashboardState>,
    user: AuthenticatedUser,
) -> Response {
    let loaded = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::debug!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        load_dashboard_records(&user.id, &connection)
    };

    let dashboard = loaded.and_then(|(asset_count, records)| {
        Ok(Dashboard {
            asset_count,
            summary: summarize(&records)?,
        })
    });

    match dashboard {
        Ok(dashboard) => Json(dashboard).into_response(),
        Err(error) => {
            tracing::debug!("Could not build dashboard for user {}: {error}", user.id);
            error.into_response()
        }
    }
}

/// Respond with the totals for one of the user's assets, or 404 if they do not own it.
pub async fn get_asset_summary_endpoint(
    State(state): State<DashboardState>,
    user: AuthenticatedUser,
    asset_id: Result<Path<AssetId>, PathRejection>,
) -> Response {
    let asset_id = match asset_id {
        Ok(Path(asset_id)) => asset_id,
        Err(rejection) => return Error::from(rejection).into_response(),
    };

    let loaded = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::debug!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        load_asset_records(asset_id, &user.id, &connection)
    };

    match loaded.and_then(|records| summarize(&records)) {
        Ok(summary) => Json(summary).into_response(),
        Err(error) => error.into_response(),
    }
}

/// The user's asset count and every record on their assets.
fn load_dashboard_records(
    user_id: &UserId,
    connection: &Connection,
) -> Result<(i64, Vec<FinancialRecord>), Error> {
    let records = get_financial_records(user_id, None, connection)?;
    let asset_count = count_assets(user_id, connection)?;

    Ok((asset_count, records))
}

fn load_asset_records(
    asset_id: AssetId,
    user_id: &UserId,
    connection: &Connection,
) -> Result<Vec<FinancialRecord>, Error> {
    // Distinguishes an asset without records from one the user does not own.
    get_asset(asset_id, user_id, connection)?;
    get_financial_records(user_id, Some(asset_id), connection)
}
