//! Fleet Ledger is a JSON API for tracking the income and expenses of a fleet of vehicles.
//!
//! Users authenticate with bearer tokens issued by an external identity
//! provider. Each user owns a set of assets (vehicles) and records income and
//! expenses against them. Dashboard endpoints summarize those records by month.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod asset;
mod auth;
mod dashboard;
mod database_id;
mod date_format;
mod decimal_format;
mod db;
mod endpoints;
mod error;
mod financial_record;
mod logging;
mod not_found;
mod patch;
mod routing;
#[cfg(test)]
mod test_utils;
mod user;

pub use app_state::AppState;
pub use asset::{AssetName, AssetType, CustomAttributes, NewAsset, create_asset};
pub use database_id::{AssetId, RecordId};
pub use db::{DeletedRows, delete_all_data, initialize as initialize_db};
pub use error::Error;
pub use financial_record::{NewFinancialRecord, RecordKind, create_financial_record};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use user::{User, UserId, count_users, ensure_user, get_user_by_id, list_users_with_asset_count};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
