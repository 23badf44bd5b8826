//! Application router configuration.
//!
//! Every route except [endpoints::COFFEE] requires a bearer token, which is
//! enforced by the [crate::auth::AuthenticatedUser] extractor in each handler.

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};

use crate::{
    AppState,
    asset::{
        create_asset_endpoint, delete_asset_endpoint, edit_asset_endpoint, get_asset_endpoint,
        list_assets_endpoint,
    },
    dashboard::{get_asset_summary_endpoint, get_dashboard_endpoint},
    endpoints,
    financial_record::{
        create_record_endpoint, delete_record_endpoint, edit_record_endpoint,
        list_records_endpoint,
    },
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new().route(endpoints::COFFEE, get(get_coffee));

    let protected_routes = Router::new()
        .route(
            endpoints::ASSETS,
            get(list_assets_endpoint).post(create_asset_endpoint),
        )
        .route(
            endpoints::ASSET,
            get(get_asset_endpoint)
                .put(edit_asset_endpoint)
                .delete(delete_asset_endpoint),
        )
        .route(endpoints::ASSET_SUMMARY, get(get_asset_summary_endpoint))
        .route(
            endpoints::FINANCIAL_RECORDS,
            get(list_records_endpoint).post(create_record_endpoint),
        )
        .route(
            endpoints::FINANCIAL_RECORD,
            put(edit_record_endpoint).delete(delete_record_endpoint),
        )
        .route(endpoints::DASHBOARD, get(get_dashboard_endpoint));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}
