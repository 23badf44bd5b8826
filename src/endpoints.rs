//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/assets/{asset_id}', use [format_endpoint].

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route to list and create assets.
pub const ASSETS: &str = "/api/assets";
/// The route to read, update and delete a single asset.
pub const ASSET: &str = "/api/assets/{asset_id}";
/// The route for the income and expense summary of a single asset.
pub const ASSET_SUMMARY: &str = "/api/assets/{asset_id}/summary";
/// The route to list and create financial records.
pub const FINANCIAL_RECORDS: &str = "/api/financial-records";
/// The route to update and delete a single financial record.
pub const FINANCIAL_RECORD: &str = "/api/financial-records/{record_id}";
/// The route for the summary over all of a user's financial records.
pub const DASHBOARD: &str = "/api/dashboard";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/assets/{asset_id}', '{asset_id}' is the parameter.
///
/// Only the first parameter is replaced. If no parameter is found in
/// `endpoint_path`, the function returns the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
