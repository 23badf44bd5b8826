//! Asset management for the vehicles a user tracks.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::create_asset_endpoint;
pub use db::{
    count_assets, create_asset, create_asset_table, delete_asset, get_asset, get_assets,
    update_asset,
};
pub use delete::delete_asset_endpoint;
pub use domain::{
    Asset, AssetName, AssetSummary, AssetType, CreateAssetRequest, CustomAttributes, NewAsset,
    UpdateAssetRequest,
};
pub use edit::edit_asset_endpoint;
pub use list::{get_asset_endpoint, list_assets_endpoint};
