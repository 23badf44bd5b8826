//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// Database identifier for an asset.
pub type AssetId = DatabaseId;
/// Database identifier for a financial record.
pub type RecordId = DatabaseId;
