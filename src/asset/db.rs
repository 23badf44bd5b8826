//! Database operations for assets.
//!
//! Every query is scoped by the owning user's ID, an asset that belongs to
//! another user behaves as if it does not exist.

use rusqlite::{Connection, Row, types::Type};

use crate::{
    Error,
    asset::{Asset, AssetName, CustomAttributes, NewAsset},
    database_id::AssetId,
    user::UserId,
};

const ASSET_COLUMNS: &str =
    "id, user_id, name, asset_type, image_url, custom_attributes, created_at";

/// Create the asset table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_asset_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS asset (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            asset_type TEXT NOT NULL CHECK (asset_type IN ('CARRO', 'JEEP', 'BUSETA', 'TURBO')),
            image_url TEXT,
            custom_attributes TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    // Speed up the per-user listing.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_asset_user_created ON asset(user_id, created_at DESC);",
        (),
    )?;

    Ok(())
}

/// Create an asset owned by `user_id` and return it with its generated ID.
///
/// # Errors
///
/// Returns a [Error::JSONSerializationError] if the custom attributes could
/// not be encoded, or [Error::SqlError] if an SQL related error occurred.
pub fn create_asset(
    asset: &NewAsset,
    user_id: &UserId,
    connection: &Connection,
) -> Result<Asset, Error> {
    let custom_attributes = encode_custom_attributes(asset.custom_attributes.as_ref())?;

    connection
        .prepare(&format!(
            "INSERT INTO asset (user_id, name, asset_type, image_url, custom_attributes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING {ASSET_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_str(),
                asset.name.as_ref(),
                asset.asset_type,
                &asset.image_url,
                custom_attributes,
                time::OffsetDateTime::now_utc(),
            ),
            map_asset_row,
        )
        .map_err(Error::from)
}

/// Retrieve the asset with `asset_id` if it belongs to `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the asset does not exist or belongs to
/// another user, or [Error::SqlError] if an SQL related error occurred.
pub fn get_asset(
    asset_id: AssetId,
    user_id: &UserId,
    connection: &Connection,
) -> Result<Asset, Error> {
    connection
        .prepare(&format!(
            "SELECT {ASSET_COLUMNS} FROM asset WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((asset_id, user_id.as_str()), map_asset_row)
        .map_err(Error::from)
}

/// Retrieve all of the assets owned by `user_id`, newest first.
///
/// # Errors
///
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_assets(user_id: &UserId, connection: &Connection) -> Result<Vec<Asset>, Error> {
    connection
        .prepare(&format!(
            "SELECT {ASSET_COLUMNS} FROM asset WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC"
        ))?
        .query_map([user_id.as_str()], map_asset_row)?
        .map(|maybe_asset| maybe_asset.map_err(Error::from))
        .collect()
}

/// Overwrite the stored fields of `asset` with its current values.
///
/// The owner and creation time are never changed.
///
/// # Errors
///
/// Returns [Error::UpdateMissingAsset] if the asset does not exist or belongs
/// to another user, or [Error::SqlError] if an SQL related error occurred.
pub fn update_asset(asset: &Asset, connection: &Connection) -> Result<(), Error> {
    let custom_attributes = encode_custom_attributes(asset.custom_attributes.as_ref())?;

    let rows_affected = connection.execute(
        "UPDATE asset
        SET name = ?1, asset_type = ?2, image_url = ?3, custom_attributes = ?4
        WHERE id = ?5 AND user_id = ?6",
        (
            asset.name.as_ref(),
            asset.asset_type,
            &asset.image_url,
            custom_attributes,
            asset.id,
            asset.user_id.as_str(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingAsset);
    }

    Ok(())
}

/// Delete an asset and, through the foreign key cascade, its financial records.
///
/// # Errors
///
/// Returns [Error::DeleteMissingAsset] if the asset does not exist or belongs
/// to another user, or [Error::SqlError] if an SQL related error occurred.
pub fn delete_asset(
    asset_id: AssetId,
    user_id: &UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM asset WHERE id = ?1 AND user_id = ?2",
        (asset_id, user_id.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingAsset);
    }

    Ok(())
}

/// Get the number of assets owned by `user_id`.
///
/// # Errors
///
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn count_assets(user_id: &UserId, connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM asset WHERE user_id = ?1",
            [user_id.as_str()],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

fn encode_custom_attributes(
    custom_attributes: Option<&CustomAttributes>,
) -> Result<Option<String>, Error> {
    custom_attributes
        .map(serde_json::to_string)
        .transpose()
        .map_err(|error| Error::JSONSerializationError(error.to_string()))
}

fn map_asset_row(row: &Row) -> Result<Asset, rusqlite::Error> {
    let raw_user_id: String = row.get(1)?;
    let raw_name: String = row.get(2)?;
    let raw_custom_attributes: Option<String> = row.get(5)?;

    let custom_attributes = raw_custom_attributes
        .map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(error)))?;

    Ok(Asset {
        id: row.get(0)?,
        user_id: UserId::new(&raw_user_id),
        name: AssetName::new_unchecked(&raw_name),
        asset_type: row.get(3)?,
        image_url: row.get(4)?,
        custom_attributes,
        created_at: row.get(6)?,
    })
}
