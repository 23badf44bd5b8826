//! Core asset domain types.

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::AssetId, patch::Patch, user::UserId};

/// A validated, non-empty asset name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct AssetName(String);

impl AssetName {
    /// Create an asset name, surrounding whitespace is removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyAssetName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyAssetName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create an asset name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for AssetName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for AssetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The vehicle categories an asset can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    /// A passenger car.
    #[serde(rename = "CARRO")]
    Car,
    /// An off-road jeep.
    #[serde(rename = "JEEP")]
    Jeep,
    /// A small bus.
    #[serde(rename = "BUSETA")]
    Minibus,
    /// A light truck.
    #[serde(rename = "TURBO")]
    Truck,
}

impl AssetType {
    /// Every asset type, in the order they are presented to users.
    pub const ALL: [AssetType; 4] = [
        AssetType::Car,
        AssetType::Jeep,
        AssetType::Minibus,
        AssetType::Truck,
    ];

    /// The name used for the type in JSON and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Car => "CARRO",
            AssetType::Jeep => "JEEP",
            AssetType::Minibus => "BUSETA",
            AssetType::Truck => "TURBO",
        }
    }
}

impl FromStr for AssetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetType::ALL
            .into_iter()
            .find(|asset_type| asset_type.as_str() == s)
            .ok_or_else(|| Error::InvalidAssetType(s.to_owned()))
    }
}

impl Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for AssetType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AssetType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(error.to_string().into()))
    }
}

/// User defined details about an asset, e.g. "placa" → "ABC123".
pub type CustomAttributes = BTreeMap<String, String>;

/// A vehicle tracked by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// The ID of the asset.
    pub id: AssetId,
    /// The ID of the user that owns the asset.
    pub user_id: UserId,
    /// The display name of the asset.
    pub name: AssetName,
    /// The vehicle category.
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    /// A link to a picture of the asset.
    pub image_url: Option<String>,
    /// User defined details about the asset.
    pub custom_attributes: Option<CustomAttributes>,
    /// When the asset was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The fields of an asset that are embedded in each of its financial records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
    /// The ID of the asset.
    pub id: AssetId,
    /// The display name of the asset.
    pub name: AssetName,
    /// The vehicle category.
    #[serde(rename = "type")]
    pub asset_type: AssetType,
}

/// The validated data for creating an asset.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAsset {
    pub name: AssetName,
    pub asset_type: AssetType,
    pub image_url: Option<String>,
    pub custom_attributes: Option<CustomAttributes>,
}

/// The request body for creating an asset.
///
/// Fields are loosely typed so that missing or invalid values are reported
/// as validation errors rather than JSON parsing errors.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    pub image_url: Option<String>,
    pub custom_attributes: Option<CustomAttributes>,
}

impl TryFrom<CreateAssetRequest> for NewAsset {
    type Error = Error;

    fn try_from(request: CreateAssetRequest) -> Result<Self, Self::Error> {
        let name = request.name.ok_or(Error::MissingField("name"))?;
        let name = AssetName::new(&name)?;
        let asset_type = request
            .asset_type
            .ok_or(Error::MissingField("type"))?
            .parse()?;

        Ok(NewAsset {
            name,
            asset_type,
            image_url: request.image_url,
            custom_attributes: request.custom_attributes,
        })
    }
}

/// The request body for updating an asset, see [Patch] for how each field is applied.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssetRequest {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default, rename = "type")]
    pub asset_type: Patch<String>,
    #[serde(default)]
    pub image_url: Patch<String>,
    #[serde(default)]
    pub custom_attributes: Patch<CustomAttributes>,
}

impl UpdateAssetRequest {
    /// Merge the update into `asset`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a field is null when it must not be, or
    /// if a new name or type is invalid. `asset` is not modified in that case.
    pub fn apply(self, asset: &Asset) -> Result<Asset, Error> {
        let name = match self.name.required("name")? {
            Some(name) => AssetName::new(&name)?,
            None => asset.name.clone(),
        };
        let asset_type = match self.asset_type.required("type")? {
            Some(asset_type) => asset_type.parse()?,
            None => asset.asset_type,
        };

        Ok(Asset {
            name,
            asset_type,
            image_url: self.image_url.apply_nullable(asset.image_url.clone()),
            custom_attributes: self
                .custom_attributes
                .apply_nullable(asset.custom_attributes.clone()),
            ..asset.clone()
        })
    }
}
