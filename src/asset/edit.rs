//! Defines the endpoint for updating an asset.

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
    asset::{Asset, UpdateAssetRequest, get_asset, update_asset},
    auth::AuthenticatedUser,
    database_id::AssetId,
    user::UserId,
};

/// The state needed to edit an asset.
#[derive(Debug, Clone)]
pub struct EditAssetState {
    /// The database connection for managing assets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAssetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Apply a partial update to an asset, responds with the updated asset.
pub async fn edit_asset_endpoint(
    State(state): State<EditAssetState>,
    user: AuthenticatedUser,
    asset_id: Result<Path<AssetId>, PathRejection>,
    payload: Result<Json<UpdateAssetRequest>, JsonRejection>,
) -> Response {
    let (asset_id, update) = match (asset_id, payload) {
        (Ok(Path(asset_id)), Ok(Json(update))) => (asset_id, update),
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

    match edit_asset(asset_id, &user.id, update, &connection) {
        Ok(asset) => Json(asset).into_response(),
        Err(error) => {
            tracing::debug!("Could not update asset {asset_id}: {error}");
            error.into_response()
        }
    }
}

/// Merge `update` into the stored asset and save the result in one transaction.
fn edit_asset(
    asset_id: AssetId,
    user_id: &UserId,
    update: UpdateAssetRequest,
    connection: &Connection,
) -> Result<Asset, Error> {
    let transaction = connection.unchecked_transaction()?;

    let current = get_asset(asset_id, user_id, &transaction).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingAsset,
        error => error,
    })?;
    let updated = update.apply(&current)?;
    update_asset(&updated, &transaction)?;

    transaction.commit()?;

    Ok(updated)
}

#[cfg(test)]
mod test {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;

    use crate::{
        asset::{
            Asset, AssetName, AssetType, CustomAttributes, NewAsset, UpdateAssetRequest,
            create_asset, edit::EditAssetState, edit_asset_endpoint, get_asset,
        },
        auth::AuthenticatedUser,
        initialize_db,
        user::{UserId, ensure_user},
    };

    #[track_caller]
    fn must_create_test_state() -> (EditAssetState, Asset) {
        let connection =
            Connection::open_in_memory().expect("could not create in-memory SQLite database");
        initialize_db(&connection).expect("could not initialize test DB");
        ensure_user(&UserId::new("owner"), None, &connection).expect("could not create user");
        let asset = create_asset(
            &NewAsset {
                name: AssetName::new_unchecked("Willys"),
                asset_type: AssetType::Jeep,
                image_url: Some("https://example.com/willys.png".to_owned()),
                custom_attributes: Some(CustomAttributes::from([(
                    "color".to_owned(),
                    "verde".to_owned(),
                )])),
            },
            &UserId::new("owner"),
            &connection,
        )
        .expect("could not create test asset");

        (
            EditAssetState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            asset,
        )
    }

    fn user(id: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            id: UserId::new(id),
            email: None,
        }
    }

    #[track_caller]
    fn must_get_asset(state: &EditAssetState, asset_id: i64) -> Asset {
        get_asset(
            asset_id,
            &UserId::new("owner"),
            &state.db_connection.lock().expect("could not acquire lock"),
        )
        .expect("could not get asset")
    }

    fn parse_update(json: &str) -> UpdateAssetRequest {
        serde_json::from_str(json).expect("could not parse update")
    }

    #[tokio::test]
    async fn can_update_name_only() {
        let (state, asset) = must_create_test_state();

        let response = edit_asset_endpoint(
            State(state.clone()),
            user("owner"),
            Ok(Path(asset.id)),
            Ok(Json(parse_update(r#"{"name": "Willys 1952"}"#))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let got = must_get_asset(&state, asset.id);
        assert_eq!(
            got,
            Asset {
                name: AssetName::new_unchecked("Willys 1952"),
                ..asset
            }
        );
    }

    #[tokio::test]
    async fn null_clears_optional_fields() {
        let (state, asset) = must_create_test_state();

        let response = edit_asset_endpoint(
            State(state.clone()),
            user("owner"),
            Ok(Path(asset.id)),
            Ok(Json(parse_update(
                r#"{"imageUrl": null, "customAttributes": null}"#,
            ))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let got = must_get_asset(&state, asset.id);
        assert_eq!(got.image_url, None);
        assert_eq!(got.custom_attributes, None);
    }

    #[tokio::test]
    async fn invalid_type_changes_nothing() {
        let (state, asset) = must_create_test_state();

        let response = edit_asset_endpoint(
            State(state.clone()),
            user("owner"),
            Ok(Path(asset.id)),
            Ok(Json(parse_update(r#"{"name": "Nautilus", "type": "SUBMARINE"}"#))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(must_get_asset(&state, asset.id), asset);
    }

    #[tokio::test]
    async fn other_users_asset_is_not_found() {
        let (state, asset) = must_create_test_state();

        let response = edit_asset_endpoint(
            State(state.clone()),
            user("intruder"),
            Ok(Path(asset.id)),
            Ok(Json(parse_update(r#"{"name": "Stolen"}"#))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(must_get_asset(&state, asset.id), asset);
    }
}
