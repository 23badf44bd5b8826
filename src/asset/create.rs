//! Asset creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    asset::{CreateAssetRequest, NewAsset, create_asset},
    auth::AuthenticatedUser,
};

/// The state needed for creating an asset.
#[derive(Debug, Clone)]
pub struct CreateAssetState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAssetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle a request to create an asset, responds with 201 and the new asset.
pub async fn create_asset_endpoint(
    State(state): State<CreateAssetState>,
    user: AuthenticatedUser,
    payload: Result<Json<CreateAssetRequest>, JsonRejection>,
) -> Response {
    let new_asset = match payload
        .map_err(Error::from)
        .and_then(|Json(request)| NewAsset::try_from(request))
    {
        Ok(new_asset) => new_asset,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::debug!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_asset(&new_asset, &user.id, &connection) {
        Ok(asset) => {
            tracing::info!("User {} created asset {}", user.id, asset.id);
            (StatusCode::CREATED, Json(asset)).into_response()
        }
        Err(error) => {
            tracing::debug!("Could not create asset for user {}: {error}", user.id);
            error.into_response()
        }
    }
}

#[cfg(test)]
mod create_asset_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        asset::{
            Asset, AssetType, CreateAssetRequest, CustomAttributes, count_assets,
            create::CreateAssetState, create_asset_endpoint,
        },
        auth::AuthenticatedUser,
        initialize_db,
        test_utils::{get_error_message, parse_json_body},
        user::{UserId, ensure_user},
    };

    fn get_test_state() -> (CreateAssetState, AuthenticatedUser) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize_db(&connection).expect("Could not initialize test DB");
        let user = AuthenticatedUser {
            id: UserId::new("user-1"),
            email: None,
        };
        ensure_user(&user.id, None, &connection).expect("Could not create test user");

        (
            CreateAssetState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user,
        )
    }

    #[tokio::test]
    async fn can_create_asset() {
        let (state, user) = get_test_state();
        let request = CreateAssetRequest {
            name: Some("Chevrolet Luv".to_owned()),
            asset_type: Some("TURBO".to_owned()),
            image_url: Some("https://example.com/luv.png".to_owned()),
            custom_attributes: Some(CustomAttributes::from([(
                "placa".to_owned(),
                "ABC123".to_owned(),
            )])),
        };

        let response =
            create_asset_endpoint(State(state.clone()), user.clone(), Ok(Json(request))).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let asset: Asset = parse_json_body(response).await;
        assert_eq!(asset.name.as_ref(), "Chevrolet Luv");
        assert_eq!(asset.asset_type, AssetType::Truck);
        assert_eq!(asset.user_id, user.id);
        assert_eq!(
            asset.image_url.as_deref(),
            Some("https://example.com/luv.png")
        );
    }

    #[tokio::test]
    async fn invalid_type_creates_nothing() {
        let (state, user) = get_test_state();
        let request = CreateAssetRequest {
            name: Some("Nautilus".to_owned()),
            asset_type: Some("SUBMARINE".to_owned()),
            ..Default::default()
        };

        let response =
            create_asset_endpoint(State(state.clone()), user.clone(), Ok(Json(request))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_assets(&user.id, &connection), Ok(0));
    }

    #[tokio::test]
    async fn blank_name_creates_nothing() {
        let (state, user) = get_test_state();
        let request = CreateAssetRequest {
            name: Some("  ".to_owned()),
            asset_type: Some("CARRO".to_owned()),
            ..Default::default()
        };

        let response =
            create_asset_endpoint(State(state.clone()), user.clone(), Ok(Json(request))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_error_message(response).await,
            "Asset name cannot be empty"
        );
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(count_assets(&user.id, &connection), Ok(0));
    }
}
