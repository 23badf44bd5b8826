//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, auth::AuthConfig, db::initialize};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The key and rules for verifying the identity provider's bearer tokens.
    pub auth_config: AuthConfig,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// Bearer tokens are verified with `jwt_secret`, and must carry `jwt_audience`
    /// as their audience if it is given.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        jwt_secret: &str,
        jwt_audience: Option<&str>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            auth_config: AuthConfig::new(jwt_secret, jwt_audience),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}
