//! Code for creating the user table and fetching users from the database.
//!
//! Users are owned by the external identity provider. A local row is created
//! the first time a user makes an authenticated request so that assets can
//! reference it with a foreign key.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Error;

/// A newtype wrapper for the opaque user IDs issued by the identity provider.
///
/// This helps disambiguate user IDs from other strings, e.g. emails, at compile time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: &str) -> Self {
        Self(id.to_owned())
    }

    /// The ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user's ID at the identity provider.
    pub id: UserId,
    /// The user's email, if the identity provider shared one.
    pub email: Option<String>,
    /// When the user first made an authenticated request.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Insert the user if they do not exist yet, otherwise refresh their email.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if `email` already belongs to a user with a different ID,
/// - or [Error::SqlError] if some other SQL related error occurred.
pub fn ensure_user(id: &UserId, email: Option<&str>, connection: &Connection) -> Result<(), Error> {
    connection
        .execute(
            "INSERT INTO user (id, email, created_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET email = excluded.email
            WHERE email IS NOT excluded.email",
            (id.as_str(), email, OffsetDateTime::now_utc()),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateEmail,
            error => error.into(),
        })?;

    Ok(())
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a known user,
/// - or there was an error trying to access the database.
pub fn get_user_by_id(user_id: &UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, email, created_at FROM user WHERE id = :id")?
        .query_row(&[(":id", user_id.as_str())], map_user_row)
        .map_err(|error| error.into())
}

/// Get every user together with the number of assets they own, ordered by email.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn list_users_with_asset_count(connection: &Connection) -> Result<Vec<(User, i64)>, Error> {
    connection
        .prepare(
            "SELECT user.id, user.email, user.created_at, COUNT(asset.id)
            FROM user LEFT JOIN asset ON asset.user_id = user.id
            GROUP BY user.id
            ORDER BY user.email ASC, user.id ASC",
        )?
        .query_map([], |row| Ok((map_user_row(row)?, row.get::<_, i64>(3)?)))?
        .map(|maybe_user| maybe_user.map_err(Error::from))
        .collect()
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id: String = row.get(0)?;
    let email = row.get(1)?;
    let created_at = row.get(2)?;

    Ok(User {
        id: UserId::new(&raw_id),
        email,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize};

    use super::{UserId, count_users, ensure_user, get_user_by_id};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    #[test]
    fn ensure_user_creates_missing_user() {
        let connection = get_test_connection();
        let id = UserId::new("user-1");

        ensure_user(&id, Some("foo@bar.baz"), &connection).expect("could not ensure user");

        let user = get_user_by_id(&id, &connection).expect("could not get user");
        assert_eq!(user.id, id);
        assert_eq!(user.email.as_deref(), Some("foo@bar.baz"));
    }

    #[test]
    fn ensure_user_is_idempotent_and_refreshes_email() {
        let connection = get_test_connection();
        let id = UserId::new("user-1");
        ensure_user(&id, Some("old@bar.baz"), &connection).unwrap();
        let created_at = get_user_by_id(&id, &connection).unwrap().created_at;

        ensure_user(&id, Some("new@bar.baz"), &connection).unwrap();

        let user = get_user_by_id(&id, &connection).unwrap();
        assert_eq!(count_users(&connection), Ok(1));
        assert_eq!(user.email.as_deref(), Some("new@bar.baz"));
        assert_eq!(user.created_at, created_at);
    }

    #[test]
    fn ensure_user_rejects_email_of_other_user() {
        let connection = get_test_connection();
        ensure_user(&UserId::new("user-1"), Some("foo@bar.baz"), &connection).unwrap();

        let result = ensure_user(&UserId::new("user-2"), Some("foo@bar.baz"), &connection);

        assert_eq!(result, Err(Error::DuplicateEmail));
        assert_eq!(count_users(&connection), Ok(1));
    }

    #[test]
    fn users_without_email_do_not_clash() {
        let connection = get_test_connection();

        ensure_user(&UserId::new("user-1"), None, &connection).unwrap();
        ensure_user(&UserId::new("user-2"), None, &connection).unwrap();

        assert_eq!(count_users(&connection), Ok(2));
    }

    #[test]
    fn get_missing_user_returns_not_found() {
        let connection = get_test_connection();

        let result = get_user_by_id(&UserId::new("nobody"), &connection);

        assert_eq!(result, Err(Error::NotFound));
    }
}
