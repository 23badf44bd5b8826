//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use time::Date;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry a bearer token.
    #[error("not authenticated")]
    Unauthenticated,

    /// The bearer token could not be decoded, has a bad signature or has expired.
    ///
    /// The string holds the reason from the token library and is only logged.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The email in the token already belongs to a different user ID.
    #[error("the email is already registered to another account")]
    DuplicateEmail,

    /// A required field was missing from the request body.
    #[error("the field \"{0}\" is required")]
    MissingField(&'static str),

    /// A required field was explicitly set to null in an update.
    #[error("the field \"{0}\" cannot be null")]
    NullField(&'static str),

    /// An empty or whitespace-only string was used as an asset name.
    #[error("asset name cannot be empty")]
    EmptyAssetName,

    /// The asset type is not one of the supported vehicle categories.
    #[error("invalid vehicle type \"{0}\", must be one of CARRO, JEEP, BUSETA or TURBO")]
    InvalidAssetType(String),

    /// The financial record type is neither income nor expense.
    #[error("invalid record type \"{0}\", must be INCOME or EXPENSE")]
    InvalidRecordKind(String),

    /// A monetary amount was zero or negative.
    #[error("the amount must be a positive number")]
    NonPositiveAmount,

    /// A monetary amount was larger than a single record may hold.
    #[error("the amount must not be greater than 100000000000000000000")]
    AmountTooLarge,

    /// A total over financial records does not fit in a decimal.
    #[error("the totals are too large to compute")]
    AmountOverflow,

    /// A date string could not be parsed.
    #[error("invalid date \"{0}\", expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The end of a date range came before its start.
    #[error("the end date {end_date} must not be before the start date {date}")]
    InvalidDateRange {
        /// The start date of the range.
        date: Date,
        /// The offending end date.
        end_date: Date,
    },

    /// The request could not be parsed, e.g. malformed JSON or a non-numeric ID.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The requested resource was not found.
    ///
    /// This is also returned when the resource belongs to another user, so that
    /// clients cannot learn whether another user's resource exists.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update an asset that does not exist or is not owned by the user.
    #[error("tried to update an asset that is not in the database")]
    UpdateMissingAsset,

    /// Tried to delete an asset that does not exist or is not owned by the user.
    #[error("tried to delete an asset that is not in the database")]
    DeleteMissingAsset,

    /// Tried to update a financial record that does not exist or is not owned by the user.
    #[error("tried to update a financial record that is not in the database")]
    UpdateMissingRecord,

    /// Tried to delete a financial record that does not exist or is not owned by the user.
    #[error("tried to delete a financial record that is not in the database")]
    DeleteMissingRecord,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => Error::SqlError(error),
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

impl Error {
    /// The HTTP status code the error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated | Error::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::MissingField(_)
            | Error::NullField(_)
            | Error::EmptyAssetName
            | Error::InvalidAssetType(_)
            | Error::InvalidRecordKind(_)
            | Error::NonPositiveAmount
            | Error::AmountTooLarge
            | Error::InvalidDate(_)
            | Error::InvalidDateRange { .. }
            | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::UpdateMissingAsset
            | Error::DeleteMissingAsset
            | Error::UpdateMissingRecord
            | Error::DeleteMissingRecord => StatusCode::NOT_FOUND,
            Error::AmountOverflow
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::JSONSerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the client.
    fn client_message(&self) -> String {
        match self {
            Error::Unauthenticated => "Not authenticated".to_owned(),
            Error::InvalidToken(_) => "Invalid or expired session".to_owned(),
            Error::NotFound => "The requested resource could not be found".to_owned(),
            Error::UpdateMissingAsset | Error::DeleteMissingAsset => {
                "Asset not found or not authorized".to_owned()
            }
            Error::UpdateMissingRecord | Error::DeleteMissingRecord => {
                "Financial record not found or not authorized".to_owned()
            }
            Error::AmountOverflow => "The totals are too large to compute".to_owned(),
            Error::SqlError(_) | Error::DatabaseLockError | Error::JSONSerializationError(_) => {
                "Internal server error".to_owned()
            }
            error => {
                let message = error.to_string();
                let mut chars = message.chars();

                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => message,
                }
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            Error::InvalidToken(reason) => {
                tracing::debug!("Rejected bearer token: {reason}");
            }
            // Server errors are only logged here, callers add context at the debug level.
            error if status.is_server_error() => {
                tracing::error!("An unexpected error occurred: {}", error);
            }
            _ => {}
        }

        let body = Json(json!({
            "error": self.client_message(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod error_response_tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use serde_json::Value;
    use time::macros::date;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::{
        Layer,
        layer::{Context, SubscriberExt},
    };

    use crate::Error;

    /// Counts the error level events emitted while it is installed.
    #[derive(Clone, Default)]
    struct ErrorEventCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for ErrorEventCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    async fn get_body(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("could not read response body");

        (
            status,
            serde_json::from_slice(&bytes).expect("response body is not JSON"),
        )
    }

    #[tokio::test]
    async fn validation_error_is_bad_request_with_message() {
        let (status, body) = get_body(Error::InvalidDateRange {
            date: date!(2024 - 02 - 01),
            end_date: date!(2024 - 01 - 01),
        })
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "The end date 2024-01-01 must not be before the start date 2024-02-01"
        );
    }

    #[tokio::test]
    async fn sql_error_does_not_leak_details() {
        let (status, body) =
            get_body(Error::SqlError(rusqlite::Error::InvalidColumnName("secret".to_owned())))
                .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn invalid_token_is_unauthorized() {
        let (status, body) = get_body(Error::InvalidToken("ExpiredSignature".to_owned())).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid or expired session");
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(Error::from(rusqlite::Error::QueryReturnedNoRows), Error::NotFound);
    }

    #[test]
    fn sql_error_is_logged_once() {
        let counter = ErrorEventCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());

        tracing::subscriber::with_default(subscriber, || {
            let error = Error::from(rusqlite::Error::InvalidColumnName("secret".to_owned()));
            let _ = error.into_response();
        });

        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn client_errors_are_not_logged_as_errors() {
        let counter = ErrorEventCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());

        tracing::subscriber::with_default(subscriber, || {
            let _ = Error::NotFound.into_response();
            let _ = Error::AmountTooLarge.into_response();
        });

        assert_eq!(counter.0.load(Ordering::SeqCst), 0);
    }
}
