//! Defines the core data models and database queries for financial records.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    asset::{AssetName, AssetSummary},
    database_id::{AssetId, RecordId},
    date_format::parse_date,
    patch::Patch,
    user::UserId,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a financial record is money earned or money spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Money earned with the asset, e.g. a fare.
    #[serde(rename = "INCOME")]
    Income,
    /// Money spent on the asset, e.g. fuel or repairs.
    #[serde(rename = "EXPENSE")]
    Expense,
}

impl RecordKind {
    /// The name used for the kind in JSON and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Income => "INCOME",
            RecordKind::Expense => "EXPENSE",
        }
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(RecordKind::Income),
            "EXPENSE" => Ok(RecordKind::Expense),
            other => Err(Error::InvalidRecordKind(other.to_owned())),
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for RecordKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for RecordKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(error.to_string().into()))
    }
}

/// An income or expense attached to an asset.
///
/// A record either happened on `date`, or covers the period from `date` to
/// `end_date` inclusive, e.g. a monthly insurance payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    /// The ID of the record.
    pub id: RecordId,
    /// The ID of the asset the record belongs to.
    pub asset_id: AssetId,
    /// The amount of money earned or spent, always positive.
    #[serde(with = "crate::decimal_format")]
    pub amount: Decimal,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub kind: RecordKind,
    /// When the record happened, or the start of the period it covers.
    #[serde(with = "crate::date_format")]
    pub date: Date,
    /// The last day of the period the record covers.
    #[serde(with = "crate::date_format::option", default)]
    pub end_date: Option<Date>,
    /// A text description of what the record was for.
    pub description: Option<String>,
    /// When the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// The asset the record belongs to.
    pub asset: AssetSummary,
}

/// The validated data for creating a financial record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFinancialRecord {
    pub asset_id: AssetId,
    pub amount: Decimal,
    pub kind: RecordKind,
    pub date: Date,
    pub end_date: Option<Date>,
    pub description: Option<String>,
}

/// The request body for creating a financial record.
///
/// `amount` accepts a JSON number or a string holding a decimal number, dates
/// accept `YYYY-MM-DD` or an RFC 3339 date-time.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    pub asset_id: Option<AssetId>,
    #[serde(deserialize_with = "crate::decimal_format::option::deserialize", default)]
    pub amount: Option<Decimal>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
}

impl TryFrom<CreateRecordRequest> for NewFinancialRecord {
    type Error = Error;

    fn try_from(request: CreateRecordRequest) -> Result<Self, Self::Error> {
        let asset_id = request.asset_id.ok_or(Error::MissingField("assetId"))?;
        let amount = validate_amount(request.amount.ok_or(Error::MissingField("amount"))?)?;
        let kind = request.kind.ok_or(Error::MissingField("type"))?.parse()?;
        let date = parse_date(&request.date.ok_or(Error::MissingField("date"))?)?;
        let end_date = request
            .end_date
            .map(|end_date| parse_date(&end_date))
            .transpose()?;
        validate_date_range(date, end_date)?;

        Ok(NewFinancialRecord {
            asset_id,
            amount,
            kind,
            date,
            end_date,
            description: request.description,
        })
    }
}

/// The request body for updating a financial record, see [Patch] for how each field is applied.
///
/// The asset a record belongs to cannot be changed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordRequest {
    #[serde(deserialize_with = "crate::decimal_format::patch::deserialize", default)]
    pub amount: Patch<Decimal>,
    #[serde(default, rename = "type")]
    pub kind: Patch<String>,
    #[serde(default)]
    pub date: Patch<String>,
    #[serde(default)]
    pub end_date: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
}

impl UpdateRecordRequest {
    /// Merge the update into `record`.
    ///
    /// The date range is checked on the merged values, so sending only an
    /// `endDate` compares it against the stored `date` and vice versa.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a field is null when it must not be, a
    /// new value is invalid, or the merged date range is inverted.
    pub fn apply(self, record: &FinancialRecord) -> Result<FinancialRecord, Error> {
        let amount = match self.amount.required("amount")? {
            Some(amount) => validate_amount(amount)?,
            None => record.amount,
        };
        let kind = match self.kind.required("type")? {
            Some(kind) => kind.parse()?,
            None => record.kind,
        };
        let date = match self.date.required("date")? {
            Some(date) => parse_date(&date)?,
            None => record.date,
        };
        let end_date = match self.end_date {
            Patch::Missing => record.end_date,
            Patch::Null => None,
            Patch::Value(end_date) => Some(parse_date(&end_date)?),
        };
        validate_date_range(date, end_date)?;

        Ok(FinancialRecord {
            amount,
            kind,
            date,
            end_date,
            description: self.description.apply_nullable(record.description.clone()),
            ..record.clone()
        })
    }
}

/// The largest amount a single record may hold, 10^20.
///
/// Keeps sums over hundreds of millions of records within [Decimal::MAX].
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_661_992_960, 1_808_227_885, 5, false, 0);

/// Check that `amount` is greater than zero and at most [MAX_AMOUNT].
///
/// # Errors
///
/// Returns [Error::NonPositiveAmount] for zero or negative amounts and
/// [Error::AmountTooLarge] for amounts above [MAX_AMOUNT].
pub fn validate_amount(amount: Decimal) -> Result<Decimal, Error> {
    if amount <= Decimal::ZERO {
        Err(Error::NonPositiveAmount)
    } else if amount > MAX_AMOUNT {
        Err(Error::AmountTooLarge)
    } else {
        Ok(amount)
    }
}

/// Check that `end_date`, if given, is not before `date`.
///
/// # Errors
///
/// Returns [Error::InvalidDateRange] if the range is inverted.
pub fn validate_date_range(date: Date, end_date: Option<Date>) -> Result<(), Error> {
    match end_date {
        Some(end_date) if end_date < date => Err(Error::InvalidDateRange { date, end_date }),
        _ => Ok(()),
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_RECORD: &str = "SELECT
    financial_record.id,
    financial_record.asset_id,
    financial_record.amount,
    financial_record.kind,
    financial_record.date,
    financial_record.end_date,
    financial_record.description,
    financial_record.created_at,
    asset.name,
    asset.asset_type
    FROM financial_record INNER JOIN asset ON asset.id = financial_record.asset_id";

pub fn create_financial_record_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS financial_record (
            id INTEGER PRIMARY KEY,
            asset_id INTEGER NOT NULL,
            amount TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('INCOME', 'EXPENSE')),
            date TEXT NOT NULL,
            end_date TEXT CHECK (end_date IS NULL OR end_date >= date),
            description TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(asset_id) REFERENCES asset(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_financial_record_asset_date
        ON financial_record(asset_id, date DESC);",
        (),
    )?;

    Ok(())
}

/// Create a financial record for an asset owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the asset does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_financial_record(
    record: &NewFinancialRecord,
    user_id: &UserId,
    connection: &Connection,
) -> Result<FinancialRecord, Error> {
    let inserted = connection.execute(
        "INSERT INTO financial_record (asset_id, amount, kind, date, end_date, description, created_at)
        SELECT id, ?1, ?2, ?3, ?4, ?5, ?6 FROM asset WHERE id = ?7 AND user_id = ?8",
        (
            record.amount.to_string(),
            record.kind,
            record.date,
            record.end_date,
            &record.description,
            OffsetDateTime::now_utc(),
            record.asset_id,
            user_id.as_str(),
        ),
    )?;

    if inserted == 0 {
        return Err(Error::NotFound);
    }

    get_financial_record(connection.last_insert_rowid(), user_id, connection)
}

/// Retrieve a financial record if its asset belongs to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the record does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_financial_record(
    record_id: RecordId,
    user_id: &UserId,
    connection: &Connection,
) -> Result<FinancialRecord, Error> {
    connection
        .prepare(&format!(
            "{SELECT_RECORD} WHERE financial_record.id = ?1 AND asset.user_id = ?2"
        ))?
        .query_row((record_id, user_id.as_str()), map_financial_record_row)
        .map_err(Error::from)
}

/// Retrieve the financial records of every asset owned by `user_id`, latest first.
///
/// If `asset_id` is given only the records of that asset are returned, which
/// is an empty list when the user does not own the asset.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn get_financial_records(
    user_id: &UserId,
    asset_id: Option<AssetId>,
    connection: &Connection,
) -> Result<Vec<FinancialRecord>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_RECORD}
            WHERE asset.user_id = ?1 AND (?2 IS NULL OR financial_record.asset_id = ?2)
            ORDER BY financial_record.date DESC, financial_record.id DESC"
        ))?
        .query_map((user_id.as_str(), asset_id), map_financial_record_row)?
        .map(|maybe_record| maybe_record.map_err(Error::from))
        .collect()
}

/// Overwrite the stored fields of `record` with its current values.
///
/// The asset and creation time are never changed.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingRecord] if the record does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_financial_record(
    record: &FinancialRecord,
    user_id: &UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE financial_record
        SET amount = ?1, kind = ?2, date = ?3, end_date = ?4, description = ?5
        WHERE id = ?6 AND asset_id IN (SELECT id FROM asset WHERE user_id = ?7)",
        (
            record.amount.to_string(),
            record.kind,
            record.date,
            record.end_date,
            &record.description,
            record.id,
            user_id.as_str(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingRecord);
    }

    Ok(())
}

/// Delete a financial record whose asset belongs to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingRecord] if the record does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_financial_record(
    record_id: RecordId,
    user_id: &UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM financial_record
        WHERE id = ?1 AND asset_id IN (SELECT id FROM asset WHERE user_id = ?2)",
        (record_id, user_id.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingRecord);
    }

    Ok(())
}

/// Get the number of financial records across all of the user's assets.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is an SQL error.
pub fn count_financial_records(user_id: &UserId, connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(financial_record.id) FROM financial_record
            INNER JOIN asset ON asset.id = financial_record.asset_id
            WHERE asset.user_id = ?1",
            [user_id.as_str()],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

fn map_financial_record_row(row: &Row) -> Result<FinancialRecord, rusqlite::Error> {
    let asset_id = row.get(1)?;
    let raw_amount: String = row.get(2)?;
    let amount = raw_amount
        .parse::<Decimal>()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(error)))?;
    let raw_asset_name: String = row.get(8)?;

    Ok(FinancialRecord {
        id: row.get(0)?,
        asset_id,
        amount,
        kind: row.get(3)?,
        date: row.get(4)?,
        end_date: row.get(5)?,
        description: row.get(6)?,
        created_at: row.get(7)?,
        asset: AssetSummary {
            id: asset_id,
            name: AssetName::new_unchecked(&raw_asset_name),
            asset_type: row.get(9)?,
        },
    })
}



#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error,
        asset::{AssetName, AssetType, NewAsset, create_asset, delete_asset},
        db::initialize,
        financial_record::{
            NewFinancialRecord, RecordKind, count_financial_records, create_financial_record,
            delete_financial_record, get_financial_record, get_financial_records,
            update_financial_record,
        },
        user::{UserId, ensure_user},
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        ensure_user(&UserId::new("owner"), None, &connection).unwrap();
        ensure_user(&UserId::new("intruder"), None, &connection).unwrap();
        connection
    }

    fn create_test_asset(owner: &str, connection: &Connection) -> i64 {
        create_asset(
            &NewAsset {
                name: AssetName::new_unchecked("Turbo"),
                asset_type: AssetType::Truck,
                image_url: None,
                custom_attributes: None,
            },
            &UserId::new(owner),
            connection,
        )
        .unwrap()
        .id
    }

    fn new_record(asset_id: i64, date: time::Date) -> NewFinancialRecord {
        NewFinancialRecord {
            asset_id,
            amount: dec!(1234.56),
            kind: RecordKind::Income,
            date,
            end_date: None,
            description: Some("Flete".to_owned()),
        }
    }

    #[test]
    fn create_and_get_record() {
        let connection = get_test_connection();
        let owner = UserId::new("owner");
        let asset_id = create_test_asset("owner", &connection);

        let created =
            create_financial_record(&new_record(asset_id, date!(2024 - 03 - 01)), &owner, &connection)
                .expect("could not create record");
        let got = get_financial_record(created.id, &owner, &connection).unwrap();

        assert_eq!(created, got);
        assert_eq!(got.amount, dec!(1234.56));
        assert_eq!(got.asset.id, asset_id);
        assert_eq!(got.asset.asset_type, AssetType::Truck);
    }

    #[test]
    fn create_record_for_other_users_asset_fails() {
        let connection = get_test_connection();
        let asset_id = create_test_asset("owner", &connection);

        let result = create_financial_record(
            &new_record(asset_id, date!(2024 - 03 - 01)),
            &UserId::new("intruder"),
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(count_financial_records(&UserId::new("owner"), &connection), Ok(0));
    }

    #[test]
    fn list_is_latest_first_and_filterable() {
        let connection = get_test_connection();
        let owner = UserId::new("owner");
        let first_asset = create_test_asset("owner", &connection);
        let second_asset = create_test_asset("owner", &connection);
        let old =
            create_financial_record(&new_record(first_asset, date!(2024 - 01 - 01)), &owner, &connection)
                .unwrap();
        let new =
            create_financial_record(&new_record(second_asset, date!(2024 - 06 - 01)), &owner, &connection)
                .unwrap();

        let all = get_financial_records(&owner, None, &connection).unwrap();
        let filtered = get_financial_records(&owner, Some(first_asset), &connection).unwrap();

        assert_eq!(all, vec![new, old.clone()]);
        assert_eq!(filtered, vec![old]);
    }

    #[test]
    fn list_for_other_users_asset_is_empty() {
        let connection = get_test_connection();
        let owner = UserId::new("owner");
        let asset_id = create_test_asset("owner", &connection);
        create_financial_record(&new_record(asset_id, date!(2024 - 01 - 01)), &owner, &connection)
            .unwrap();

        let records =
            get_financial_records(&UserId::new("intruder"), Some(asset_id), &connection).unwrap();

        assert!(records.is_empty());
    }

    #[test]
    fn update_and_delete_are_scoped_to_owner() {
        let connection = get_test_connection();
        let owner = UserId::new("owner");
        let intruder = UserId::new("intruder");
        let asset_id = create_test_asset("owner", &connection);
        let mut record =
            create_financial_record(&new_record(asset_id, date!(2024 - 01 - 01)), &owner, &connection)
                .unwrap();
        record.amount = dec!(1);

        assert_eq!(
            update_financial_record(&record, &intruder, &connection),
            Err(Error::UpdateMissingRecord)
        );
        assert_eq!(
            delete_financial_record(record.id, &intruder, &connection),
            Err(Error::DeleteMissingRecord)
        );

        update_financial_record(&record, &owner, &connection).unwrap();
        assert_eq!(get_financial_record(record.id, &owner, &connection), Ok(record.clone()));
        delete_financial_record(record.id, &owner, &connection).unwrap();
        assert_eq!(
            get_financial_record(record.id, &owner, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn deleting_asset_deletes_its_records() {
        let connection = get_test_connection();
        let owner = UserId::new("owner");
        let asset_id = create_test_asset("owner", &connection);
        for day in 1..=3 {
            let date = time::Date::from_calendar_date(2024, time::Month::May, day).unwrap();
            create_financial_record(&new_record(asset_id, date), &owner, &connection).unwrap();
        }

        delete_asset(asset_id, &owner, &connection).unwrap();

        assert_eq!(count_financial_records(&owner, &connection), Ok(0));
        let orphans: i64 = connection
            .query_row("SELECT COUNT(id) FROM financial_record", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }
}
