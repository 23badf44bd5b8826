//! Creates the application's database tables.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, asset::create_asset_table, financial_record::create_financial_record_table,
    user::create_user_table,
};

/// Create the tables for the domain models if they do not exist yet.
///
/// Foreign key enforcement is switched on for `connection`, which makes
/// deleting a user or asset also delete the rows that depend on it.
///
/// # Errors
///
/// Returns an [Error::SqlError] if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Must be set outside of a transaction to take effect.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_asset_table(&transaction)?;
    create_financial_record_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// The number of rows removed by [delete_all_data].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeletedRows {
    /// The number of financial records deleted.
    pub financial_records: usize,
    /// The number of assets deleted.
    pub assets: usize,
    /// The number of users deleted.
    pub users: usize,
}

/// Delete every financial record, asset and user in a single transaction.
///
/// Rows are deleted children first so the counts do not depend on
/// foreign key cascades.
///
/// # Errors
///
/// Returns an [Error::SqlError] if any of the deletes failed, in which case
/// nothing is deleted.
pub fn delete_all_data(connection: &Connection) -> Result<DeletedRows, Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    let financial_records = transaction.execute("DELETE FROM financial_record", ())?;
    let assets = transaction.execute("DELETE FROM asset", ())?;
    let users = transaction.execute("DELETE FROM user", ())?;

    transaction.commit()?;

    Ok(DeletedRows {
        financial_records,
        assets,
        users,
    })
}
