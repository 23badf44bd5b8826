use std::error::Error;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::macros::date;

use fleet_ledger::{
    AssetName, AssetType, CustomAttributes, NewAsset, NewFinancialRecord, RecordKind, UserId,
    create_asset, create_financial_record, ensure_user, initialize_db,
};

/// A utility for creating a test database for the JSON API server of fleet_ledger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: PathBuf,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = args.output_path.as_path();

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");
    let user_id = UserId::new("test-user");
    ensure_user(&user_id, Some("test@test.com"), &conn)?;

    println!("Creating assets...");
    let bus = create_asset(
        &NewAsset {
            name: AssetName::new("Buseta Ruta 12")?,
            asset_type: AssetType::Minibus,
            image_url: None,
            custom_attributes: Some(CustomAttributes::from([
                ("marca".to_owned(), "Chevrolet".to_owned()),
                ("placa".to_owned(), "SXT-482".to_owned()),
            ])),
        },
        &user_id,
        &conn,
    )?;
    let jeep = create_asset(
        &NewAsset {
            name: AssetName::new("Willys Finca")?,
            asset_type: AssetType::Jeep,
            image_url: None,
            custom_attributes: None,
        },
        &user_id,
        &conn,
    )?;

    println!("Creating financial records...");
    let records = [
        (bus.id, "1250000", RecordKind::Income, date!(2024 - 01 - 31), None, "Pasajes enero"),
        (bus.id, "320000", RecordKind::Expense, date!(2024 - 01 - 15), None, "Aceite"),
        (bus.id, "1100000", RecordKind::Income, date!(2024 - 02 - 29), None, "Pasajes febrero"),
        (
            jeep.id,
            "8755.00",
            RecordKind::Expense,
            date!(2024 - 02 - 01),
            Some(date!(2024 - 02 - 28)),
            "Seguro",
        ),
        (jeep.id, "450000", RecordKind::Income, date!(2024 - 03 - 10), None, "Flete"),
    ];

    for (asset_id, amount, kind, date, end_date, description) in records {
        create_financial_record(
            &NewFinancialRecord {
                asset_id,
                amount: amount.parse::<Decimal>()?,
                kind,
                date,
                end_date,
                description: Some(description.to_owned()),
            },
            &user_id,
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
