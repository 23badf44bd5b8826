use std::error::Error;
use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use fleet_ledger::{delete_all_data, initialize_db, list_users_with_asset_count};

/// Maintenance commands for a fleet_ledger database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DB_PATH")]
    db_path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every user with the number of assets they own.
    ListUsers,
    /// Delete all financial records, assets and users.
    ///
    /// Users are created again the next time they make an authenticated request.
    Cleanup,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if !args.db_path.is_file() {
        eprintln!("No database found at {:#?}", args.db_path);
        exit(1);
    }

    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    match args.command {
        Command::ListUsers => {
            let users = list_users_with_asset_count(&conn)?;

            if users.is_empty() {
                println!("No users found.");
            }

            for (user, asset_count) in users {
                println!(
                    "{}\t{}\t{} assets",
                    user.id,
                    user.email.as_deref().unwrap_or("-"),
                    asset_count
                );
            }
        }
        Command::Cleanup => {
            let deleted = delete_all_data(&conn)?;

            println!(
                "Deleted {} financial records, {} assets and {} users.",
                deleted.financial_records, deleted.assets, deleted.users
            );
        }
    }

    Ok(())
}
