pub mod fetch;
pub mod init;
pub mod load;
pub mod report;
pub mod run;
pub mod status;
pub mod train;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::{ensure_schema, get_connection};
use crate::error::Result;
use crate::settings::{load_settings, shellexpand_path, Settings};

#[derive(Parser)]
#[command(
    name = "camara",
    version,
    about = "Ingest Câmara legislators and expenses, then flag high expenses."
)]
pub struct Cli {
    /// Directory holding camara.db (default from settings)
    #[arg(long = "data-dir", global = true, env = "CAMARA_DATA_DIR")]
    pub data_dir: Option<String>,
    /// Roster endpoint URL (default from settings)
    #[arg(long = "roster-url", global = true, env = "CAMARA_ROSTER_URL")]
    pub roster_url: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the deputados and despesas tables if missing.
    Init {
        /// Also write the effective settings to the settings file
        #[arg(long)]
        save: bool,
    },
    /// Fetch the legislator roster and append it to deputados.
    Fetch,
    /// Load an expense file and append it to despesas.
    Load {
        /// Path to the ';'-delimited expense file
        file: String,
        /// Fill deputado_id from nuDeputadoId using stored legislators
        #[arg(long)]
        link: bool,
        /// Year of the issued-expenses preview (default from settings)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Label an expense file and train the high-expense classifiers.
    Train {
        /// Path to the ';'-delimited expense file
        file: String,
    },
    /// Run the whole pipeline: schema, roster, expenses, training.
    Run {
        /// Expense file (default: expenses_file from settings)
        file: Option<String>,
        /// Fill deputado_id from nuDeputadoId using stored legislators
        #[arg(long)]
        link: bool,
        /// Skip the roster fetch
        #[arg(long = "skip-fetch")]
        skip_fetch: bool,
        /// Year of the issued-expenses preview (default from settings)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Show the database path and row counts.
    Status,
}

/// Settings file merged with command-line overrides.
pub fn resolve_settings(cli: &Cli) -> Settings {
    let mut settings = load_settings();
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = shellexpand_path(dir);
    }
    if let Some(url) = &cli.roster_url {
        settings.roster_url = url.clone();
    }
    settings
}

/// Opens the store and makes sure both tables exist.
pub(crate) fn open_store(settings: &Settings) -> Result<Connection> {
    let conn = get_connection(&settings.db_path())?;
    ensure_schema(&conn)?;
    Ok(conn)
}
