use crate::db::{table_columns, DEPUTADOS, DESPESAS};
use crate::error::Result;
use crate::settings::{save_settings, settings_path, Settings};

use super::open_store;

pub fn run(settings: &Settings, save: bool) -> Result<()> {
    let conn = open_store(settings)?;
    println!("Database:   {}", settings.db_path().display());
    for table in [DEPUTADOS, DESPESAS] {
        let columns = table_columns(&conn, table)?;
        println!("  {table:<10} {} columns", columns.len());
    }

    if save {
        save_settings(settings)?;
        println!("Settings saved to {}", settings_path().display());
    }
    Ok(())
}
