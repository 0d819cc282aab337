use crate::db::get_connection;
use crate::error::Result;
use crate::reports::get_status;
use crate::settings::Settings;

use super::report::format_status;

pub fn run(settings: &Settings) -> Result<()> {
    let db_path = settings.db_path();
    println!("Data dir:   {}", settings.data_dir);
    println!("Roster URL: {}", settings.roster_url);

    if !db_path.exists() {
        println!("Database:   {}", db_path.display());
        println!();
        println!("Database not found. Run `camara init` to set up.");
        return Ok(());
    }

    let conn = get_connection(&db_path)?;
    let status = get_status(&conn)?;
    println!("{}", format_status(&db_path.display().to_string(), &status));
    Ok(())
}
