use std::path::PathBuf;

use rusqlite::Connection;

use crate::db::DESPESAS;
use crate::error::Result;
use crate::importer::load_expenses;
use crate::linker::link_legislators;
use crate::models::Table;
use crate::reports::get_year_expenses;
use crate::settings::{shellexpand_path, Settings};
use crate::sink::append;

use super::open_store;
use super::report::{format_expense_head, format_year_expenses};

const PREVIEW_ROWS: usize = 5;

/// Loads an expense file and appends it to `despesas`.
///
/// A file that cannot be read yields `None` without touching the store.
pub fn stage(
    conn: &mut Connection,
    settings: &Settings,
    file: &str,
    link: bool,
    year: Option<i32>,
) -> Result<Option<Table>> {
    let file_path = PathBuf::from(shellexpand_path(file));
    let mut expenses = match load_expenses(&file_path) {
        Some(table) if !table.is_empty() => table,
        Some(_) => {
            println!("{} has no expense rows; nothing written to {DESPESAS}.", file_path.display());
            return Ok(None);
        }
        None => {
            println!("Could not read {}; nothing written to {DESPESAS}.", file_path.display());
            return Ok(None);
        }
    };
    println!("{}", format_expense_head(&expenses, PREVIEW_ROWS));

    if link {
        let summary = link_legislators(conn, &mut expenses)?;
        println!(
            "{} expenses linked to legislators, {} unmatched",
            summary.matched, summary.unmatched
        );
    }

    let written = append(conn, DESPESAS, &expenses)?;
    println!("{written} expenses appended to {DESPESAS}");

    let year = year.unwrap_or(settings.preview_year);
    let issued = get_year_expenses(conn, year, PREVIEW_ROWS)?;
    println!("{}", format_year_expenses(&issued));
    Ok(Some(expenses))
}

pub fn run(settings: &Settings, file: &str, link: bool, year: Option<i32>) -> Result<()> {
    let mut conn = open_store(settings)?;
    stage(&mut conn, settings, file, link, year)?;
    Ok(())
}
