use std::time::Duration;

use rusqlite::Connection;

use crate::db::{read_legislators, DEPUTADOS};
use crate::error::Result;
use crate::models::Table;
use crate::reports::party_distribution;
use crate::roster::{fetch_roster, normalize, RosterClient};
use crate::settings::Settings;
use crate::sink::append;

use super::open_store;
use super::report::{format_legislators, format_party_distribution};

const PREVIEW_ROWS: usize = 5;

/// Fetches the roster and appends it to `deputados`.
///
/// An unavailable roster is not an error: nothing is written and `None` is
/// returned. Persistence failures are.
pub fn stage(conn: &mut Connection, settings: &Settings) -> Result<Option<Table>> {
    let client = RosterClient::new(
        &settings.roster_url,
        Duration::from_secs(settings.http_timeout_secs),
    )?;
    let roster = match fetch_roster(&client) {
        Some(table) if !table.is_empty() => normalize(table),
        _ => {
            println!("Roster unavailable; nothing written to {DEPUTADOS}.");
            return Ok(None);
        }
    };

    let written = append(conn, DEPUTADOS, &roster)?;
    println!("{written} legislators appended to {DEPUTADOS}");

    let stored = read_legislators(conn)?;
    let preview: Vec<_> = stored.into_iter().take(PREVIEW_ROWS).collect();
    println!("{}", format_legislators("Stored Legislators", &preview));
    println!("{}", format_party_distribution(&party_distribution(&roster)));
    Ok(Some(roster))
}

pub fn run(settings: &Settings) -> Result<()> {
    let mut conn = open_store(settings)?;
    stage(&mut conn, settings)?;
    Ok(())
}
