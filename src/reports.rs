use std::collections::HashMap;

use rusqlite::Connection;

use crate::db::{count_rows, query_table, DEPUTADOS, DESPESAS};
use crate::error::Result;
use crate::models::Table;

// ---------------------------------------------------------------------------
// Party distribution
// ---------------------------------------------------------------------------

pub struct PartyCount {
    pub party: String,
    pub count: usize,
}

/// Legislators per party acronym, largest first (ties by acronym).
pub fn party_distribution(roster: &Table) -> Vec<PartyCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    if let Some(values) = roster.column_values("siglaPartido") {
        for v in values {
            let party = v.to_string();
            let party = if party.is_empty() { "(sem partido)".to_string() } else { party };
            *counts.entry(party).or_default() += 1;
        }
    }
    let mut items: Vec<PartyCount> = counts
        .into_iter()
        .map(|(party, count)| PartyCount { party, count })
        .collect();
    items.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.party.cmp(&b.party)));
    items
}

// ---------------------------------------------------------------------------
// Expenses issued in a year
// ---------------------------------------------------------------------------

pub struct YearExpenses {
    pub year: i32,
    pub count: i64,
    pub total_net: f64,
    pub preview: Table,
}

pub fn get_year_expenses(conn: &Connection, year: i32, limit: usize) -> Result<YearExpenses> {
    let year_str = format!("{year:04}");
    let (count, total_net): (i64, f64) = conn.query_row(
        "SELECT count(*), COALESCE(SUM(\"vlrLiquido\"), 0.0) FROM despesas \
         WHERE strftime('%Y', \"datEmissao\") = ?1",
        [&year_str],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    let preview = query_table(
        conn,
        "SELECT id, \"txNomeParlamentar\", \"sgPartido\", \"txtDescricao\", \"datEmissao\", \
         \"vlrLiquido\", deputado_id FROM despesas \
         WHERE strftime('%Y', \"datEmissao\") = ?1 ORDER BY \"datEmissao\", id LIMIT ?2",
        rusqlite::params![year_str, limit as i64],
    )?;
    Ok(YearExpenses {
        year,
        count,
        total_net,
        preview,
    })
}

// ---------------------------------------------------------------------------
// Store status
// ---------------------------------------------------------------------------

pub struct StoreStatus {
    pub legislators: i64,
    pub expenses: i64,
    pub linked_expenses: i64,
}

pub fn get_status(conn: &Connection) -> Result<StoreStatus> {
    let linked_expenses: i64 = conn.query_row(
        "SELECT count(*) FROM despesas WHERE deputado_id IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    Ok(StoreStatus {
        legislators: count_rows(conn, DEPUTADOS)?,
        expenses: count_rows(conn, DESPESAS)?,
        linked_expenses,
    })
}
