use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::Result;
use crate::models::{Table, Value};

/// Columns holding calendar dates; normalized to `YYYY-MM-DD` on load.
pub const DATE_COLUMNS: &[&str] = &["datEmissao", "datPagamentoRestituicao"];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn parse_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date().format("%Y-%m-%d").to_string());
        }
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d.format("%Y-%m-%d").to_string());
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnKind {
    Integer,
    Real,
    Text,
}

/// Zero-padded codes (CPF, CNPJ) keep their padding as text.
fn zero_padded(s: &str) -> bool {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let int_part = unsigned.split('.').next().unwrap_or(unsigned);
    int_part.len() > 1 && int_part.starts_with('0')
}

fn looks_integer(s: &str) -> bool {
    !zero_padded(s) && s.parse::<i64>().is_ok()
}

fn looks_real(s: &str) -> bool {
    !zero_padded(s)
        && s.chars().any(|c| c.is_ascii_digit())
        && !s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
        && s.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

/// Picks the narrowest kind every non-empty cell of a column satisfies.
fn sniff<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnKind {
    let mut kind = ColumnKind::Integer;
    for cell in cells.filter(|c| !c.is_empty()) {
        if kind == ColumnKind::Integer && !looks_integer(cell) {
            kind = ColumnKind::Real;
        }
        if kind == ColumnKind::Real && !looks_real(cell) {
            return ColumnKind::Text;
        }
    }
    kind
}

fn to_value(cell: String, kind: ColumnKind) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    match kind {
        ColumnKind::Integer => cell.parse().map(Value::Integer).unwrap_or(Value::Text(cell)),
        ColumnKind::Real => cell.parse().map(Value::Real).unwrap_or(Value::Text(cell)),
        ColumnKind::Text => Value::Text(cell),
    }
}

// ---------------------------------------------------------------------------
// load_expenses
// ---------------------------------------------------------------------------

pub struct LoadedExpenses {
    pub table: Table,
    /// Rows dropped because a date cell did not parse.
    pub rejected: usize,
}

/// Reads a `;`-delimited, `"`-quoted expense file with a header row.
///
/// Every record must have as many fields as the header. Column types are
/// sniffed from the data; date columns are normalized and a row whose date
/// cannot be parsed is rejected.
pub fn try_load_expenses(file_path: &Path) -> Result<LoadedExpenses> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .quote(b'"')
        .has_headers(true)
        .from_reader(std::io::BufReader::new(file));

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    let date_idx: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| DATE_COLUMNS.contains(&h.as_str()))
        .map(|(i, _)| i)
        .collect();

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    let mut rejected = 0usize;
    'records: for result in rdr.records() {
        let record = result?;
        let mut cells: Vec<String> = record.iter().map(|f| f.trim().to_string()).collect();
        for &i in &date_idx {
            if cells[i].is_empty() {
                continue;
            }
            match parse_date(&cells[i]) {
                Some(date) => cells[i] = date,
                None => {
                    tracing::debug!(
                        line = ?record.position().map(|p| p.line()),
                        column = %headers[i],
                        value = %cells[i],
                        "Rejecting row with unparseable date"
                    );
                    rejected += 1;
                    continue 'records;
                }
            }
        }
        raw_rows.push(cells);
    }

    let kinds: Vec<ColumnKind> = (0..headers.len())
        .map(|i| {
            if date_idx.contains(&i) {
                ColumnKind::Text
            } else {
                sniff(raw_rows.iter().map(|r| r[i].as_str()))
            }
        })
        .collect();

    let mut table = Table::new(headers);
    for row in raw_rows {
        let values = row
            .into_iter()
            .zip(&kinds)
            .map(|(cell, kind)| to_value(cell, *kind))
            .collect();
        table.push_row(values);
    }

    Ok(LoadedExpenses { table, rejected })
}

/// Loads the expense file. Failures are reported and yield `None`.
pub fn load_expenses(file_path: &Path) -> Option<Table> {
    match try_load_expenses(file_path) {
        Ok(loaded) => {
            if loaded.rejected > 0 {
                tracing::warn!(
                    stage = "load",
                    rejected = loaded.rejected,
                    "Rows rejected for unparseable dates"
                );
            }
            tracing::info!(
                stage = "load",
                rows = loaded.table.len(),
                file = %file_path.display(),
                "Expenses loaded"
            );
            Some(loaded.table)
        }
        Err(e) => {
            tracing::warn!(stage = "load", file = %file_path.display(), error = %e, "Expense load failed");
            None
        }
    }
}
