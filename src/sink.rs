use rusqlite::Connection;

use crate::db::quote_ident;
use crate::error::Result;
use crate::models::Table;

/// Appends every row of `rows` into `table_name`, matching columns by name.
///
/// The whole batch runs in one transaction: any insert failure (unknown
/// column, NOT NULL breach, foreign key violation) rolls the batch back and
/// is returned to the caller. Nothing is validated up front; the store is
/// the authority on the schema.
pub fn append(conn: &mut Connection, table_name: &str, rows: &Table) -> Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }

    let columns: Vec<String> = rows.columns().iter().map(|c| quote_ident(c)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table_name),
        columns.join(", "),
        placeholders.join(", "),
    );

    let tx = conn.transaction()?;
    let mut inserted = 0usize;
    {
        let mut stmt = tx.prepare(&sql)?;
        for row in rows.rows() {
            stmt.execute(rusqlite::params_from_iter(row.iter()))?;
            inserted += 1;
        }
    }
    tx.commit()?;

    tracing::debug!(table = table_name, rows = inserted, "Batch committed");
    Ok(inserted)
}
