use std::collections::HashMap;

use rusqlite::Connection;

use crate::error::{CamaraError, Result};
use crate::models::{Table, Value};

pub const EXTERNAL_ID_COLUMN: &str = "nuDeputadoId";
pub const FOREIGN_KEY_COLUMN: &str = "deputado_id";

pub struct LinkSummary {
    pub matched: usize,
    pub unmatched: usize,
}

/// Maps the API identifier (last path segment of `deputados.uri`) to the
/// store's identifier. When a legislator was stored more than once the most
/// recent row wins.
fn external_ids(conn: &Connection) -> Result<HashMap<i64, i64>> {
    let mut stmt = conn.prepare("SELECT id, uri FROM deputados WHERE uri IS NOT NULL ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut map = HashMap::new();
    for (id, uri) in rows {
        let external = uri
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .and_then(|seg| seg.parse::<i64>().ok());
        if let Some(external) = external {
            map.insert(external, id);
        }
    }
    Ok(map)
}

/// Fills `deputado_id` for every expense whose `nuDeputadoId` matches a
/// stored legislator. Unmatched rows get NULL.
pub fn link_legislators(conn: &Connection, table: &mut Table) -> Result<LinkSummary> {
    let ids = external_ids(conn)?;
    let values: Vec<Value> = table
        .column_values(EXTERNAL_ID_COLUMN)
        .ok_or_else(|| CamaraError::MissingColumn(EXTERNAL_ID_COLUMN.to_string()))?
        .map(|v| {
            v.as_i64()
                .and_then(|ext| ids.get(&ext))
                .map(|id| Value::Integer(*id))
                .unwrap_or(Value::Null)
        })
        .collect();

    let matched = values.iter().filter(|v| !v.is_null()).count();
    let summary = LinkSummary {
        matched,
        unmatched: values.len() - matched,
    };
    table.set_column(FOREIGN_KEY_COLUMN, values);

    tracing::info!(
        stage = "link",
        matched = summary.matched,
        unmatched = summary.unmatched,
        "Expenses linked to legislators"
    );
    Ok(summary)
}
