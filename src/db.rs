use std::path::Path;

use rusqlite::{Connection, ToSql};

use crate::error::Result;
use crate::models::{Legislator, Table, Value};

pub const DEPUTADOS: &str = "deputados";
pub const DESPESAS: &str = "despesas";

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS deputados (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uri VARCHAR(255),
    nome VARCHAR(255) NOT NULL,
    "siglaPartido" VARCHAR(50) NOT NULL,
    "uriPartido" VARCHAR(255),
    "siglaUf" VARCHAR(2) NOT NULL,
    "idLegislatura" INTEGER,
    "urlFoto" TEXT,
    email VARCHAR(255),
    gabinete VARCHAR(100)
);

CREATE TABLE IF NOT EXISTS despesas (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    "txNomeParlamentar" VARCHAR(255),
    cpf VARCHAR(20),
    "ideCadastro" INTEGER,
    "nuCarteiraParlamentar" VARCHAR(30),
    "nuLegislatura" INTEGER,
    "sgUF" VARCHAR(5),
    "sgPartido" VARCHAR(20),
    "codLegislatura" INTEGER,
    "numSubCota" INTEGER,
    "txtDescricao" TEXT,
    "numEspecificacaoSubCota" INTEGER,
    "txtDescricaoEspecificacao" TEXT,
    "txtFornecedor" TEXT,
    "txtCNPJCPF" VARCHAR(30),
    "txtNumero" VARCHAR(255),
    "indTipoDocumento" VARCHAR(5),
    "datEmissao" DATE,
    "vlrDocumento" NUMERIC,
    "vlrGlosa" NUMERIC,
    "vlrLiquido" NUMERIC,
    "numMes" INTEGER,
    "numAno" INTEGER,
    "numParcela" INTEGER,
    "txtPassageiro" TEXT,
    "txtTrecho" TEXT,
    "numLote" INTEGER,
    "numRessarcimento" INTEGER,
    "datPagamentoRestituicao" DATE,
    "vlrRestituicao" NUMERIC,
    "nuDeputadoId" INTEGER,
    "ideDocumento" VARCHAR(255),
    "urlDocumento" TEXT,
    deputado_id INTEGER,
    CONSTRAINT fk_deputado
        FOREIGN KEY (deputado_id)
        REFERENCES deputados(id)
);
"#;

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

/// Creates both tables when absent. Safe to call on every start.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Quotes an identifier verbatim so camelCase column names survive.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    let sql = format!("SELECT count(*) FROM {}", quote_ident(table));
    Ok(conn.query_row(&sql, [], |r| r.get(0))?)
}

/// Runs a query and collects the result set into a [`Table`].
pub fn query_table(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Result<Table> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();
    let rows = stmt
        .query_map(params, |row| {
            (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let mut table = Table::new(columns);
    for row in rows {
        table.push_row(row);
    }
    Ok(table)
}

pub fn read_legislators(conn: &Connection) -> Result<Vec<Legislator>> {
    let mut stmt = conn.prepare(
        "SELECT id, nome, \"siglaPartido\", \"siglaUf\", \"idLegislatura\", email \
         FROM deputados ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Legislator {
            id: row.get(0)?,
            nome: row.get(1)?,
            sigla_partido: row.get(2)?,
            sigla_uf: row.get(3)?,
            id_legislatura: row.get(4)?,
            email: row.get(5)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let sql = format!("PRAGMA table_info({})", quote_ident(table));
    let mut stmt = conn.prepare(&sql)?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;
    Ok(cols.collect::<std::result::Result<Vec<_>, _>>()?)
}

#[cfg(test)]
pub(crate) fn test_db() -> (tempfile::TempDir, Connection) {
    let dir = tempfile::tempdir().unwrap();
    let conn = get_connection(&dir.path().join("test.db")).unwrap();
    ensure_schema(&conn).unwrap();
    (dir, conn)
}
