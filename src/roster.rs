//! Legislator roster client for the Câmara open-data API.
//!
//! The endpoint answers `{ "dados": [ {...}, ... ] }` with the full roster in
//! a single page. Anything other than HTTP 200 with that shape is treated as
//! a failed fetch: the condition is logged and the caller gets `None`.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::error::{CamaraError, Result};
use crate::models::{Table, Value};

const USER_AGENT: &str = concat!("camara/", env!("CARGO_PKG_VERSION"));

pub struct RosterClient {
    http_client: Client,
    url: String,
}

impl RosterClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http_client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn get_roster(&self) -> Result<Table> {
        tracing::debug!(url = %self.url, "Requesting roster");
        let response = self
            .http_client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(CamaraError::HttpStatus(status.as_u16()));
        }

        let body: serde_json::Value = response.json()?;
        table_from_payload(&body)
    }
}

/// Fetches the roster. Failures of any kind are reported and yield `None`.
pub fn fetch_roster(client: &RosterClient) -> Option<Table> {
    match client.get_roster() {
        Ok(table) => {
            tracing::info!(stage = "fetch", rows = table.len(), "Roster fetched");
            Some(table)
        }
        Err(e) => {
            tracing::warn!(stage = "fetch", url = %client.url(), error = %e, "Roster fetch failed");
            None
        }
    }
}

/// Turns the `dados` array into a table whose columns are the union of the
/// record keys, in order of first appearance.
pub fn table_from_payload(body: &serde_json::Value) -> Result<Table> {
    let records = body
        .get("dados")
        .and_then(|d| d.as_array())
        .ok_or_else(|| CamaraError::Payload("expected a `dados` array".to_string()))?;

    let mut columns: Vec<String> = Vec::new();
    for record in records {
        let obj = record
            .as_object()
            .ok_or_else(|| CamaraError::Payload("`dados` entries must be objects".to_string()))?;
        for key in obj.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = Table::new(columns);
    for record in records {
        let row = table
            .columns()
            .iter()
            .map(|col| record.get(col).map(json_cell).unwrap_or(Value::Null))
            .collect();
        table.push_row(row);
    }
    Ok(table)
}

fn json_cell(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Integer(i64::from(*b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Real).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

/// Prepares a fetched roster for `deputados`: the API's own `id` is dropped
/// so the store assigns the identifier. The external identity stays in `uri`.
pub fn normalize(mut table: Table) -> Table {
    if table.drop_column("id") {
        tracing::debug!("Dropped API id column; identifiers are assigned by the store");
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Serves one canned HTTP response on a random local port.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}/api/v2/deputados")
    }

    fn client(url: &str) -> RosterClient {
        RosterClient::new(url, Duration::from_secs(5)).unwrap()
    }

    const PAYLOAD: &str = r#"{"dados": [
        {"id": 204554, "uri": "https://dadosabertos.camara.leg.br/api/v2/deputados/204554",
         "nome": "Abilio Brunini", "siglaPartido": "PL", "siglaUf": "MT", "idLegislatura": 57,
         "urlFoto": "https://www.camara.leg.br/internet/deputado/bandep/204554.jpg",
         "email": "dep.abiliobrunini@camara.leg.br"},
        {"id": 220714, "nome": "Adail Filho", "siglaPartido": "REPUBLICANOS", "siglaUf": "AM",
         "idLegislatura": 57, "gabinete": null}
    ], "links": []}"#;

    #[test]
    fn test_fetch_roster_parses_dados() {
        let url = serve_once("200 OK", PAYLOAD);
        let table = fetch_roster(&client(&url)).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "nome"), Some(&Value::Text("Abilio Brunini".into())));
        assert_eq!(table.get(1, "idLegislatura"), Some(&Value::Integer(57)));
    }

    #[test]
    fn test_fetch_roster_non_200_yields_none() {
        let url = serve_once("503 Service Unavailable", r#"{"dados": []}"#);
        assert!(fetch_roster(&client(&url)).is_none());
    }

    #[test]
    fn test_fetch_roster_not_found_yields_none() {
        let url = serve_once("404 Not Found", "{}");
        assert!(fetch_roster(&client(&url)).is_none());
    }

    #[test]
    fn test_fetch_roster_bad_json_yields_none() {
        let url = serve_once("200 OK", "<html>maintenance</html>");
        assert!(fetch_roster(&client(&url)).is_none());
    }

    #[test]
    fn test_fetch_roster_connection_refused_yields_none() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        assert!(fetch_roster(&client(&format!("http://{addr}/"))).is_none());
    }

    #[test]
    fn test_fetch_roster_timeout_yields_none() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            // Hold the connection open without ever answering.
            if let Ok((stream, _)) = listener.accept() {
                std::thread::sleep(Duration::from_secs(5));
                drop(stream);
            }
        });
        let slow = RosterClient::new(&format!("http://{addr}/"), Duration::from_millis(200)).unwrap();
        let started = std::time::Instant::now();
        assert!(fetch_roster(&slow).is_none());
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_columns_are_union_in_first_seen_order() {
        let body: serde_json::Value = serde_json::from_str(PAYLOAD).unwrap();
        let table = table_from_payload(&body).unwrap();
        assert_eq!(
            table.columns(),
            &["id", "uri", "nome", "siglaPartido", "siglaUf", "idLegislatura", "urlFoto", "email", "gabinete"]
        );
        assert_eq!(table.get(1, "uri"), Some(&Value::Null));
        assert_eq!(table.get(1, "gabinete"), Some(&Value::Null));
    }

    #[test]
    fn test_missing_dados_is_a_payload_error() {
        let body = serde_json::json!({"erro": "x"});
        assert!(matches!(table_from_payload(&body), Err(CamaraError::Payload(_))));
    }

    #[test]
    fn test_normalize_drops_api_id() {
        let body: serde_json::Value = serde_json::from_str(PAYLOAD).unwrap();
        let table = normalize(table_from_payload(&body).unwrap());
        assert!(table.column_index("id").is_none());
        assert_eq!(table.columns()[0], "uri");
    }
}
