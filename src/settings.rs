use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_ROSTER_URL: &str = "https://dadosabertos.camara.leg.br/api/v2/deputados";
pub const DB_FILE: &str = "camara.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_dir_string")]
    pub data_dir: String,
    #[serde(default = "default_roster_url")]
    pub roster_url: String,
    #[serde(default)]
    pub expenses_file: Option<String>,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_preview_year")]
    pub preview_year: i32,
    #[serde(default)]
    pub model: ModelSettings,
}

/// Labelling and training constants.
///
/// Defaults: net value strictly above 10 000.00 is a high expense, five
/// numeric features, 70/30 split, seed 42.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub threshold: f64,
    pub label_column: String,
    pub features: Vec<String>,
    pub test_fraction: f64,
    pub seed: u64,
    /// Inverse L2 regularization strength of the logistic model.
    pub c: f64,
    pub n_estimators: u16,
    pub max_depth: Option<u16>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            threshold: 10_000.0,
            label_column: "vlrLiquido".to_string(),
            features: ["numMes", "numAno", "numSubCota", "vlrDocumento", "numParcela"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            test_fraction: 0.3,
            seed: 42,
            c: 1.0,
            n_estimators: 100,
            max_depth: None,
        }
    }
}

fn default_roster_url() -> String {
    DEFAULT_ROSTER_URL.to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_preview_year() -> i32 {
    2022
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir_string(),
            roster_url: default_roster_url(),
            expenses_file: None,
            http_timeout_secs: default_http_timeout_secs(),
            preview_year: default_preview_year(),
            model: ModelSettings::default(),
        }
    }
}

impl Settings {
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(DB_FILE)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("camara")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local")
        .join("share")
        .join("camara")
}

fn default_data_dir_string() -> String {
    default_data_dir().to_string_lossy().to_string()
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(&path).unwrap_or_default();
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable settings file");
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    std::fs::create_dir_all(config_dir())?;
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.roster_url, DEFAULT_ROSTER_URL);
        assert_eq!(s.http_timeout_secs, 30);
        assert!(s.expenses_file.is_none());
        assert_eq!(s.model.threshold, 10_000.0);
        assert_eq!(s.model.features.len(), 5);
        assert_eq!(s.model.seed, 42);
        assert!(s.db_path().ends_with(DB_FILE));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"data_dir": "/tmp/camara", "model": {"threshold": 500.0}}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.data_dir, "/tmp/camara");
        assert_eq!(s.roster_url, DEFAULT_ROSTER_URL);
        assert_eq!(s.model.threshold, 500.0);
        assert_eq!(s.model.n_estimators, 100);
        assert_eq!(s.model.label_column, "vlrLiquido");
    }

    #[test]
    fn test_partial_file_without_data_dir_keeps_its_fields() {
        let json = r#"{"expenses_file": "/data/Ano-2022.csv", "model": {"threshold": 500.0}}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.data_dir, Settings::default().data_dir);
        assert_eq!(s.expenses_file.as_deref(), Some("/data/Ano-2022.csv"));
        assert_eq!(s.model.threshold, 500.0);
        assert_eq!(s.model.c, 1.0);
    }

    #[test]
    fn test_roundtrip_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.expenses_file = Some("/data/Ano-2022.csv".to_string());
        settings.model.max_depth = Some(8);
        std::fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();
        let loaded: Settings =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.expenses_file.as_deref(), Some("/data/Ano-2022.csv"));
        assert_eq!(loaded.model.max_depth, Some(8));
    }

    #[test]
    fn test_shellexpand_leaves_plain_paths() {
        assert_eq!(shellexpand_path("/var/data"), "/var/data");
    }
}
