use crate::error::{CamaraError, Result};
use crate::settings::Settings;

use super::{fetch, load, open_store, train};

/// Logs a failed stage and remembers it. Later stages that do not depend on
/// the failed one still run.
fn report_stage<T>(stage: &str, result: Result<T>, failed: &mut Vec<String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(stage, error = %e, "Stage failed");
            eprintln!("{stage} failed: {e}");
            failed.push(stage.to_string());
            None
        }
    }
}

pub fn run(
    settings: &Settings,
    file: Option<&str>,
    link: bool,
    skip_fetch: bool,
    year: Option<i32>,
) -> Result<()> {
    let file = file
        .map(str::to_string)
        .or_else(|| settings.expenses_file.clone())
        .ok_or_else(|| {
            CamaraError::Settings(
                "No expense file given and expenses_file is not set in settings".into(),
            )
        })?;

    // Schema setup failing is fatal: nothing else can run without the store.
    drop(open_store(settings)?);
    tracing::info!(stage = "schema", db = %settings.db_path().display(), "Schema ready");

    let mut failed = Vec::new();

    if skip_fetch {
        tracing::info!(stage = "fetch", "Skipping roster fetch");
    } else {
        let fetched = open_store(settings).and_then(|mut conn| fetch::stage(&mut conn, settings));
        report_stage("fetch", fetched, &mut failed);
    }

    let loaded = open_store(settings)
        .and_then(|mut conn| load::stage(&mut conn, settings, &file, link, year));
    match report_stage("load", loaded, &mut failed) {
        Some(Some(expenses)) => {
            report_stage("train", train::stage(&expenses, settings), &mut failed);
        }
        Some(None) => {
            tracing::info!(stage = "train", "Skipping training: no expenses loaded");
        }
        None => {
            tracing::info!(stage = "train", "Skipping training: expenses were not stored");
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(CamaraError::Other(format!("pipeline stages failed: {}", failed.join(", "))))
    }
}
