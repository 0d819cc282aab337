use std::path::PathBuf;

use crate::classifier::train_and_report;
use crate::error::{CamaraError, Result};
use crate::features::prepare;
use crate::importer::try_load_expenses;
use crate::models::Table;
use crate::settings::{shellexpand_path, Settings};

use super::report::format_training;

/// Labels the expenses, trains both models and prints their holdout reports.
pub fn stage(expenses: &Table, settings: &Settings) -> Result<()> {
    let (features, labels) = prepare(expenses, &settings.model)?;
    let result = train_and_report(&features, &labels, &settings.model)?;
    println!("{}", format_training(&result));
    Ok(())
}

pub fn run(settings: &Settings, file: &str) -> Result<()> {
    let file_path = PathBuf::from(shellexpand_path(file));
    let loaded = try_load_expenses(&file_path)?;
    if loaded.rejected > 0 {
        tracing::warn!(stage = "train", rejected = loaded.rejected, "Rows rejected for unparseable dates");
    }
    if loaded.table.is_empty() {
        return Err(CamaraError::Other(format!(
            "{} has no expense rows to train on",
            file_path.display()
        )));
    }
    stage(&loaded.table, settings)
}
