use crate::error::{CamaraError, Result};
use crate::models::Table;
use crate::settings::ModelSettings;

/// Row-major numeric feature matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Features {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl Features {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    pub fn select(&self, indices: &[usize]) -> Features {
        Features {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}

/// Binary class per row: 1 for a high expense, 0 otherwise.
pub type Labels = Vec<u8>;

/// Strictly greater than the threshold counts as high.
pub fn high_expense(net_value: f64, threshold: f64) -> u8 {
    u8::from(net_value > threshold)
}

fn numeric_column(table: &Table, column: &str) -> Result<Vec<f64>> {
    table
        .column_values(column)
        .ok_or_else(|| CamaraError::MissingColumn(column.to_string()))?
        .enumerate()
        .map(|(row, v)| {
            v.as_f64().ok_or_else(|| CamaraError::NonNumeric {
                column: column.to_string(),
                row,
            })
        })
        .collect()
}

/// Derives the high-expense label and the configured feature subset.
///
/// Missing columns and non-numeric cells (including empty ones) are errors;
/// nothing is imputed or rescaled.
pub fn prepare(table: &Table, settings: &ModelSettings) -> Result<(Features, Labels)> {
    for column in std::iter::once(&settings.label_column).chain(&settings.features) {
        if table.column_index(column).is_none() {
            return Err(CamaraError::MissingColumn(column.clone()));
        }
    }

    let labels: Labels = numeric_column(table, &settings.label_column)?
        .into_iter()
        .map(|net| high_expense(net, settings.threshold))
        .collect();

    let columns = settings
        .features
        .iter()
        .map(|c| numeric_column(table, c))
        .collect::<Result<Vec<_>>>()?;
    let rows = (0..table.len())
        .map(|r| columns.iter().map(|col| col[r]).collect())
        .collect();

    Ok((
        Features {
            columns: settings.features.clone(),
            rows,
        },
        labels,
    ))
}
