use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::classifier::{ModelReport, TrainingReport};
use crate::fmt::{bar, brl, score};
use crate::models::{self, Legislator, Value};
use crate::reports::{PartyCount, StoreStatus, YearExpenses};

const BAR_WIDTH: usize = 40;

pub const EXPENSE_PREVIEW_COLUMNS: &[&str] = &[
    "txNomeParlamentar",
    "sgPartido",
    "txtDescricao",
    "datEmissao",
    "vlrDocumento",
    "vlrLiquido",
];

fn money_cell(value: &Value) -> Cell {
    let text = match value.as_f64() {
        Some(v) => brl(v),
        None => value.to_string(),
    };
    Cell::new(text).set_alignment(CellAlignment::Right)
}

pub fn format_legislators(title: &str, legislators: &[Legislator]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Nome", "Partido", "UF", "Legislatura", "Email"]);
    for l in legislators {
        table.add_row(vec![
            Cell::new(l.id),
            Cell::new(&l.nome),
            Cell::new(&l.sigla_partido),
            Cell::new(&l.sigla_uf),
            Cell::new(l.id_legislatura.map(|v| v.to_string()).unwrap_or_default()),
            Cell::new(l.email.as_deref().unwrap_or("")),
        ]);
    }
    format!("{}\n{table}", title.bold())
}

pub fn format_party_distribution(items: &[PartyCount]) -> String {
    let max = items.iter().map(|p| p.count).max().unwrap_or(0);
    let mut table = Table::new();
    table.set_header(vec!["Partido", "Deputados", ""]);
    for p in items {
        table.add_row(vec![
            Cell::new(&p.party),
            Cell::new(p.count).set_alignment(CellAlignment::Right),
            Cell::new(bar(p.count, max, BAR_WIDTH).cyan()),
        ]);
    }
    format!("{}\n{table}", "Deputados por Partido".bold())
}

/// First `n` rows of a loaded expense table, restricted to preview columns.
pub fn format_expense_head(expenses: &models::Table, n: usize) -> String {
    let columns: Vec<&str> = EXPENSE_PREVIEW_COLUMNS
        .iter()
        .copied()
        .filter(|c| expenses.column_index(c).is_some())
        .collect();
    let head = expenses.head(n);
    let mut table = Table::new();
    table.set_header(columns.clone());
    for row in 0..head.len() {
        let cells: Vec<Cell> = columns
            .iter()
            .map(|c| {
                let value = head.get(row, c).cloned().unwrap_or(Value::Null);
                if c.starts_with("vlr") {
                    money_cell(&value)
                } else {
                    Cell::new(value.to_string())
                }
            })
            .collect();
        table.add_row(cells);
    }
    format!(
        "{} ({} rows, {} columns)\n{table}",
        "Loaded Expenses".bold(),
        expenses.len(),
        expenses.columns().len()
    )
}

pub fn format_year_expenses(data: &YearExpenses) -> String {
    let heading = format!("Expenses issued in {}", data.year).bold();
    if data.count == 0 {
        return format!("{heading}\nNo stored expenses for {}.", data.year);
    }
    let mut table = Table::new();
    table.set_header(data.preview.columns().to_vec());
    for row in data.preview.rows() {
        let cells: Vec<Cell> = data
            .preview
            .columns()
            .iter()
            .zip(row)
            .map(|(col, value)| {
                if col.starts_with("vlr") {
                    money_cell(value)
                } else {
                    Cell::new(value.to_string())
                }
            })
            .collect();
        table.add_row(cells);
    }
    format!(
        "{heading}: {} rows, net {}\n{table}",
        data.count,
        brl(data.total_net)
    )
}

fn format_model(model: &ModelReport) -> String {
    let r = &model.report;
    let mut report = Table::new();
    report.set_header(vec!["", "precision", "recall", "f1-score", "support"]);
    for (label, m) in [("0", &r.classes[0]), ("1", &r.classes[1])] {
        report.add_row(vec![
            Cell::new(label),
            Cell::new(score(m.precision)),
            Cell::new(score(m.recall)),
            Cell::new(score(m.f1)),
            Cell::new(m.support),
        ]);
    }
    report.add_row(vec![
        Cell::new("accuracy"),
        Cell::new(""),
        Cell::new(""),
        Cell::new(score(r.accuracy)),
        Cell::new(r.macro_avg.support),
    ]);
    for (label, m) in [("macro avg", &r.macro_avg), ("weighted avg", &r.weighted_avg)] {
        report.add_row(vec![
            Cell::new(label),
            Cell::new(score(m.precision)),
            Cell::new(score(m.recall)),
            Cell::new(score(m.f1)),
            Cell::new(m.support),
        ]);
    }

    let c = &model.confusion.counts;
    let mut confusion = Table::new();
    confusion.set_header(vec!["true \\ predicted", "0", "1"]);
    confusion.add_row(vec![Cell::new("0"), Cell::new(c[0][0]), Cell::new(c[0][1])]);
    confusion.add_row(vec![Cell::new("1"), Cell::new(c[1][0]), Cell::new(c[1][1])]);

    format!(
        "{}\n{report}\n{}\n{confusion}",
        format!("Classification Report - {}", model.name).bold(),
        format!("Confusion Matrix - {}", model.name).bold(),
    )
}

pub fn format_training(result: &TrainingReport) -> String {
    let mut out = format!(
        "Training on {} rows, evaluating on {} holdout rows\n",
        result.split.train.len(),
        result.split.holdout.len()
    );
    for model in &result.models {
        out.push('\n');
        out.push_str(&format_model(model));
        out.push('\n');
    }
    out
}

pub fn format_status(db_path: &str, status: &StoreStatus) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Table", "Rows"]);
    table.add_row(vec![Cell::new("deputados"), Cell::new(status.legislators)]);
    table.add_row(vec![Cell::new("despesas"), Cell::new(status.expenses)]);
    table.add_row(vec![
        Cell::new("despesas linked to deputados"),
        Cell::new(status.linked_expenses),
    ]);
    format!("Database:   {db_path}\n{table}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{classification_report, ConfusionMatrix, Split};

    #[test]
    fn test_format_training_includes_both_sections() {
        let confusion = ConfusionMatrix { counts: [[7, 1], [2, 5]] };
        let result = TrainingReport {
            split: Split {
                train: (0..35).collect(),
                holdout: (35..50).collect(),
            },
            models: vec![ModelReport {
                name: "Random Forest".to_string(),
                confusion,
                report: classification_report(&confusion),
            }],
        };
        let text = format_training(&result);
        assert!(text.contains("Training on 35 rows"));
        assert!(text.contains("Classification Report - Random Forest"));
        assert!(text.contains("Confusion Matrix - Random Forest"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("0.80"));
    }

    #[test]
    fn test_format_party_distribution() {
        let items = vec![
            PartyCount { party: "PL".into(), count: 4 },
            PartyCount { party: "PT".into(), count: 2 },
        ];
        let text = format_party_distribution(&items);
        assert!(text.contains("PL"));
        assert!(text.contains(&"\u{2588}".repeat(BAR_WIDTH)));
    }

    #[test]
    fn test_format_expense_head_limits_rows_and_formats_money() {
        let mut t = models::Table::new(vec!["txNomeParlamentar".into(), "vlrLiquido".into(), "cpf".into()]);
        for i in 0..10 {
            t.push_row(vec![Value::Text(format!("Dep {i}")), Value::Real(12345.6)]);
        }
        let text = format_expense_head(&t, 3);
        assert!(text.contains("10 rows, 3 columns"));
        assert!(text.contains("Dep 2"));
        assert!(!text.contains("Dep 3"));
        assert!(text.contains("R$ 12.345,60"));
        assert!(!text.contains("cpf"));
    }
}
