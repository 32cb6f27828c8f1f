use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use log::{error, info, warn};
use thiserror::Error;

use crate::api::RecordApi;
use crate::forms::parse_amount;
use crate::models::{
    Resource,
    expense::{Expense, NewExpense},
    income::{Income, NewIncome},
    parse_date,
};

/// One spreadsheet row keyed by trimmed column name.
pub type Row = HashMap<String, String>;

pub async fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    read_rows_from_reader(bytes.as_slice())
        .with_context(|| format!("Failed to read rows from {}", path.display()))
}

pub fn read_rows_from_reader<R: Read>(reader: R) -> Result<Vec<Row>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to parse line {}", index + 2))?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.clone(), cell.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("Invalid data. Columns required: {}", .0.join(", "))]
    MissingColumns(&'static [&'static str]),
    #[error("Amount must be a positive number")]
    InvalidAmount,
    #[error("Date must be in YYYY-MM-DD format")]
    InvalidDate,
}

/// A resource that can be created from a spreadsheet row.
pub trait Importable: Resource {
    const REQUIRED_COLUMNS: &'static [&'static str];

    fn from_row(row: &Row) -> Result<Self::New, RowError>;
}

fn cell<'a>(row: &'a Row, column: &str) -> &'a str {
    row.get(column).map(|v| v.trim()).unwrap_or("")
}

fn check_required(row: &Row, columns: &'static [&'static str]) -> Result<(), RowError> {
    if columns.iter().any(|c| cell(row, c).is_empty()) {
        return Err(RowError::MissingColumns(columns));
    }
    Ok(())
}

impl Importable for Expense {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["title", "amount", "category", "date"];

    fn from_row(row: &Row) -> Result<NewExpense, RowError> {
        check_required(row, Self::REQUIRED_COLUMNS)?;
        Ok(NewExpense {
            title: cell(row, "title").to_string(),
            amount: parse_amount(cell(row, "amount")).ok_or(RowError::InvalidAmount)?,
            date: parse_date(cell(row, "date")).ok_or(RowError::InvalidDate)?,
            category: cell(row, "category").to_string(),
        })
    }
}

impl Importable for Income {
    const REQUIRED_COLUMNS: &'static [&'static str] = &["source", "amount", "date"];

    fn from_row(row: &Row) -> Result<NewIncome, RowError> {
        check_required(row, Self::REQUIRED_COLUMNS)?;
        Ok(NewIncome {
            source: cell(row, "source").to_string(),
            amount: parse_amount(cell(row, "amount")).ok_or(RowError::InvalidAmount)?,
            date: parse_date(cell(row, "date")).ok_or(RowError::InvalidDate)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportFailure {
    /// 1-based data row number (the header is not counted).
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub total: usize,
    pub submitted: usize,
    pub failure: Option<ImportFailure>,
}

impl ImportReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    pub fn message(&self, noun: &str) -> String {
        match &self.failure {
            None => format!("Bulk {noun}s imported successfully! ({} rows)", self.submitted),
            Some(failure) => format!(
                "Bulk import stopped at row {}: {} ({} of {} rows submitted)",
                failure.row, failure.reason, self.submitted, self.total
            ),
        }
    }
}

/// Submits rows one at a time in file order. The first row that fails
/// validation or submission stops the batch; rows already sent stay sent.
pub async fn bulk_import<R, A>(api: &A, rows: &[Row]) -> ImportReport
where
    R: Importable,
    A: RecordApi<R>,
{
    let mut submitted = 0;
    for (index, row) in rows.iter().enumerate() {
        let failure = match R::from_row(row) {
            Ok(new) => match api.create(&new).await {
                Ok(_) => {
                    submitted += 1;
                    continue;
                }
                Err(err) => {
                    error!("bulk {} import failed on row {}: {err}", R::NOUN, index + 1);
                    ImportFailure {
                        row: index + 1,
                        reason: err.user_message(),
                    }
                }
            },
            Err(err) => {
                warn!("bulk {} import rejected row {}: {err}", R::NOUN, index + 1);
                ImportFailure {
                    row: index + 1,
                    reason: err.to_string(),
                }
            }
        };
        return ImportReport {
            total: rows.len(),
            submitted,
            failure: Some(failure),
        };
    }

    info!("bulk imported {submitted} {}s", R::NOUN);
    ImportReport {
        total: rows.len(),
        submitted,
        failure: None,
    }
}

/// Reads a CSV file and feeds it through [`bulk_import`].
pub async fn import_file<R, A>(api: &A, path: &Path) -> Result<ImportReport>
where
    R: Importable,
    A: RecordApi<R>,
{
    let rows = read_rows(path).await?;
    Ok(bulk_import::<R, A>(api, &rows).await)
}
