//! Row classification: raw spreadsheet rows into typed [`Record`]s.

use crate::model::{CategoryType, RawRow, Record};

/// Turns raw rows into records. Implementations must be deterministic and
/// must emit exactly one record per input row, in input order.
pub trait RowClassifier: Send + Sync {
    fn classify(&self, headers: &[String], rows: &[RawRow]) -> Vec<Record>;
}

/// Classifier driven by named columns.
///
/// Category is matched case-insensitively on the category column text
/// (`HRT`, `TRT`, `provider`). A row has an error when the error column is
/// non-empty or any cell holds a spreadsheet error value such as `#N/A`.
#[derive(Debug, Clone)]
pub struct ColumnClassifier {
    pub category_column: String,
    pub days_out_column: String,
    pub score_column: String,
    pub error_column: String,
}

impl Default for ColumnClassifier {
    fn default() -> Self {
        Self {
            category_column: "Type".to_string(),
            days_out_column: "Days Out".to_string(),
            score_column: "Availability Score".to_string(),
            error_column: "Error".to_string(),
        }
    }
}

const SHEET_ERROR_VALUES: &[&str] = &[
    "#N/A", "#REF!", "#VALUE!", "#ERROR!", "#DIV/0!", "#NAME?", "#NUM!", "#NULL!",
];

impl ColumnClassifier {
    pub fn with_category_column(mut self, column: impl Into<String>) -> Self {
        self.category_column = column.into();
        self
    }

    pub fn with_days_out_column(mut self, column: impl Into<String>) -> Self {
        self.days_out_column = column.into();
        self
    }

    pub fn with_score_column(mut self, column: impl Into<String>) -> Self {
        self.score_column = column.into();
        self
    }

    pub fn with_error_column(mut self, column: impl Into<String>) -> Self {
        self.error_column = column.into();
        self
    }

    fn cell<'a>(row: &'a RawRow, column: &str) -> Option<&'a str> {
        row.get(column).map(|s| s.trim()).filter(|s| !s.is_empty())
    }

    fn category(&self, row: &RawRow) -> CategoryType {
        let Some(text) = Self::cell(row, &self.category_column) else {
            return CategoryType::Other;
        };
        let text = text.to_ascii_lowercase();
        if text.contains("hrt") {
            CategoryType::Hrt
        } else if text.contains("trt") {
            CategoryType::Trt
        } else if text.contains("provider") {
            CategoryType::Provider
        } else {
            CategoryType::Other
        }
    }

    /// Leading integer of the cell, so "12 days" reads as 12
    fn days_out(&self, row: &RawRow) -> Option<i64> {
        let text = Self::cell(row, &self.days_out_column)?;
        let end = text
            .char_indices()
            .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && *c == '-')))
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        text[..end].parse().ok()
    }

    fn score(&self, row: &RawRow) -> Option<f64> {
        Self::cell(row, &self.score_column)?
            .trim_end_matches('%')
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }

    fn has_error(&self, row: &RawRow) -> bool {
        Self::cell(row, &self.error_column).is_some()
            || row
                .values()
                .any(|v| SHEET_ERROR_VALUES.contains(&v.trim().to_ascii_uppercase().as_str()))
    }
}

impl RowClassifier for ColumnClassifier {
    fn classify(&self, _headers: &[String], rows: &[RawRow]) -> Vec<Record> {
        rows.iter()
            .map(|row| {
                Record::unclassified(row.clone())
                    .with_category(self.category(row))
                    .with_days_out(self.days_out(row))
                    .with_score(self.score(row))
                    .with_error(self.has_error(row))
            })
            .collect()
    }
}

/// Zip a header row with value rows. Short rows are padded with empty
/// cells; cells beyond the header row are dropped.
pub fn rows_from_values(headers: &[String], values: &[Vec<String>]) -> Vec<RawRow> {
    values
        .iter()
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), cells.get(i).cloned().unwrap_or_default()))
                .collect()
        })
        .collect()
}
