//! Classified availability records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw spreadsheet row: header name → cell text
pub type RawRow = BTreeMap<String, String>;

/// Service line a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CategoryType {
    #[serde(rename = "HRT")]
    Hrt,
    #[serde(rename = "TRT")]
    Trt,
    Provider,
    #[default]
    Other,
}

/// One classified row. Typed fields are derived by the row classifier; the
/// original cells travel along untouched in `raw`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub raw: RawRow,
    pub days_out: Option<i64>,
    pub availability_score: Option<f64>,
    pub has_error: bool,
    pub category_type: CategoryType,
}

impl Record {
    /// A record with no derived data, categorized as `Other`
    pub fn unclassified(raw: RawRow) -> Self {
        Self {
            raw,
            days_out: None,
            availability_score: None,
            has_error: false,
            category_type: CategoryType::Other,
        }
    }

    pub fn with_category(mut self, category: CategoryType) -> Self {
        self.category_type = category;
        self
    }

    pub fn with_days_out(mut self, days_out: Option<i64>) -> Self {
        self.days_out = days_out;
        self
    }

    pub fn with_score(mut self, score: Option<f64>) -> Self {
        self.availability_score = score;
        self
    }

    pub fn with_error(mut self, has_error: bool) -> Self {
        self.has_error = has_error;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_is_camel_case() {
        let mut raw = RawRow::new();
        raw.insert("Location".to_string(), "Downtown".to_string());
        let record = Record::unclassified(raw)
            .with_category(CategoryType::Hrt)
            .with_days_out(Some(4));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["categoryType"], "HRT");
        assert_eq!(value["daysOut"], 4);
        assert_eq!(value["hasError"], false);
        assert!(value["availabilityScore"].is_null());
        assert_eq!(value["raw"]["Location"], "Downtown");
    }

    #[test]
    fn test_category_names() {
        let names: Vec<String> = [
            CategoryType::Hrt,
            CategoryType::Trt,
            CategoryType::Provider,
            CategoryType::Other,
        ]
        .iter()
        .map(|c| serde_json::to_string(c).unwrap())
        .collect();
        assert_eq!(names, ["\"HRT\"", "\"TRT\"", "\"Provider\"", "\"Other\""]);
    }
}
