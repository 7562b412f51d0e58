//! Per-date QC report of article names the lookup table does not know

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Distinct unmapped variant names for one day, one list per source, each in
/// first-seen order. Feeds manual lookup-table maintenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmappedReport {
    pub date: NaiveDate,
    #[serde(rename = "unmapped_fiskal_items")]
    pub journal: Vec<String>,
    #[serde(rename = "unmapped_mengenlisten_items")]
    pub shift_count: Vec<String>,
    #[serde(rename = "unmapped_bestellungen_items")]
    pub preorders: Vec<String>,
}

impl UnmappedReport {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            journal: Vec::new(),
            shift_count: Vec::new(),
            preorders: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.journal.is_empty() && self.shift_count.is_empty() && self.preorders.is_empty()
    }
}

/// Append `name` unless the list already carries it
pub(crate) fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|existing| existing == name) {
        list.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_unique_keeps_first_seen_order() {
        let mut list = Vec::new();
        push_unique(&mut list, "Unknown Pastry");
        push_unique(&mut list, "Mystery Bun");
        push_unique(&mut list, "Unknown Pastry");
        assert_eq!(list, vec!["Unknown Pastry", "Mystery Bun"]);
    }

    #[test]
    fn test_report_serializes_with_qc_field_names() {
        let mut report = UnmappedReport::new(NaiveDate::from_ymd_opt(2024, 4, 11).unwrap());
        report.journal.push("Unknown Pastry".to_string());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("unmapped_fiskal_items").is_some());
        assert!(json.get("unmapped_mengenlisten_items").is_some());
        assert!(json.get("unmapped_bestellungen_items").is_some());
    }
}
