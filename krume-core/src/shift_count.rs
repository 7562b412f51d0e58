//! Shift-count reports: per-day stock, leftover and sell-out data
//! transcribed from handwritten count sheets (Mengenlisten)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One article row on a count sheet. Unreadable cells stay `None`,
/// never an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftCountEntry {
    pub article_name: String,
    /// Counted stock (Aktuelle Menge)
    #[serde(default)]
    pub stock: Option<i64>,
    /// Returned leftover units (Retoure)
    #[serde(default)]
    pub leftover: Option<f64>,
    /// Time of day the article sold out, `HH:MM` (Ausverkauft)
    #[serde(default)]
    pub sold_out: Option<String>,
}

/// A complete count sheet for one sales day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftReport {
    pub report_date: NaiveDate,
    /// Production day header (Backtag)
    pub production_day: String,
    /// Sales day the counts apply to (für Tag)
    pub sales_day: String,
    pub articles: Vec<ShiftCountEntry>,
}
