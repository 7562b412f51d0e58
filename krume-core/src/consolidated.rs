//! Per-day consolidated output: master-article buckets and daily totals

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Accumulated data for one master article on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterArticleData {
    pub master_name: String,
    /// Revenue accumulated across sources
    pub total_sales: Decimal,
    /// Units accumulated across sources
    pub total_quantity: Decimal,
    /// Leftover units from the day's shift count; overwritten, not accumulated
    #[serde(default)]
    pub leftover: Option<f64>,
    /// Sell-out time from the day's shift count (`HH:MM`), same overwrite
    /// semantics as `leftover`
    #[serde(default)]
    pub sold_out_time: Option<String>,
}

impl MasterArticleData {
    /// Fresh bucket: zero revenue and quantity, no shift-count signals
    pub fn new(master_name: impl Into<String>) -> Self {
        Self {
            master_name: master_name.into(),
            total_sales: Decimal::ZERO,
            total_quantity: Decimal::ZERO,
            leftover: None,
            sold_out_time: None,
        }
    }

    /// Add one sold position. `amount` is the position's total, not a unit price.
    pub fn add_sale(&mut self, amount: Decimal, quantity: Decimal) {
        self.total_sales += amount;
        self.total_quantity += quantity;
    }

    /// Attach shift-count signals, replacing whatever an earlier report set
    pub fn record_shift_count(&mut self, leftover: Option<f64>, sold_out: Option<String>) {
        self.leftover = leftover;
        self.sold_out_time = sold_out;
    }
}

/// Everything known about one calendar day after cross-source merging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedProductData {
    pub date: NaiveDate,
    /// Sum of `total_sales` over all master articles of the day
    pub total_revenue: Decimal,
    pub master_articles: BTreeMap<String, MasterArticleData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bucket_starts_at_zero() {
        let bucket = MasterArticleData::new("Brot Mix");
        assert_eq!(bucket.total_sales, Decimal::ZERO);
        assert_eq!(bucket.total_quantity, Decimal::ZERO);
        assert_eq!(bucket.leftover, None);
        assert_eq!(bucket.sold_out_time, None);
    }

    #[test]
    fn test_add_sale_accumulates() {
        let mut bucket = MasterArticleData::new("Brot Mix");
        bucket.add_sale(Decimal::new(245, 2), Decimal::new(5, 1));
        bucket.add_sale(Decimal::new(490, 2), Decimal::ONE);
        assert_eq!(bucket.total_sales, Decimal::new(735, 2));
        assert_eq!(bucket.total_quantity, Decimal::new(15, 1));
    }

    #[test]
    fn test_record_shift_count_overwrites() {
        let mut bucket = MasterArticleData::new("Brot Mix");
        bucket.record_shift_count(Some(5.0), None);
        bucket.record_shift_count(Some(3.0), Some("14:20".to_string()));
        assert_eq!(bucket.leftover, Some(3.0));
        assert_eq!(bucket.sold_out_time.as_deref(), Some("14:20"));
    }

    #[test]
    fn test_consolidated_round_trip_is_lossless() {
        let mut bucket = MasterArticleData::new("Brot Mix");
        bucket.add_sale(Decimal::new(245, 2), Decimal::new(5, 1));
        bucket.record_shift_count(Some(3.0), Some("14:20".to_string()));

        let mut master_articles = BTreeMap::new();
        master_articles.insert("Brot Mix".to_string(), bucket);
        let day = ConsolidatedProductData {
            date: NaiveDate::from_ymd_opt(2024, 4, 11).unwrap(),
            total_revenue: Decimal::new(245, 2),
            master_articles,
        };

        let json = serde_json::to_string_pretty(&day).unwrap();
        let back: ConsolidatedProductData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, day);
        assert_eq!(back.total_revenue.to_string(), "2.45");
        // decimals travel as strings, not binary floats
        assert!(json.contains("\"2.45\""));
    }
}
