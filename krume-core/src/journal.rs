//! Point-of-sale journal records: receipts and their line items

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single product position on a receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Article id from the `(#N)` suffix of the item line
    pub article_number: u32,
    pub article_name: String,
    /// Units sold; may be fractional (half loaves are a thing)
    pub quantity: Decimal,
    /// Warengruppe name, `"Unknown"` when the receipt carries none
    pub category: String,
    pub category_number: u32,
    /// This line's total amount, not a unit price
    pub price: Decimal,
}

/// One parsed receipt from a journal dump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Globally unique id printed on the receipt
    pub uuid: String,
    pub timestamp: NaiveDateTime,
    /// Receipt sequence number, monotonic within one journal file only
    pub bill_number: u32,
    pub items: Vec<LineItem>,
    /// Printed gross total. Never negative: cancellation/refund receipts
    /// carry no parseable total and are excluded at parse time.
    pub total_gross: Decimal,
}

impl Transaction {
    /// Calendar day this receipt belongs to
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}
