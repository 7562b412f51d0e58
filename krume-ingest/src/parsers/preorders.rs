//! Pre-order CSV reader: one export covers the whole order history, one row
//! per ordered article. Rows are regrouped into orders by id.
//!
//! Columns: id, abholdatum (YYYY-MM-DD), artikelname, artikelanzahl,
//! artikelpreis (integer cents).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use krume_core::orders::{Order, OrderItem};
use log::{info, warn};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::encoding::decode_text;
use crate::numeric::cents_to_euros;

#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    abholdatum: String,
    artikelname: String,
    artikelanzahl: String,
    artikelpreis: String,
}

/// Read a pre-order CSV export into orders (first-seen order preserved).
/// Unusable rows are logged and skipped.
pub fn parse_preorder_csv(path: impl AsRef<Path>) -> Result<Vec<Order>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading pre-order CSV {}", path.display()))?;
    let text = decode_text(&bytes);
    info!("reading pre-orders from {}", path.display());
    parse_preorder_text(&text)
}

fn parse_preorder_text(text: &str) -> Result<Vec<Order>> {
    let mut rdr = csv::Reader::from_reader(text.as_bytes());

    let mut order_ids: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, (NaiveDate, Vec<OrderItem>)> = HashMap::new();

    for (idx, result) in rdr.deserialize::<CsvRow>().enumerate() {
        let row_no = idx + 2; // header is row 1
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                warn!("pre-order row {row_no}: unreadable: {err}");
                continue;
            }
        };

        let pickup_date = match NaiveDate::parse_from_str(row.abholdatum.trim(), "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                warn!("pre-order row {row_no}: bad pickup date {:?}", row.abholdatum);
                continue;
            }
        };
        let quantity = match row.artikelanzahl.trim().parse::<Decimal>() {
            Ok(quantity) => quantity,
            Err(_) => {
                warn!("pre-order row {row_no}: bad quantity {:?}", row.artikelanzahl);
                continue;
            }
        };
        let cents = match row.artikelpreis.trim().parse::<i64>() {
            Ok(cents) => cents,
            Err(_) => {
                warn!("pre-order row {row_no}: bad price {:?}", row.artikelpreis);
                continue;
            }
        };

        let entry = grouped.entry(row.id.clone()).or_insert_with(|| {
            order_ids.push(row.id.clone());
            (pickup_date, Vec::new())
        });
        entry.1.push(OrderItem {
            article_name: row.artikelname,
            quantity,
            price: cents_to_euros(cents),
        });
    }

    let orders: Vec<Order> = order_ids
        .into_iter()
        .filter_map(|id| {
            let (pickup_date, items) = grouped.remove(&id)?;
            Some(Order::new(id, pickup_date, items))
        })
        .collect();

    info!("grouped {} pre-orders", orders.len());
    Ok(orders)
}

/// Write orders into monthly JSON extracts (`bestellungen_YYYY-MM.json`,
/// object keyed by order id). Returns the written paths.
pub fn write_monthly_extracts(orders: &[Order], dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut by_month: BTreeMap<String, BTreeMap<&str, &Order>> = BTreeMap::new();
    for order in orders {
        let month = order.pickup_date.format("%Y-%m").to_string();
        by_month.entry(month).or_default().insert(&order.id, order);
    }

    let mut written = Vec::new();
    for (month, month_orders) in &by_month {
        let path = dir.join(format!("bestellungen_{month}.json"));
        let json = serde_json::to_string_pretty(month_orders)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing pre-order extract {}", path.display()))?;
        info!("saved {} orders for {month} to {}", month_orders.len(), path.display());
        written.push(path);
    }
    Ok(written)
}

/// Read one monthly extract back (used by the unify stage)
pub fn read_monthly_extract(path: impl AsRef<Path>) -> Result<Vec<Order>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading pre-order extract {}", path.display()))?;
    let map: BTreeMap<String, Order> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing pre-order extract {}", path.display()))?;
    Ok(map.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
id,abholdatum,artikelname,artikelanzahl,artikelpreis
B-1001,2024-04-13,Brezel,4,120
B-1001,2024-04-13,Roggenmischbrot,1,490
B-1002,2024-05-02,Dinkelstange,2,210
";

    #[test]
    fn test_rows_group_into_orders() {
        let orders = parse_preorder_text(CSV).unwrap();
        assert_eq!(orders.len(), 2);

        let first = &orders[0];
        assert_eq!(first.id, "B-1001");
        assert_eq!(
            first.pickup_date,
            NaiveDate::from_ymd_opt(2024, 4, 13).unwrap()
        );
        assert_eq!(first.items.len(), 2);
        // 4 * 1.20 + 1 * 4.90
        assert_eq!(first.sum, Decimal::new(970, 2));
    }

    #[test]
    fn test_prices_convert_from_cents() {
        let orders = parse_preorder_text(CSV).unwrap();
        assert_eq!(orders[0].items[0].price, Decimal::new(120, 2));
        assert_eq!(orders[1].items[0].price, Decimal::new(210, 2));
    }

    #[test]
    fn test_bad_rows_are_skipped_not_fatal() {
        let csv = "\
id,abholdatum,artikelname,artikelanzahl,artikelpreis
B-1,2024-04-13,Brezel,4,120
B-2,13.04.2024,Brezel,1,120
B-3,2024-04-13,Brezel,viele,120
";
        let orders = parse_preorder_text(csv).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, "B-1");
    }

    #[test]
    fn test_monthly_extract_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let orders = parse_preorder_text(CSV).unwrap();

        let written = write_monthly_extracts(&orders, dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("bestellungen_2024-04.json").exists());
        assert!(dir.path().join("bestellungen_2024-05.json").exists());

        let april = read_monthly_extract(dir.path().join("bestellungen_2024-04.json")).unwrap();
        assert_eq!(april.len(), 1);
        assert_eq!(april[0], orders[0]);
    }
}
