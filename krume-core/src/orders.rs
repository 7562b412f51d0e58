//! Customer pre-orders with future pickup dates

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One article position within a pre-order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub article_name: String,
    pub quantity: Decimal,
    /// Unit price in euros (unlike journal line items, which carry line totals)
    pub price: Decimal,
}

impl OrderItem {
    /// Total amount of this position
    pub fn line_total(&self) -> Decimal {
        self.price * self.quantity
    }
}

/// A customer order to be picked up on a given day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub pickup_date: NaiveDate,
    #[serde(rename = "sales")]
    pub items: Vec<OrderItem>,
    /// Order total, Σ price × quantity over the items
    pub sum: Decimal,
}

impl Order {
    /// Build an order, computing its total from the items
    pub fn new(id: impl Into<String>, pickup_date: NaiveDate, items: Vec<OrderItem>) -> Self {
        let sum = items.iter().map(OrderItem::line_total).sum();
        Self {
            id: id.into(),
            pickup_date,
            items,
            sum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_sum_is_price_times_quantity() {
        let items = vec![
            OrderItem {
                article_name: "Brezel".to_string(),
                quantity: Decimal::from(4),
                price: Decimal::new(120, 2),
            },
            OrderItem {
                article_name: "Roggenmischbrot".to_string(),
                quantity: Decimal::new(5, 1),
                price: Decimal::new(490, 2),
            },
        ];
        let order = Order::new("B-1001", NaiveDate::from_ymd_opt(2024, 4, 13).unwrap(), items);
        // 4 * 1.20 + 0.5 * 4.90
        assert_eq!(order.sum, Decimal::new(725, 2));
    }

    #[test]
    fn test_items_serialize_under_sales_key() {
        let order = Order::new(
            "B-7",
            NaiveDate::from_ymd_opt(2024, 4, 13).unwrap(),
            vec![OrderItem {
                article_name: "Brezel".to_string(),
                quantity: Decimal::ONE,
                price: Decimal::new(120, 2),
            }],
        );
        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("sales").is_some());
        assert!(json.get("items").is_none());
    }
}
