//! Cross-source merge: journal transactions, shift counts and pre-orders
//! folded into one consolidated record per calendar day

use chrono::NaiveDate;
use krume_core::{
    ArticleLookupTable, ConsolidatedProductData, MasterArticleData, Order, ShiftReport, Transaction,
};
use log::{debug, info};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

use crate::report::{UnmappedReport, push_unique};

/// Output of one unify run
#[derive(Debug)]
pub struct UnifiedData {
    pub days: BTreeMap<NaiveDate, ConsolidatedProductData>,
    /// Only days that actually had unmapped names appear here
    pub unmapped: Vec<UnmappedReport>,
}

/// Owned per-day bucket map with an explicit bucket-or-create operation.
/// Lives only for the duration of one day's fold.
#[derive(Debug, Default)]
struct DayLedger {
    buckets: BTreeMap<String, MasterArticleData>,
}

impl DayLedger {
    /// Bucket for a master article, created zeroed on first touch
    fn bucket(&mut self, master_name: &str) -> &mut MasterArticleData {
        self.buckets
            .entry(master_name.to_string())
            .or_insert_with(|| MasterArticleData::new(master_name))
    }

    fn finish(self, date: NaiveDate) -> ConsolidatedProductData {
        let total_revenue: Decimal = self.buckets.values().map(|b| b.total_sales).sum();
        ConsolidatedProductData {
            date,
            total_revenue,
            master_articles: self.buckets,
        }
    }
}

/// Merges the three sources of a batch run. Holds the one lookup table,
/// shared read-only across all days.
pub struct DataUnifier {
    lookup: ArticleLookupTable,
}

impl DataUnifier {
    pub fn new(lookup: ArticleLookupTable) -> Self {
        Self { lookup }
    }

    /// Merge everything into one record per day.
    ///
    /// The union of dates across the three sources decides which days exist;
    /// a day any single source knows about produces output. Per day the fold
    /// order is journal, then shift count, then pre-orders — the latter two
    /// may open buckets the till never saw. Totals do not depend on input
    /// ordering, only bucket creation order does.
    pub fn unify(
        &self,
        transactions: &[Transaction],
        shift_reports: &BTreeMap<NaiveDate, ShiftReport>,
        orders: &[Order],
    ) -> UnifiedData {
        let journal_by_date = group_by(transactions, Transaction::date);
        let orders_by_date = group_by(orders, |order| order.pickup_date);

        let mut dates: BTreeSet<NaiveDate> = journal_by_date.keys().copied().collect();
        dates.extend(shift_reports.keys().copied());
        dates.extend(orders_by_date.keys().copied());

        let mut days = BTreeMap::new();
        let mut unmapped_reports = Vec::new();

        for date in dates {
            let mut ledger = DayLedger::default();
            let mut unmapped = UnmappedReport::new(date);

            for txn in journal_by_date.get(&date).into_iter().flatten() {
                for item in &txn.items {
                    match self.lookup.resolve(&item.article_name) {
                        // price is already the line's total, not a unit price
                        Some(master) => ledger.bucket(master).add_sale(item.price, item.quantity),
                        None => push_unique(&mut unmapped.journal, &item.article_name),
                    }
                }
            }

            if let Some(report) = shift_reports.get(&date) {
                for entry in &report.articles {
                    match self.lookup.resolve(&entry.article_name) {
                        Some(master) => ledger
                            .bucket(master)
                            .record_shift_count(entry.leftover, entry.sold_out.clone()),
                        None => push_unique(&mut unmapped.shift_count, &entry.article_name),
                    }
                }
            }

            for order in orders_by_date.get(&date).into_iter().flatten() {
                for item in &order.items {
                    match self.lookup.resolve(&item.article_name) {
                        Some(master) => ledger
                            .bucket(master)
                            .add_sale(item.line_total(), item.quantity),
                        None => push_unique(&mut unmapped.preorders, &item.article_name),
                    }
                }
            }

            if !unmapped.is_empty() {
                debug!(
                    "{date}: {} journal / {} shift-count / {} pre-order names unmapped",
                    unmapped.journal.len(),
                    unmapped.shift_count.len(),
                    unmapped.preorders.len()
                );
                unmapped_reports.push(unmapped);
            }
            days.insert(date, ledger.finish(date));
        }

        info!(
            "unified {} days, {} with unmapped items",
            days.len(),
            unmapped_reports.len()
        );
        UnifiedData {
            days,
            unmapped: unmapped_reports,
        }
    }
}

fn group_by<'a, T>(
    items: &'a [T],
    date_of: impl Fn(&T) -> NaiveDate,
) -> BTreeMap<NaiveDate, Vec<&'a T>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<&T>> = BTreeMap::new();
    for item in items {
        grouped.entry(date_of(item)).or_default().push(item);
    }
    grouped
}
