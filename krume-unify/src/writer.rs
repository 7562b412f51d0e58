//! Durable outputs: consolidated month files and QC artifacts

use anyhow::{Context, Result};
use chrono::NaiveDate;
use krume_core::ConsolidatedProductData;
use log::info;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::report::UnmappedReport;

/// Write one month of consolidated days as a date-keyed JSON object.
/// Decimals travel as strings, so the file round-trips without precision loss.
pub fn write_consolidated_month(
    days: &BTreeMap<NaiveDate, ConsolidatedProductData>,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let keyed: BTreeMap<String, &ConsolidatedProductData> = days
        .iter()
        .map(|(date, day)| (date.format("%Y-%m-%d").to_string(), day))
        .collect();
    let json = serde_json::to_string_pretty(&keyed)?;
    std::fs::write(path, json)
        .with_context(|| format!("writing consolidated data {}", path.display()))?;
    info!("saved {} consolidated days to {}", days.len(), path.display());
    Ok(())
}

/// Read a consolidated month file back
pub fn read_consolidated_month(
    path: impl AsRef<Path>,
) -> Result<BTreeMap<NaiveDate, ConsolidatedProductData>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading consolidated data {}", path.display()))?;
    let keyed: BTreeMap<String, ConsolidatedProductData> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing consolidated data {}", path.display()))?;
    Ok(keyed.into_values().map(|day| (day.date, day)).collect())
}

/// Write the per-date unmapped-name QC files
/// (`unmapped_items_YYYY-MM-DD.json`). Returns the written paths.
pub fn write_unmapped_reports(
    reports: &[UnmappedReport],
    qc_dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>> {
    let qc_dir = qc_dir.as_ref();
    if reports.is_empty() {
        return Ok(Vec::new());
    }
    std::fs::create_dir_all(qc_dir).with_context(|| format!("creating {}", qc_dir.display()))?;

    let mut written = Vec::new();
    for report in reports {
        let path = qc_dir.join(format!("unmapped_items_{}.json", report.date.format("%Y-%m-%d")));
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing QC report {}", path.display()))?;
        written.push(path);
    }
    info!("saved {} unmapped-item reports to {}", written.len(), qc_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use krume_core::MasterArticleData;
    use rust_decimal::Decimal;

    fn sample_days() -> BTreeMap<NaiveDate, ConsolidatedProductData> {
        let date = NaiveDate::from_ymd_opt(2024, 4, 11).unwrap();
        let mut bucket = MasterArticleData::new("Brot Mix");
        bucket.add_sale(Decimal::new(245, 2), Decimal::new(5, 1));
        bucket.record_shift_count(Some(3.0), Some("14:20".to_string()));

        let mut master_articles = BTreeMap::new();
        master_articles.insert("Brot Mix".to_string(), bucket);

        let mut days = BTreeMap::new();
        days.insert(
            date,
            ConsolidatedProductData {
                date,
                total_revenue: Decimal::new(245, 2),
                master_articles,
            },
        );
        days
    }

    #[test]
    fn test_consolidated_month_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("consolidated_2024-04.json");

        let days = sample_days();
        write_consolidated_month(&days, &path).unwrap();
        let back = read_consolidated_month(&path).unwrap();
        assert_eq!(back, days);
    }

    #[test]
    fn test_consolidated_file_is_date_keyed_with_string_decimals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("consolidated_2024-04.json");
        write_consolidated_month(&sample_days(), &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let day = value.get("2024-04-11").unwrap();
        assert_eq!(
            day.get("total_revenue"),
            Some(&serde_json::Value::String("2.45".to_string()))
        );
    }

    #[test]
    fn test_unmapped_reports_one_file_per_date() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 4, 11).unwrap();
        let mut report = UnmappedReport::new(date);
        report.journal.push("Unknown Pastry".to_string());

        let written = write_unmapped_reports(&[report], dir.path().join("qc")).unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("unmapped_items_2024-04-11.json"));

        let raw = std::fs::read_to_string(&written[0]).unwrap();
        assert!(raw.contains("unmapped_fiskal_items"));
        assert!(raw.contains("Unknown Pastry"));
    }

    #[test]
    fn test_no_reports_no_qc_dir() {
        let dir = tempfile::tempdir().unwrap();
        let qc = dir.path().join("qc");
        let written = write_unmapped_reports(&[], &qc).unwrap();
        assert!(written.is_empty());
        assert!(!qc.exists());
    }
}
