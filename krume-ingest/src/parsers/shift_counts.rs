//! Loader for transcribed shift-count extracts: one JSON file per sales day,
//! shaped `{"YYYY-MM-DD": {production_day, sales_day, articles: [...]}}`.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use krume_core::shift_count::{ShiftCountEntry, ShiftReport};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Wire shape of the per-date value inside an extract file
#[derive(Serialize, Deserialize)]
struct ReportBody {
    production_day: String,
    sales_day: String,
    articles: Vec<ShiftCountEntry>,
}

/// Parse one extract (or one transcription reply) into a report
pub fn parse_report_json(raw: &str) -> Result<ShiftReport> {
    let map: BTreeMap<String, ReportBody> = serde_json::from_str(raw)
        .context("shift report is not a date-keyed JSON object")?;
    let Some((date_key, body)) = map.into_iter().next() else {
        bail!("shift report JSON is empty");
    };
    let report_date = NaiveDate::parse_from_str(&date_key, "%Y-%m-%d")
        .with_context(|| format!("bad report date key {date_key:?}"))?;

    Ok(ShiftReport {
        report_date,
        production_day: body.production_day,
        sales_day: body.sales_day,
        articles: body.articles,
    })
}

/// Write a report as an extract file named after its date
pub fn write_report_json(report: &ShiftReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut map = BTreeMap::new();
    map.insert(
        report.report_date.format("%Y-%m-%d").to_string(),
        ReportBody {
            production_day: report.production_day.clone(),
            sales_day: report.sales_day.clone(),
            articles: report.articles.clone(),
        },
    );
    let json = serde_json::to_string_pretty(&map)?;
    std::fs::write(path, json)
        .with_context(|| format!("writing shift report {}", path.display()))?;
    info!("saved shift report for {} to {}", report.report_date, path.display());
    Ok(())
}

/// Load every `*.json` extract in a directory, keyed by report date.
///
/// A missing directory contributes nothing. Unreadable files are logged and
/// skipped. When two files carry the same date the later-loaded one wins —
/// a date has at most one count sheet, so this only matters for re-scans.
pub fn load_reports_dir(dir: impl AsRef<Path>) -> Result<BTreeMap<NaiveDate, ShiftReport>> {
    let dir = dir.as_ref();
    let mut reports = BTreeMap::new();
    if !dir.exists() {
        info!("shift-count directory {} does not exist, skipping", dir.display());
        return Ok(reports);
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    for path in paths {
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("could not read shift report {}: {err}", path.display());
                continue;
            }
        };
        match parse_report_json(&raw) {
            Ok(report) => {
                reports.insert(report.report_date, report);
            }
            Err(err) => {
                warn!("could not load shift report {}: {err:#}", path.display());
            }
        }
    }

    info!("loaded {} shift reports from {}", reports.len(), dir.display());
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"{
        "2024-04-11": {
            "production_day": "Donnerstag",
            "sales_day": "Donnerstag",
            "articles": [
                {"article_name": "Roggenmischbrot", "stock": 12, "leftover": 3.0, "sold_out": "14:20"},
                {"article_name": "Brezel", "stock": 40, "leftover": null, "sold_out": null}
            ]
        }
    }"#;

    #[test]
    fn test_parse_report_json() {
        let report = parse_report_json(REPORT).unwrap();
        assert_eq!(
            report.report_date,
            NaiveDate::from_ymd_opt(2024, 4, 11).unwrap()
        );
        assert_eq!(report.articles.len(), 2);
        assert_eq!(report.articles[0].leftover, Some(3.0));
        assert_eq!(report.articles[1].sold_out, None);
    }

    #[test]
    fn test_bad_date_key_is_an_error() {
        let raw = r#"{"elfter April": {"production_day": "Do", "sales_day": "Do", "articles": []}}"#;
        assert!(parse_report_json(raw).is_err());
    }

    #[test]
    fn test_load_reports_dir_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2024-04-11.json"), REPORT).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ nicht json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let reports = load_reports_dir(dir.path()).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports.contains_key(&NaiveDate::from_ymd_opt(2024, 4, 11).unwrap()));
    }

    #[test]
    fn test_missing_dir_is_empty_not_error() {
        let reports = load_reports_dir("/nonexistent/mengenlisten").unwrap();
        assert!(reports.is_empty());
    }

    #[test]
    fn test_write_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let report = parse_report_json(REPORT).unwrap();
        let path = dir.path().join("2024-04-11.json");
        write_report_json(&report, &path).unwrap();

        let reports = load_reports_dir(dir.path()).unwrap();
        assert_eq!(reports.get(&report.report_date), Some(&report));
    }
}
