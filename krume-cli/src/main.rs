use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use krume_core::{ArticleLookupTable, ShiftReport};
use krume_ingest::parsers::journal::{
    parse_journal_file, read_extract_json, write_extract_json, write_unparsed_blocks,
};
use krume_ingest::parsers::preorders::{
    parse_preorder_csv, read_monthly_extract, write_monthly_extracts,
};
use krume_ingest::parsers::shift_counts::{load_reports_dir, write_report_json};
use krume_ingest::transcribe::TranscriptionClient;
use krume_unify::writer::{write_consolidated_month, write_unmapped_reports};
use krume_unify::DataUnifier;
use log::warn;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

mod layout;
mod months;

use layout::DataLayout;

#[derive(Parser, Debug)]
#[command(name = "krume", version, about = "Bakery sales reconciliation CLI")]
struct Cli {
    /// Root of the data tree (raw/, processed/, master/)
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse raw journal dumps into JSON extracts plus an audit file
    ExtractJournal,

    /// Split the pre-order CSV export into monthly JSON extracts
    ExtractOrders {
        /// CSV export (defaults to the single .csv under raw/Bestellungen)
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Transcribe shift-count PDFs into per-date JSON extracts
    ExtractCounts {
        /// Seconds to wait between transcription calls
        #[arg(long, default_value_t = 5)]
        delay: u64,
    },

    /// Merge extracts into consolidated per-day records, month by month
    Unify,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let layout = DataLayout::new(&cli.data_dir);

    match cli.command {
        Command::ExtractJournal => extract_journal(&layout),
        Command::ExtractOrders { csv } => extract_orders(&layout, csv),
        Command::ExtractCounts { delay } => extract_counts(&layout, delay).await,
        Command::Unify => unify(&layout),
    }
}

fn extract_journal(layout: &DataLayout) -> Result<()> {
    let input_dir = layout.journal_raw();
    let output_dir = layout.journal_extracts();
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let files = list_files_with_ext(&input_dir, "txt")?;
    if files.is_empty() {
        bail!("no journal dumps under {}", input_dir.display());
    }
    println!("Found {} journal files to process", files.len());

    let mut all_unparsed = Vec::new();
    let mut processed = 0usize;
    for path in &files {
        match parse_journal_file(path) {
            Ok(extract) => {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("journal");
                let out = output_dir.join(format!("{name}.json"));
                write_extract_json(&extract.transactions, &out)?;
                println!(
                    "  {} -> {} transactions ({} unparsed blocks, {} skipped item lines)",
                    name,
                    extract.transactions.len(),
                    extract.unparsed_blocks.len(),
                    extract.skipped_item_lines
                );
                all_unparsed.extend(extract.unparsed_blocks);
                processed += 1;
            }
            Err(err) => warn!("skipping {}: {err:#}", path.display()),
        }
    }

    write_unparsed_blocks(&all_unparsed, layout.qc().join("unparsed_fiskal_blocks.txt"))?;
    println!("Completed: {processed}/{} files processed", files.len());
    Ok(())
}

fn extract_orders(layout: &DataLayout, csv: Option<PathBuf>) -> Result<()> {
    let csv_path = match csv {
        Some(path) => path,
        None => {
            let candidates = list_files_with_ext(&layout.orders_raw(), "csv")?;
            match candidates.as_slice() {
                [] => bail!("no CSV export under {} (pass --csv <path>)", layout.orders_raw().display()),
                [single] => single.clone(),
                more => {
                    warn!("{} CSV exports found, using {}", more.len(), more[0].display());
                    more[0].clone()
                }
            }
        }
    };

    let orders = parse_preorder_csv(&csv_path)?;
    let written = write_monthly_extracts(&orders, layout.order_extracts())?;
    println!(
        "Completed: {} orders across {} monthly files",
        orders.len(),
        written.len()
    );
    Ok(())
}

async fn extract_counts(layout: &DataLayout, delay: u64) -> Result<()> {
    let client = TranscriptionClient::from_env()?;
    let output_dir = layout.count_extracts();
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let files = list_files_with_ext(&layout.counts_raw(), "pdf")?;
    if files.is_empty() {
        bail!("no count sheets under {}", layout.counts_raw().display());
    }
    println!("Found {} count sheets to transcribe", files.len());

    let mut failed: Vec<String> = Vec::new();
    let mut processed = 0usize;
    for (i, path) in files.iter().enumerate() {
        match client.transcribe_pdf(path).await? {
            Some(report) => {
                let out = output_dir.join(format!("{}.json", report.report_date));
                write_report_json(&report, &out)?;
                println!(
                    "  {} -> {} ({}/{})",
                    path.display(),
                    report.report_date,
                    i + 1,
                    files.len()
                );
                processed += 1;
            }
            None => failed.push(path.display().to_string()),
        }

        // the transcription service throttles; pace the calls
        if i + 1 < files.len() {
            tokio::time::sleep(std::time::Duration::from_secs(delay)).await;
        }
    }

    write_failed_transcriptions(&failed, &layout.qc().join("unparsed_mengenlisten.txt"))?;
    println!("Completed: {processed}/{} files transcribed", files.len());
    Ok(())
}

fn unify(layout: &DataLayout) -> Result<()> {
    let lookup = ArticleLookupTable::from_file(layout.lookup_table())?;
    println!("Loaded lookup table with {} variants", lookup.len());
    let unifier = DataUnifier::new(lookup);

    let mut journal_months: BTreeMap<String, PathBuf> = BTreeMap::new();
    for path in list_files_with_ext(&layout.journal_extracts(), "json")? {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match months::month_key_from_journal_filename(name) {
            Some(month) => {
                journal_months.insert(month, path);
            }
            None => warn!("cannot derive a month from journal extract {name}"),
        }
    }

    let mut order_months: BTreeMap<String, PathBuf> = BTreeMap::new();
    for path in list_files_with_ext(&layout.order_extracts(), "json")? {
        if let Some(month) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(months::month_key_from_order_filename)
        {
            order_months.insert(month, path);
        }
    }

    let all_reports = load_reports_dir(layout.count_extracts())?;

    let mut all_months: BTreeSet<String> = journal_months.keys().cloned().collect();
    all_months.extend(order_months.keys().cloned());
    all_months.extend(all_reports.keys().map(|date| months::month_key_of(*date)));

    if all_months.is_empty() {
        bail!("no extracts found under {}", layout.root().display());
    }
    println!("Found {} months to process", all_months.len());

    let unified_dir = layout.unified();
    std::fs::create_dir_all(&unified_dir)
        .with_context(|| format!("creating {}", unified_dir.display()))?;

    let mut processed = 0usize;
    for month in &all_months {
        // Journal revenue is the backbone of a day; months without it are
        // surfaced and skipped rather than half-consolidated.
        let Some(journal_path) = journal_months.get(month) else {
            println!("Skipping {month}: no journal extract");
            continue;
        };

        match unify_month(
            &unifier,
            month,
            journal_path,
            &all_reports,
            order_months.get(month),
            &unified_dir,
            &layout.qc(),
        ) {
            Ok((day_count, unmapped_count)) => {
                println!("  {month}: {day_count} days consolidated, {unmapped_count} with unmapped items");
                processed += 1;
            }
            Err(err) => warn!("month {month} failed: {err:#}"),
        }
    }

    println!("Completed: {processed}/{} months processed", all_months.len());
    Ok(())
}

fn unify_month(
    unifier: &DataUnifier,
    month: &str,
    journal_path: &Path,
    all_reports: &BTreeMap<chrono::NaiveDate, ShiftReport>,
    orders_path: Option<&PathBuf>,
    unified_dir: &Path,
    qc_dir: &Path,
) -> Result<(usize, usize)> {
    let transactions = read_extract_json(journal_path)?;

    let month_reports: BTreeMap<chrono::NaiveDate, ShiftReport> = all_reports
        .iter()
        .filter(|(date, _)| months::month_key_of(**date) == month)
        .map(|(date, report)| (*date, report.clone()))
        .collect();

    let orders = orders_path
        .map(read_monthly_extract)
        .transpose()?
        .unwrap_or_default();

    let unified = unifier.unify(&transactions, &month_reports, &orders);

    write_consolidated_month(
        &unified.days,
        unified_dir.join(format!("consolidated_{month}.json")),
    )?;
    write_unmapped_reports(&unified.unmapped, qc_dir)?;

    Ok((unified.days.len(), unified.unmapped.len()))
}

fn list_files_with_ext(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e == ext))
        .collect();
    files.sort();
    Ok(files)
}

fn write_failed_transcriptions(failed: &[String], path: &Path) -> Result<()> {
    if failed.is_empty() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let mut out = format!("Unparsed PDF Files ({} total)\n", failed.len());
    out.push_str(&"=".repeat(60));
    out.push_str("\n\n");
    for (i, file) in failed.iter().enumerate() {
        out.push_str(&format!("File {}: {file}\n", i + 1));
    }

    std::fs::write(path, out).with_context(|| format!("writing {}", path.display()))?;
    println!("Unparsed files saved to: {}", path.display());
    Ok(())
}
