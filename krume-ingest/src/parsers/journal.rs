//! Journal block parser: segments a point-of-sale journal dump into
//! per-receipt blocks and extracts structured transactions.
//!
//! Expected block shape inside the dump:
//!   Rechnung (#4711)                                    11.04.2024 09:30:05
//!   UUID: 9c41f2aa-...
//!   0.5x Roggenmischbrot (#71)                                         2,45
//!      Warengruppe: Brot (#3)
//!   Summe Brutto                                                       2,45
//!   Signatur: pX0b...
//!
//! A block that is missing a required field is archived verbatim for audit
//! and the scan continues; one bad receipt never aborts the extraction.

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use krume_core::journal::{LineItem, Transaction};
use log::{debug, info, warn};
use regex::Regex;
use rust_decimal::Decimal;
use std::path::Path;

use crate::encoding::decode_text;
use crate::numeric::parse_comma_decimal;

/// Scanner mode: between receipts, or collecting lines of an open block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Idle,
    InBlock,
}

/// Result of scanning one journal dump
#[derive(Debug, Default)]
pub struct JournalExtract {
    pub transactions: Vec<Transaction>,
    /// Raw line sequences of blocks that failed to parse, verbatim, for audit
    pub unparsed_blocks: Vec<Vec<String>>,
    /// Interior lines that looked like item lines but did not match the item
    /// grammar. They are excluded from the item lists on purpose; the counter
    /// keeps the loss visible.
    pub skipped_item_lines: usize,
}

struct BlockRegexes {
    header: Regex,
    header_timestamp: Regex,
    item: Regex,
    item_candidate: Regex,
    category: Regex,
    total_gross: Regex,
}

impl BlockRegexes {
    fn new() -> Result<Self> {
        Ok(Self {
            header: Regex::new(r"^Rechnung \(#(\d+)\)")?,
            header_timestamp: Regex::new(r"(\d{2}\.\d{2}\.\d{4} \d{2}:\d{2}:\d{2})$")?,
            item: Regex::new(r"^(\d+(?:\.\d+)?)x\s+(.+?)\s+\(#(\d+)\)\s+(\d+,\d+)$")?,
            item_candidate: Regex::new(r"^\d+(?:[.,]\d+)?x\s")?,
            category: Regex::new(r"^Warengruppe:\s+(.+?)\s+\(#(\d+)\)$")?,
            total_gross: Regex::new(r"Summe Brutto\s+(\d+,\d+)")?,
        })
    }
}

/// Read and scan a journal dump file (encoding handled best-effort)
pub fn parse_journal_file(path: impl AsRef<Path>) -> Result<JournalExtract> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading journal dump {}", path.display()))?;
    let text = decode_text(&bytes);
    info!("scanning journal dump {}", path.display());
    parse_journal_text(&text)
}

/// Scan journal text into transactions plus audit leftovers.
///
/// Transactions come out in source order. The only error this returns is a
/// broken regex table; every per-block problem is recovered into
/// `unparsed_blocks`.
pub fn parse_journal_text(text: &str) -> Result<JournalExtract> {
    let re = BlockRegexes::new()?;
    let mut extract = JournalExtract::default();
    let mut state = ScanState::Idle;
    let mut block: Vec<String> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if re.header.is_match(line) {
            if state == ScanState::InBlock {
                // A receipt header before the previous signature. The open
                // block can never parse without its signature line, so it is
                // archived as-is and a fresh block starts here.
                warn!(
                    "line {line_no}: new receipt header inside an open block, archiving {} lines",
                    block.len()
                );
                extract.unparsed_blocks.push(std::mem::take(&mut block));
            }
            debug!("line {line_no}: receipt block opened");
            state = ScanState::InBlock;
            block.push(line.to_string());
            continue;
        }

        if state == ScanState::InBlock && line.starts_with("Signatur: ") {
            block.push(line.to_string());
            match parse_block(&re, &block) {
                Ok((txn, skipped)) => {
                    debug!("line {line_no}: parsed receipt {}", txn.uuid);
                    extract.transactions.push(txn);
                    extract.skipped_item_lines += skipped;
                }
                Err(err) => {
                    warn!("line {line_no}: receipt block failed to parse: {err:#}");
                    extract.unparsed_blocks.push(std::mem::take(&mut block));
                }
            }
            block.clear();
            state = ScanState::Idle;
            continue;
        }

        if state == ScanState::InBlock {
            block.push(line.to_string());
        }
        // Lines outside any block are header/footer noise and are dropped.
    }

    if state == ScanState::InBlock && !block.is_empty() {
        warn!(
            "journal text ended inside an open block, archiving {} lines",
            block.len()
        );
        extract.unparsed_blocks.push(block);
    }

    info!(
        "journal scan complete: {} transactions, {} unparsed blocks, {} skipped item lines",
        extract.transactions.len(),
        extract.unparsed_blocks.len(),
        extract.skipped_item_lines
    );
    Ok(extract)
}

/// Extract one transaction from a complete block. Field lookups are
/// order-independent within the block.
fn parse_block(re: &BlockRegexes, lines: &[String]) -> Result<(Transaction, usize)> {
    let uuid = extract_uuid(lines)?;
    let timestamp = extract_timestamp(re, lines)?;
    let bill_number = extract_bill_number(re, lines)?;
    let (items, skipped) = extract_items(re, lines);
    let total_gross = extract_total_gross(re, lines)?;

    Ok((
        Transaction {
            uuid,
            timestamp,
            bill_number,
            items,
            total_gross,
        },
        skipped,
    ))
}

fn extract_uuid(lines: &[String]) -> Result<String> {
    lines
        .iter()
        .find_map(|line| line.strip_prefix("UUID: "))
        .map(str::to_string)
        .context("no UUID line in block")
}

fn extract_timestamp(re: &BlockRegexes, lines: &[String]) -> Result<NaiveDateTime> {
    for line in lines {
        if !re.header.is_match(line) {
            continue;
        }
        if let Some(caps) = re.header_timestamp.captures(line) {
            return NaiveDateTime::parse_from_str(&caps[1], "%d.%m.%Y %H:%M:%S")
                .with_context(|| format!("bad receipt timestamp {:?}", &caps[1]));
        }
    }
    bail!("no timestamp on receipt header")
}

fn extract_bill_number(re: &BlockRegexes, lines: &[String]) -> Result<u32> {
    for line in lines {
        if let Some(caps) = re.header.captures(line) {
            return caps[1]
                .parse()
                .with_context(|| format!("bill number out of range: {:?}", &caps[1]));
        }
    }
    bail!("no bill number on receipt header")
}

/// Collect item lines. A line that resembles an item but fails the grammar is
/// excluded without failing the block; the second tuple element counts those.
fn extract_items(re: &BlockRegexes, lines: &[String]) -> (Vec<LineItem>, usize) {
    let mut items = Vec::new();
    let mut skipped = 0;

    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = re.item.captures(line) else {
            if re.item_candidate.is_match(line) {
                debug!("item-like line excluded: {line:?}");
                skipped += 1;
            }
            continue;
        };

        let (Ok(quantity), Ok(article_number), Ok(price)) = (
            caps[1].parse::<Decimal>(),
            caps[3].parse::<u32>(),
            parse_comma_decimal(&caps[4]),
        ) else {
            debug!("item-like line excluded: {line:?}");
            skipped += 1;
            continue;
        };

        // Category marker sits on the line right after the item, if anywhere
        let (category, category_number) = lines
            .get(i + 1)
            .and_then(|next| re.category.captures(next))
            .and_then(|c| Some((c[1].to_string(), c[2].parse::<u32>().ok()?)))
            .unwrap_or_else(|| ("Unknown".to_string(), 0));

        items.push(LineItem {
            article_number,
            article_name: caps[2].to_string(),
            quantity,
            category,
            category_number,
            price,
        });
    }

    (items, skipped)
}

/// Only a positive comma-decimal amount satisfies the gross-total line.
/// Cancellation and refund receipts print a negative total, never match, and
/// so fail the block — they must not end up as negative revenue.
fn extract_total_gross(re: &BlockRegexes, lines: &[String]) -> Result<Decimal> {
    for line in lines {
        if let Some(caps) = re.total_gross.captures(line) {
            return parse_comma_decimal(&caps[1]);
        }
    }
    bail!("no positive gross total in block")
}

/// Write transactions as a JSON extract (array of records)
pub fn write_extract_json(transactions: &[Transaction], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(transactions)?;
    std::fs::write(path, json)
        .with_context(|| format!("writing journal extract {}", path.display()))?;
    info!("saved {} transactions to {}", transactions.len(), path.display());
    Ok(())
}

/// Read a JSON extract back (used by the unify stage)
pub fn read_extract_json(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading journal extract {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing journal extract {}", path.display()))
}

/// Audit dump of every block the scanner could not parse, verbatim
pub fn write_unparsed_blocks(blocks: &[Vec<String>], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if blocks.is_empty() {
        info!("no unparsed blocks to save");
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let mut out = format!("Unparsed Transaction Blocks ({} total)\n", blocks.len());
    out.push_str(&"=".repeat(60));
    out.push_str("\n\n");
    for (i, block) in blocks.iter().enumerate() {
        out.push_str(&format!("Block {}:\n", i + 1));
        out.push_str(&"-".repeat(20));
        out.push('\n');
        for line in block {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&"=".repeat(60));
        out.push_str("\n\n");
    }

    std::fs::write(path, out)
        .with_context(|| format!("writing unparsed blocks to {}", path.display()))?;
    info!("saved {} unparsed blocks to {}", blocks.len(), path.display());
    Ok(())
}
