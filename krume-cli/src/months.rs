//! Month bookkeeping for the batch driver. Journal dumps are named after
//! German month names ("Birke April 2024.txt"), the other extracts carry
//! ISO dates.

use chrono::NaiveDate;
use regex::Regex;

const MONTH_NAMES: &[(&str, u32)] = &[
    ("Januar", 1),
    ("Februar", 2),
    ("März", 3),
    ("Maerz", 3),
    ("April", 4),
    ("Mai", 5),
    ("Juni", 6),
    ("Juli", 7),
    ("August", 8),
    ("September", 9),
    ("Oktober", 10),
    ("November", 11),
    ("Dezember", 12),
];

/// `YYYY-MM` from a journal extract filename like `Birke April 2024.txt.json`
pub fn month_key_from_journal_filename(name: &str) -> Option<String> {
    let month = MONTH_NAMES
        .iter()
        .find(|(month_name, _)| name.contains(month_name))
        .map(|(_, number)| *number)?;
    let year_re = Regex::new(r"20\d{2}").ok()?;
    let year = year_re.find(name)?.as_str();
    Some(format!("{year}-{month:02}"))
}

/// `YYYY-MM` from a pre-order extract filename like `bestellungen_2024-04.json`
pub fn month_key_from_order_filename(name: &str) -> Option<String> {
    let re = Regex::new(r"bestellungen_(\d{4}-\d{2})\.json").ok()?;
    Some(re.captures(name)?[1].to_string())
}

pub fn month_key_of(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}
