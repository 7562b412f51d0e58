//! krume-ingest: source extractors for the three bakery data feeds
//! (journal dumps, pre-order CSV exports, transcribed shift-count sheets)

pub mod encoding;
pub mod numeric;
pub mod parsers;
pub mod transcribe;

pub use parsers::journal::{JournalExtract, parse_journal_file, parse_journal_text};
pub use parsers::preorders::parse_preorder_csv;
pub use parsers::shift_counts::load_reports_dir;
pub use transcribe::TranscriptionClient;
