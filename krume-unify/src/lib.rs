//! krume-unify: cross-source reconciliation of bakery sales data

pub mod report;
pub mod unifier;
pub mod writer;

pub use report::UnmappedReport;
pub use unifier::{DataUnifier, UnifiedData};
