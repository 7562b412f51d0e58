//! Variant-to-master article name lookup

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Immutable mapping from every known source-specific article spelling to
/// its canonical master article name.
///
/// Lookup is an exact, case-sensitive string match — no normalization, no
/// fuzzy matching. A miss is an expected outcome the caller records for QC,
/// not an error. The table is loaded once and shared read-only for the
/// duration of a batch run.
#[derive(Debug, Clone, Default)]
pub struct ArticleLookupTable {
    variant_to_master: HashMap<String, String>,
}

#[derive(Deserialize)]
struct LookupFile {
    variant_to_master_lookup: HashMap<String, String>,
}

impl ArticleLookupTable {
    pub fn from_map(variant_to_master: HashMap<String, String>) -> Self {
        Self { variant_to_master }
    }

    /// Load the table from its JSON file:
    /// `{"variant_to_master_lookup": {"<variant>": "<master>", ...}}`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading lookup table {}", path.display()))?;
        let file: LookupFile = serde_json::from_str(&raw)
            .with_context(|| format!("parsing lookup table {}", path.display()))?;
        Ok(Self {
            variant_to_master: file.variant_to_master_lookup,
        })
    }

    /// Resolve a variant name to its master article name
    pub fn resolve(&self, variant: &str) -> Option<&str> {
        self.variant_to_master.get(variant).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variant_to_master.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variant_to_master.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ArticleLookupTable {
        let mut map = HashMap::new();
        map.insert("Roggenmischbrot".to_string(), "Brot Mix".to_string());
        map.insert("Roggenmisch 750g".to_string(), "Brot Mix".to_string());
        map.insert("Brezel".to_string(), "Brezel".to_string());
        ArticleLookupTable::from_map(map)
    }

    #[test]
    fn test_known_variants_resolve_to_master() {
        let t = table();
        assert_eq!(t.resolve("Roggenmischbrot"), Some("Brot Mix"));
        assert_eq!(t.resolve("Roggenmisch 750g"), Some("Brot Mix"));
    }

    #[test]
    fn test_unknown_variant_is_none_not_error() {
        let t = table();
        assert_eq!(t.resolve("Unknown Pastry"), None);
        // deterministic on repeat
        assert_eq!(t.resolve("Unknown Pastry"), None);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let t = table();
        assert_eq!(t.resolve("roggenmischbrot"), None);
        assert_eq!(t.resolve("BREZEL"), None);
    }
}
