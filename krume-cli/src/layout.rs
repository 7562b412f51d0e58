//! On-disk layout of one data root: raw sources in, extracts and
//! consolidated data out, QC artifacts to the side

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn journal_raw(&self) -> PathBuf {
        self.root.join("raw").join("Fiskaljournale")
    }

    pub fn journal_extracts(&self) -> PathBuf {
        self.root.join("processed").join("Fiskaljournale")
    }

    pub fn orders_raw(&self) -> PathBuf {
        self.root.join("raw").join("Bestellungen")
    }

    pub fn order_extracts(&self) -> PathBuf {
        self.root.join("processed").join("Bestellungen")
    }

    pub fn counts_raw(&self) -> PathBuf {
        self.root.join("raw").join("Mengenlisten")
    }

    pub fn count_extracts(&self) -> PathBuf {
        self.root.join("processed").join("Mengenlisten")
    }

    pub fn unified(&self) -> PathBuf {
        self.root.join("processed").join("Unified_data")
    }

    pub fn qc(&self) -> PathBuf {
        self.root.join("processed").join("qc")
    }

    pub fn lookup_table(&self) -> PathBuf {
        self.root.join("master").join("lookup_table.json")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_hang_off_the_root() {
        let layout = DataLayout::new("/srv/bakery");
        assert_eq!(
            layout.journal_raw(),
            PathBuf::from("/srv/bakery/raw/Fiskaljournale")
        );
        assert_eq!(
            layout.unified(),
            PathBuf::from("/srv/bakery/processed/Unified_data")
        );
        assert_eq!(
            layout.lookup_table(),
            PathBuf::from("/srv/bakery/master/lookup_table.json")
        );
    }
}
