//! Site -> region catalog.
//!
//! The bundled catalog lists the state variety-testing sites grouped by
//! oblast. A replacement CSV with the same header can be supplied instead.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, StoreError};

const BUNDLED_SITES: &str = include_str!("../data/sites.csv");

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SiteEntry {
    pub oblast_id: String,
    pub oblast_name: String,
    pub site_id: String,
    pub site_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct SiteCatalog {
    entries: Vec<SiteEntry>,
    by_site: BTreeMap<String, usize>,
}

impl SiteCatalog {
    /// Catalog shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::parse(BUNDLED_SITES.as_bytes(), "bundled sites.csv")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| StoreError::io("read", path, e))?;
        Self::parse(bytes.as_slice(), &path.display().to_string())
    }

    pub fn parse(bytes: &[u8], source_name: &str) -> Result<Self> {
        let catalog_error = |message: String| StoreError::Catalog {
            source_name: source_name.to_string(),
            message,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);
        let headers = reader
            .headers()
            .map_err(|e| catalog_error(e.to_string()))?
            .clone();

        let mut entries = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| catalog_error(e.to_string()))?;

            let get = |name: &str| -> Option<String> {
                headers
                    .iter()
                    .position(|h| h == name)
                    .and_then(|i| row.get(i))
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            };

            let site_id =
                get("site_id").ok_or_else(|| catalog_error("missing site_id".to_string()))?;
            let oblast_name = get("oblast_name")
                .ok_or_else(|| catalog_error(format!("missing oblast_name for {site_id}")))?;
            entries.push(SiteEntry {
                oblast_id: get("oblast_id").unwrap_or_default(),
                oblast_name,
                site_name: get("site_name").unwrap_or_else(|| site_id.clone()),
                site_id,
            });
        }

        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<SiteEntry>) -> Self {
        let by_site = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.site_id.clone(), index))
            .collect();
        Self { entries, by_site }
    }

    pub fn get(&self, site_id: &str) -> Option<&SiteEntry> {
        self.by_site.get(site_id).map(|index| &self.entries[*index])
    }

    pub fn region_for_site(&self, site_id: &str) -> Option<&str> {
        self.get(site_id).map(|entry| entry.oblast_name.as_str())
    }

    pub fn site_name(&self, site_id: &str) -> Option<&str> {
        self.get(site_id).map(|entry| entry.site_name.as_str())
    }

    pub fn entries(&self) -> &[SiteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_resolves_sites_to_oblasts() {
        let catalog = SiteCatalog::bundled().unwrap();
        assert!(catalog.len() > 60);
        assert_eq!(
            catalog.region_for_site("kostanay-fedorov-gsu"),
            Some("Костанайская область")
        );
        assert_eq!(catalog.site_name("akmola-shortandy-gsu"), Some("Шортандинский ГСУ"));
        // Oblast ids themselves are not sites.
        assert_eq!(catalog.region_for_site("kostanay"), None);
    }

    #[test]
    fn custom_catalog_defaults_missing_site_name() {
        let csv = "oblast_id,oblast_name,site_id,site_name\nnorth,North Region,site-a,\n";
        let catalog = SiteCatalog::parse(csv.as_bytes(), "inline").unwrap();
        assert_eq!(catalog.site_name("site-a"), Some("site-a"));
        assert_eq!(catalog.region_for_site("site-a"), Some("North Region"));
    }

    #[test]
    fn catalog_requires_oblast_name() {
        let csv = "oblast_id,oblast_name,site_id,site_name\nnorth,,site-a,Site A\n";
        let err = SiteCatalog::parse(csv.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, StoreError::Catalog { .. }));
    }
}
