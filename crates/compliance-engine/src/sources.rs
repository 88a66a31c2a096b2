//! Reference-data sources consulted by the resolver
//!
//! Three collaborators, each behind an async trait so the backing store
//! (database, HTTP service, static file) is the caller's choice:
//! - `AliasTable`: `(name, manufacturer) -> canonical SKU`
//! - `PartsCatalog`: exact SKU lookup and a fuzzy name/SKU search
//! - `MaterialsReference`: price/origin overrides keyed by SKU or name
//!
//! In-memory implementations load from strict JSON documents.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, LookupError, Result};

/// A parts-catalog record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartRecord {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub origin_country: Option<String>,
    #[serde(default)]
    pub is_domestic: Option<bool>,
}

/// Price and origin facts from the materials reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaterialFacts {
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub is_domestic: Option<bool>,
    #[serde(default)]
    pub origin_country: Option<String>,
}

#[async_trait]
pub trait AliasTable: Send + Sync {
    async fn resolve(
        &self,
        name: &str,
        manufacturer: Option<&str>,
    ) -> std::result::Result<Option<String>, LookupError>;
}

#[async_trait]
pub trait PartsCatalog: Send + Sync {
    async fn find_by_sku(&self, sku: &str) -> std::result::Result<Option<PartRecord>, LookupError>;

    async fn search_by_name_or_sku(
        &self,
        text: &str,
    ) -> std::result::Result<Option<PartRecord>, LookupError>;
}

#[async_trait]
pub trait MaterialsReference: Send + Sync {
    async fn lookup(
        &self,
        sku_or_name: &str,
    ) -> std::result::Result<Option<MaterialFacts>, LookupError>;
}

/// Lower-case and collapse everything but letters and digits
pub fn match_key(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Shortest normalised text the fuzzy search will consider
const MIN_FUZZY_KEY_LEN: usize = 3;

// ============================================================================
// Alias mapping
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasEntry {
    pub name: String,
    /// `None` matches any manufacturer
    #[serde(default)]
    pub manufacturer: Option<String>,
    pub sku: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct AliasDocument {
    aliases: Vec<AliasEntry>,
}

/// Static alias table. Manufacturer-specific entries win over wildcards.
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    entries: Vec<AliasEntry>,
}

impl AliasMap {
    pub fn new(entries: Vec<AliasEntry>) -> Self {
        Self { entries }
    }

    /// Parse `{"aliases": [{"name": .., "manufacturer": .., "sku": ..}]}`
    pub fn from_json_str(s: &str) -> Result<Self> {
        let document: AliasDocument = serde_json::from_str(s)
            .map_err(|e| EngineError::ReferenceData(format!("alias table: {}", e)))?;
        Ok(Self::new(document.aliases))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, name: &str, manufacturer: Option<&str>) -> Option<&AliasEntry> {
        let name_key = match_key(name);
        let manufacturer_key = manufacturer.map(match_key);
        let same_name = |entry: &&AliasEntry| match_key(&entry.name) == name_key;

        self.entries
            .iter()
            .filter(same_name)
            .find(|entry| match (&entry.manufacturer, &manufacturer_key) {
                (Some(m), Some(key)) => match_key(m) == *key,
                _ => false,
            })
            .or_else(|| {
                self.entries
                    .iter()
                    .filter(same_name)
                    .find(|entry| entry.manufacturer.is_none())
            })
    }
}

#[async_trait]
impl AliasTable for AliasMap {
    async fn resolve(
        &self,
        name: &str,
        manufacturer: Option<&str>,
    ) -> std::result::Result<Option<String>, LookupError> {
        Ok(self.find(name, manufacturer).map(|entry| entry.sku.clone()))
    }
}

// ============================================================================
// Parts catalog
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDocument {
    parts: Vec<PartRecord>,
}

/// Parts catalog held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    parts: Vec<PartRecord>,
}

impl InMemoryCatalog {
    pub fn new(parts: Vec<PartRecord>) -> Self {
        Self { parts }
    }

    /// Parse `{"parts": [PartRecord, ..]}`
    pub fn from_json_str(s: &str) -> Result<Self> {
        let document: CatalogDocument = serde_json::from_str(s)
            .map_err(|e| EngineError::ReferenceData(format!("parts catalog: {}", e)))?;
        Ok(Self::new(document.parts))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Exact SKU (normalised) first; otherwise the record whose normalised
    /// name or SKU is the longest substring of the text, or contains it.
    fn search(&self, text: &str) -> Option<&PartRecord> {
        let key = match_key(text);
        if key.len() < MIN_FUZZY_KEY_LEN {
            return None;
        }

        if let Some(exact) = self.parts.iter().find(|p| match_key(&p.sku) == key) {
            return Some(exact);
        }

        self.parts
            .iter()
            .filter_map(|part| {
                let name_key = match_key(&part.name);
                let sku_key = match_key(&part.sku);
                [name_key, sku_key]
                    .into_iter()
                    .filter(|candidate| candidate.len() >= MIN_FUZZY_KEY_LEN)
                    .filter(|candidate| key.contains(candidate.as_str()) || candidate.contains(&key))
                    .map(|candidate| candidate.len())
                    .max()
                    .map(|score| (score, part))
            })
            // Longest match wins; ties go to the earlier record
            .fold(None, |best: Option<(usize, &PartRecord)>, (score, part)| match best {
                Some((best_score, _)) if best_score >= score => best,
                _ => Some((score, part)),
            })
            .map(|(_, part)| part)
    }
}

#[async_trait]
impl PartsCatalog for InMemoryCatalog {
    async fn find_by_sku(&self, sku: &str) -> std::result::Result<Option<PartRecord>, LookupError> {
        Ok(self.parts.iter().find(|p| p.sku == sku).cloned())
    }

    async fn search_by_name_or_sku(
        &self,
        text: &str,
    ) -> std::result::Result<Option<PartRecord>, LookupError> {
        Ok(self.search(text).cloned())
    }
}

// ============================================================================
// Materials reference
// ============================================================================

/// Materials reference table parsed from a JSON object keyed by SKU or name:
///
/// ```json
/// { "XR-100-168": { "unit_price": 42.5, "is_domestic": true } }
/// ```
///
/// Parsing is data-only; unknown fields are rejected.
#[derive(Debug, Clone, Default)]
pub struct MaterialsTable {
    entries: BTreeMap<String, MaterialFacts>,
}

impl MaterialsTable {
    pub fn new<I: IntoIterator<Item = (String, MaterialFacts)>>(entries: I) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, facts)| (match_key(&key), facts))
                .collect(),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: BTreeMap<String, MaterialFacts> = serde_json::from_str(s)
            .map_err(|e| EngineError::ReferenceData(format!("materials reference: {}", e)))?;
        Ok(Self::new(raw))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl MaterialsReference for MaterialsTable {
    async fn lookup(
        &self,
        sku_or_name: &str,
    ) -> std::result::Result<Option<MaterialFacts>, LookupError> {
        Ok(self.entries.get(&match_key(sku_or_name)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn part(sku: &str, name: &str) -> PartRecord {
        PartRecord {
            sku: sku.to_string(),
            name: name.to_string(),
            manufacturer: None,
            category: None,
            unit_price: Some(10.0),
            origin_country: None,
            is_domestic: None,
        }
    }

    #[tokio::test]
    async fn test_alias_prefers_manufacturer_specific_entry() {
        let aliases = AliasMap::new(vec![
            AliasEntry {
                name: "XR100 Rail".into(),
                manufacturer: None,
                sku: "GENERIC-RAIL".into(),
            },
            AliasEntry {
                name: "XR100 Rail".into(),
                manufacturer: Some("IronRidge".into()),
                sku: "XR-100-168".into(),
            },
        ]);

        let specific = aliases.resolve("xr100 rail", Some("IRONRIDGE")).await.unwrap();
        assert_eq!(specific.as_deref(), Some("XR-100-168"));

        let wildcard = aliases.resolve("XR100 Rail", Some("Other")).await.unwrap();
        assert_eq!(wildcard.as_deref(), Some("GENERIC-RAIL"));

        let missing = aliases.resolve("Unknown part", None).await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_catalog_exact_sku() {
        let catalog = InMemoryCatalog::new(vec![part("XR-100-168", "XR100 Rail 168in")]);
        let found = catalog.find_by_sku("XR-100-168").await.unwrap();
        assert_eq!(found.map(|p| p.name), Some("XR100 Rail 168in".to_string()));
        assert_eq!(catalog.find_by_sku("xr-100-168").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_catalog_fuzzy_prefers_longest_match() {
        let catalog = InMemoryCatalog::new(vec![
            part("RAIL-1", "Rail"),
            part("XR-100-168", "XR100 Rail 168in"),
        ]);
        let found = catalog
            .search_by_name_or_sku("IronRidge XR100 Rail 168in black")
            .await
            .unwrap();
        assert_eq!(found.map(|p| p.sku), Some("XR-100-168".to_string()));
    }

    #[tokio::test]
    async fn test_catalog_fuzzy_ignores_tiny_keys() {
        let catalog = InMemoryCatalog::new(vec![part("XR-100-168", "XR100 Rail 168in")]);
        assert_eq!(catalog.search_by_name_or_sku("xr").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_materials_table_parses_strict_json() {
        let table = MaterialsTable::from_json_str(
            r#"{"XR-100-168": {"unit_price": 42.5, "is_domestic": true}}"#,
        )
        .unwrap();
        let facts = table.lookup("xr 100 168").await.unwrap().unwrap();
        assert_eq!(facts.unit_price, Some(42.5));
        assert_eq!(facts.is_domestic, Some(true));
    }

    #[test]
    fn test_materials_table_rejects_code() {
        // Object literals with functions or unquoted keys are not data
        assert!(MaterialsTable::from_json_str(r#"{rail: {unit_price: 1}}"#).is_err());
        assert!(MaterialsTable::from_json_str(
            r#"{"rail": {"unit_price": 1, "compute": "() => 2"}}"#
        )
        .is_err());
    }

    #[test]
    fn test_catalog_document_parses() {
        let catalog = InMemoryCatalog::from_json_str(
            r#"{"parts": [{"sku": "A-1", "name": "Anchor", "origin_country": "US"}]}"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 1);
    }
}
