// The bundled vehicle catalog: loaded once at startup, read-only afterwards

use std::{collections::HashSet, fs, path::Path};

use crate::{
    compare::{Comparison, ComparisonKey},
    error::CatalogError,
    models::VehicleRecord,
};

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<VehicleRecord>,
}

impl Catalog {
    /// Validates the records: brand, model and slug must be present and slugs
    /// must be unique (case-insensitively).
    pub fn new(records: Vec<VehicleRecord>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for (index, record) in records.iter().enumerate() {
            if record.variant_slug.trim().is_empty() {
                return Err(CatalogError::MissingField { index, field: "variantSlug" });
            }
            if record.brand.trim().is_empty() {
                return Err(CatalogError::MissingField { index, field: "brand" });
            }
            if record.model.trim().is_empty() {
                return Err(CatalogError::MissingField { index, field: "model" });
            }
            if !seen.insert(record.variant_slug.to_lowercase()) {
                return Err(CatalogError::DuplicateSlug(record.variant_slug.clone()));
            }
        }
        Ok(Catalog { records })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<VehicleRecord> = serde_json::from_str(json)?;
        Self::new(records)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Reading catalog file");
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json(&content)?;
        tracing::info!(records = catalog.len(), path = %path.display(), "Catalog loaded");
        Ok(catalog)
    }

    pub fn records(&self) -> &[VehicleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&VehicleRecord> {
        self.records
            .iter()
            .find(|r| r.variant_slug.eq_ignore_ascii_case(slug))
    }

    // Variant page lookup: all three path segments must agree
    pub fn find_variant(&self, brand: &str, model: &str, slug: &str) -> Option<&VehicleRecord> {
        self.records.iter().find(|r| {
            r.brand.to_lowercase() == brand.to_lowercase()
                && r.model.to_lowercase() == model.to_lowercase()
                && r.variant_slug.eq_ignore_ascii_case(slug)
        })
    }

    // Label is "<brand> <model> <variant>" as shown on the compare form
    pub fn find_by_label(&self, label: &str) -> Option<&VehicleRecord> {
        self.records.iter().find(|r| r.full_label() == label)
    }

    pub fn by_brand(&self, brand: &str) -> Vec<&VehicleRecord> {
        let brand = brand.to_lowercase();
        self.records
            .iter()
            .filter(|r| r.brand.to_lowercase() == brand)
            .collect()
    }

    pub fn by_model(&self, brand: &str, model: &str) -> Vec<&VehicleRecord> {
        let model = model.to_lowercase();
        self.by_brand(brand)
            .into_iter()
            .filter(|r| r.model.to_lowercase() == model)
            .collect()
    }

    /// Distinct brand names, sorted.
    pub fn brands(&self) -> Vec<String> {
        distinct_sorted(self.records.iter().map(|r| r.brand.as_str()))
    }

    /// Distinct model names for a brand (matched case-insensitively), sorted.
    pub fn models_for(&self, brand: &str) -> Vec<String> {
        distinct_sorted(self.by_brand(brand).into_iter().map(|r| r.model.as_str()))
    }

    // Distinct "<brand> <model> <variant>" labels in catalog order
    pub fn variant_labels(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(VehicleRecord::full_label)
            .filter(|label| seen.insert(label.clone()))
            .collect()
    }

    pub fn compare(&self, key: &str) -> Comparison<'_> {
        Comparison::resolve(&ComparisonKey::parse(key), |slug| self.find_by_slug(slug))
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = values
        .collect::<HashSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    out.sort();
    out
}
