// Side-by-side comparison keys of the form "<slugA>-vs-<slugB>"

use serde::Serialize;

use crate::models::VehicleRecord;

pub const SEPARATOR: &str = "-vs-";

// Rows of the comparison table, in display order
pub const FEATURES: [&str; 9] = [
    "brand",
    "model",
    "variant",
    "price",
    "fuelType",
    "transmission",
    "bodyType",
    "year",
    "vehicleType",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonKey {
    pub left: String,
    pub right: Option<String>,
}

impl ComparisonKey {
    /// Splits on the literal `-vs-`. Slugs are assumed not to contain the
    /// separator themselves; when the key has more than one separator only the
    /// first two pieces are used.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(SEPARATOR);
        let left = parts.next().unwrap_or_default().to_string();
        let right = parts.next().map(str::to_string);
        ComparisonKey { left, right }
    }
}

/// Both sides of a comparison. Either may be unresolved.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Comparison<'a> {
    pub left: Option<&'a VehicleRecord>,
    pub right: Option<&'a VehicleRecord>,
}

impl<'a> Comparison<'a> {
    pub fn resolve<F>(key: &ComparisonKey, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<&'a VehicleRecord>,
    {
        Comparison {
            left: lookup(&key.left),
            right: key.right.as_deref().and_then(&lookup),
        }
    }

    // Renderable only when both sides were found
    pub fn pair(&self) -> Option<(&'a VehicleRecord, &'a VehicleRecord)> {
        self.left.zip(self.right)
    }

    pub fn is_resolved(&self) -> bool {
        self.pair().is_some()
    }

    // (feature, left value, right value) rows; empty unless both sides resolved
    pub fn rows(&self) -> Vec<(&'static str, String, String)> {
        match self.pair() {
            Some((a, b)) => FEATURES
                .iter()
                .map(|f| (*f, feature_value(a, f), feature_value(b, f)))
                .collect(),
            None => Vec::new(),
        }
    }
}

pub fn feature_value(record: &VehicleRecord, feature: &str) -> String {
    let optional = |v: &Option<String>| v.clone().unwrap_or_default();
    match feature {
        "brand" => record.brand.clone(),
        "model" => record.model.clone(),
        "variant" => record.variant.clone(),
        "price" => record.price.to_string(),
        "fuelType" => optional(&record.fuel_type),
        "transmission" => optional(&record.transmission),
        "bodyType" => optional(&record.body_type),
        "year" => optional(&record.year),
        "vehicleType" => optional(&record.vehicle_type),
        _ => String::new(),
    }
}

/// Comparison key for two chosen records, or `None` when both are the same vehicle.
pub fn comparison_key(a: &VehicleRecord, b: &VehicleRecord) -> Option<String> {
    if a.variant_slug.eq_ignore_ascii_case(&b.variant_slug) {
        return None;
    }
    Some(format!("{}{}{}", a.variant_slug, SEPARATOR, b.variant_slug))
}
