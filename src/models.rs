// Data structures shared by the catalog, the query engine and the web layer
// e.g. VehicleRecord, FilterCriteria, FinanceInputs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pricing;

// Price as it appears in the bundled JSON: either a formatted string ("R300 000")
// or a number. Whole numbers land in `Amount`; fractional or negative ones in
// `Decimal`. Always go through `amount()` before comparing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawPrice {
    Amount(u64),
    Decimal(f64),
    Text(String),
}

impl RawPrice {
    pub fn amount(&self) -> u64 {
        pricing::parse_price(self)
    }
}

impl Default for RawPrice {
    fn default() -> Self {
        RawPrice::Text(String::new())
    }
}

impl fmt::Display for RawPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawPrice::Amount(n) => write!(f, "{}", pricing::format_rand(*n)),
            RawPrice::Decimal(_) => write!(f, "{}", pricing::format_rand(self.amount())),
            RawPrice::Text(s) => f.write_str(s),
        }
    }
}

// Seat count is sometimes a string ("5"), sometimes a number (5, or 5.0)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawSeats {
    Count(u32),
    Decimal(f64),
    Text(String),
}

impl RawSeats {
    pub fn count(&self) -> Option<u32> {
        match self {
            RawSeats::Count(n) => Some(*n),
            RawSeats::Decimal(n) => pricing::round_seats(*n),
            RawSeats::Text(s) => pricing::parse_seats(s),
        }
    }
}

/// One catalog entry. Immutable once loaded.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")] // Match the keys of car-data.json
pub struct VehicleRecord {
    pub brand: String,
    pub model: String,
    pub variant: String,
    pub variant_slug: String,
    #[serde(default)]
    pub price: RawPrice,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub body_type: Option<String>,
    #[serde(default)]
    pub drive: Option<String>,
    #[serde(default)]
    pub seats: Option<RawSeats>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl VehicleRecord {
    pub fn price_amount(&self) -> u64 {
        self.price.amount()
    }

    pub fn seat_count(&self) -> Option<u32> {
        self.seats.as_ref().and_then(RawSeats::count)
    }

    // "Volkswagen Polo"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }

    // "Volkswagen Polo 1.0 TSI Life", used as the option label on the compare form
    pub fn full_label(&self) -> String {
        format!("{} {} {}", self.brand, self.model, self.variant)
    }

    // Route to the variant page: /cars/<brand>/<model>/<variantSlug>
    pub fn href(&self) -> String {
        format!(
            "/cars/{}/{}/{}",
            path_segment(&self.brand),
            path_segment(&self.model),
            path_segment(&self.variant_slug)
        )
    }

    // vehicleType "Unknown" is a placeholder in the source data
    pub fn vehicle_type_label(&self) -> &str {
        match self.vehicle_type.as_deref() {
            Some(t) if !t.is_empty() && t != "Unknown" => t,
            _ => "To Be Classified",
        }
    }
}

// Percent-encodes everything outside the URL unreserved set
pub fn path_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Every active predicate must hold. Empty sets, empty strings and zero bounds
/// place no restriction.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub min_price: Option<u64>,
    #[serde(default)]
    pub max_price: Option<u64>,
    #[serde(default)]
    pub min_monthly: Option<u64>,
    #[serde(default)]
    pub max_monthly: Option<u64>,
    #[serde(default)]
    pub fuel_types: Vec<String>,
    #[serde(default)]
    pub transmissions: Vec<String>,
    #[serde(default)]
    pub body_types: Vec<String>,
    #[serde(default)]
    pub drives: Vec<String>,
    #[serde(default)]
    pub seats: Vec<u32>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self == &FilterCriteria::default()
    }

    // Builder-style helpers, mostly used by pages that expose a single select per field
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_fuel_type(mut self, fuel: Option<&str>) -> Self {
        self.fuel_types = single(fuel);
        self
    }

    pub fn with_transmission(mut self, transmission: Option<&str>) -> Self {
        self.transmissions = single(transmission);
        self
    }

    pub fn with_body_type(mut self, body: Option<&str>) -> Self {
        self.body_types = single(body);
        self
    }
}

fn single(value: Option<&str>) -> Vec<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| vec![v.to_string()])
        .unwrap_or_default()
}

/// Inputs to the amortized monthly payment estimate.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinanceInputs {
    pub price: f64,
    pub deposit: f64,
    pub annual_interest_rate_percent: f64,
    pub term_months: u32,
    pub balloon_percent: f64,
}

impl FinanceInputs {
    // Same finance configuration applied to a different vehicle price
    pub fn for_price(&self, price: u64) -> Self {
        FinanceInputs {
            price: price as f64,
            ..*self
        }
    }
}

impl Default for FinanceInputs {
    fn default() -> Self {
        FinanceInputs {
            price: 0.0,
            deposit: 0.0,
            annual_interest_rate_percent: 11.0,
            term_months: 60,
            balloon_percent: 0.0,
        }
    }
}

// Which text a name sort collates on
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum NameField {
    #[default]
    BrandModel,
    Model,
    Variant,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    None,
    Price,
    Name(NameField),
    Newest,
}

impl SortKey {
    // Parses the `sort` query value used by the pages: "", "price", "name", "newest".
    // Unknown values leave the order untouched.
    pub fn from_param(raw: &str, name_field: NameField) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "price" => SortKey::Price,
            "name" => SortKey::Name(name_field),
            "newest" => SortKey::Newest,
            _ => SortKey::None,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            SortKey::None => "",
            SortKey::Price => "price",
            SortKey::Name(_) => "name",
            SortKey::Newest => "newest",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "brand": "Volkswagen",
            "model": "Polo",
            "variant": "1.0 TSI Life",
            "variantSlug": "polo",
            "price": "R350 000",
            "seats": 5
        }"#;
        let record: VehicleRecord = serde_json::from_str(json).expect("parse record");
        assert_eq!(record.price_amount(), 350_000);
        assert_eq!(record.seat_count(), Some(5));
        assert!(record.fuel_type.is_none());
        assert!(record.timestamp.is_none());
    }

    #[test]
    fn numeric_price_and_string_seats() {
        let json = r#"{"brand":"Kia","model":"Picanto","variant":"1.0 Start",
            "variantSlug":"picanto-start","price":199900,"seats":"4"}"#;
        let record: VehicleRecord = serde_json::from_str(json).expect("parse record");
        assert_eq!(record.price, RawPrice::Amount(199_900));
        assert_eq!(record.seat_count(), Some(4));
    }

    #[test]
    fn fractional_and_negative_numbers_still_parse() {
        let json = r#"{"brand":"Kia","model":"Picanto","variant":"1.0 Start",
            "variantSlug":"picanto-start","price":299999.5,"seats":5.0}"#;
        let record: VehicleRecord = serde_json::from_str(json).expect("parse record");
        assert_eq!(record.price_amount(), 300_000);
        assert_eq!(record.seat_count(), Some(5));

        let json = r#"{"brand":"Kia","model":"Picanto","variant":"1.0 Start",
            "variantSlug":"picanto-start","price":-1500,"seats":-2}"#;
        let record: VehicleRecord = serde_json::from_str(json).expect("parse record");
        assert_eq!(record.price_amount(), 0);
        assert_eq!(record.seat_count(), None);
    }

    #[test]
    fn href_encodes_spaces() {
        let record = VehicleRecord {
            brand: "Land Rover".into(),
            model: "Defender".into(),
            variant_slug: "defender-110".into(),
            ..Default::default()
        };
        assert_eq!(record.href(), "/cars/Land%20Rover/Defender/defender-110");
    }

    #[test]
    fn unknown_vehicle_type_gets_placeholder() {
        let mut record = VehicleRecord::default();
        assert_eq!(record.vehicle_type_label(), "To Be Classified");
        record.vehicle_type = Some("Unknown".into());
        assert_eq!(record.vehicle_type_label(), "To Be Classified");
        record.vehicle_type = Some("Passenger".into());
        assert_eq!(record.vehicle_type_label(), "Passenger");
    }

    #[test]
    fn sort_key_from_param() {
        assert_eq!(SortKey::from_param("price", NameField::BrandModel), SortKey::Price);
        assert_eq!(
            SortKey::from_param("Name", NameField::Variant),
            SortKey::Name(NameField::Variant)
        );
        assert_eq!(SortKey::from_param("", NameField::BrandModel), SortKey::None);
        assert_eq!(SortKey::from_param("bogus", NameField::BrandModel), SortKey::None);
    }

    #[test]
    fn criteria_builders_ignore_blank_values() {
        let criteria = FilterCriteria::default()
            .with_fuel_type(Some(" "))
            .with_transmission(None)
            .with_body_type(Some("suv"));
        assert!(criteria.fuel_types.is_empty());
        assert!(criteria.transmissions.is_empty());
        assert_eq!(criteria.body_types, vec!["suv".to_string()]);
    }
}
