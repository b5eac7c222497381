// Shared fixtures for the integration tests

#![allow(dead_code)]

use carguide_rust::{
    catalog::Catalog,
    config::Settings,
    models::{RawPrice, RawSeats, VehicleRecord},
    AppState,
};

pub const CATALOG_JSON: &str = r#"[
  {"brand": "Volkswagen", "model": "Polo", "variant": "1.0 TSI Life", "variantSlug": "polo", "price": "R384 400", "fuelType": "Petrol", "transmission": "Manual", "bodyType": "Hatchback", "drive": "4x2", "seats": "5", "year": "2024", "vehicleType": "Passenger", "timestamp": "2024-05-02T08:00:00Z"},
  {"brand": "Hyundai", "model": "i20", "variant": "1.2 Motion", "variantSlug": "i20", "price": "R299 900", "fuelType": "Petrol", "transmission": "Manual", "bodyType": "Hatchback", "drive": "4x2", "seats": 5, "year": "2024", "vehicleType": "Passenger", "timestamp": "2024-04-18"},
  {"brand": "Toyota", "model": "Fortuner", "variant": "2.8 GD-6 4x4 VX", "variantSlug": "fortuner-28-vx", "price": "R949 000", "fuelType": "Diesel", "transmission": "Automatic", "bodyType": "SUV", "drive": "4x4", "seats": "7", "year": "2024", "vehicleType": "Passenger", "timestamp": "2024-02-12"},
  {"brand": "Toyota", "model": "Hilux", "variant": "2.0 VVTi S", "variantSlug": "hilux-20-s", "price": "R344 600", "fuelType": "Petrol", "transmission": "Manual", "bodyType": "Bakkie", "drive": "4x2", "seats": "2", "year": "2024", "vehicleType": "LCV"},
  {"brand": "Kia", "model": "Picanto", "variant": "1.0 Start", "variantSlug": "picanto-start", "price": 209995, "fuelType": "Petrol", "transmission": "Manual", "bodyType": "Hatchback", "seats": "4", "vehicleType": "Unknown", "timestamp": "2024-04-02"},
  {"brand": "Mahindra", "model": "Pik Up", "variant": "2.2 S6", "variantSlug": "pik-up-s6", "price": "POA"}
]"#;

pub fn catalog() -> Catalog {
    Catalog::from_json(CATALOG_JSON).expect("fixture catalog is valid")
}

pub fn app_state() -> AppState {
    AppState::new(Settings::default(), catalog())
}

pub fn car(slug: &str, price: u64, body: Option<&str>) -> VehicleRecord {
    VehicleRecord {
        brand: "Brand".into(),
        model: format!("Model {}", slug),
        variant: "Base".into(),
        variant_slug: slug.into(),
        price: RawPrice::Amount(price),
        body_type: body.map(str::to_string),
        seats: Some(RawSeats::Count(5)),
        ..Default::default()
    }
}

pub fn slugs(records: &[&VehicleRecord]) -> Vec<String> {
    records.iter().map(|r| r.variant_slug.clone()).collect()
}
