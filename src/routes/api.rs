// Handlers for the JSON API endpoints

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Json},
};
use axum_extra::extract::Query;
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    export,
    finance::{self, FinanceQuote},
    models::{FinanceInputs, VehicleRecord},
    query,
    routes::params::{FinanceQuery, ListingQuery},
    AppState,
};

// --- Response Wrappers ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CarSummary<'a> {
    #[serde(flatten)]
    record: &'a VehicleRecord,
    numeric_price: u64,
    est_monthly: u64,
    href: String,
}

impl<'a> CarSummary<'a> {
    fn new(record: &'a VehicleRecord, finance_inputs: &FinanceInputs) -> Self {
        let numeric_price = record.price_amount();
        CarSummary {
            record,
            numeric_price,
            est_monthly: finance::monthly_payment(&finance_inputs.for_price(numeric_price)),
            href: record.href(),
        }
    }
}

#[derive(Serialize)]
struct CarsResponse<'a> {
    total: usize,
    cars: Vec<CarSummary<'a>>,
}

#[derive(Serialize)]
struct CompareResponse<'a> {
    left: &'a VehicleRecord,
    right: &'a VehicleRecord,
    rows: Vec<CompareRow>,
}

#[derive(Serialize)]
struct CompareRow {
    feature: &'static str,
    left: String,
    right: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FinanceResponse {
    inputs: FinanceInputs,
    #[serde(flatten)]
    quote: FinanceQuote,
}

// --- API Handlers ---

pub async fn list_cars(
    State(app_state): State<AppState>,
    Query(listing): Query<ListingQuery>,
) -> AppResult<impl IntoResponse> {
    let listing = listing.without_stale_model(&app_state.catalog);
    let criteria = listing.criteria();
    let finance_inputs = listing.finance(app_state.settings.finance.listing_inputs());
    tracing::info!(?criteria, sort = listing.sort_key().as_param(), "[HANDLER] /api/cars - Request received.");

    let results = query::sorted(
        query::filter(app_state.catalog.records(), &criteria, &finance_inputs),
        listing.sort_key(),
    );
    tracing::debug!("[HANDLER] /api/cars - Returning {} vehicles.", results.len());

    let body = CarsResponse {
        total: results.len(),
        cars: results.iter().map(|r| CarSummary::new(r, &finance_inputs)).collect(),
    };
    // Serialize here: the response borrows from the shared catalog
    Ok(Json(serde_json::to_value(body).map_err(anyhow::Error::from)?))
}

pub async fn export_cars(
    State(app_state): State<AppState>,
    Query(listing): Query<ListingQuery>,
) -> AppResult<impl IntoResponse> {
    let listing = listing.without_stale_model(&app_state.catalog);
    let criteria = listing.criteria();
    let finance_inputs = listing.finance(app_state.settings.finance.listing_inputs());
    let results = query::sorted(
        query::filter(app_state.catalog.records(), &criteria, &finance_inputs),
        listing.sort_key(),
    );
    tracing::info!("[HANDLER] /api/cars/export.csv - Exporting {} vehicles.", results.len());

    let csv = export::to_csv_string(&results, &finance_inputs)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"cars.csv\""),
        ],
        csv,
    ))
}

pub async fn get_car(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    tracing::info!("[HANDLER] /api/cars/:slug - Request received for slug: {}", slug);
    let record = app_state
        .catalog
        .find_by_slug(&slug)
        .ok_or_else(|| AppError::NotFound(format!("No vehicle with slug '{}'", slug)))?;
    let summary = CarSummary::new(record, &app_state.settings.finance.listing_inputs());
    Ok(Json(serde_json::to_value(summary).map_err(anyhow::Error::from)?))
}

pub async fn get_brands(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let brands = app_state.catalog.brands();
    tracing::info!("[HANDLER] /api/brands - Returning {} brands.", brands.len());
    Ok(Json(brands))
}

pub async fn get_models(
    State(app_state): State<AppState>,
    Path(brand): Path<String>,
) -> AppResult<impl IntoResponse> {
    let models = app_state.catalog.models_for(&brand);
    tracing::info!("[HANDLER] /api/brands/:brand/models - {} models for brand '{}'.", models.len(), brand);
    if models.is_empty() {
        return Err(AppError::NotFound(format!("Unknown brand '{}'", brand)));
    }
    Ok(Json(models))
}

pub async fn compare(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    tracing::info!("[HANDLER] /api/compare/:slug - Request received for {}", slug);
    let comparison = app_state.catalog.compare(&slug);
    let (left, right) = comparison
        .pair()
        .ok_or_else(|| AppError::NotFound("One or both cars could not be loaded.".to_string()))?;

    let body = CompareResponse {
        left,
        right,
        rows: comparison
            .rows()
            .into_iter()
            .map(|(feature, left, right)| CompareRow { feature, left, right })
            .collect(),
    };
    Ok(Json(serde_json::to_value(body).map_err(anyhow::Error::from)?))
}

pub async fn finance_quote(
    State(app_state): State<AppState>,
    Query(params): Query<FinanceQuery>,
) -> AppResult<impl IntoResponse> {
    let inputs = params.inputs(app_state.settings.finance.calculator_inputs());
    let quote = finance::quote(&inputs);
    tracing::info!(?inputs, monthly = quote.monthly_payment, "[HANDLER] /api/finance - Quote computed.");
    Ok(Json(FinanceResponse { inputs, quote }))
}

pub async fn best_of(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let finance_inputs = app_state.settings.finance.listing_inputs();
    let picks = query::best_of_by_body_type(app_state.catalog.records(), 2, app_state.settings.results_limit);
    tracing::info!("[HANDLER] /api/best-of - Returning {} vehicles.", picks.len());
    let cars: Vec<CarSummary> = picks.iter().map(|r| CarSummary::new(r, &finance_inputs)).collect();
    Ok(Json(serde_json::to_value(cars).map_err(anyhow::Error::from)?))
}
