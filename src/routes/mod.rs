// Route definitions

use axum::{
    routing::get,
    Router,
};

use crate::AppState;

// Declare submodules for different route groups
mod api;
pub mod pages;
pub mod params;

// Static files are nested by the caller (see main.rs) so tests can build the
// router without a static directory.
pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/cars", get(api::list_cars))
        .route("/cars/export.csv", get(api::export_cars))
        .route("/cars/:slug", get(api::get_car))
        .route("/brands", get(api::get_brands))
        .route("/brands/:brand/models", get(api::get_models))
        .route("/compare/:slug", get(api::compare))
        .route("/finance", get(api::finance_quote))
        .route("/best-of", get(api::best_of))
        .with_state(app_state.clone());

    Router::new()
        .route("/", get(pages::home_page))
        .route("/cars/:brand", get(pages::brand_page))
        .route("/cars/:brand/:model", get(pages::model_page))
        .route("/cars/:brand/:model/:variant", get(pages::variant_page))
        .route("/compare-cars", get(pages::compare_form_page).post(pages::compare_submit))
        .route("/compare/:slug", get(pages::compare_page))
        .route("/tools/finance-calculator", get(pages::finance_calculator_page))
        .route("/tools/vehicle-finder", get(pages::vehicle_finder_page))
        .route("/sell-your-car", get(pages::sell_page).post(pages::sell_submit))
        .nest("/api", api_router)
        .with_state(app_state)
}
