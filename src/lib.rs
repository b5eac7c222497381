// Car price guide: catalog query engine, finance estimator and the web layer on top

use axum::extract::FromRef;
use std::sync::Arc;

pub mod catalog;
pub mod compare;
pub mod config;
pub mod error;
pub mod export;
pub mod finance;
pub mod finder;
pub mod models;
pub mod pricing;
pub mod query;
pub mod routes;

use crate::{catalog::Catalog, config::Settings};

// Shared, read-only application state
#[derive(Clone, FromRef)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(settings: Settings, catalog: Catalog) -> Self {
        AppState {
            settings: Arc::new(settings),
            catalog: Arc::new(catalog),
        }
    }
}
