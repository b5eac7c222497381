// Settings loaded with the 'config' crate: defaults, then an optional
// config.toml, then APP_* environment variables (nested keys use "__",
// e.g. APP_FINANCE__INTEREST_RATE=12.5)

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::FinanceInputs;

#[derive(Debug, Deserialize, Clone)]
pub struct FinanceSettings {
    // Finance assumptions behind the "Est. Monthly" figures on listing pages
    pub deposit: f64,
    pub interest_rate: f64,
    pub term_months: u32,
    pub balloon_percent: f64,
    // Initial values of the finance calculator
    pub calculator_price: f64,
    pub calculator_interest_rate: f64,
}

impl FinanceSettings {
    pub fn listing_inputs(&self) -> FinanceInputs {
        FinanceInputs {
            price: 0.0,
            deposit: self.deposit,
            annual_interest_rate_percent: self.interest_rate,
            term_months: self.term_months,
            balloon_percent: self.balloon_percent,
        }
    }

    pub fn calculator_inputs(&self) -> FinanceInputs {
        FinanceInputs {
            price: self.calculator_price,
            deposit: self.deposit,
            annual_interest_rate_percent: self.calculator_interest_rate,
            term_months: self.term_months,
            balloon_percent: self.balloon_percent,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server_address: String,
    pub catalog_path: String,
    pub static_dir: String,
    // Cards shown on the home page
    pub results_limit: usize,
    pub finance: FinanceSettings,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present
        Self::load(None)
    }

    /// Builds settings from the defaults, `config_file` (or `config.toml` in the
    /// working directory when `None`) and the environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let file_source = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name("config").required(false),
        };

        let builder = Config::builder()
            .set_default("server_address", "127.0.0.1:3000")?
            .set_default("catalog_path", "data/car-data.json")?
            .set_default("static_dir", "static")?
            .set_default("results_limit", 9)?
            .set_default("finance.deposit", 0.0)?
            .set_default("finance.interest_rate", 11.0)?
            .set_default("finance.term_months", 60)?
            .set_default("finance.balloon_percent", 0.0)?
            .set_default("finance.calculator_price", 300_000.0)?
            .set_default("finance.calculator_interest_rate", 11.75)?
            .add_source(file_source)
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            server_address: "127.0.0.1:3000".to_string(),
            catalog_path: "data/car-data.json".to_string(),
            static_dir: "static".to_string(),
            results_limit: 9,
            finance: FinanceSettings {
                deposit: 0.0,
                interest_rate: 11.0,
                term_months: 60,
                balloon_percent: 0.0,
                calculator_price: 300_000.0,
                calculator_interest_rate: 11.75,
            },
        }
    }
}
