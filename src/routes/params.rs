// Query-string and form structures. Numeric inputs arrive as text from HTML
// forms (often empty), so they are parsed leniently instead of by serde.

use serde::Deserialize;

use crate::{
    catalog::Catalog,
    finder::{FinderAnswers, FinderStep},
    models::{FilterCriteria, FinanceInputs, NameField, SortKey},
    pricing,
};

// "" / "abc" -> None, "R150 000" -> Some(150000)
fn amount(raw: &str) -> Option<u64> {
    Some(pricing::parse_price_text(raw)).filter(|n| *n > 0)
}

fn decimal(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

fn cleaned(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Filters, sort and finance options shared by the home page and `/api/cars`.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ListingQuery {
    pub q: String,
    pub make: String,
    pub model: String,
    pub min_price: String,
    pub max_price: String,
    pub body: Vec<String>,
    pub transmission: Vec<String>,
    pub fuel: Vec<String>,
    pub drive: Vec<String>,
    pub seats: Vec<String>,
    pub sort: String,
    // Finance options
    pub deposit: String,
    pub term: String,
    pub rate: String,
    pub balloon: String,
    pub min_monthly: String,
    pub max_monthly: String,
}

impl ListingQuery {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            keyword: self.q.trim().to_string(),
            brand: self.make.trim().to_string(),
            model: self.model.trim().to_string(),
            min_price: amount(&self.min_price),
            max_price: amount(&self.max_price),
            min_monthly: amount(&self.min_monthly),
            max_monthly: amount(&self.max_monthly),
            fuel_types: cleaned(&self.fuel),
            transmissions: cleaned(&self.transmission),
            body_types: cleaned(&self.body),
            drives: cleaned(&self.drive),
            seats: self.seats.iter().filter_map(|s| pricing::parse_seats(s)).collect(),
        }
    }

    // Missing or invalid finance options fall back to `defaults`
    pub fn finance(&self, defaults: FinanceInputs) -> FinanceInputs {
        FinanceInputs {
            price: defaults.price,
            // An explicit "0" is a real choice, only a blank field falls back
            deposit: if self.deposit.trim().is_empty() {
                defaults.deposit
            } else {
                pricing::parse_price_text(&self.deposit) as f64
            },
            annual_interest_rate_percent: decimal(&self.rate).unwrap_or(defaults.annual_interest_rate_percent),
            term_months: self
                .term
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|t| *t > 0)
                .unwrap_or(defaults.term_months),
            balloon_percent: decimal(&self.balloon).unwrap_or(defaults.balloon_percent),
        }
    }

    pub fn sort_key(&self) -> SortKey {
        SortKey::from_param(&self.sort, NameField::BrandModel)
    }

    /// Clears a model left over from a previously selected make.
    pub fn without_stale_model(mut self, catalog: &Catalog) -> Self {
        if !self.make.trim().is_empty() && !self.model.trim().is_empty() {
            let known = catalog
                .models_for(&self.make)
                .iter()
                .any(|m| m.eq_ignore_ascii_case(self.model.trim()));
            if !known {
                self.model.clear();
            }
        }
        self
    }

    // Whether any of the "more filters" finance fields were submitted
    pub fn has_finance_options(&self) -> bool {
        [&self.deposit, &self.term, &self.rate, &self.balloon, &self.min_monthly, &self.max_monthly]
            .iter()
            .any(|v| !v.trim().is_empty())
    }
}

/// Single-select filters of the brand and model pages.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct BrowseQuery {
    pub sort: String,
    pub fuel: String,
    pub transmission: String,
    pub body: String,
}

impl BrowseQuery {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::default()
            .with_fuel_type(Some(self.fuel.to_lowercase().as_str()))
            .with_transmission(Some(self.transmission.to_lowercase().as_str()))
            .with_body_type(Some(self.body.to_lowercase().as_str()))
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct FinanceQuery {
    pub price: String,
    pub deposit: String,
    pub rate: String,
    pub term: String,
    pub balloon: String,
}

impl FinanceQuery {
    pub fn inputs(&self, defaults: FinanceInputs) -> FinanceInputs {
        FinanceInputs {
            price: amount(&self.price).map(|p| p as f64).unwrap_or(defaults.price),
            deposit: if self.deposit.trim().is_empty() {
                defaults.deposit
            } else {
                pricing::parse_price_text(&self.deposit) as f64
            },
            annual_interest_rate_percent: decimal(&self.rate).unwrap_or(defaults.annual_interest_rate_percent),
            term_months: self.term.trim().parse::<u32>().unwrap_or(defaults.term_months),
            balloon_percent: decimal(&self.balloon).unwrap_or(defaults.balloon_percent),
        }
    }
}

/// Vehicle finder state carried between steps. `at` is the step being answered
/// and `answer` its value; the other fields are answers already given.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct FinderQuery {
    pub at: String,
    pub answer: Option<String>,
    pub budget: String,
    pub boot: String,
    pub transmission: String,
    pub seats: String,
    pub fuel: String,
    pub body: String,
}

impl FinderQuery {
    // The step being answered; blank or garbled values mean none
    pub fn at_step(&self) -> Option<FinderStep> {
        self.at.trim().parse::<usize>().ok().map(FinderStep::from_index)
    }

    pub fn carried(&self) -> [(FinderStep, &str); 6] {
        [
            (FinderStep::Budget, self.budget.as_str()),
            (FinderStep::BootSpace, self.boot.as_str()),
            (FinderStep::Transmission, self.transmission.as_str()),
            (FinderStep::Seats, self.seats.as_str()),
            (FinderStep::FuelType, self.fuel.as_str()),
            (FinderStep::BodyType, self.body.as_str()),
        ]
    }

    /// Rebuilds the answers and works out which step to show next.
    pub fn resolve(&self) -> (FinderStep, FinderAnswers) {
        let mut answers = FinderAnswers::default();
        for (step, value) in self.carried() {
            if !value.trim().is_empty() {
                answers.answer(step, value);
            }
        }

        let step = match (self.at_step(), self.answer.as_deref()) {
            (Some(step), Some(answer)) => {
                answers.answer(step, answer);
                step.next()
            }
            (Some(step), None) => step,
            (None, _) => FinderStep::Budget,
        };
        (step, answers)
    }
}

// Name of the query field that carries a step's answer
pub fn finder_field(step: FinderStep) -> &'static str {
    match step {
        FinderStep::Budget => "budget",
        FinderStep::BootSpace => "boot",
        FinderStep::Transmission => "transmission",
        FinderStep::Seats => "seats",
        FinderStep::FuelType => "fuel",
        FinderStep::BodyType => "body",
        FinderStep::Results => "",
    }
}

#[derive(Debug, Deserialize)]
pub struct CompareForm {
    pub car1: String,
    pub car2: String,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SellCarForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub brand: String,
    pub model: String,
    pub year: String,
    pub mileage: String,
    pub price: String,
    pub notes: String,
}

impl SellCarForm {
    // Required: name, email, brand, model, year, mileage
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("brand", &self.brand),
            ("model", &self.model),
            ("year", &self.year),
            ("mileage", &self.mileage),
        ];
        let mut missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(k, _)| *k)
            .collect();
        if !self.email.trim().is_empty() && !self.email.contains('@') {
            missing.push("email");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_query_parses_leniently() {
        let query = ListingQuery {
            q: " polo ".into(),
            min_price: "".into(),
            max_price: "R300 000".into(),
            body: vec!["SUV".into(), " ".into()],
            seats: vec!["5".into(), "x".into()],
            rate: "abc".into(),
            term: "72".into(),
            ..Default::default()
        };
        let criteria = query.criteria();
        assert_eq!(criteria.keyword, "polo");
        assert_eq!(criteria.min_price, None);
        assert_eq!(criteria.max_price, Some(300_000));
        assert_eq!(criteria.body_types, vec!["suv".to_string()]);
        assert_eq!(criteria.seats, vec![5]);

        let finance = query.finance(FinanceInputs::default());
        assert_eq!(finance.annual_interest_rate_percent, 11.0);
        assert_eq!(finance.term_months, 72);
        assert!(query.has_finance_options());
    }

    #[test]
    fn explicit_zero_deposit_overrides_default() {
        let defaults = FinanceInputs { deposit: 50_000.0, ..Default::default() };
        let zero = ListingQuery { deposit: "0".into(), ..Default::default() };
        assert_eq!(zero.finance(defaults).deposit, 0.0);

        let blank = ListingQuery::default();
        assert_eq!(blank.finance(defaults).deposit, 50_000.0);

        let typed = ListingQuery { deposit: "R20 000".into(), ..Default::default() };
        assert_eq!(typed.finance(defaults).deposit, 20_000.0);
    }

    #[test]
    fn stale_model_is_dropped_when_make_changes() {
        let catalog = Catalog::from_json(
            r#"[{"brand": "Toyota", "model": "Hilux", "variant": "2.0 S", "variantSlug": "hilux"},
                {"brand": "Volkswagen", "model": "Polo", "variant": "Life", "variantSlug": "polo"}]"#,
        )
        .expect("catalog");

        let stale = ListingQuery { make: "Toyota".into(), model: "Polo".into(), ..Default::default() };
        assert_eq!(stale.without_stale_model(&catalog).model, "");

        let current = ListingQuery { make: "toyota".into(), model: "hilux".into(), ..Default::default() };
        assert_eq!(current.without_stale_model(&catalog).model, "hilux");
    }

    #[test]
    fn finance_query_defaults() {
        let defaults = FinanceInputs { price: 300_000.0, annual_interest_rate_percent: 11.75, ..Default::default() };
        let inputs = FinanceQuery::default().inputs(defaults);
        assert_eq!(inputs, defaults);

        let query = FinanceQuery { price: "250000".into(), deposit: "0".into(), balloon: "20".into(), ..Default::default() };
        let inputs = query.inputs(defaults);
        assert_eq!(inputs.price, 250_000.0);
        assert_eq!(inputs.deposit, 0.0);
        assert_eq!(inputs.balloon_percent, 20.0);
    }

    #[test]
    fn finder_query_advances() {
        let fresh = FinderQuery::default();
        assert_eq!(fresh.resolve().0, FinderStep::Budget);

        let blank = FinderQuery { at: "".into(), answer: Some("yes".into()), ..Default::default() };
        assert_eq!(blank.at_step(), None);
        assert_eq!(blank.resolve().0, FinderStep::Budget);

        let query = FinderQuery {
            at: FinderStep::Transmission.index().to_string(),
            answer: Some("manual".into()),
            budget: "250000".into(),
            boot: "yes".into(),
            ..Default::default()
        };
        let (step, answers) = query.resolve();
        assert_eq!(step, FinderStep::Seats);
        assert_eq!(answers.budget, 250_000);
        assert_eq!(answers.boot_space, Some(true));
        assert_eq!(answers.transmission.as_deref(), Some("manual"));
    }

    #[test]
    fn sell_form_validation() {
        let form = SellCarForm {
            name: "Thandi".into(),
            email: "not-an-email".into(),
            brand: "Toyota".into(),
            model: "Corolla".into(),
            year: "2019".into(),
            ..Default::default()
        };
        assert_eq!(form.missing_fields(), vec!["mileage", "email"]);
    }
}
