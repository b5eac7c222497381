// Server-rendered pages. Each handler runs the catalog query engine and hands
// plain view structs to an Askama template.

use askama::Template;
use axum::{
    extract::{Form, Path, RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::Query;
use chrono::Datelike;

use crate::{
    compare,
    error::{AppError, AppResult},
    finance, finder,
    finder::FinderStep,
    models::{FinanceInputs, NameField, SortKey, VehicleRecord},
    pricing::{format_rand, group_thousands},
    query,
    routes::params::{finder_field, BrowseQuery, CompareForm, FinanceQuery, FinderQuery, ListingQuery, SellCarForm},
    AppState,
};

// Body types considered for the home page "best of" list
const BEST_OF_PER_BODY_TYPE: usize = 2;

const BODY_TYPES: [(&str, &str); 4] = [("hatchback", "Hatchback"), ("suv", "SUV"), ("sedan", "Sedan"), ("bakkie", "Bakkie")];
const TRANSMISSIONS: [(&str, &str); 2] = [("manual", "Manual"), ("automatic", "Automatic")];
const FUEL_TYPES: [(&str, &str); 4] = [("petrol", "Petrol"), ("diesel", "Diesel"), ("hybrid", "Hybrid"), ("electric", "Electric")];
const DRIVES: [(&str, &str); 2] = [("4x2", "4X2"), ("4x4", "4X4")];
const SEATS: [(&str, &str); 5] = [("2", "2 seats"), ("4", "4 seats"), ("5", "5 seats"), ("6", "6 seats"), ("7", "7 seats")];
const LISTING_TERMS: [u32; 6] = [12, 24, 36, 48, 60, 72];
const CALCULATOR_TERMS: [u32; 4] = [36, 48, 60, 72];

// The brand and model pages offer a few more choices than the home page checkboxes
const BROWSE_TRANSMISSIONS: [(&str, &str); 3] = [("manual", "Manual"), ("automatic", "Automatic"), ("cvt", "CVT")];
const BROWSE_BODY_TYPES: [(&str, &str); 5] = [
    ("hatchback", "Hatchback"),
    ("sedan", "Sedan"),
    ("suv", "SUV"),
    ("bakkie", "Bakkie"),
    ("van", "Van"),
];

// Shortcuts shown on the home page, each a saved home page query
const POPULAR_PAGES: [(&str, &str); 5] = [
    ("Best Cars Under R300k", "/?max_price=300000&sort=price"),
    ("Most Fuel Efficient Hatchbacks", "/?body=hatchback&fuel=hybrid&fuel=electric&sort=price"),
    ("Compare Polo vs i20", "/compare/polo-vs-i20"),
    ("Top SUVs in South Africa", "/?body=suv&sort=newest"),
    ("Car Finance Calculator", "/tools/finance-calculator"),
];

// --- View models ---

pub struct CarCard {
    pub href: String,
    pub title: String,
    pub variant: String,
    pub vehicle_type: String,
    pub price: String,
    pub monthly: String,
    pub specs: String,
}

impl CarCard {
    fn new(record: &VehicleRecord, finance_inputs: &FinanceInputs) -> Self {
        let price = record.price_amount();
        let monthly = finance::monthly_payment(&finance_inputs.for_price(price));
        let specs = [record.transmission.as_deref(), record.fuel_type.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" • ");
        CarCard {
            href: record.href(),
            title: record.display_name(),
            variant: record.variant.clone(),
            vehicle_type: record.vehicle_type_label().to_string(),
            price: format_rand(price),
            monthly: format_rand(monthly),
            specs,
        }
    }
}

fn cards(records: &[&VehicleRecord], finance_inputs: &FinanceInputs) -> Vec<CarCard> {
    records.iter().map(|r| CarCard::new(r, finance_inputs)).collect()
}

pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

fn options(choices: &[(&str, &str)], selected: &[String]) -> Vec<SelectOption> {
    choices
        .iter()
        .map(|(value, label)| SelectOption {
            value: value.to_string(),
            label: label.to_string(),
            selected: selected.iter().any(|s| s.eq_ignore_ascii_case(value)),
        })
        .collect()
}

fn named_options(names: Vec<String>, selected: &str) -> Vec<SelectOption> {
    names
        .into_iter()
        .map(|name| SelectOption {
            selected: name.to_lowercase() == selected.trim().to_lowercase(),
            label: name.clone(),
            value: name,
        })
        .collect()
}

fn term_options(terms: &[u32], selected: u32) -> Vec<SelectOption> {
    terms
        .iter()
        .map(|t| SelectOption {
            value: t.to_string(),
            label: format!("{} months", t),
            selected: *t == selected,
        })
        .collect()
}

fn sort_options(selected: SortKey, name_label: &str, with_newest: bool) -> Vec<SelectOption> {
    let mut choices = vec![("", "Sort by"), ("price", "Lowest Price"), ("name", name_label)];
    if with_newest {
        choices.push(("newest", "Newest"));
    }
    choices
        .into_iter()
        .map(|(value, label)| SelectOption {
            value: value.to_string(),
            label: label.to_string(),
            selected: value == selected.as_param(),
        })
        .collect()
}

// Renders a template, mapping failures to a 500
fn render<T: Template>(template: &T) -> AppResult<Html<String>> {
    match template.render() {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            tracing::error!("Failed to render template: {}", e);
            Err(AppError::from(e))
        }
    }
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}

// --- Home ---

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    year: i32,
    popular: Vec<(String, String)>,
    q: String,
    brand_options: Vec<SelectOption>,
    model_options: Vec<SelectOption>,
    has_make: bool,
    body_options: Vec<SelectOption>,
    transmission_options: Vec<SelectOption>,
    fuel_options: Vec<SelectOption>,
    drive_options: Vec<SelectOption>,
    seat_options: Vec<SelectOption>,
    min_price: String,
    max_price: String,
    sort_options: Vec<SelectOption>,
    show_more_filters: bool,
    deposit: String,
    term_options: Vec<SelectOption>,
    rate: String,
    balloon: String,
    min_monthly: String,
    max_monthly: String,
    export_href: String,
    total: usize,
    cars: Vec<CarCard>,
    best_of: Vec<CarCard>,
}

pub async fn home_page(
    State(app_state): State<AppState>,
    Query(listing): Query<ListingQuery>,
    RawQuery(raw_query): RawQuery,
) -> AppResult<Html<String>> {
    let catalog = &app_state.catalog;
    let listing = listing.without_stale_model(catalog);
    let limit = app_state.settings.results_limit;
    let finance_inputs = listing.finance(app_state.settings.finance.listing_inputs());
    let criteria = listing.criteria();
    tracing::info!(?criteria, "[PAGE] / - Rendering home page.");

    let results = query::sorted(
        query::filter(catalog.records(), &criteria, &finance_inputs),
        listing.sort_key(),
    );
    tracing::debug!("[PAGE] / - {} of {} vehicles match.", results.len(), catalog.len());
    let shown: Vec<&VehicleRecord> = results.iter().take(limit).copied().collect();
    let best_of = query::best_of_by_body_type(catalog.records(), BEST_OF_PER_BODY_TYPE, limit);

    let models = if listing.make.trim().is_empty() {
        Vec::new()
    } else {
        catalog.models_for(&listing.make)
    };

    // The export applies exactly the filters of this page
    let export_href = match raw_query {
        Some(raw) if !raw.is_empty() => format!("/api/cars/export.csv?{}", raw),
        _ => "/api/cars/export.csv".to_string(),
    };

    let template = HomeTemplate {
        year: current_year(),
        popular: POPULAR_PAGES
            .iter()
            .map(|(title, href)| (title.to_string(), href.to_string()))
            .collect(),
        q: listing.q.clone(),
        brand_options: named_options(catalog.brands(), &listing.make),
        model_options: named_options(models, &listing.model),
        has_make: !listing.make.trim().is_empty(),
        body_options: options(&BODY_TYPES, &criteria.body_types),
        transmission_options: options(&TRANSMISSIONS, &criteria.transmissions),
        fuel_options: options(&FUEL_TYPES, &criteria.fuel_types),
        drive_options: options(&DRIVES, &criteria.drives),
        seat_options: options(
            &SEATS,
            &criteria.seats.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        ),
        min_price: listing.min_price.clone(),
        max_price: listing.max_price.clone(),
        sort_options: sort_options(listing.sort_key(), "Name (A-Z)", true),
        show_more_filters: listing.has_finance_options(),
        deposit: listing.deposit.clone(),
        term_options: term_options(&LISTING_TERMS, finance_inputs.term_months),
        rate: finance_inputs.annual_interest_rate_percent.to_string(),
        balloon: finance_inputs.balloon_percent.to_string(),
        min_monthly: listing.min_monthly.clone(),
        max_monthly: listing.max_monthly.clone(),
        export_href,
        total: results.len(),
        cars: cards(&shown, &finance_inputs),
        best_of: cards(&best_of, &finance_inputs),
    };
    render(&template)
}

// --- Brand & model browsing ---

pub struct ModelGroup {
    pub model: String,
    pub href: String,
    pub cars: Vec<CarCard>,
}

#[derive(Template)]
#[template(path = "brand.html")]
struct BrandTemplate {
    year: i32,
    brand: String,
    sort_options: Vec<SelectOption>,
    fuel_options: Vec<SelectOption>,
    transmission_options: Vec<SelectOption>,
    body_options: Vec<SelectOption>,
    groups: Vec<ModelGroup>,
}

pub async fn brand_page(
    State(app_state): State<AppState>,
    Path(brand): Path<String>,
    Query(browse): Query<BrowseQuery>,
) -> AppResult<Html<String>> {
    tracing::info!("[PAGE] /cars/:brand - Request received for brand: {}", brand);
    let finance_inputs = app_state.settings.finance.listing_inputs();
    let records = app_state.catalog.by_brand(&brand);
    let sort_key = SortKey::from_param(&browse.sort, NameField::Model);
    let matching = query::sorted(query::filter(records, &browse.criteria(), &finance_inputs), sort_key);

    let mut groups: Vec<ModelGroup> = query::group_by(matching, query::by_model)
        .into_iter()
        .map(|(model, cars)| ModelGroup {
            href: format!(
                "/cars/{}/{}",
                crate::models::path_segment(&cars[0].brand),
                crate::models::path_segment(&model)
            ),
            cars: cards(&cars, &finance_inputs),
            model,
        })
        .collect();
    groups.sort_by_key(|g| g.model.to_lowercase());
    tracing::debug!("[PAGE] /cars/:brand - {} model groups for brand '{}'.", groups.len(), brand);

    let template = BrandTemplate {
        year: current_year(),
        brand,
        sort_options: sort_options(sort_key, "Model Name (A-Z)", false),
        fuel_options: with_placeholder("Fuel", options(&FUEL_TYPES, &[browse.fuel.clone()])),
        transmission_options: with_placeholder(
            "Transmission",
            options(&BROWSE_TRANSMISSIONS, &[browse.transmission.clone()]),
        ),
        body_options: with_placeholder("Body", options(&BROWSE_BODY_TYPES, &[browse.body.clone()])),
        groups,
    };
    render(&template)
}

// Single-select dropdowns start with an empty "any" entry
fn with_placeholder(label: &str, mut choices: Vec<SelectOption>) -> Vec<SelectOption> {
    let any_selected = choices.iter().any(|c| c.selected);
    choices.insert(
        0,
        SelectOption {
            value: String::new(),
            label: label.to_string(),
            selected: !any_selected,
        },
    );
    choices
}

#[derive(Template)]
#[template(path = "model.html")]
struct ModelTemplate {
    year: i32,
    brand: String,
    model: String,
    sort_options: Vec<SelectOption>,
    fuel_options: Vec<SelectOption>,
    transmission_options: Vec<SelectOption>,
    body_options: Vec<SelectOption>,
    cars: Vec<CarCard>,
}

pub async fn model_page(
    State(app_state): State<AppState>,
    Path((brand, model)): Path<(String, String)>,
    Query(browse): Query<BrowseQuery>,
) -> AppResult<Html<String>> {
    tracing::info!("[PAGE] /cars/:brand/:model - Request received for {} {}", brand, model);
    let finance_inputs = app_state.settings.finance.listing_inputs();
    let records = app_state.catalog.by_model(&brand, &model);
    let sort_key = SortKey::from_param(&browse.sort, NameField::Variant);
    let matching = query::sorted(query::filter(records, &browse.criteria(), &finance_inputs), sort_key);

    let template = ModelTemplate {
        year: current_year(),
        brand,
        model,
        sort_options: sort_options(sort_key, "Variant Name (A-Z)", false),
        fuel_options: with_placeholder("Fuel", options(&FUEL_TYPES, &[browse.fuel.clone()])),
        transmission_options: with_placeholder(
            "Transmission",
            options(&BROWSE_TRANSMISSIONS, &[browse.transmission.clone()]),
        ),
        body_options: with_placeholder("Body", options(&BROWSE_BODY_TYPES, &[browse.body.clone()])),
        cars: cards(&matching, &finance_inputs),
    };
    render(&template)
}

#[derive(Template)]
#[template(path = "variant.html")]
struct VariantTemplate {
    year: i32,
    title: String,
    model_year: String,
    image_url: String,
    alt: String,
    price: String,
    monthly: String,
    specs: Vec<(String, String)>,
    calculator_href: String,
    model_href: String,
}

pub async fn variant_page(
    State(app_state): State<AppState>,
    Path((brand, model, variant)): Path<(String, String, String)>,
) -> AppResult<Html<String>> {
    tracing::info!("[PAGE] /cars/:brand/:model/:variant - Request received for {}/{}/{}", brand, model, variant);
    let record = app_state
        .catalog
        .find_variant(&brand, &model, &variant)
        .ok_or_else(|| AppError::NotFound("Car variant not found".to_string()))?;

    let price = record.price_amount();
    let monthly = finance::monthly_payment(&app_state.settings.finance.listing_inputs().for_price(price));
    let optional = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

    let template = VariantTemplate {
        year: current_year(),
        title: record.full_label(),
        model_year: record.year.clone().unwrap_or_default(),
        image_url: record.image_url.clone().unwrap_or_default(),
        alt: format!("{} {}", record.model, record.variant),
        price: record.price.to_string(),
        monthly: format_rand(monthly),
        specs: vec![
            ("Fuel Type".to_string(), optional(&record.fuel_type)),
            ("Transmission".to_string(), optional(&record.transmission)),
            ("Body Type".to_string(), optional(&record.body_type)),
            ("Drive".to_string(), optional(&record.drive)),
            (
                "Seats".to_string(),
                record.seat_count().map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
            ),
            ("Year".to_string(), optional(&record.year)),
        ],
        calculator_href: format!("/tools/finance-calculator?price={}", price),
        model_href: format!(
            "/cars/{}/{}",
            crate::models::path_segment(&record.brand),
            crate::models::path_segment(&record.model)
        ),
    };
    render(&template)
}

// --- Comparison ---

#[derive(Template)]
#[template(path = "compare_form.html")]
struct CompareFormTemplate {
    year: i32,
    car1_options: Vec<SelectOption>,
    car2_options: Vec<SelectOption>,
    error: String,
}

impl CompareFormTemplate {
    fn new(labels: Vec<String>, car1: &str, car2: &str, error: &str) -> Self {
        CompareFormTemplate {
            year: current_year(),
            car1_options: label_options(&labels, car1),
            car2_options: label_options(&labels, car2),
            error: error.to_string(),
        }
    }
}

fn label_options(labels: &[String], selected: &str) -> Vec<SelectOption> {
    labels
        .iter()
        .map(|label| SelectOption {
            value: label.clone(),
            label: label.clone(),
            selected: label == selected,
        })
        .collect()
}

pub async fn compare_form_page(State(app_state): State<AppState>) -> AppResult<Html<String>> {
    tracing::info!("[PAGE] /compare-cars - Rendering compare form.");
    let template = CompareFormTemplate::new(app_state.catalog.variant_labels(), "", "", "");
    render(&template)
}

pub async fn compare_submit(
    State(app_state): State<AppState>,
    Form(form): Form<CompareForm>,
) -> AppResult<Response> {
    tracing::info!("[PAGE] POST /compare-cars - '{}' vs '{}'", form.car1, form.car2);
    let catalog = &app_state.catalog;
    let key = match (catalog.find_by_label(&form.car1), catalog.find_by_label(&form.car2)) {
        (Some(a), Some(b)) => compare::comparison_key(a, b),
        _ => None,
    };

    match key {
        Some(key) => Ok(Redirect::to(&format!("/compare/{}", crate::models::path_segment(&key))).into_response()),
        None => {
            let template = CompareFormTemplate::new(
                catalog.variant_labels(),
                &form.car1,
                &form.car2,
                "Please choose two different cars to compare.",
            );
            Ok((StatusCode::BAD_REQUEST, render(&template)?).into_response())
        }
    }
}

#[derive(Template)]
#[template(path = "compare.html")]
struct CompareTemplate {
    year: i32,
    resolved: bool,
    left_title: String,
    right_title: String,
    rows: Vec<(String, String, String)>,
}

pub async fn compare_page(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Html<String>> {
    tracing::info!("[PAGE] /compare/:slug - Request received for {}", slug);
    let comparison = app_state.catalog.compare(&slug);
    if !comparison.is_resolved() {
        tracing::warn!(
            left = comparison.left.is_some(),
            right = comparison.right.is_some(),
            "[PAGE] /compare/:slug - Comparison '{}' could not be resolved.",
            slug
        );
    }

    let (left_title, right_title) = comparison
        .pair()
        .map(|(a, b)| (a.display_name(), b.display_name()))
        .unwrap_or_default();
    let template = CompareTemplate {
        year: current_year(),
        resolved: comparison.is_resolved(),
        left_title,
        right_title,
        rows: comparison
            .rows()
            .into_iter()
            .map(|(feature, a, b)| (feature.to_string(), a, b))
            .collect(),
    };
    render(&template)
}

// --- Tools ---

#[derive(Template)]
#[template(path = "finance.html")]
struct FinanceTemplate {
    year: i32,
    price: String,
    deposit: String,
    rate: String,
    term_options: Vec<SelectOption>,
    balloon: String,
    balloon_amount: String,
    financed_amount: String,
    monthly_payment: String,
    total_repayable: String,
}

pub async fn finance_calculator_page(
    State(app_state): State<AppState>,
    Query(params): Query<FinanceQuery>,
) -> AppResult<Html<String>> {
    let inputs = params.inputs(app_state.settings.finance.calculator_inputs());
    let quote = finance::quote(&inputs);
    tracing::info!(?inputs, monthly = quote.monthly_payment, "[PAGE] /tools/finance-calculator - Quote computed.");

    let template = FinanceTemplate {
        year: current_year(),
        price: format!("{:.0}", inputs.price),
        deposit: format!("{:.0}", inputs.deposit),
        rate: format!("{:.2}", inputs.annual_interest_rate_percent),
        term_options: term_options(&CALCULATOR_TERMS, inputs.term_months),
        balloon: format!("{}", inputs.balloon_percent),
        balloon_amount: format_rand(quote.balloon_amount),
        financed_amount: format_rand(quote.financed_amount),
        monthly_payment: format_rand(quote.monthly_payment),
        total_repayable: format_rand(quote.total_repayable),
    };
    render(&template)
}

#[derive(Template)]
#[template(path = "finder.html")]
struct FinderTemplate {
    year: i32,
    at: usize,
    question: String,
    is_budget: bool,
    is_results: bool,
    budget: u64,
    budget_display: String,
    choices: Vec<(String, String)>,
    carried: Vec<(String, String)>,
    results: Vec<CarCard>,
}

pub async fn vehicle_finder_page(
    State(app_state): State<AppState>,
    Query(params): Query<FinderQuery>,
) -> AppResult<Html<String>> {
    let (step, answers) = params.resolve();
    tracing::info!(?step, ?answers, "[PAGE] /tools/vehicle-finder - Rendering step.");

    // Answers given so far travel along as hidden fields
    let mut carried: Vec<(String, String)> = params
        .carried()
        .iter()
        .filter(|(s, v)| !v.trim().is_empty() && s.index() < step.index())
        .map(|(s, v)| (finder_field(*s).to_string(), v.to_string()))
        .collect();
    if let (Some(answered), Some(answer)) = (params.at_step(), params.answer.as_deref()) {
        carried.retain(|(name, _)| name != finder_field(answered));
        carried.push((finder_field(answered).to_string(), answer.to_string()));
    }

    let results = if step == FinderStep::Results {
        let finance_inputs = app_state.settings.finance.listing_inputs();
        let picks = finder::recommend(app_state.catalog.records(), &answers, finder::MAX_RESULTS);
        cards(&picks, &finance_inputs)
    } else {
        Vec::new()
    };

    let template = FinderTemplate {
        year: current_year(),
        at: step.index(),
        question: step.question().to_string(),
        is_budget: step == FinderStep::Budget,
        is_results: step == FinderStep::Results,
        budget: answers.budget,
        budget_display: group_thousands(answers.budget),
        choices: step.choices(),
        carried,
        results,
    };
    render(&template)
}

// --- Sell your car ---

#[derive(Template)]
#[template(path = "sell.html")]
struct SellTemplate {
    year: i32,
    submitted: bool,
    errors: Vec<String>,
    form: SellCarForm,
}

pub async fn sell_page() -> AppResult<Html<String>> {
    let template = SellTemplate {
        year: current_year(),
        submitted: false,
        errors: Vec::new(),
        form: SellCarForm::default(),
    };
    render(&template)
}

pub async fn sell_submit(Form(form): Form<SellCarForm>) -> AppResult<(StatusCode, Html<String>)> {
    let missing = form.missing_fields();
    if !missing.is_empty() {
        tracing::info!(?missing, "[PAGE] POST /sell-your-car - Incomplete listing rejected.");
        let template = SellTemplate {
            year: current_year(),
            submitted: false,
            errors: missing.iter().map(|f| format!("Please provide a valid {}.", f)).collect(),
            form,
        };
        return Ok((StatusCode::BAD_REQUEST, render(&template)?));
    }

    // Listings are acknowledged only; there is no store behind this form
    tracing::info!(
        brand = %form.brand,
        model = %form.model,
        year = %form.year,
        mileage = %form.mileage,
        "[PAGE] POST /sell-your-car - Listing submitted."
    );
    let template = SellTemplate {
        year: current_year(),
        submitted: true,
        errors: Vec::new(),
        form,
    };
    Ok((StatusCode::OK, render(&template)?))
}
