// Catalog-level behaviour: loading, lookups, comparison keys and the query
// engine run against a whole catalog

mod support;

use carguide_rust::{
    catalog::Catalog,
    error::CatalogError,
    finance, finder,
    models::{FilterCriteria, FinanceInputs, NameField, RawSeats, SortKey},
    query,
};

use support::{car, catalog, slugs};

#[test]
fn comparison_key_resolves_both_sides() {
    let catalog = catalog();

    let comparison = catalog.compare("polo-vs-i20");
    let (left, right) = comparison.pair().expect("both sides resolve");
    assert_eq!(left.variant_slug, "polo");
    assert_eq!(right.variant_slug, "i20");
    assert_eq!(comparison.rows().len(), 9);

    let missing = catalog.compare("polo-vs-missing");
    assert!(missing.left.is_some());
    assert!(missing.right.is_none());
    assert!(!missing.is_resolved());
    assert!(missing.rows().is_empty());

    // No separator at all: only the left side is looked up
    assert!(!catalog.compare("polo").is_resolved());
}

#[test]
fn seat_filter_uses_parsed_counts() {
    let mut five = car("five", 200_000, Some("Hatchback"));
    five.seats = Some(RawSeats::Text("5".into()));
    let mut seven = car("seven", 300_000, Some("SUV"));
    seven.seats = Some(RawSeats::Text("7".into()));
    let mut unknown = car("unknown", 250_000, Some("SUV"));
    unknown.seats = None;
    let records = vec![five, seven, unknown];

    let criteria = FilterCriteria { seats: vec![5], ..Default::default() };
    let result = query::filter(&records, &criteria, &FinanceInputs::default());
    assert_eq!(slugs(&result), vec!["five"]);
}

#[test]
fn best_of_takes_two_cheapest_per_body_type() {
    let mut records = Vec::new();
    for i in 0..10u64 {
        records.push(car(&format!("hatch-{}", i), 300_000 - i * 10_000, Some("Hatchback")));
        records.push(car(&format!("suv-{}", i), 500_000 - i * 10_000, Some("SUV")));
    }

    let picks = query::best_of_by_body_type(&records, 2, 9);
    assert_eq!(picks.len(), 4);
    assert_eq!(slugs(&picks), vec!["hatch-9", "hatch-8", "suv-9", "suv-8"]);

    let capped = query::best_of_by_body_type(&records, 2, 3);
    assert_eq!(capped.len(), 3);
}

#[test]
fn keyword_matches_brand_model_or_variant() {
    let catalog = catalog();
    let finance_inputs = FinanceInputs::default();
    let search = |keyword: &str| {
        let criteria = FilterCriteria { keyword: keyword.into(), ..Default::default() };
        slugs(&query::filter(catalog.records(), &criteria, &finance_inputs))
    };

    assert_eq!(search("TOYOTA"), vec!["fortuner-28-vx", "hilux-20-s"]);
    assert_eq!(search("motion"), vec!["i20"]);
    assert_eq!(search("pik"), vec!["pik-up-s6"]);
    assert!(search("tesla").is_empty());
}

#[test]
fn missing_optional_fields_never_match_a_specific_value() {
    let catalog = catalog();
    let criteria = FilterCriteria::default().with_body_type(Some("hatchback"));
    let result = query::filter(catalog.records(), &criteria, &FinanceInputs::default());
    assert_eq!(slugs(&result), vec!["polo", "i20", "picanto-start"]);

    // The Mahindra has no drive; the Picanto has none either
    let criteria = FilterCriteria { drives: vec!["4x2".into()], ..Default::default() };
    let result = query::filter(catalog.records(), &criteria, &FinanceInputs::default());
    assert_eq!(slugs(&result), vec!["polo", "i20", "hilux-20-s"]);
}

#[test]
fn monthly_range_depends_on_finance_inputs() {
    let catalog = catalog();
    let criteria = FilterCriteria { max_monthly: Some(7_000), ..Default::default() };

    // "POA" parses to 0 and so always fits under a monthly cap
    let standard = query::filter(catalog.records(), &criteria, &FinanceInputs::default());
    // The Hilux (R344 600) comes to R7 492 a month and misses the cap
    assert_eq!(slugs(&standard), vec!["i20", "picanto-start", "pik-up-s6"]);

    let with_deposit = FinanceInputs { deposit: 100_000.0, ..FinanceInputs::default() };
    let result = query::filter(catalog.records(), &criteria, &with_deposit);
    assert_eq!(slugs(&result), vec!["polo", "i20", "hilux-20-s", "picanto-start", "pik-up-s6"]);
    for record in &result {
        assert!(finance::monthly_payment(&with_deposit.for_price(record.price_amount())) <= 7_000);
    }
}

#[test]
fn sorting_whole_catalog() {
    let catalog = catalog();
    let all: Vec<_> = catalog.records().iter().collect();

    let by_price = query::sorted(all.clone(), SortKey::Price);
    assert_eq!(by_price[0].variant_slug, "pik-up-s6");
    assert_eq!(by_price.last().map(|r| r.variant_slug.as_str()), Some("fortuner-28-vx"));

    let by_name = query::sorted(all.clone(), SortKey::Name(NameField::BrandModel));
    assert_eq!(
        slugs(&by_name),
        vec!["i20", "picanto-start", "pik-up-s6", "fortuner-28-vx", "hilux-20-s", "polo"]
    );

    // Records without a timestamp go last, in catalog order
    let newest = query::sorted(all, SortKey::Newest);
    assert_eq!(
        slugs(&newest),
        vec!["polo", "i20", "picanto-start", "fortuner-28-vx", "hilux-20-s", "pik-up-s6"]
    );
}

#[test]
fn brand_pages_group_by_model() {
    let catalog = catalog();
    let groups = query::group_by(catalog.by_brand("toyota"), query::by_model);
    let keys: Vec<&str> = groups.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["Fortuner", "Hilux"]);
    assert_eq!(catalog.models_for("TOYOTA"), vec!["Fortuner", "Hilux"]);
}

#[test]
fn lookups_are_case_insensitive() {
    let catalog = catalog();
    assert!(catalog.find_by_slug("POLO").is_some());
    assert!(catalog.find_variant("volkswagen", "polo", "polo").is_some());
    assert!(catalog.find_variant("volkswagen", "golf", "polo").is_none());
    assert!(catalog.find_by_label("Hyundai i20 1.2 Motion").is_some());
}

#[test]
fn duplicate_slugs_are_rejected() {
    let records = vec![car("polo", 1, None), car("Polo", 2, None)];
    match Catalog::new(records) {
        Err(CatalogError::DuplicateSlug(slug)) => assert_eq!(slug, "Polo"),
        other => panic!("expected a duplicate slug error, got {:?}", other.map(|c| c.len())),
    }
}

#[test]
fn fractional_prices_do_not_break_loading() {
    let catalog = Catalog::from_json(
        r#"[{"brand": "Kia", "model": "Rio", "variant": "1.4 LS", "variantSlug": "rio-ls", "price": 299999.5, "seats": 5.0}]"#,
    )
    .expect("fractional numbers load");
    let record = catalog.find_by_slug("rio-ls").expect("record present");
    assert_eq!(record.price_amount(), 300_000);
    assert_eq!(record.seat_count(), Some(5));
}

#[test]
fn bundled_catalog_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/car-data.json");
    let catalog = Catalog::load(path).expect("bundled catalog is valid");
    assert!(catalog.len() >= 20);
    assert!(catalog.compare("polo-vs-i20").is_resolved());
}

#[test]
fn finder_recommends_within_budget() {
    let catalog = catalog();
    let mut answers = finder::FinderAnswers::default();
    answers.answer(finder::FinderStep::Budget, "310000");
    answers.answer(finder::FinderStep::BootSpace, "yes");

    let picks = finder::recommend(catalog.records(), &answers, finder::MAX_RESULTS);
    assert_eq!(slugs(&picks), vec!["i20", "picanto-start"]);
}
