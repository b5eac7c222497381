// Catalog query engine: predicate filtering, sorting and grouping over the
// in-memory vehicle list. Pure functions, no I/O.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashMap;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::{
    finance,
    models::{FilterCriteria, FinanceInputs, NameField, SortKey, VehicleRecord},
};

// Case-insensitive equality for optional catalog fields. A missing field never matches.
fn field_in(field: Option<&str>, allowed: &[String]) -> bool {
    match field {
        Some(value) => {
            let value = value.trim().to_lowercase();
            allowed.iter().any(|a| a.trim().to_lowercase() == value)
        }
        None => false,
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

// Zero bounds mean "no restriction"
fn active(bound: Option<u64>) -> Option<u64> {
    bound.filter(|b| *b > 0)
}

/// Tests a single record against every active criterion.
pub fn matches(record: &VehicleRecord, criteria: &FilterCriteria, finance_inputs: &FinanceInputs) -> bool {
    let keyword = criteria.keyword.trim().to_lowercase();
    if !keyword.is_empty()
        && !(record.brand.to_lowercase().contains(&keyword)
            || record.model.to_lowercase().contains(&keyword)
            || record.variant.to_lowercase().contains(&keyword))
    {
        return false;
    }

    if !criteria.brand.trim().is_empty() && !eq_ignore_case(&record.brand, &criteria.brand) {
        return false;
    }
    if !criteria.model.trim().is_empty() && !eq_ignore_case(&record.model, &criteria.model) {
        return false;
    }

    let price = record.price_amount();
    if let Some(min) = active(criteria.min_price) {
        if price < min {
            return false;
        }
    }
    if let Some(max) = active(criteria.max_price) {
        if price > max {
            return false;
        }
    }

    if !criteria.body_types.is_empty() && !field_in(record.body_type.as_deref(), &criteria.body_types) {
        return false;
    }
    if !criteria.transmissions.is_empty()
        && !field_in(record.transmission.as_deref(), &criteria.transmissions)
    {
        return false;
    }
    if !criteria.fuel_types.is_empty() && !field_in(record.fuel_type.as_deref(), &criteria.fuel_types) {
        return false;
    }
    if !criteria.drives.is_empty() && !field_in(record.drive.as_deref(), &criteria.drives) {
        return false;
    }
    if !criteria.seats.is_empty() {
        match record.seat_count() {
            Some(seats) if criteria.seats.contains(&seats) => {}
            _ => return false,
        }
    }

    let min_monthly = active(criteria.min_monthly);
    let max_monthly = active(criteria.max_monthly);
    if min_monthly.is_some() || max_monthly.is_some() {
        let monthly = finance::monthly_payment(&finance_inputs.for_price(price));
        if min_monthly.is_some_and(|min| monthly < min) || max_monthly.is_some_and(|max| monthly > max) {
            return false;
        }
    }

    true
}

/// Every record that satisfies `criteria`, in catalog order.
///
/// `finance_inputs` supplies the deposit, rate, term and balloon used for the
/// monthly-payment range; its `price` is replaced by each record's own price.
pub fn filter<'a, I>(records: I, criteria: &FilterCriteria, finance_inputs: &FinanceInputs) -> Vec<&'a VehicleRecord>
where
    I: IntoIterator<Item = &'a VehicleRecord>,
{
    records
        .into_iter()
        .filter(|record| matches(record, criteria, finance_inputs))
        .collect()
}

/// Parses the catalog timestamp formats: RFC 3339, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS` and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn name_text(record: &VehicleRecord, field: NameField) -> String {
    match field {
        NameField::BrandModel => record.display_name(),
        NameField::Model => record.model.clone(),
        NameField::Variant => record.variant.clone(),
    }
}

/// Collation key for name sorts: accents folded away and case ignored first
/// ("Škoda" sorts with "Skoda", ahead of "Toyota"), then case, then the raw
/// text so "polo" and "Polo" still order deterministically.
pub fn collation_key(text: &str) -> (String, String, String) {
    let folded: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    (folded, text.to_lowercase(), text.to_string())
}

/// Stable sort by `key`. `SortKey::None` leaves the order as given.
pub fn sort(records: &mut [&VehicleRecord], key: SortKey) {
    match key {
        SortKey::None => {}
        SortKey::Price => records.sort_by_key(|r| r.price_amount()),
        SortKey::Name(field) => {
            records.sort_by_cached_key(|r| collation_key(&name_text(r, field)))
        }
        SortKey::Newest => {
            // Unparsable timestamps compare as None, which sorts below every date
            records.sort_by(|a, b| {
                let ta = a.timestamp.as_deref().and_then(parse_timestamp);
                let tb = b.timestamp.as_deref().and_then(parse_timestamp);
                tb.cmp(&ta)
            })
        }
    }
}

// Convenience for callers holding a filtered Vec
pub fn sorted(mut records: Vec<&VehicleRecord>, key: SortKey) -> Vec<&VehicleRecord> {
    sort(&mut records, key);
    records
}

/// Groups records by the selector's value, keeping the order in which keys are
/// first seen and the input order inside each group. Records for which the
/// selector returns `None` are left out.
pub fn group_by<'a, I, F>(records: I, selector: F) -> Vec<(String, Vec<&'a VehicleRecord>)>
where
    I: IntoIterator<Item = &'a VehicleRecord>,
    F: Fn(&VehicleRecord) -> Option<String>,
{
    let mut groups: Vec<(String, Vec<&'a VehicleRecord>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in records {
        let Some(key) = selector(record) else { continue };
        match index.get(&key) {
            Some(&i) => groups[i].1.push(record),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![record]));
            }
        }
    }
    groups
}

pub fn by_model(record: &VehicleRecord) -> Option<String> {
    Some(record.model.clone())
}

// Body types are grouped case-insensitively; records without one are skipped
pub fn by_body_type(record: &VehicleRecord) -> Option<String> {
    record
        .body_type
        .as_deref()
        .map(|b| b.trim().to_lowercase())
        .filter(|b| !b.is_empty())
}

/// Cheapest `per_group` records of each body type, merged, re-sorted by price
/// and capped at `cap`.
pub fn best_of_by_body_type<'a, I>(records: I, per_group: usize, cap: usize) -> Vec<&'a VehicleRecord>
where
    I: IntoIterator<Item = &'a VehicleRecord>,
{
    let picks: Vec<&VehicleRecord> = group_by(records, by_body_type)
        .into_iter()
        .flat_map(|(_, group)| sorted(group, SortKey::Price).into_iter().take(per_group))
        .collect();
    let mut picks = sorted(picks, SortKey::Price);
    picks.truncate(cap);
    picks
}
