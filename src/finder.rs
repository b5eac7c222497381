// Vehicle finder: a six-question wizard that narrows the catalog down to a few
// recommendations. The wizard state is an explicit value carried between
// requests instead of living in the page.

use serde::{Deserialize, Serialize};

use crate::models::VehicleRecord;

pub const DEFAULT_BUDGET: u64 = 300_000;
pub const MAX_RESULTS: usize = 6;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum FinderStep {
    #[default]
    Budget,
    BootSpace,
    Transmission,
    Seats,
    FuelType,
    BodyType,
    Results,
}

impl FinderStep {
    pub const ALL: [FinderStep; 7] = [
        FinderStep::Budget,
        FinderStep::BootSpace,
        FinderStep::Transmission,
        FinderStep::Seats,
        FinderStep::FuelType,
        FinderStep::BodyType,
        FinderStep::Results,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    // Out-of-range indices clamp to the results step
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or(FinderStep::Results)
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn question(self) -> &'static str {
        match self {
            FinderStep::Budget => "What's your budget?",
            FinderStep::BootSpace => "Do you need boot space?",
            FinderStep::Transmission => "Preferred transmission?",
            FinderStep::Seats => "How many seats do you need?",
            FinderStep::FuelType => "Preferred fuel type?",
            FinderStep::BodyType => "Preferred body type?",
            FinderStep::Results => "Results",
        }
    }

    // (value, label) choices offered at this step
    pub fn choices(self) -> Vec<(String, String)> {
        let titled = |values: &[&str]| -> Vec<(String, String)> {
            values.iter().map(|v| (v.to_string(), title_case(v))).collect()
        };
        match self {
            FinderStep::BootSpace => titled(&["yes", "no"]),
            FinderStep::Transmission => titled(&["automatic", "manual"]),
            FinderStep::Seats => [2, 4, 5, 7, 8]
                .iter()
                .map(|n| (n.to_string(), format!("{}+", n)))
                .collect(),
            FinderStep::FuelType => titled(&["petrol", "diesel", "hybrid", "electric"]),
            FinderStep::BodyType => titled(&["hatchback", "sedan", "suv", "bakkie", "van"]),
            FinderStep::Budget | FinderStep::Results => Vec::new(),
        }
    }
}

pub fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Answers collected so far. `None` means the question was not answered and
/// places no restriction.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinderAnswers {
    pub budget: u64,
    pub boot_space: Option<bool>,
    pub transmission: Option<String>,
    pub min_seats: Option<u32>,
    pub fuel_type: Option<String>,
    pub body_type: Option<String>,
}

impl Default for FinderAnswers {
    fn default() -> Self {
        FinderAnswers {
            budget: DEFAULT_BUDGET,
            boot_space: None,
            transmission: None,
            min_seats: None,
            fuel_type: None,
            body_type: None,
        }
    }
}

impl FinderAnswers {
    /// Records the answer for `step`. Blank or unparsable answers clear it.
    pub fn answer(&mut self, step: FinderStep, raw: &str) {
        let value = raw.trim().to_lowercase();
        let text = || Some(value.clone()).filter(|v| !v.is_empty());
        match step {
            FinderStep::Budget => {
                self.budget = crate::pricing::parse_price_text(&value);
                if self.budget == 0 {
                    self.budget = DEFAULT_BUDGET;
                }
            }
            FinderStep::BootSpace => {
                self.boot_space = match value.as_str() {
                    "yes" => Some(true),
                    "no" => Some(false),
                    _ => None,
                }
            }
            FinderStep::Transmission => self.transmission = text(),
            FinderStep::Seats => self.min_seats = value.parse().ok().filter(|n| *n > 0),
            FinderStep::FuelType => self.fuel_type = text(),
            FinderStep::BodyType => self.body_type = text(),
            FinderStep::Results => {}
        }
    }
}

fn lower(field: &Option<String>) -> Option<String> {
    field.as_deref().map(|v| v.trim().to_lowercase())
}

pub fn fits(record: &VehicleRecord, answers: &FinderAnswers) -> bool {
    if record.price_amount() > answers.budget {
        return false;
    }

    let body = lower(&record.body_type);
    // Boot space means a hatch or an SUV; "no" does not restrict
    if answers.boot_space == Some(true) {
        let roomy = body
            .as_deref()
            .is_some_and(|b| b.contains("suv") || b.contains("hatch"));
        if !roomy {
            return false;
        }
    }

    let same = |field: &Option<String>, wanted: &Option<String>| match wanted {
        Some(w) => lower(field).as_deref() == Some(w.trim().to_lowercase().as_str()),
        None => true,
    };
    if !same(&record.transmission, &answers.transmission)
        || !same(&record.fuel_type, &answers.fuel_type)
        || !same(&record.body_type, &answers.body_type)
    {
        return false;
    }

    match answers.min_seats {
        Some(min) => record.seat_count().unwrap_or(0) >= min,
        None => true,
    }
}

/// First `limit` records, in catalog order, that fit every answer.
pub fn recommend<'a, I>(records: I, answers: &FinderAnswers, limit: usize) -> Vec<&'a VehicleRecord>
where
    I: IntoIterator<Item = &'a VehicleRecord>,
{
    records
        .into_iter()
        .filter(|r| fits(r, answers))
        .take(limit)
        .collect()
}
