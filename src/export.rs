// CSV export of a result set, one row per vehicle with its monthly estimate

use serde::Serialize;
use std::io::Write;

use crate::{
    finance,
    models::{FinanceInputs, VehicleRecord},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRow<'a> {
    brand: &'a str,
    model: &'a str,
    variant: &'a str,
    variant_slug: &'a str,
    price: u64,
    est_monthly: u64,
    fuel_type: Option<&'a str>,
    transmission: Option<&'a str>,
    body_type: Option<&'a str>,
    drive: Option<&'a str>,
    seats: Option<u32>,
    year: Option<&'a str>,
}

pub fn write_csv<W: Write>(
    records: &[&VehicleRecord],
    finance_inputs: &FinanceInputs,
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        let price = record.price_amount();
        wtr.serialize(ExportRow {
            brand: &record.brand,
            model: &record.model,
            variant: &record.variant,
            variant_slug: &record.variant_slug,
            price,
            est_monthly: finance::monthly_payment(&finance_inputs.for_price(price)),
            fuel_type: record.fuel_type.as_deref(),
            transmission: record.transmission.as_deref(),
            body_type: record.body_type.as_deref(),
            drive: record.drive.as_deref(),
            seats: record.seat_count(),
            year: record.year.as_deref(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(records: &[&VehicleRecord], finance_inputs: &FinanceInputs) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    write_csv(records, finance_inputs, &mut buf)?;
    // csv only ever writes the UTF-8 we gave it
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
