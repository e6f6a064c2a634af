//! Tabular order ingestion.
//!
//! Reads the operator's order export: one row per order, coordinates as
//! `"lat,lng"`, delivery time as `HH:MM` or `HH:MM-HH:MM`. Every invalid
//! row is reported with its file row number and ingestion aborts when any
//! row fails.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{GeoPoint, Order, TimeWindow};

const REQUIRED_COLUMNS: [&str; 8] = [
    "sale_order_id",
    "delivery_date",
    "delivery_time",
    "load_weight_in_kg",
    "partner_id",
    "display_name",
    "alamat",
    "coordinates",
];

#[derive(Debug, Deserialize)]
struct OrderRecord {
    sale_order_id: String,
    delivery_date: String,
    delivery_time: String,
    load_weight_in_kg: String,
    partner_id: String,
    display_name: String,
    alamat: String,
    coordinates: String,
    #[serde(default)]
    kota: Option<String>,
    #[serde(default)]
    is_priority: Option<String>,
}

/// Reads and validates orders from a CSV file.
pub fn read_orders(path: impl AsRef<Path>) -> Result<Vec<Order>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::Ingestion(vec![format!("cannot open {}: {e}", path.display())]))?;

    let headers = reader
        .headers()
        .map_err(|e| Error::Ingestion(vec![format!("cannot read header: {e}")]))?
        .clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !headers.iter().any(|h| h == **c))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(Error::Ingestion(vec![format!(
            "missing required columns: {}",
            missing.join(", ")
        )]));
    }

    let mut orders = Vec::new();
    let mut problems = Vec::new();
    for (i, record) in reader.deserialize::<OrderRecord>().enumerate() {
        // header is row 1
        let row = i + 2;
        match record {
            Ok(record) => match parse_record(record) {
                Ok(order) => orders.push(order),
                Err(msg) => problems.push(format!("row {row}: {msg}")),
            },
            Err(e) => problems.push(format!("row {row}: {e}")),
        }
    }

    if !problems.is_empty() {
        return Err(Error::Ingestion(problems));
    }
    if orders.is_empty() {
        return Err(Error::Ingestion(vec!["no orders in file".to_string()]));
    }
    info!(orders = orders.len(), file = %path.display(), "orders ingested");
    Ok(orders)
}

fn parse_record(record: OrderRecord) -> std::result::Result<Order, String> {
    for (name, value) in [
        ("sale_order_id", &record.sale_order_id),
        ("delivery_date", &record.delivery_date),
        ("delivery_time", &record.delivery_time),
        ("partner_id", &record.partner_id),
        ("display_name", &record.display_name),
        ("alamat", &record.alamat),
        ("coordinates", &record.coordinates),
    ] {
        if value.trim().is_empty() {
            return Err(format!("missing required field: {name}"));
        }
    }

    let date = Order::parse_date(&record.delivery_date).ok_or_else(|| {
        format!(
            "invalid delivery_date '{}', expected YYYY-MM-DD or an ISO-8601 instant",
            record.delivery_date
        )
    })?;
    let window = TimeWindow::parse(&record.delivery_time).ok_or_else(|| {
        format!(
            "invalid delivery_time '{}', expected HH:MM or HH:MM-HH:MM",
            record.delivery_time
        )
    })?;
    let weight: f64 = record
        .load_weight_in_kg
        .trim()
        .parse()
        .map_err(|_| format!("invalid load_weight_in_kg '{}'", record.load_weight_in_kg))?;
    let point = parse_coordinates(&record.coordinates)?;

    let mut order = Order::new(
        record.sale_order_id.trim(),
        date,
        window,
        weight,
        record.partner_id.trim(),
        record.display_name.trim(),
        record.alamat.trim(),
        point,
    )
    .map_err(|e| e.to_string())?;

    if let Some(kota) = record.kota {
        order = order.with_zone(kota);
    }
    if let Some(flag) = record.is_priority {
        order = order.with_priority(parse_boolean(&flag));
    }
    Ok(order)
}

fn parse_coordinates(s: &str) -> std::result::Result<GeoPoint, String> {
    let (lat, lng) = s
        .trim()
        .split_once(',')
        .ok_or_else(|| format!("invalid coordinates '{s}', expected 'lat,lng'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{lat}'"))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{lng}'"))?;
    GeoPoint::new(lat, lng).ok_or_else(|| format!("coordinates out of range: {lat}, {lng}"))
}

/// Accepts `0/1`, `true/false`, `yes/no`, `y/n`; anything else is false.
fn parse_boolean(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}
