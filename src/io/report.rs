//! Delimited-text reports: the per-stop route file and the totals summary.

use std::path::Path;

use tracing::info;

use crate::config::MultiHubConfig;
use crate::error::{Error, Result};
use crate::models::{OrderKind, Route, RoutingSolution, Source};

const ROUTE_HEADERS: [&str; 21] = [
    "source",
    "trip_number",
    "vehicle_name",
    "vehicle_type",
    "rate_per_km",
    "sequence",
    "from",
    "to",
    "customer",
    "address",
    "city_zone",
    "delivery_window",
    "arrival_time",
    "departure_time",
    "weight_kg",
    "cumulative_weight_kg",
    "distance_from_prev_km",
    "lat",
    "lng",
    "priority",
    "notes",
];

/// Writes solutions as CSV reports.
pub struct ReportWriter<'a> {
    depot_name: &'a str,
    hubs: Option<&'a MultiHubConfig>,
}

impl<'a> ReportWriter<'a> {
    pub fn new(depot_name: &'a str, hubs: Option<&'a MultiHubConfig>) -> Self {
        Self { depot_name, hubs }
    }

    /// Human-readable name for a route source.
    fn source_name(&self, source: &Source) -> String {
        match source {
            Source::Depot => self.depot_name.to_string(),
            Source::Hub(id) => self
                .hubs
                .and_then(|h| h.hub_by_id(id))
                .map(|h| h.location().name().to_string())
                .unwrap_or_else(|| id.clone()),
        }
    }

    /// Writes one row per stop across all routes. A run with unassigned
    /// orders still produces the file; an empty solution produces just the
    /// header.
    pub fn write_routes(&self, solution: &RoutingSolution, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| Error::Report(format!("cannot create {}: {e}", path.display())))?;
        writer
            .write_record(ROUTE_HEADERS)
            .map_err(|e| Error::Report(e.to_string()))?;

        for route in solution.routes() {
            if route.is_empty() {
                continue;
            }
            self.write_route(&mut writer, route)?;
        }
        writer.flush().map_err(|e| Error::Report(e.to_string()))?;
        info!(file = %path.display(), routes = solution.routes().len(), "route report written");
        Ok(())
    }

    fn write_route(&self, writer: &mut csv::Writer<std::fs::File>, route: &Route) -> Result<()> {
        let mut from = self.source_name(route.source());
        for stop in route.stops() {
            let order = &stop.order;
            let notes = match order.kind() {
                OrderKind::HubConsolidation => "hub consolidation drop-off",
                OrderKind::Delivery => "",
            };
            writer
                .write_record([
                    route.source().to_string(),
                    route.trip_number().to_string(),
                    route.vehicle().name(),
                    route.vehicle().type_name().to_string(),
                    format!("{:.0}", route.vehicle().cost_per_km()),
                    (stop.sequence + 1).to_string(),
                    from.clone(),
                    order.customer_name().to_string(),
                    order.customer_name().to_string(),
                    order.address().to_string(),
                    order.zone().unwrap_or("").to_string(),
                    order.window().display(),
                    stop.arrival_hhmm(),
                    stop.departure_hhmm(),
                    format!("{:.1}", order.weight_kg()),
                    format!("{:.1}", stop.cumulative_weight_kg),
                    format!("{:.2}", stop.distance_from_prev_km),
                    format!("{:.6}", order.point().lat()),
                    format!("{:.6}", order.point().lng()),
                    if order.is_priority() { "1" } else { "0" }.to_string(),
                    notes.to_string(),
                ])
                .map_err(|e| Error::Report(e.to_string()))?;
            from = order.customer_name().to_string();
        }
        Ok(())
    }

    /// Writes per-source and overall totals, then the unassigned section.
    pub fn write_summary(&self, solution: &RoutingSolution, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| Error::Report(format!("cannot create {}: {e}", path.display())))?;
        let w = |writer: &mut csv::Writer<std::fs::File>, record: &[String]| {
            writer
                .write_record(record)
                .map_err(|e| Error::Report(e.to_string()))
        };

        w(
            &mut writer,
            &[
                "source".into(),
                "routes".into(),
                "orders_delivered".into(),
                "total_weight_kg".into(),
                "total_distance_km".into(),
                "total_cost".into(),
            ],
        )?;

        let mut sources: Vec<Source> = Vec::new();
        for route in solution.routes() {
            if !sources.contains(route.source()) {
                sources.push(route.source().clone());
            }
        }
        for source in &sources {
            let routes: Vec<&Route> = solution
                .routes()
                .iter()
                .filter(|r| r.source() == source && !r.is_empty())
                .collect();
            let delivered = routes
                .iter()
                .flat_map(|r| r.stops())
                .filter(|s| s.order.kind() == OrderKind::Delivery)
                .count();
            let weight: f64 = routes
                .iter()
                .flat_map(|r| r.stops())
                .filter(|s| s.order.kind() == OrderKind::Delivery)
                .map(|s| s.order.weight_kg())
                .sum();
            let distance: f64 = routes.iter().map(|r| r.total_distance_km()).sum();
            let cost: f64 = routes.iter().map(|r| r.total_cost()).sum();
            w(
                &mut writer,
                &[
                    source.to_string(),
                    routes.len().to_string(),
                    delivered.to_string(),
                    format!("{weight:.1}"),
                    format!("{distance:.2}"),
                    format!("{cost:.0}"),
                ],
            )?;
        }

        let total_weight: f64 = solution
            .routes()
            .iter()
            .flat_map(|r| r.stops())
            .filter(|s| s.order.kind() == OrderKind::Delivery)
            .map(|s| s.order.weight_kg())
            .sum();
        w(
            &mut writer,
            &[
                "TOTAL".into(),
                solution.vehicles_used().to_string(),
                solution.orders_delivered().to_string(),
                format!("{total_weight:.1}"),
                format!("{:.2}", solution.total_distance_km()),
                format!("{:.0}", solution.total_cost()),
            ],
        )?;

        if !solution.unassigned().is_empty() {
            w(&mut writer, &[String::new()])?;
            w(
                &mut writer,
                &[
                    "unassigned_order_id".into(),
                    "customer".into(),
                    "delivery_window".into(),
                    "weight_kg".into(),
                    "city_zone".into(),
                ],
            )?;
            for order in solution.unassigned() {
                w(
                    &mut writer,
                    &[
                        order.id().to_string(),
                        order.customer_name().to_string(),
                        order.window().display(),
                        format!("{:.1}", order.weight_kg()),
                        order.zone().unwrap_or("").to_string(),
                    ],
                )?;
            }
        }

        writer.flush().map_err(|e| Error::Report(e.to_string()))?;
        info!(file = %path.display(), "summary report written");
        Ok(())
    }
}
