//! Source assignment: which orders are served from the depot versus a hub.

use tracing::info;

use crate::config::{MultiHubConfig, SourceMode, UnassignedZonePolicy};
use crate::error::{Error, Result};
use crate::matrix::{LocationIndex, TravelMatrix};
use crate::models::{Order, Source};

/// Orders partitioned by serving source.
///
/// The depot entry comes first, then every configured hub in configuration
/// order; entries may be empty but are always present, so the partition
/// covers `{DEPOT} ∪ hub_ids` exactly.
#[derive(Debug, Clone)]
pub struct SourceAssignment {
    entries: Vec<(Source, Vec<Order>)>,
}

impl SourceAssignment {
    fn new(hub_ids: &[String]) -> Self {
        let mut entries = vec![(Source::Depot, Vec::new())];
        entries.extend(
            hub_ids
                .iter()
                .map(|id| (Source::Hub(id.clone()), Vec::new())),
        );
        Self { entries }
    }

    fn push(&mut self, source: &Source, order: Order) {
        let entry = self
            .entries
            .iter_mut()
            .find(|(s, _)| s == source)
            .expect("assignment sources are fixed at construction");
        entry.1.push(order);
    }

    /// Sources in stable order: depot first, hubs in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Source, &[Order])> {
        self.entries.iter().map(|(s, o)| (s, o.as_slice()))
    }

    pub fn orders_for(&self, source: &Source) -> &[Order] {
        self.entries
            .iter()
            .find(|(s, _)| s == source)
            .map(|(_, o)| o.as_slice())
            .unwrap_or(&[])
    }

    pub fn depot_orders(&self) -> &[Order] {
        self.orders_for(&Source::Depot)
    }

    /// Drops depot-pool orders whose id is in `ids` (those the blind van
    /// already delivered en route).
    pub fn remove_depot_orders(&mut self, ids: &[String]) {
        if ids.is_empty() {
            return;
        }
        if let Some((_, orders)) = self.entries.iter_mut().find(|(s, _)| s.is_depot()) {
            orders.retain(|o| !ids.iter().any(|id| id == o.id()));
        }
    }

    pub fn total_orders(&self) -> usize {
        self.entries.iter().map(|(_, o)| o.len()).sum()
    }
}

/// Decides, per order, whether it enters the system from the depot or a
/// hub.
pub struct SourceAssigner<'a> {
    config: &'a MultiHubConfig,
    travel: &'a TravelMatrix,
    index: &'a LocationIndex,
}

impl<'a> SourceAssigner<'a> {
    pub fn new(
        config: &'a MultiHubConfig,
        travel: &'a TravelMatrix,
        index: &'a LocationIndex,
    ) -> Self {
        Self {
            config,
            travel,
            index,
        }
    }

    /// Partitions `orders` across the depot and hubs per the configured
    /// mode. Order positions must match the customer rows of the full
    /// matrix.
    pub fn assign(&self, orders: &[Order]) -> Result<SourceAssignment> {
        let mode = self.config.source_assignment.mode;
        if self.config.is_zero_hub() && mode != SourceMode::ZoneBased {
            return Err(Error::Config(format!(
                "source assignment mode '{}' requires at least one hub",
                match mode {
                    SourceMode::Dynamic => "dynamic",
                    SourceMode::Hybrid => "hybrid",
                    SourceMode::ZoneBased => "zone_based",
                }
            )));
        }

        let hub_ids = if self.config.is_zero_hub() {
            Vec::new()
        } else {
            self.config.hub_ids()
        };
        let mut assignment = SourceAssignment::new(&hub_ids);
        let zone_map = self.config.zone_to_hub();

        for (pos, order) in orders.iter().enumerate() {
            let source = match mode {
                SourceMode::ZoneBased => self.zone_source(order, &zone_map),
                SourceMode::Dynamic => self.best_source(pos)?.0,
                SourceMode::Hybrid => self.hybrid_source(order, pos, &zone_map)?,
            };
            assignment.push(&source, order.clone());
        }

        info!(
            mode = ?mode,
            depot = assignment.depot_orders().len(),
            total = assignment.total_orders(),
            "source assignment complete"
        );
        Ok(assignment)
    }

    /// Weighted cost of serving the customer at matrix row `order_idx`
    /// from matrix row `source_idx`.
    fn weighted_cost(&self, source_idx: usize, order_idx: usize) -> f64 {
        let sa = &self.config.source_assignment;
        sa.distance_weight * self.travel.distance_km(source_idx, order_idx)
            + sa.time_weight * self.travel.duration_min(source_idx, order_idx)
    }

    /// Zone lookup with the unassigned-zone policy as fallback.
    fn zone_source(
        &self,
        order: &Order,
        zone_map: &std::collections::HashMap<String, String>,
    ) -> Source {
        if self.config.is_zero_hub() {
            return Source::Depot;
        }
        if let Some(zone) = order.zone() {
            if let Some(hub_id) = zone_map.get(zone) {
                return Source::Hub(hub_id.clone());
            }
        }
        match self.config.unassigned_zone_policy {
            UnassignedZonePolicy::Depot => Source::Depot,
            UnassignedZonePolicy::Nearest => self
                .nearest_hub(order)
                .map(Source::Hub)
                .unwrap_or(Source::Depot),
        }
    }

    /// Geographically nearest hub by great-circle distance.
    fn nearest_hub(&self, order: &Order) -> Option<String> {
        self.config
            .hubs
            .iter()
            .min_by(|a, b| {
                let da = a.location().point().haversine_km(&order.point());
                let db = b.location().point().haversine_km(&order.point());
                da.partial_cmp(&db).expect("distances are finite")
            })
            .map(|h| h.id().to_string())
    }

    /// The source with the lowest weighted cost across depot and hubs.
    fn best_source(&self, pos: usize) -> Result<(Source, f64)> {
        let order_idx = self.index.customer_index(pos);
        let mut best = (Source::Depot, self.weighted_cost(LocationIndex::DEPOT, order_idx));
        for hub in &self.config.hubs {
            let hub_idx = self.index.hub_index(hub.id())?;
            let cost = self.weighted_cost(hub_idx, order_idx);
            if cost < best.1 {
                best = (Source::Hub(hub.id().to_string()), cost);
            }
        }
        Ok(best)
    }

    /// Zone assignment, overridden by the dynamic choice only when the
    /// advantage clears the configured threshold.
    fn hybrid_source(
        &self,
        order: &Order,
        pos: usize,
        zone_map: &std::collections::HashMap<String, String>,
    ) -> Result<Source> {
        let zone_source = self.zone_source(order, zone_map);
        let order_idx = self.index.customer_index(pos);
        let zone_idx = match &zone_source {
            Source::Depot => LocationIndex::DEPOT,
            Source::Hub(id) => self.index.hub_index(id)?,
        };
        let zone_cost = self.weighted_cost(zone_idx, order_idx);
        let (best_source, best_cost) = self.best_source(pos)?;

        let advantage_pct = if zone_cost > 0.0 {
            (zone_cost - best_cost) / zone_cost * 100.0
        } else {
            0.0
        };

        if advantage_pct >= self.config.source_assignment.min_cost_advantage_percent {
            Ok(best_source)
        } else {
            Ok(zone_source)
        }
    }
}
