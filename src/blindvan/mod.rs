//! Blind-van consolidation leg planning.
//!
//! Routes the heavy consolidation vehicle from the depot through every hub
//! carrying load, in nearest-neighbor order. Hubs in delivery mode may pull
//! depot-pool orders lying in the travel corridor onto the van, bounded by
//! detour caps and the capacity left after consolidation loads and
//! reserves.

use tracing::{debug, info};

use crate::assign::SourceAssignment;
use crate::config::MultiHubConfig;
use crate::error::{Error, Result};
use crate::matrix::{LocationIndex, TravelMatrix};
use crate::models::{Order, Route, RouteStop, Source, TimeWindow, VehicleType};

/// Minutes spent unloading the consolidation load at a hub.
pub const CONSOLIDATION_SERVICE_MIN: i64 = 10;

/// Minutes spent per en-route customer delivery.
pub const DELIVERY_SERVICE_MIN: i64 = 5;

/// The blind-van leg: at most one route, plus the depot-pool orders it
/// already delivered (these must leave the depot pool before last-mile
/// solving).
#[derive(Debug)]
pub struct BlindVanPlan {
    pub route: Option<Route>,
    pub delivered_en_route: Vec<Order>,
}

/// A depot-pool order that fits a hub approach corridor.
#[derive(Debug, Clone)]
struct CorridorCandidate {
    order: Order,
    matrix_idx: usize,
    detour_km: f64,
    detour_min: i64,
    score: f64,
}

/// Plans the consolidation leg.
pub struct BlindVanPlanner<'a> {
    config: &'a MultiHubConfig,
    travel: &'a TravelMatrix,
    index: &'a LocationIndex,
    van: &'a VehicleType,
}

impl<'a> BlindVanPlanner<'a> {
    pub fn new(
        config: &'a MultiHubConfig,
        travel: &'a TravelMatrix,
        index: &'a LocationIndex,
        van: &'a VehicleType,
    ) -> Self {
        Self {
            config,
            travel,
            index,
            van,
        }
    }

    /// Produces the blind-van route over hubs with load, or no route when
    /// nothing consolidates. `order_rows` maps order ids to full-matrix
    /// rows for the depot-pool corridor lookups.
    pub fn plan(
        &self,
        assignment: &SourceAssignment,
        order_rows: &dyn Fn(&str) -> Option<usize>,
    ) -> Result<BlindVanPlan> {
        let active: Vec<usize> = self
            .config
            .hubs
            .iter()
            .enumerate()
            .filter(|(_, hub)| !assignment.orders_for(&hub_source(hub.id())).is_empty())
            .map(|(i, _)| i)
            .collect();

        if active.is_empty() {
            debug!("no hub carries load, skipping blind van");
            return Ok(BlindVanPlan {
                route: None,
                delivered_en_route: Vec::new(),
            });
        }

        let sequence = self.hub_sequence(&active)?;
        let (en_route, delivered) = self.pick_en_route(&sequence, assignment, order_rows)?;
        let route = self.build_route(&sequence, &en_route, assignment)?;

        info!(
            hubs = sequence.len(),
            en_route = delivered.len(),
            distance_km = route.total_distance_km(),
            "blind van planned"
        );
        Ok(BlindVanPlan {
            route: Some(route),
            delivered_en_route: delivered,
        })
    }

    /// Nearest-neighbor hub order starting from the depot.
    fn hub_sequence(&self, active: &[usize]) -> Result<Vec<usize>> {
        let mut remaining: Vec<(usize, usize)> = active
            .iter()
            .map(|&hi| {
                self.index
                    .hub_index(self.config.hubs[hi].id())
                    .map(|row| (hi, row))
            })
            .collect::<Result<_>>()?;

        let mut sequence = Vec::with_capacity(remaining.len());
        let mut current = LocationIndex::DEPOT;
        while !remaining.is_empty() {
            let (pick, _) = remaining
                .iter()
                .enumerate()
                .min_by(|(_, (_, a)), (_, (_, b))| {
                    self.travel
                        .distance_km(current, *a)
                        .partial_cmp(&self.travel.distance_km(current, *b))
                        .expect("distances are finite")
                })
                .expect("checked non-empty");
            let (hub_pos, row) = remaining.remove(pick);
            current = row;
            sequence.push(hub_pos);
        }
        Ok(sequence)
    }

    /// En-route selections per hub, in hub-sequence order. Returns the
    /// per-hub selected orders (aligned with `sequence`) and the flattened
    /// delivered list.
    fn pick_en_route(
        &self,
        sequence: &[usize],
        assignment: &SourceAssignment,
        order_rows: &dyn Fn(&str) -> Option<usize>,
    ) -> Result<(Vec<Vec<CorridorCandidate>>, Vec<Order>)> {
        let depot_pool = assignment.depot_orders();
        let consolidation_total = self.consolidation_total(assignment);
        let reserve_total: f64 = self
            .config
            .hubs
            .iter()
            .filter(|h| h.delivery_enabled())
            .map(|h| h.en_route().reserve_capacity_kg)
            .sum();

        let mut budget = self.van.capacity_kg() - consolidation_total - reserve_total;
        let mut selected_ids: Vec<String> = Vec::new();
        let mut delivered: Vec<Order> = Vec::new();
        let mut per_hub: Vec<Vec<CorridorCandidate>> = Vec::with_capacity(sequence.len());

        let mut prev_row = LocationIndex::DEPOT;
        for &hub_pos in sequence {
            let hub = &self.config.hubs[hub_pos];
            let hub_row = self.index.hub_index(hub.id())?;

            if !hub.delivery_enabled() || depot_pool.is_empty() {
                per_hub.push(Vec::new());
                prev_row = hub_row;
                continue;
            }

            let policy = hub.en_route();
            let mut candidates: Vec<CorridorCandidate> = Vec::new();
            for order in depot_pool {
                if selected_ids.iter().any(|id| id == order.id()) {
                    continue;
                }
                let Some(row) = order_rows(order.id()) else {
                    continue;
                };
                let detour_km = self.travel.distance_km(prev_row, row)
                    + self.travel.distance_km(row, hub_row)
                    - self.travel.distance_km(prev_row, hub_row);
                let detour_min = (self.travel.duration_min(prev_row, row)
                    + self.travel.duration_min(row, hub_row)
                    - self.travel.duration_min(prev_row, hub_row))
                .ceil() as i64
                    + DELIVERY_SERVICE_MIN;

                if detour_km <= policy.max_detour_km && detour_min <= policy.max_detour_minutes
                {
                    candidates.push(CorridorCandidate {
                        order: order.clone(),
                        matrix_idx: row,
                        detour_km,
                        detour_min,
                        score: detour_km * 2.0 + detour_min as f64 / 10.0,
                    });
                }
            }

            // Lowest score wins; equal scores prefer the lighter order.
            candidates.sort_by(|a, b| {
                a.score
                    .partial_cmp(&b.score)
                    .expect("scores are finite")
                    .then(
                        a.order
                            .weight_kg()
                            .partial_cmp(&b.order.weight_kg())
                            .expect("weights are finite"),
                    )
            });

            let mut chosen = Vec::new();
            for candidate in candidates {
                if chosen.len() >= policy.max_stops {
                    break;
                }
                let weight = candidate.order.weight_kg();
                if weight > budget {
                    continue;
                }
                budget -= weight;
                debug!(
                    order = candidate.order.id(),
                    hub = hub.id(),
                    detour_km = candidate.detour_km,
                    detour_min = candidate.detour_min,
                    "en-route delivery selected"
                );
                selected_ids.push(candidate.order.id().to_string());
                delivered.push(candidate.order.clone());
                chosen.push(candidate);
            }
            per_hub.push(chosen);
            prev_row = hub_row;
        }

        Ok((per_hub, delivered))
    }

    fn consolidation_total(&self, assignment: &SourceAssignment) -> f64 {
        self.config
            .hubs
            .iter()
            .map(|hub| {
                assignment
                    .orders_for(&hub_source(hub.id()))
                    .iter()
                    .map(|o| o.weight_kg())
                    .sum::<f64>()
            })
            .sum()
    }

    fn build_route(
        &self,
        sequence: &[usize],
        en_route: &[Vec<CorridorCandidate>],
        assignment: &SourceAssignment,
    ) -> Result<Route> {
        let mut route = Route::new(self.van.instance(1), Source::Depot);
        route.set_departure_time(self.config.blind_van_departure);

        let consolidation_window =
            TimeWindow::new(self.config.blind_van_departure, self.config.blind_van_arrival)
                .or_else(|| TimeWindow::point(self.config.blind_van_departure))
                .ok_or_else(|| {
                    Error::Config("invalid blind van departure/arrival times".into())
                })?;

        let mut on_board = self.consolidation_total(assignment)
            + en_route
                .iter()
                .flatten()
                .map(|c| c.order.weight_kg())
                .sum::<f64>();

        let mut clock = self.config.blind_van_departure;
        let mut prev_row = LocationIndex::DEPOT;
        let mut total_distance = 0.0;
        let mut sequence_no = 0usize;

        for (leg, &hub_pos) in sequence.iter().enumerate() {
            let hub = &self.config.hubs[hub_pos];
            let hub_row = self.index.hub_index(hub.id())?;

            for candidate in &en_route[leg] {
                let travel_km = self.travel.distance_km(prev_row, candidate.matrix_idx);
                let travel_min =
                    self.travel.duration_min(prev_row, candidate.matrix_idx).ceil() as i64;
                total_distance += travel_km;
                let arrival = clock + travel_min;
                let departure = arrival + DELIVERY_SERVICE_MIN;

                route.push_stop(RouteStop {
                    order: candidate.order.clone(),
                    arrival,
                    departure,
                    distance_from_prev_km: travel_km,
                    cumulative_weight_kg: on_board,
                    sequence: sequence_no,
                });
                sequence_no += 1;
                clock = departure;
                on_board -= candidate.order.weight_kg();
                prev_row = candidate.matrix_idx;
            }

            let hub_orders = assignment.orders_for(&hub_source(hub.id()));
            let hub_load: f64 = hub_orders.iter().map(|o| o.weight_kg()).sum();
            let delivery_date = hub_orders
                .first()
                .map(|o| o.delivery_date())
                .expect("active hubs carry orders");

            let travel_km = self.travel.distance_km(prev_row, hub_row);
            let travel_min = self.travel.duration_min(prev_row, hub_row).ceil() as i64;
            total_distance += travel_km;
            let arrival = clock + travel_min;
            let departure = arrival + CONSOLIDATION_SERVICE_MIN;

            let consolidation = Order::consolidation(
                hub.id(),
                hub.location().name(),
                hub.location().address(),
                hub.location().point(),
                hub_load,
                delivery_date,
                consolidation_window,
            );
            route.push_stop(RouteStop {
                order: consolidation,
                arrival,
                departure,
                distance_from_prev_km: travel_km,
                cumulative_weight_kg: on_board,
                sequence: sequence_no,
            });
            sequence_no += 1;
            clock = departure;
            on_board -= hub_load;
            prev_row = hub_row;
        }

        // Return leg measured from the last visited stop back to the
        // depot; no stop is emitted for it.
        if self.config.blind_van_return_to_depot {
            total_distance += self.travel.distance_km(prev_row, LocationIndex::DEPOT);
        }

        route.set_totals(total_distance, total_distance * self.van.cost_per_km());
        Ok(route)
    }
}

fn hub_source(id: &str) -> Source {
    Source::Hub(id.to_string())
}
