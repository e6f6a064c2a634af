//! Routes, stops, and the routing solution.

use std::fmt;
use std::time::Duration;

use crate::models::{format_hhmm, Fleet, Order, OrderKind, Vehicle};

/// The physical origin of a route: the depot or one of the hubs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    Depot,
    Hub(String),
}

impl Source {
    pub fn is_depot(&self) -> bool {
        matches!(self, Source::Depot)
    }

    pub fn hub_id(&self) -> Option<&str> {
        match self {
            Source::Depot => None,
            Source::Hub(id) => Some(id),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Depot => f.write_str("DEPOT"),
            Source::Hub(id) => f.write_str(id),
        }
    }
}

/// Optimization objective for a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    MinimizeVehicles,
    MinimizeCost,
    Balanced,
}

impl Strategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "minimize_vehicles" => Some(Self::MinimizeVehicles),
            "minimize_cost" => Some(Self::MinimizeCost),
            "balanced" => Some(Self::Balanced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MinimizeVehicles => "minimize_vehicles",
            Self::MinimizeCost => "minimize_cost",
            Self::Balanced => "balanced",
        }
    }
}

/// A single stop on a route.
#[derive(Debug, Clone)]
pub struct RouteStop {
    /// The order served at this stop (real delivery or hub consolidation).
    pub order: Order,
    /// Arrival time, minutes from midnight.
    pub arrival: i64,
    /// Departure time (arrival + service), minutes from midnight.
    pub departure: i64,
    /// Road distance from the previous stop (or the source), km.
    pub distance_from_prev_km: f64,
    /// Weight carried up to and including this stop since trip start, kg.
    pub cumulative_weight_kg: f64,
    /// Zero-based position within the route.
    pub sequence: usize,
}

impl RouteStop {
    pub fn arrival_hhmm(&self) -> String {
        format_hhmm(self.arrival)
    }

    pub fn departure_hhmm(&self) -> String {
        format_hhmm(self.departure)
    }
}

/// One vehicle's ordered tour out of a source.
#[derive(Debug, Clone)]
pub struct Route {
    vehicle: Vehicle,
    stops: Vec<RouteStop>,
    departure_time: i64,
    total_distance_km: f64,
    total_cost: f64,
    source: Source,
    trip_number: usize,
}

impl Route {
    /// Creates an empty route (the solver fills in stops and totals).
    pub fn new(vehicle: Vehicle, source: Source) -> Self {
        Self {
            vehicle,
            stops: Vec::new(),
            departure_time: 0,
            total_distance_km: 0.0,
            total_cost: 0.0,
            source,
            trip_number: 1,
        }
    }

    pub fn push_stop(&mut self, stop: RouteStop) {
        self.stops.push(stop);
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn stops(&self) -> &[RouteStop] {
        &self.stops
    }

    pub fn num_stops(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Departure time from the source, minutes from midnight.
    pub fn departure_time(&self) -> i64 {
        self.departure_time
    }

    pub fn departure_hhmm(&self) -> String {
        format_hhmm(self.departure_time)
    }

    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_km
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Trip number of the physical vehicle, 1-based.
    pub fn trip_number(&self) -> usize {
        self.trip_number
    }

    /// Total weight delivered on this route, kg.
    pub fn total_weight_kg(&self) -> f64 {
        self.stops.iter().map(|s| s.order.weight_kg()).sum()
    }

    /// Estimated completion time: last departure plus the return buffer.
    pub fn end_time(&self, return_buffer: i64) -> i64 {
        match self.stops.last() {
            Some(last) => last.departure + return_buffer,
            None => self.departure_time,
        }
    }

    pub fn set_departure_time(&mut self, t: i64) {
        self.departure_time = t;
    }

    pub fn set_totals(&mut self, distance_km: f64, cost: f64) {
        self.total_distance_km = distance_km;
        self.total_cost = cost;
    }

    pub fn set_trip_number(&mut self, trip: usize) {
        self.trip_number = trip;
    }

    pub fn set_vehicle(&mut self, vehicle: Vehicle) {
        self.vehicle = vehicle;
    }

    pub fn set_source(&mut self, source: Source) {
        self.source = source;
    }

    /// Checks route invariants; returns human-readable problems, empty when
    /// the route is consistent.
    pub fn validate(&self, fleet: &Fleet) -> Vec<String> {
        let mut problems = Vec::new();

        if self.stops.is_empty() {
            problems.push("route has no stops".to_string());
            return problems;
        }

        if self.total_weight_kg() > self.vehicle.capacity_kg() + 1e-9 {
            problems.push(format!(
                "load {:.1} kg exceeds capacity {:.1} kg of {}",
                self.total_weight_kg(),
                self.vehicle.capacity_kg(),
                self.vehicle.name()
            ));
        }

        // The blind-van leg records on-board load (counting down) and may
        // deliver ahead of customer windows; window and prefix-sum checks
        // apply to last-mile routes only.
        let is_consolidation_leg = self
            .stops
            .iter()
            .any(|s| s.order.kind() == OrderKind::HubConsolidation);

        let mut cumulative = 0.0;
        let mut prev_departure = self.departure_time;
        for (i, stop) in self.stops.iter().enumerate() {
            if stop.sequence != i {
                problems.push(format!(
                    "stop {} has sequence {}, expected {}",
                    i, stop.sequence, i
                ));
            }
            if stop.arrival < prev_departure {
                problems.push(format!(
                    "stop {} arrives at {} before previous departure {}",
                    i,
                    stop.arrival_hhmm(),
                    format_hhmm(prev_departure)
                ));
            }
            if stop.departure < stop.arrival {
                problems.push(format!("stop {} departs before it arrives", i));
            }

            let w = stop.order.window();
            let tolerance = fleet.tolerance_for(&stop.order);
            if stop.order.kind() == OrderKind::Delivery && !is_consolidation_leg {
                if stop.arrival < w.start() {
                    problems.push(format!(
                        "stop {} ({}) arrives at {} before window {}",
                        i,
                        stop.order.customer_name(),
                        stop.arrival_hhmm(),
                        w.display()
                    ));
                }
                if w.is_late(stop.arrival, tolerance) {
                    problems.push(format!(
                        "stop {} ({}) arrives at {} after window {} (+{} min tolerance)",
                        i,
                        stop.order.customer_name(),
                        stop.arrival_hhmm(),
                        w.display(),
                        tolerance
                    ));
                }
            }

            cumulative += stop.order.weight_kg();
            if !is_consolidation_leg && (stop.cumulative_weight_kg - cumulative).abs() > 1e-6
            {
                problems.push(format!(
                    "stop {} cumulative weight {:.1} kg differs from prefix sum {:.1} kg",
                    i, stop.cumulative_weight_kg, cumulative
                ));
            }
            prev_departure = stop.departure;
        }

        problems
    }
}

/// The complete output of one solve: routes, leftovers, and bookkeeping.
#[derive(Debug, Clone)]
pub struct RoutingSolution {
    routes: Vec<Route>,
    unassigned: Vec<Order>,
    strategy: Strategy,
    solve_time: Duration,
}

impl RoutingSolution {
    pub fn new(
        routes: Vec<Route>,
        unassigned: Vec<Order>,
        strategy: Strategy,
        solve_time: Duration,
    ) -> Self {
        Self {
            routes,
            unassigned,
            strategy,
            solve_time,
        }
    }

    pub fn empty(strategy: Strategy) -> Self {
        Self::new(Vec::new(), Vec::new(), strategy, Duration::ZERO)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn routes_mut(&mut self) -> &mut Vec<Route> {
        &mut self.routes
    }

    pub fn unassigned(&self) -> &[Order] {
        &self.unassigned
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn solve_time(&self) -> Duration {
        self.solve_time
    }

    pub fn vehicles_used(&self) -> usize {
        self.routes.iter().filter(|r| !r.is_empty()).count()
    }

    pub fn total_distance_km(&self) -> f64 {
        self.routes.iter().map(|r| r.total_distance_km()).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.routes.iter().map(|r| r.total_cost()).sum()
    }

    /// Delivered order count, hub consolidation stops excluded.
    pub fn orders_delivered(&self) -> usize {
        self.routes
            .iter()
            .flat_map(|r| r.stops())
            .filter(|s| s.order.kind() == OrderKind::Delivery)
            .count()
    }

    pub fn push_unassigned(&mut self, order: Order) {
        self.unassigned.push(order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPoint, RoutingParams, TimeWindow, VehicleType};

    fn fleet() -> Fleet {
        let t = VehicleType::new("Van", 100.0, 5000.0).expect("valid");
        Fleet::new(vec![t], RoutingParams::default()).expect("valid")
    }

    fn order(id: &str, weight: f64, window: &str) -> Order {
        Order::new(
            id,
            Order::parse_date("2025-03-01").expect("valid"),
            TimeWindow::parse(window).expect("valid"),
            weight,
            "P-1",
            format!("Customer {id}"),
            "Address",
            GeoPoint::new(-6.2, 106.8).expect("valid"),
        )
        .expect("valid order")
    }

    fn stop(o: Order, arrival: i64, seq: usize, cumulative: f64) -> RouteStop {
        RouteStop {
            arrival,
            departure: arrival + 15,
            distance_from_prev_km: 1.0,
            cumulative_weight_kg: cumulative,
            sequence: seq,
            order: o,
        }
    }

    #[test]
    fn test_source_display() {
        assert_eq!(Source::Depot.to_string(), "DEPOT");
        assert_eq!(Source::Hub("hub_utara".into()).to_string(), "hub_utara");
        assert!(Source::Depot.is_depot());
        assert_eq!(Source::Hub("h".into()).hub_id(), Some("h"));
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(Strategy::parse("balanced"), Some(Strategy::Balanced));
        assert_eq!(
            Strategy::parse("MINIMIZE_COST"),
            Some(Strategy::MinimizeCost)
        );
        assert_eq!(
            Strategy::parse("minimize_vehicles"),
            Some(Strategy::MinimizeVehicles)
        );
        assert!(Strategy::parse("fastest").is_none());
        assert_eq!(Strategy::Balanced.as_str(), "balanced");
    }

    #[test]
    fn test_route_totals() {
        let f = fleet();
        let mut r = Route::new(f.types()[0].instance(1), Source::Depot);
        r.push_stop(stop(order("A", 30.0, "04:00-05:00"), 250, 0, 30.0));
        r.push_stop(stop(order("B", 20.0, "04:00-06:00"), 280, 1, 50.0));
        r.set_totals(12.0, 60_000.0);
        r.set_departure_time(210);

        assert_eq!(r.num_stops(), 2);
        assert!((r.total_weight_kg() - 50.0).abs() < 1e-9);
        assert_eq!(r.end_time(30), 280 + 15 + 30);
        assert!(r.validate(&f).is_empty(), "{:?}", r.validate(&f));
    }

    #[test]
    fn test_route_validate_capacity() {
        let f = fleet();
        let mut r = Route::new(f.types()[0].instance(1), Source::Depot);
        r.push_stop(stop(order("A", 80.0, "04:00-05:00"), 250, 0, 80.0));
        r.push_stop(stop(order("B", 40.0, "04:00-06:00"), 280, 1, 120.0));
        let problems = r.validate(&f);
        assert!(problems.iter().any(|p| p.contains("capacity")));
    }

    #[test]
    fn test_route_validate_late_arrival() {
        let f = fleet();
        let mut r = Route::new(f.types()[0].instance(1), Source::Depot);
        // Non-priority tolerance is 20 min; 05:00 window end + 25 is late.
        r.push_stop(stop(order("A", 10.0, "04:00-05:00"), 325, 0, 10.0));
        let problems = r.validate(&f);
        assert!(problems.iter().any(|p| p.contains("after window")));
    }

    #[test]
    fn test_route_validate_sequence_gap() {
        let f = fleet();
        let mut r = Route::new(f.types()[0].instance(1), Source::Depot);
        r.push_stop(stop(order("A", 10.0, "04:00-05:00"), 250, 1, 10.0));
        let problems = r.validate(&f);
        assert!(problems.iter().any(|p| p.contains("sequence")));
    }

    #[test]
    fn test_solution_aggregates() {
        let f = fleet();
        let mut r1 = Route::new(f.types()[0].instance(1), Source::Depot);
        r1.push_stop(stop(order("A", 30.0, "04:00-05:00"), 250, 0, 30.0));
        r1.set_totals(10.0, 50_000.0);
        let mut r2 = Route::new(f.types()[0].instance(2), Source::Depot);
        r2.push_stop(stop(order("B", 20.0, "04:00-06:00"), 260, 0, 20.0));
        r2.set_totals(8.0, 40_000.0);

        let sol = RoutingSolution::new(
            vec![r1, r2],
            vec![order("C", 5.0, "09:00-10:00")],
            Strategy::Balanced,
            Duration::from_secs(1),
        );
        assert_eq!(sol.vehicles_used(), 2);
        assert_eq!(sol.orders_delivered(), 2);
        assert_eq!(sol.unassigned().len(), 1);
        assert!((sol.total_distance_km() - 18.0).abs() < 1e-9);
        assert!((sol.total_cost() - 90_000.0).abs() < 1e-9);
    }
}
