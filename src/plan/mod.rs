//! Top-level tour planning: partition, consolidate, solve, assemble.
//!
//! Threads one day's orders through the pipeline: full travel matrices →
//! source assignment → blind-van consolidation leg (removing en-route
//! deliveries from the depot pool) → per-source time-window clustering →
//! per-cluster CVRPTW solves on contracted matrices → multi-trip assembly
//! → one merged solution, depot routes first, hubs in configuration order.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::assign::SourceAssigner;
use crate::blindvan::BlindVanPlanner;
use crate::cluster::{TimeWindowCluster, TimeWindowClusterer};
use crate::config::MultiHubConfig;
use crate::error::{Error, Result};
use crate::matrix::{LocationIndex, MatrixProvider, RoadOracle, TravelMatrix};
use crate::models::{
    Fleet, Location, Order, Route, RoutingSolution, Source,
};
use crate::multitrip::TripAssembler;
use crate::solver::{CvrptwSolver, SolverConfig};

/// Planner knobs: the solver configuration (its `time_limit` is the
/// overall budget, divided among clusters) and the per-cluster floor.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub solver: SolverConfig,
    /// Every cluster gets at least this much of the budget.
    pub min_cluster_budget: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            min_cluster_budget: Duration::from_secs(30),
        }
    }
}

/// Plans one day of delivery tours.
pub struct TourPlanner {
    depot: Location,
    fleet: Fleet,
    hubs: MultiHubConfig,
}

impl TourPlanner {
    pub fn new(depot: Location, fleet: Fleet, hubs: MultiHubConfig) -> Self {
        Self { depot, fleet, hubs }
    }

    /// The full location sequence `[depot, hub_1.., customer_1..]` used to
    /// key and index the travel matrices.
    pub fn locations(&self, orders: &[Order]) -> Vec<Location> {
        let mut locations = vec![self.depot.clone()];
        if !self.hubs.is_zero_hub() {
            locations.extend(self.hubs.hubs.iter().map(|h| h.location().clone()));
        }
        locations.extend(orders.iter().map(|o| {
            Location::customer(o.customer_name(), o.point()).with_address(o.address())
        }));
        locations
    }

    /// Fetches matrices through the provider, then plans.
    pub fn plan<O: RoadOracle>(
        &self,
        orders: &[Order],
        provider: &MatrixProvider<O>,
        config: &PlannerConfig,
    ) -> Result<RoutingSolution> {
        let travel = provider.matrices(&self.locations(orders))?;
        self.plan_with_matrices(orders, &travel, config)
    }

    /// Plans against pre-computed full matrices (rows laid out as
    /// [`TourPlanner::locations`]).
    pub fn plan_with_matrices(
        &self,
        orders: &[Order],
        travel: &TravelMatrix,
        config: &PlannerConfig,
    ) -> Result<RoutingSolution> {
        let started = Instant::now();
        let strategy = config.solver.strategy;

        if orders.is_empty() {
            return Ok(RoutingSolution::empty(strategy));
        }

        let zero_hub = self.hubs.is_zero_hub();
        let hub_ids = if zero_hub { Vec::new() } else { self.hubs.hub_ids() };
        let index = LocationIndex::new(hub_ids);

        let expected = 1 + index.num_hubs() + orders.len();
        if travel.size() != expected {
            return Err(Error::Config(format!(
                "travel matrix covers {} locations, expected {expected}",
                travel.size()
            )));
        }

        let assigner = SourceAssigner::new(&self.hubs, travel, &index);
        let mut assignment = assigner.assign(orders)?;

        // Consolidation leg; its en-route deliveries leave the depot pool.
        let mut blind_routes: Vec<Route> = Vec::new();
        if !zero_hub {
            let van = self
                .fleet
                .type_by_name(&self.hubs.blind_van_vehicle)
                .ok_or_else(|| {
                    Error::Config(format!(
                        "hub routing requires vehicle type '{}' in the fleet",
                        self.hubs.blind_van_vehicle
                    ))
                })?;
            let row_of = |id: &str| {
                orders
                    .iter()
                    .position(|o| o.id() == id)
                    .map(|p| index.customer_index(p))
            };
            let planner = BlindVanPlanner::new(&self.hubs, travel, &index, van);
            let plan = planner.plan(&assignment, &row_of)?;
            if let Some(route) = plan.route {
                blind_routes.push(route);
            }
            let delivered: Vec<String> = plan
                .delivered_en_route
                .iter()
                .map(|o| o.id().to_string())
                .collect();
            assignment.remove_depot_orders(&delivered);
        }

        // The blind van only works the consolidation leg.
        let last_mile_fleet = if zero_hub {
            self.fleet.clone()
        } else {
            self.fleet
                .without(&self.hubs.blind_van_vehicle)
                .ok_or_else(|| {
                    Error::Config(
                        "fleet has no last-mile vehicles besides the blind van".into(),
                    )
                })?
        };

        // Cluster every source up front so the budget split covers them all.
        let params = last_mile_fleet.params().clone();
        let clusterer = TimeWindowClusterer::new(
            params.multi_trip.gap_threshold_minutes,
            params.multi_trip.min_cluster_size,
        );
        let mut work: Vec<(Source, Vec<TimeWindowCluster>)> = Vec::new();
        for (source, source_orders) in assignment.iter() {
            if source_orders.is_empty() {
                continue;
            }
            let clusters = if params.multi_trip.enabled {
                clusterer.cluster(source_orders)
            } else {
                clusterer_single(source_orders)
            };
            work.push((source.clone(), clusters));
        }

        let total_clusters: usize = work.iter().map(|(_, c)| c.len()).sum();
        let budget = if total_clusters == 0 {
            config.solver.time_limit
        } else {
            (config.solver.time_limit / total_clusters as u32).max(config.min_cluster_budget)
        };
        info!(
            sources = work.len(),
            clusters = total_clusters,
            budget_secs = budget.as_secs_f64(),
            "planning tours"
        );

        let mut all_routes: Vec<Route> = Vec::new();
        let mut all_unassigned: Vec<Order> = Vec::new();

        for (source, clusters) in work {
            let source_row = match &source {
                Source::Depot => LocationIndex::DEPOT,
                Source::Hub(id) => index.hub_index(id)?,
            };
            let earliest_departure = match &source {
                Source::Depot => 0,
                Source::Hub(_) => self.hubs.earliest_hub_delivery,
            };

            let mut cluster_solutions = Vec::with_capacity(clusters.len());
            for cluster in &clusters {
                let mut rows = vec![source_row];
                for order in &cluster.orders {
                    let pos = orders
                        .iter()
                        .position(|o| o.id() == order.id())
                        .expect("cluster orders come from the input");
                    rows.push(index.customer_index(pos));
                }
                let sub = travel.submatrix(&rows);

                let solver_config = SolverConfig {
                    time_limit: budget,
                    earliest_departure,
                    ..config.solver.clone()
                };
                let solver = CvrptwSolver::new(
                    &cluster.orders,
                    &last_mile_fleet,
                    &sub,
                    source.clone(),
                    solver_config,
                );
                match solver.solve() {
                    Ok(solution) => cluster_solutions.push(solution),
                    Err(Error::NoSolution(msg)) => {
                        warn!(source = %source, cluster = cluster.id, %msg,
                              "cluster solve infeasible, orders go unassigned");
                        cluster_solutions.push(RoutingSolution::new(
                            Vec::new(),
                            cluster.orders.clone(),
                            strategy,
                            Duration::ZERO,
                        ));
                    }
                    Err(other) => return Err(other),
                }
            }

            let assembled = TripAssembler::new(&params.multi_trip).assemble(
                cluster_solutions,
                &source,
                strategy,
            );
            let (routes, unassigned) = (
                assembled.routes().to_vec(),
                assembled.unassigned().to_vec(),
            );
            all_routes.extend(routes);
            all_unassigned.extend(unassigned);
        }

        // Blind van leads the final ordering.
        let mut routes = blind_routes;
        routes.extend(all_routes);

        let solution =
            RoutingSolution::new(routes, all_unassigned, strategy, started.elapsed());
        info!(
            routes = solution.routes().len(),
            delivered = solution.orders_delivered(),
            unassigned = solution.unassigned().len(),
            elapsed_secs = solution.solve_time().as_secs_f64(),
            "plan complete"
        );
        Ok(solution)
    }
}

/// All orders as one cluster (multi-trip disabled).
fn clusterer_single(orders: &[Order]) -> Vec<TimeWindowCluster> {
    TimeWindowClusterer::new(i64::MAX / 2, 1).cluster(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BlindVanMode, EnRoutePolicy, HubConfig, MultiHubConfig, SourceAssignmentConfig,
        SourceMode, UnassignedZonePolicy,
    };
    use crate::matrix::Matrix;
    use crate::models::{
        GeoPoint, MultiTripParams, OrderKind, RoutingParams, Strategy, TimeWindow,
        VehicleType,
    };

    fn quick_config() -> PlannerConfig {
        PlannerConfig {
            solver: SolverConfig {
                time_limit: Duration::from_secs(2),
                max_iterations: 1_200,
                ..SolverConfig::default()
            },
            min_cluster_budget: Duration::from_millis(200),
        }
    }

    fn order_at(
        id: &str,
        lat: f64,
        lng: f64,
        weight: f64,
        window: &str,
        zone: Option<&str>,
    ) -> Order {
        let mut o = Order::new(
            id,
            Order::parse_date("2025-03-01").expect("valid"),
            TimeWindow::parse(window).expect("valid"),
            weight,
            format!("P-{id}"),
            format!("Customer {id}"),
            format!("Alamat {id}"),
            GeoPoint::new(lat, lng).expect("valid"),
        )
        .expect("valid order");
        if let Some(z) = zone {
            o = o.with_zone(z);
        }
        o
    }

    fn depot() -> Location {
        Location::depot(
            "Warehouse",
            GeoPoint::new(-6.2088, 106.8456).expect("valid"),
        )
    }

    fn fleet_of(types: Vec<VehicleType>, params: RoutingParams) -> Fleet {
        Fleet::new(types, params).expect("valid fleet")
    }

    /// S1: one customer, one vehicle, everything fits.
    #[test]
    fn test_trivial_single_delivery() {
        let orders = vec![order_at(
            "SO-1", -6.2100, 106.8500, 50.0, "04:00-05:00", None,
        )];
        let van = VehicleType::new("L300", 800.0, 5000.0).expect("valid");
        let planner = TourPlanner::new(
            depot(),
            fleet_of(vec![van], RoutingParams::default()),
            MultiHubConfig::default(),
        );

        let points = vec![depot().point(), orders[0].point()];
        let travel = TravelMatrix::great_circle(&points, 25.0);
        let solution = planner
            .plan_with_matrices(&orders, &travel, &quick_config())
            .expect("plans");

        assert_eq!(solution.vehicles_used(), 1);
        assert!(solution.unassigned().is_empty());
        let route = &solution.routes()[0];
        assert_eq!(route.num_stops(), 1);
        let stop = &route.stops()[0];
        assert!(stop.arrival >= 240 && stop.arrival <= 300, "{}", stop.arrival);

        let round_trip = 2.0 * travel.distance_km(0, 1);
        assert!((route.total_distance_km() - round_trip).abs() < 1e-9);
        assert!((route.total_cost() - round_trip * 5000.0).abs() < 1e-6);
    }

    /// S2: capacity forces a second vehicle.
    #[test]
    fn test_capacity_forces_multi_vehicle() {
        let orders = vec![
            order_at("SO-1", -6.2100, 106.8500, 250.0, "04:00-08:00", None),
            order_at("SO-2", -6.2150, 106.8520, 250.0, "04:00-08:00", None),
            order_at("SO-3", -6.2200, 106.8540, 250.0, "04:00-08:00", None),
        ];
        let van = VehicleType::new("Granmax", 500.0, 3500.0)
            .expect("valid")
            .with_unlimited(true);
        let planner = TourPlanner::new(
            depot(),
            fleet_of(vec![van], RoutingParams::default()),
            MultiHubConfig::default(),
        );

        let mut points = vec![depot().point()];
        points.extend(orders.iter().map(|o| o.point()));
        let travel = TravelMatrix::great_circle(&points, 25.0);
        let solution = planner
            .plan_with_matrices(&orders, &travel, &quick_config())
            .expect("plans");

        assert!(solution.vehicles_used() >= 2);
        assert_eq!(solution.orders_delivered(), 3);
        assert!(solution.unassigned().is_empty());
        for route in solution.routes() {
            assert!(route.total_weight_kg() <= 500.0 + 1e-9);
        }
    }

    /// S3: impossible windows drop an order instead of failing.
    #[test]
    fn test_time_window_infeasibility_drops_order() {
        let orders = vec![
            order_at("SO-E", -6.2100, 106.8500, 10.0, "06:00-06:01", None),
            order_at("SO-W", -6.2200, 106.8540, 10.0, "06:00-06:01", None),
        ];
        // one vehicle only, strict tolerances
        let van = VehicleType::new("L300", 800.0, 5000.0).expect("valid");
        let params = RoutingParams {
            non_priority_time_tolerance: 0,
            ..RoutingParams::default()
        };
        let planner = TourPlanner::new(
            depot(),
            fleet_of(vec![van], params),
            MultiHubConfig::default(),
        );

        // hand-built matrix: both customers 10 min out, 30 min apart
        let mut distance = Matrix::new(3);
        let mut duration = Matrix::new(3);
        for (i, j, km, min) in [
            (0usize, 1usize, 4.0, 10.0),
            (0, 2, 4.0, 10.0),
            (1, 2, 12.0, 30.0),
        ] {
            distance.set(i, j, km);
            distance.set(j, i, km);
            duration.set(i, j, min);
            duration.set(j, i, min);
        }
        let travel = TravelMatrix::new(distance, duration).expect("same size");
        let solution = planner
            .plan_with_matrices(&orders, &travel, &quick_config())
            .expect("no exception");

        assert_eq!(solution.orders_delivered(), 1);
        assert_eq!(solution.unassigned().len(), 1);
    }

    fn hub_network(mode: BlindVanMode, max_stops: usize) -> MultiHubConfig {
        let mut hub = HubConfig::new(
            "hub_utara",
            Location::hub("North Hub", GeoPoint::new(-6.1300, 106.8300).expect("valid"))
                .with_address("Jl. Pluit 1"),
            vec!["JAKARTA UTARA".to_string()],
        )
        .with_mode(mode);
        if mode == BlindVanMode::ConsolidationWithDelivery {
            hub = hub.with_en_route(EnRoutePolicy {
                max_stops,
                max_detour_minutes: 10,
                max_detour_km: 5.0,
                reserve_capacity_kg: 50.0,
            });
        }
        MultiHubConfig {
            enabled: true,
            hubs: vec![hub],
            unassigned_zone_policy: UnassignedZonePolicy::Depot,
            blind_van_return_to_depot: true,
            source_assignment: SourceAssignmentConfig {
                mode: SourceMode::ZoneBased,
                ..SourceAssignmentConfig::default()
            },
            ..MultiHubConfig::default()
        }
    }

    fn hub_fleet() -> Fleet {
        let van = VehicleType::new("Blind Van", 1000.0, 6000.0).expect("valid");
        let motor = VehicleType::new("Sepeda Motor", 150.0, 1000.0)
            .expect("valid")
            .with_fixed_count(2)
            .with_unlimited(true);
        fleet_of(vec![van, motor], RoutingParams::default())
    }

    /// Full-matrix layout for hub tests: [depot, hub, customers..] on a
    /// line with 2 min/km travel.
    fn line_matrix(coords: &[f64]) -> TravelMatrix {
        let n = coords.len();
        let distance = Matrix::from_fn(n, |i, j| (coords[i] - coords[j]).abs());
        let duration = Matrix::from_fn(n, |i, j| (coords[i] - coords[j]).abs() * 2.0);
        TravelMatrix::new(distance, duration).expect("same size")
    }

    /// S4: Mode A consolidation splits hub-zone and depot customers.
    #[test]
    fn test_hub_consolidation_mode_a() {
        let orders = vec![
            order_at("N-1", -6.1290, 106.8310, 120.0, "07:00-10:00", Some("JAKARTA UTARA")),
            order_at("N-2", -6.1310, 106.8290, 80.0, "07:00-10:00", Some("JAKARTA UTARA")),
            order_at("S-1", -6.2100, 106.8500, 60.0, "07:00-10:00", Some("JAKARTA SELATAN")),
            order_at("S-2", -6.2150, 106.8520, 40.0, "07:00-10:00", Some("JAKARTA SELATAN")),
        ];
        let planner = TourPlanner::new(
            depot(),
            hub_fleet(),
            hub_network(BlindVanMode::ConsolidationOnly, 0),
        );

        // depot 0, hub 10 km out; north customers near the hub, south near
        // the depot
        let travel = line_matrix(&[0.0, 10.0, 10.5, 11.0, 1.0, 1.5]);
        let solution = planner
            .plan_with_matrices(&orders, &travel, &quick_config())
            .expect("plans");

        // blind van leads with the consolidation stop
        let blind = &solution.routes()[0];
        assert_eq!(blind.vehicle().type_name(), "Blind Van");
        let consolidation: Vec<_> = blind
            .stops()
            .iter()
            .filter(|s| s.order.kind() == OrderKind::HubConsolidation)
            .collect();
        assert_eq!(consolidation.len(), 1);
        assert!((consolidation[0].order.weight_kg() - 200.0).abs() < 1e-9);

        let hub_source = Source::Hub("hub_utara".to_string());
        let mut from_hub: Vec<&str> = Vec::new();
        let mut from_depot: Vec<&str> = Vec::new();
        for route in solution.routes().iter().skip(1) {
            for stop in route.stops() {
                if route.source() == &hub_source {
                    from_hub.push(stop.order.id());
                } else {
                    assert!(route.source().is_depot());
                    from_depot.push(stop.order.id());
                }
            }
        }
        from_hub.sort_unstable();
        from_depot.sort_unstable();
        assert_eq!(from_hub, vec!["N-1", "N-2"]);
        assert_eq!(from_depot, vec!["S-1", "S-2"]);
        assert!(solution.unassigned().is_empty());
    }

    /// S5: Mode B pulls a corridor customer onto the blind van.
    #[test]
    fn test_hub_mode_b_en_route_delivery() {
        let orders = vec![
            order_at("N-1", -6.1290, 106.8310, 120.0, "07:00-10:00", Some("JAKARTA UTARA")),
            order_at("N-2", -6.1310, 106.8290, 80.0, "07:00-10:00", Some("JAKARTA UTARA")),
            // on the depot→hub corridor, unmapped zone → depot pool
            order_at("MID", -6.1700, 106.8380, 30.0, "07:00-10:00", Some("JAKARTA PUSAT")),
            order_at("S-1", -6.2100, 106.8500, 60.0, "07:00-10:00", Some("JAKARTA SELATAN")),
        ];
        let planner = TourPlanner::new(
            depot(),
            hub_fleet(),
            hub_network(BlindVanMode::ConsolidationWithDelivery, 1),
        );

        // MID sits dead on the line from depot (0) to hub (10): zero km
        // detour, 5 min service detour, inside the 5 km / 10 min caps.
        let travel = line_matrix(&[0.0, 10.0, 10.5, 11.0, 5.0, 1.0]);
        let solution = planner
            .plan_with_matrices(&orders, &travel, &quick_config())
            .expect("plans");

        let blind = &solution.routes()[0];
        assert_eq!(blind.vehicle().type_name(), "Blind Van");
        assert_eq!(blind.stops().len(), 2, "en-route stop + hub stop");
        assert_eq!(blind.stops()[0].order.id(), "MID");
        assert_eq!(blind.stops()[1].order.kind(), OrderKind::HubConsolidation);
        assert!(blind.stops()[0].arrival <= blind.stops()[1].arrival);

        // MID appears nowhere else
        for route in solution.routes().iter().skip(1) {
            assert!(route.stops().iter().all(|s| s.order.id() != "MID"));
        }
        assert!(solution.unassigned().iter().all(|o| o.id() != "MID"));

        // the remaining depot-pool customer still goes out from the depot
        let depot_served: Vec<&str> = solution
            .routes()
            .iter()
            .skip(1)
            .filter(|r| r.source().is_depot())
            .flat_map(|r| r.stops().iter().map(|s| s.order.id()))
            .collect();
        assert_eq!(depot_served, vec!["S-1"]);
    }

    /// S6: two temporal clusters share physical motorcycles.
    #[test]
    fn test_multi_trip_across_clusters() {
        let mut orders = Vec::new();
        for i in 0..3 {
            orders.push(order_at(
                &format!("AM-{i}"),
                -6.2100 - 0.002 * i as f64,
                106.8500,
                10.0,
                "07:00-08:30",
                None,
            ));
        }
        for i in 0..3 {
            orders.push(order_at(
                &format!("PM-{i}"),
                -6.2100 - 0.002 * i as f64,
                106.8520,
                10.0,
                "12:00-13:00",
                None,
            ));
        }

        let motor = VehicleType::new("Sepeda Motor", 40.0, 1000.0)
            .expect("valid")
            .with_fixed_count(2);
        let params = RoutingParams {
            multi_trip: MultiTripParams {
                enabled: true,
                buffer_minutes: 45,
                gap_threshold_minutes: 60,
                min_cluster_size: 1,
                same_source_only: true,
                max_trips_per_vehicle: 3,
            },
            ..RoutingParams::default()
        };
        let planner = TourPlanner::new(
            depot(),
            fleet_of(vec![motor], params.clone()),
            MultiHubConfig::default(),
        );

        let mut points = vec![depot().point()];
        points.extend(orders.iter().map(|o| o.point()));
        let travel = TravelMatrix::great_circle(&points, 25.0);
        let solution = planner
            .plan_with_matrices(&orders, &travel, &quick_config())
            .expect("plans");

        assert_eq!(
            solution.orders_delivered() + solution.unassigned().len(),
            6
        );
        let second_trips: Vec<&Route> = solution
            .routes()
            .iter()
            .filter(|r| r.trip_number() == 2)
            .collect();
        assert!(
            !second_trips.is_empty(),
            "the noon cluster should reuse a morning motorcycle"
        );

        for second in second_trips {
            let first = solution
                .routes()
                .iter()
                .find(|r| {
                    r.vehicle().name() == second.vehicle().name() && r.trip_number() == 1
                })
                .expect("trip 1 exists for the reused vehicle");
            assert!(
                first.end_time(crate::multitrip::RETURN_BUFFER_MIN)
                    + params.multi_trip.buffer_minutes
                    <= second.departure_time()
            );
        }
    }

    /// Every input order lands in exactly one place (invariant 1).
    #[test]
    fn test_order_conservation() {
        let orders = vec![
            order_at("A", -6.2100, 106.8500, 400.0, "06:00-09:00", None),
            order_at("B", -6.2150, 106.8520, 400.0, "06:00-09:00", None),
            order_at("C", -6.2200, 106.8540, 400.0, "06:00-09:00", None),
            order_at("D", -6.2250, 106.8560, 900.0, "06:00-09:00", None),
        ];
        let van = VehicleType::new("Granmax", 500.0, 3500.0)
            .expect("valid")
            .with_fixed_count(2);
        let planner = TourPlanner::new(
            depot(),
            fleet_of(vec![van], RoutingParams::default()),
            MultiHubConfig::default(),
        );
        let mut points = vec![depot().point()];
        points.extend(orders.iter().map(|o| o.point()));
        let travel = TravelMatrix::great_circle(&points, 25.0);
        let solution = planner
            .plan_with_matrices(&orders, &travel, &quick_config())
            .expect("plans");

        let mut seen: Vec<&str> = solution
            .routes()
            .iter()
            .flat_map(|r| r.stops().iter().map(|s| s.order.id()))
            .chain(solution.unassigned().iter().map(|o| o.id()))
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec!["A", "B", "C", "D"]);
        // D outweighs every vehicle
        assert!(solution.unassigned().iter().any(|o| o.id() == "D"));
    }

    #[test]
    fn test_empty_orders_short_circuit() {
        let van = VehicleType::new("L300", 800.0, 5000.0).expect("valid");
        let planner = TourPlanner::new(
            depot(),
            fleet_of(vec![van], RoutingParams::default()),
            MultiHubConfig::default(),
        );
        let travel = TravelMatrix::great_circle(&[depot().point()], 25.0);
        let solution = planner
            .plan_with_matrices(&[], &travel, &quick_config())
            .expect("plans");
        assert!(solution.routes().is_empty());
        assert!(solution.unassigned().is_empty());
    }

    #[test]
    fn test_matrix_size_mismatch_rejected() {
        let orders = vec![order_at("A", -6.21, 106.85, 10.0, "06:00-09:00", None)];
        let van = VehicleType::new("L300", 800.0, 5000.0).expect("valid");
        let planner = TourPlanner::new(
            depot(),
            fleet_of(vec![van], RoutingParams::default()),
            MultiHubConfig::default(),
        );
        let travel = TravelMatrix::great_circle(&[depot().point()], 25.0);
        assert!(matches!(
            planner.plan_with_matrices(&orders, &travel, &quick_config()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_strategy_is_propagated() {
        let orders = vec![order_at("A", -6.21, 106.85, 10.0, "06:00-09:00", None)];
        let van = VehicleType::new("L300", 800.0, 5000.0).expect("valid");
        let planner = TourPlanner::new(
            depot(),
            fleet_of(vec![van], RoutingParams::default()),
            MultiHubConfig::default(),
        );
        let mut points = vec![depot().point()];
        points.extend(orders.iter().map(|o| o.point()));
        let travel = TravelMatrix::great_circle(&points, 25.0);
        let config = PlannerConfig {
            solver: SolverConfig {
                strategy: Strategy::MinimizeCost,
                time_limit: Duration::from_secs(1),
                max_iterations: 500,
                ..SolverConfig::default()
            },
            min_cluster_budget: Duration::from_millis(100),
        };
        let solution = planner
            .plan_with_matrices(&orders, &travel, &config)
            .expect("plans");
        assert_eq!(solution.strategy(), Strategy::MinimizeCost);
    }
}
