//! Physical vehicle reuse across temporal phases.
//!
//! Per-cluster solutions are solved with fresh vehicle units; the
//! assembler rebinds those routes to a pool of physical vehicles so a unit
//! that returns early enough (reload buffer included) carries the next
//! phase as trip 2, 3, … instead of minting another vehicle.

use tracing::{debug, info};

use crate::models::{MultiTripParams, Route, RoutingSolution, Source, Strategy};

/// Minutes allowed for the return drive when estimating a route's end.
pub const RETURN_BUFFER_MIN: i64 = 30;

/// One physical vehicle's running assignment state.
#[derive(Debug, Clone)]
struct PhysicalVehicle {
    type_name: String,
    unit: usize,
    source: Source,
    last_end_time: i64,
    trips: usize,
}

/// Binds per-cluster routes to physical vehicles.
pub struct TripAssembler<'a> {
    params: &'a MultiTripParams,
}

impl<'a> TripAssembler<'a> {
    pub fn new(params: &'a MultiTripParams) -> Self {
        Self { params }
    }

    /// Assembles cluster solutions (already in chronological order of
    /// `earliest_start`) into one route list with trip numbers, plus the
    /// concatenated unassigned orders.
    ///
    /// With multi-trip disabled or a single cluster, routes pass through
    /// with fresh physical units and trip 1.
    pub fn assemble(
        &self,
        cluster_solutions: Vec<RoutingSolution>,
        source: &Source,
        strategy: Strategy,
    ) -> RoutingSolution {
        let single = cluster_solutions.len() <= 1;
        let mut pool: Vec<PhysicalVehicle> = Vec::new();
        let mut next_unit: Vec<(String, usize)> = Vec::new();
        let mut all_routes: Vec<Route> = Vec::new();
        let mut all_unassigned = Vec::new();
        let mut total_time = std::time::Duration::ZERO;

        for solution in cluster_solutions {
            total_time += solution.solve_time();
            let (routes, unassigned) = split(solution);
            all_unassigned.extend(unassigned);

            for mut route in routes {
                if route.is_empty() {
                    continue;
                }
                route.set_source(source.clone());

                let start = route.departure_time();
                let end = route.end_time(RETURN_BUFFER_MIN);
                let type_name = route.vehicle().type_name().to_string();

                let reuse = if self.params.enabled && !single {
                    self.find_available(&pool, &type_name, source, start)
                } else {
                    None
                };

                match reuse {
                    Some(pi) => {
                        let physical = &mut pool[pi];
                        physical.trips += 1;
                        physical.last_end_time = end;
                        route.set_vehicle(route.vehicle().with_unit(physical.unit));
                        route.set_trip_number(physical.trips);
                        debug!(
                            vehicle = %route.vehicle().name(),
                            trip = physical.trips,
                            "reusing physical vehicle"
                        );
                    }
                    None => {
                        let unit = claim_unit(&mut next_unit, &type_name);
                        route.set_vehicle(route.vehicle().with_unit(unit));
                        route.set_trip_number(1);
                        pool.push(PhysicalVehicle {
                            type_name,
                            unit,
                            source: source.clone(),
                            last_end_time: end,
                            trips: 1,
                        });
                    }
                }
                all_routes.push(route);
            }
        }

        let multi = all_routes.iter().filter(|r| r.trip_number() > 1).count();
        if multi > 0 {
            info!(
                source = %source,
                routes = all_routes.len(),
                second_trips = multi,
                "multi-trip assembly complete"
            );
        }
        RoutingSolution::new(all_routes, all_unassigned, strategy, total_time)
    }

    /// The reusable physical vehicle that frees up earliest, if any frees
    /// up before `start` with the reload buffer respected. Ties fall to
    /// the lower unit number.
    fn find_available(
        &self,
        pool: &[PhysicalVehicle],
        type_name: &str,
        source: &Source,
        start: i64,
    ) -> Option<usize> {
        pool.iter()
            .enumerate()
            .filter(|(_, p)| {
                p.type_name == type_name
                    && (!self.params.same_source_only || &p.source == source)
                    && p.trips < self.params.max_trips_per_vehicle
                    && p.last_end_time + self.params.buffer_minutes <= start
            })
            .min_by_key(|(_, p)| (p.last_end_time + self.params.buffer_minutes, p.unit))
            .map(|(i, _)| i)
    }
}

fn claim_unit(next_unit: &mut Vec<(String, usize)>, type_name: &str) -> usize {
    match next_unit.iter_mut().find(|(t, _)| t == type_name) {
        Some((_, n)) => {
            *n += 1;
            *n
        }
        None => {
            next_unit.push((type_name.to_string(), 1));
            1
        }
    }
}

fn split(solution: RoutingSolution) -> (Vec<Route>, Vec<crate::models::Order>) {
    let unassigned = solution.unassigned().to_vec();
    let routes = solution.routes().to_vec();
    (routes, unassigned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::models::{
        Fleet, GeoPoint, Order, RouteStop, RoutingParams, TimeWindow, VehicleType,
    };

    fn order(id: &str, window: &str) -> Order {
        Order::new(
            id,
            Order::parse_date("2025-03-01").expect("valid"),
            TimeWindow::parse(window).expect("valid"),
            10.0,
            "P-1",
            format!("Customer {id}"),
            "Address",
            GeoPoint::new(-6.2, 106.8).expect("valid"),
        )
        .expect("valid order")
    }

    fn fleet() -> Fleet {
        let t = VehicleType::new("Motor", 40.0, 1000.0).expect("valid");
        Fleet::new(vec![t], RoutingParams::default()).expect("valid")
    }

    /// A one-stop route departing at `departure`, last stop leaving at
    /// `last_departure`.
    fn route(f: &Fleet, unit: usize, departure: i64, last_departure: i64, id: &str) -> Route {
        let mut r = Route::new(f.types()[0].instance(unit), Source::Depot);
        r.set_departure_time(departure);
        r.push_stop(RouteStop {
            order: order(id, "07:00-13:00"),
            arrival: last_departure - 15,
            departure: last_departure,
            distance_from_prev_km: 2.0,
            cumulative_weight_kg: 10.0,
            sequence: 0,
        });
        r.set_totals(4.0, 4000.0);
        r
    }

    fn solution(routes: Vec<Route>) -> RoutingSolution {
        RoutingSolution::new(routes, vec![], Strategy::Balanced, Duration::from_secs(1))
    }

    fn params() -> MultiTripParams {
        MultiTripParams {
            enabled: true,
            buffer_minutes: 60,
            max_trips_per_vehicle: 3,
            ..MultiTripParams::default()
        }
    }

    #[test]
    fn test_single_cluster_passes_through() {
        let f = fleet();
        let p = params();
        let assembler = TripAssembler::new(&p);
        let result = assembler.assemble(
            vec![solution(vec![route(&f, 1, 420, 500, "a")])],
            &Source::Depot,
            Strategy::Balanced,
        );
        assert_eq!(result.routes().len(), 1);
        assert_eq!(result.routes()[0].trip_number(), 1);
        assert_eq!(result.routes()[0].vehicle().name(), "Motor_1");
    }

    #[test]
    fn test_vehicle_reused_across_clusters() {
        let f = fleet();
        let p = params();
        let assembler = TripAssembler::new(&p);

        // Cluster 1 route ends 08:20 + 30 return = 08:50; with a 60-minute
        // buffer the vehicle frees at 09:50, before the 12:00 departure.
        let morning = solution(vec![route(&f, 1, 420, 500, "a")]);
        let noon = solution(vec![route(&f, 1, 720, 780, "b")]);

        let result = assembler.assemble(vec![morning, noon], &Source::Depot, Strategy::Balanced);
        assert_eq!(result.routes().len(), 2);
        assert_eq!(result.routes()[0].trip_number(), 1);
        assert_eq!(result.routes()[1].trip_number(), 2);
        assert_eq!(
            result.routes()[0].vehicle().name(),
            result.routes()[1].vehicle().name()
        );

        // reload-buffer invariant between the two trips
        let end1 = result.routes()[0].end_time(RETURN_BUFFER_MIN);
        assert!(end1 + p.buffer_minutes <= result.routes()[1].departure_time());
    }

    #[test]
    fn test_new_vehicle_when_buffer_not_met() {
        let f = fleet();
        let p = params();
        let assembler = TripAssembler::new(&p);

        // Second departure at 09:30 < 08:50 + 60 → fresh unit.
        let morning = solution(vec![route(&f, 1, 420, 500, "a")]);
        let next = solution(vec![route(&f, 1, 570, 650, "b")]);

        let result = assembler.assemble(vec![morning, next], &Source::Depot, Strategy::Balanced);
        assert_eq!(result.routes()[1].trip_number(), 1);
        assert_eq!(result.routes()[0].vehicle().name(), "Motor_1");
        assert_eq!(result.routes()[1].vehicle().name(), "Motor_2");
    }

    #[test]
    fn test_max_trips_cap() {
        let f = fleet();
        let p = MultiTripParams {
            max_trips_per_vehicle: 2,
            ..params()
        };
        let assembler = TripAssembler::new(&p);

        let s1 = solution(vec![route(&f, 1, 300, 330, "a")]);
        let s2 = solution(vec![route(&f, 1, 500, 530, "b")]);
        let s3 = solution(vec![route(&f, 1, 700, 730, "c")]);

        let result =
            assembler.assemble(vec![s1, s2, s3], &Source::Depot, Strategy::Balanced);
        let trips: Vec<usize> = result.routes().iter().map(|r| r.trip_number()).collect();
        assert_eq!(trips, vec![1, 2, 1], "third trip exceeds the cap of 2");
        assert_eq!(result.routes()[2].vehicle().name(), "Motor_2");
    }

    #[test]
    fn test_earliest_available_vehicle_wins() {
        let f = fleet();
        let p = params();
        let assembler = TripAssembler::new(&p);

        // Two morning routes: unit ending later (09:50) and earlier
        // (08:50). The afternoon route should bind to the earlier one.
        let morning = solution(vec![
            route(&f, 1, 420, 560, "late-finisher"),
            route(&f, 2, 420, 500, "early-finisher"),
        ]);
        let afternoon = solution(vec![route(&f, 1, 800, 860, "pm")]);

        let result =
            assembler.assemble(vec![morning, afternoon], &Source::Depot, Strategy::Balanced);
        let pm = &result.routes()[2];
        assert_eq!(pm.trip_number(), 2);
        assert_eq!(pm.vehicle().unit(), 2, "unit 2 finished earlier");
    }

    #[test]
    fn test_disabled_multi_trip_mints_fresh_units() {
        let f = fleet();
        let p = MultiTripParams {
            enabled: false,
            ..params()
        };
        let assembler = TripAssembler::new(&p);
        let s1 = solution(vec![route(&f, 1, 300, 330, "a")]);
        let s2 = solution(vec![route(&f, 1, 700, 730, "b")]);
        let result = assembler.assemble(vec![s1, s2], &Source::Depot, Strategy::Balanced);
        assert!(result.routes().iter().all(|r| r.trip_number() == 1));
        assert_eq!(result.routes()[1].vehicle().name(), "Motor_2");
    }

    #[test]
    fn test_no_overlap_per_physical_vehicle() {
        let f = fleet();
        let p = params();
        let assembler = TripAssembler::new(&p);
        let s1 = solution(vec![route(&f, 1, 300, 360, "a"), route(&f, 2, 310, 370, "b")]);
        let s2 = solution(vec![route(&f, 1, 600, 660, "c"), route(&f, 2, 610, 670, "d")]);
        let result = assembler.assemble(vec![s1, s2], &Source::Depot, Strategy::Balanced);

        // group routes per physical vehicle and check pairwise separation
        let mut by_vehicle: Vec<(String, Vec<&Route>)> = Vec::new();
        for r in result.routes() {
            match by_vehicle.iter_mut().find(|(n, _)| *n == r.vehicle().name()) {
                Some((_, v)) => v.push(r),
                None => by_vehicle.push((r.vehicle().name(), vec![r])),
            }
        }
        for (_, routes) in &by_vehicle {
            for pair in routes.windows(2) {
                assert!(
                    pair[0].end_time(RETURN_BUFFER_MIN) + p.buffer_minutes
                        <= pair[1].departure_time()
                );
            }
        }
    }
}
