//! Cheapest-insertion construction of an initial solution.
//!
//! Repeatedly inserts the globally cheapest feasible (customer, route,
//! position) triple. When nothing fits the open routes, a new vehicle is
//! opened seeded with the farthest remaining customer; customers no vehicle
//! can serve become unassigned instead of failing the solve.

use crate::models::Fleet;
use crate::solver::schedule::Ctx;

/// One vehicle's planned visit sequence over sub-problem customer indices.
#[derive(Debug, Clone)]
pub(crate) struct RoutePlan {
    /// Index into `fleet.types()`.
    pub type_idx: usize,
    /// Unit number within the type, 1-based.
    pub unit: usize,
    pub seq: Vec<usize>,
}

/// Tracks how many units of each type have been materialized.
#[derive(Debug, Clone)]
pub(crate) struct VehiclePool {
    minted: Vec<usize>,
}

impl VehiclePool {
    pub fn new(num_types: usize) -> Self {
        Self {
            minted: vec![0; num_types],
        }
    }

    /// Claims the next unit of a type, if the type has units left
    /// (`fixed_count` owned, more only when unlimited).
    pub fn claim(&mut self, fleet: &Fleet, type_idx: usize) -> Option<usize> {
        let t = &fleet.types()[type_idx];
        let next = self.minted[type_idx] + 1;
        if next <= t.fixed_count() || t.unlimited() {
            self.minted[type_idx] = next;
            Some(next)
        } else {
            None
        }
    }
}

/// A complete in-progress solution.
#[derive(Debug, Clone)]
pub(crate) struct PlanState {
    pub routes: Vec<RoutePlan>,
    /// Customer indices the solver pays the drop penalty for.
    pub unassigned: Vec<usize>,
    pub pool: VehiclePool,
}

impl PlanState {
    pub fn new(num_types: usize) -> Self {
        Self {
            routes: Vec::new(),
            unassigned: Vec::new(),
            pool: VehiclePool::new(num_types),
        }
    }

    pub fn drop_empty_routes(&mut self) {
        self.routes.retain(|r| !r.seq.is_empty());
    }
}

/// Cheapest feasible insertion of `customer` into `route`, as
/// `(position, distance delta)`.
pub(crate) fn best_insertion(
    ctx: &Ctx,
    route: &RoutePlan,
    customer: usize,
) -> Option<(usize, f64)> {
    let fleet_type = &ctx.fleet.types()[route.type_idx];
    let weight = ctx.order(customer).weight_kg();
    if ctx.load(&route.seq) + weight > fleet_type.capacity_kg() + 1e-9 {
        return None;
    }
    if !ctx.zones_allow(&route.seq, customer) {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for pos in 0..=route.seq.len() {
        let prev = if pos == 0 { 0 } else { route.seq[pos - 1] };
        let next = if pos == route.seq.len() {
            0
        } else {
            route.seq[pos]
        };
        let delta = ctx.travel.distance_km(prev, customer)
            + ctx.travel.distance_km(customer, next)
            - ctx.travel.distance_km(prev, next);

        if best.as_ref().is_some_and(|b| delta >= b.1) {
            continue;
        }

        let mut candidate = route.seq.clone();
        candidate.insert(pos, customer);
        if ctx.simulate(&candidate).is_some() {
            best = Some((pos, delta));
        }
    }
    best
}

/// Builds an initial solution by parallel cheapest insertion.
pub(crate) fn construct(ctx: &Ctx) -> PlanState {
    let mut state = PlanState::new(ctx.fleet.types().len());
    let mut unrouted: Vec<usize> = (1..=ctx.orders.len()).collect();

    while !unrouted.is_empty() {
        // Globally cheapest feasible insertion into an open route.
        let mut best: Option<(usize, usize, usize, f64)> = None;
        for (ui, &c) in unrouted.iter().enumerate() {
            for (ri, route) in state.routes.iter().enumerate() {
                if let Some((pos, delta)) = best_insertion(ctx, route, c) {
                    if best.as_ref().is_none_or(|b| delta < b.3) {
                        best = Some((ui, ri, pos, delta));
                    }
                }
            }
        }

        if let Some((ui, ri, pos, _)) = best {
            let c = unrouted.remove(ui);
            state.routes[ri].seq.insert(pos, c);
            continue;
        }

        // Nothing fits: open a new vehicle seeded with the farthest
        // remaining customer that some type can serve alone.
        if !open_route(ctx, &mut state, &mut unrouted) {
            state.unassigned.append(&mut unrouted);
        }
    }

    state.drop_empty_routes();
    state
}

/// Opens one new route seeded with the farthest seedable customer.
/// Returns false when no remaining customer can be served by any
/// available vehicle.
pub(crate) fn open_route(
    ctx: &Ctx,
    state: &mut PlanState,
    unrouted: &mut Vec<usize>,
) -> bool {
    let mut by_distance: Vec<usize> = (0..unrouted.len()).collect();
    by_distance.sort_by(|&a, &b| {
        let da = ctx.travel.distance_km(0, unrouted[a]);
        let db = ctx.travel.distance_km(0, unrouted[b]);
        db.partial_cmp(&da).expect("distances are finite")
    });

    for ui in by_distance {
        let c = unrouted[ui];
        for type_idx in 0..ctx.fleet.types().len() {
            let t = &ctx.fleet.types()[type_idx];
            if ctx.order(c).weight_kg() > t.capacity_kg() + 1e-9 {
                continue;
            }
            if ctx.simulate(&[c]).is_none() {
                break; // infeasible alone regardless of type
            }
            let Some(unit) = state.pool.claim(ctx.fleet, type_idx) else {
                continue;
            };
            state.routes.push(RoutePlan {
                type_idx,
                unit,
                seq: vec![c],
            });
            unrouted.remove(ui);
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{Matrix, TravelMatrix};
    use crate::models::{
        Fleet, GeoPoint, Order, RoutingParams, TimeWindow, VehicleType,
    };

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

    fn line_travel(n: usize) -> TravelMatrix {
        let distance = Matrix::from_fn(n, |i, j| (i as f64 - j as f64).abs() * 2.0);
        let duration = Matrix::from_fn(n, |i, j| (i as f64 - j as f64).abs() * 4.0);
        TravelMatrix::new(distance, duration).expect("same size")
    }

    fn ctx<'a>(orders: &'a [Order], travel: &'a TravelMatrix, fleet: &'a Fleet) -> Ctx<'a> {
        Ctx {
            orders,
            travel,
            fleet,
            service_time: 15,
            start_time: 0,
            max_route_minutes: 1440,
            zone_cap: 2,
        }
    }

    #[test]
    fn test_pool_respects_fixed_count() {
        let t = VehicleType::new("Van", 100.0, 5000.0)
            .expect("valid")
            .with_fixed_count(2);
        let fleet = Fleet::new(vec![t], RoutingParams::default()).expect("valid");
        let mut pool = VehiclePool::new(1);
        assert_eq!(pool.claim(&fleet, 0), Some(1));
        assert_eq!(pool.claim(&fleet, 0), Some(2));
        assert_eq!(pool.claim(&fleet, 0), None);
    }

    #[test]
    fn test_pool_unlimited_mints_past_fixed_count() {
        let t = VehicleType::new("Motor", 40.0, 1000.0)
            .expect("valid")
            .with_fixed_count(1)
            .with_unlimited(true);
        let fleet = Fleet::new(vec![t], RoutingParams::default()).expect("valid");
        let mut pool = VehiclePool::new(1);
        assert_eq!(pool.claim(&fleet, 0), Some(1));
        assert_eq!(pool.claim(&fleet, 0), Some(2));
        assert_eq!(pool.claim(&fleet, 0), Some(3));
    }

    #[test]
    fn test_construct_single_route() {
        let orders = vec![
            order("a", 10.0, "04:00-10:00"),
            order("b", 10.0, "04:00-10:00"),
            order("c", 10.0, "04:00-10:00"),
        ];
        let travel = line_travel(4);
        let t = VehicleType::new("Van", 100.0, 5000.0)
            .expect("valid")
            .with_unlimited(true);
        let fleet = Fleet::new(vec![t], RoutingParams::default()).expect("valid");
        let ctx = ctx(&orders, &travel, &fleet);

        let state = construct(&ctx);
        assert_eq!(state.routes.len(), 1);
        assert_eq!(state.routes[0].seq.len(), 3);
        assert!(state.unassigned.is_empty());
    }

    #[test]
    fn test_construct_splits_on_capacity() {
        let orders = vec![
            order("a", 250.0, "04:00-10:00"),
            order("b", 250.0, "04:00-10:00"),
            order("c", 250.0, "04:00-10:00"),
        ];
        let travel = line_travel(4);
        let t = VehicleType::new("Van", 500.0, 5000.0)
            .expect("valid")
            .with_unlimited(true);
        let fleet = Fleet::new(vec![t], RoutingParams::default()).expect("valid");
        let ctx = ctx(&orders, &travel, &fleet);

        let state = construct(&ctx);
        assert!(state.routes.len() >= 2);
        assert!(state.unassigned.is_empty());
        for route in &state.routes {
            assert!(ctx.load(&route.seq) <= 500.0 + 1e-9);
        }
    }

    #[test]
    fn test_construct_drops_unservable_order() {
        // 120 kg order with only 100 kg vehicles
        let orders = vec![
            order("ok", 50.0, "04:00-10:00"),
            order("heavy", 120.0, "04:00-10:00"),
        ];
        let travel = line_travel(3);
        let t = VehicleType::new("Van", 100.0, 5000.0)
            .expect("valid")
            .with_unlimited(true);
        let fleet = Fleet::new(vec![t], RoutingParams::default()).expect("valid");
        let ctx = ctx(&orders, &travel, &fleet);

        let state = construct(&ctx);
        assert_eq!(state.unassigned, vec![2]);
        assert_eq!(state.routes.len(), 1);
    }

    #[test]
    fn test_construct_respects_fixed_fleet() {
        // Two 60 kg orders, one 100 kg vehicle: one order must be dropped.
        let orders = vec![
            order("a", 60.0, "04:00-10:00"),
            order("b", 60.0, "04:00-10:00"),
        ];
        let travel = line_travel(3);
        let t = VehicleType::new("Van", 100.0, 5000.0).expect("valid");
        let fleet = Fleet::new(vec![t], RoutingParams::default()).expect("valid");
        let ctx = ctx(&orders, &travel, &fleet);

        let state = construct(&ctx);
        assert_eq!(state.routes.len(), 1);
        assert_eq!(state.unassigned.len(), 1);
    }

    #[test]
    fn test_best_insertion_prefers_cheapest_position() {
        let orders = vec![
            order("a", 10.0, "04:00-20:00"),
            order("b", 10.0, "04:00-20:00"),
            order("mid", 10.0, "04:00-20:00"),
        ];
        // positions on a line: source=0, a=1, b=2, mid=3, but distances
        // come from the matrix, so craft one where mid sits between a and b.
        let mut distance = Matrix::new(4);
        let mut duration = Matrix::new(4);
        let coords: [f64; 4] = [0.0, 2.0, 6.0, 4.0]; // source, a, b, mid
        for i in 0..4 {
            for j in 0..4 {
                let d = (coords[i] - coords[j]).abs();
                distance.set(i, j, d);
                duration.set(i, j, d);
            }
        }
        let travel = TravelMatrix::new(distance, duration).expect("same size");
        let t = VehicleType::new("Van", 100.0, 5000.0).expect("valid");
        let fleet = Fleet::new(vec![t], RoutingParams::default()).expect("valid");
        let ctx = ctx(&orders, &travel, &fleet);

        let route = RoutePlan {
            type_idx: 0,
            unit: 1,
            seq: vec![1, 2],
        };
        let (pos, delta) = best_insertion(&ctx, &route, 3).expect("feasible");
        assert_eq!(pos, 1, "between a and b");
        assert!(delta.abs() < 1e-9, "on the line the detour is free");
    }

    #[test]
    fn test_best_insertion_rejects_zone_violation() {
        let orders = vec![
            order("a", 1.0, "04:00-20:00").with_zone("Z1"),
            order("b", 1.0, "04:00-20:00").with_zone("Z2"),
            order("c", 1.0, "04:00-20:00").with_zone("Z3"),
        ];
        let travel = line_travel(4);
        let t = VehicleType::new("Van", 100.0, 5000.0).expect("valid");
        let fleet = Fleet::new(vec![t], RoutingParams::default()).expect("valid");
        let ctx = ctx(&orders, &travel, &fleet);

        let route = RoutePlan {
            type_idx: 0,
            unit: 1,
            seq: vec![1, 2],
        };
        assert!(best_insertion(&ctx, &route, 3).is_none());
    }
}
