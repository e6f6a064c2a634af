//! The per-phase CVRPTW solver.
//!
//! Assembles a sub-problem (source-rooted matrices, order subset, fleet),
//! runs cheapest-insertion construction followed by the metaheuristic
//! search, and extracts timed routes. A solve moves through
//! `Initializing → Building → Searching → {Feasible | Timeout |
//! Infeasible}`; both feasible and timeout-with-incumbent outcomes yield a
//! solution, while an empty incumbent raises [`Error::NoSolution`].

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::matrix::TravelMatrix;
use crate::models::{
    Fleet, Order, Route, RouteStop, RoutingSolution, Source, Strategy,
};
use crate::solver::insertion::construct;
use crate::solver::schedule::Ctx;
use crate::solver::search::{improve, SearchParams};

/// Fixed per-stop dwell, minutes.
pub const DEFAULT_SERVICE_TIME: i64 = 15;

/// A vehicle is dispatched to be at its first stop when the earliest
/// window opens, minus this head start.
const DEPARTURE_HEAD_START: i64 = 30;

/// Solver knobs for one phase solve.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub strategy: Strategy,
    /// Wall-clock budget for the search.
    pub time_limit: Duration,
    /// RNG seed; fixed seed plus fixed inputs reproduce the solve.
    pub seed: u64,
    pub service_time_minutes: i64,
    /// Earliest departure from the source, minutes from midnight. Used for
    /// hub-sourced phases that cannot start before the consolidation load
    /// arrives.
    pub earliest_departure: i64,
    /// Latest allowed tour end, minutes from midnight.
    pub max_route_minutes: i64,
    /// Objective charge per dropped order.
    pub drop_penalty: f64,
    /// Hard iteration cap; binds before the deadline on small instances so
    /// results stay reproducible.
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Balanced,
            time_limit: Duration::from_secs(30),
            seed: 0,
            service_time_minutes: DEFAULT_SERVICE_TIME,
            earliest_departure: 0,
            max_route_minutes: 24 * 60,
            drop_penalty: 1e7,
            max_iterations: 20_000,
        }
    }
}

/// Capacitated VRP with time windows over one source and one order subset.
///
/// `travel` must be source-rooted: row 0 is the source, row `i` is
/// `orders[i - 1]`.
pub struct CvrptwSolver<'a> {
    orders: &'a [Order],
    fleet: &'a Fleet,
    travel: &'a TravelMatrix,
    source: Source,
    config: SolverConfig,
}

impl<'a> CvrptwSolver<'a> {
    pub fn new(
        orders: &'a [Order],
        fleet: &'a Fleet,
        travel: &'a TravelMatrix,
        source: Source,
        config: SolverConfig,
    ) -> Self {
        Self {
            orders,
            fleet,
            travel,
            source,
            config,
        }
    }

    /// Runs the solve. Orders that cannot be served feasibly are returned
    /// in `unassigned` rather than failing the call; [`Error::NoSolution`]
    /// is raised only when not a single order could be placed.
    pub fn solve(&self) -> Result<RoutingSolution> {
        let started = Instant::now();

        if self.orders.is_empty() {
            return Ok(RoutingSolution::empty(self.config.strategy));
        }
        if self.travel.size() != self.orders.len() + 1 {
            return Err(Error::Config(format!(
                "travel matrix covers {} locations, expected {} (source + orders)",
                self.travel.size(),
                self.orders.len() + 1
            )));
        }

        let ctx = Ctx {
            orders: self.orders,
            travel: self.travel,
            fleet: self.fleet,
            service_time: self.config.service_time_minutes,
            start_time: self.config.earliest_departure,
            max_route_minutes: self.config.max_route_minutes,
            zone_cap: self.fleet.params().max_zones_per_route,
        };

        debug!(
            source = %self.source,
            orders = self.orders.len(),
            strategy = self.config.strategy.as_str(),
            "building initial solution"
        );
        let mut state = construct(&ctx);

        let params = SearchParams {
            strategy: self.config.strategy,
            deadline: started + self.config.time_limit,
            max_iterations: self.config.max_iterations,
            drop_penalty: self.config.drop_penalty,
            seed: self.config.seed,
        };
        improve(&ctx, &mut state, &params);

        if state.routes.is_empty() {
            return Err(Error::NoSolution(format!(
                "no feasible route for any of the {} orders from {}.\n\
                 Possible causes: time windows too tight, vehicles too small, \
                 or unreachable customers.\n\
                 Try: relax time windows, lengthen the time budget, or add vehicles.",
                self.orders.len(),
                self.source
            )));
        }

        let solution = self.extract(&ctx, &state, started.elapsed());
        info!(
            source = %self.source,
            routes = solution.routes().len(),
            unassigned = solution.unassigned().len(),
            distance_km = solution.total_distance_km(),
            "phase solve complete"
        );
        Ok(solution)
    }

    fn extract(
        &self,
        ctx: &Ctx,
        state: &crate::solver::insertion::PlanState,
        elapsed: Duration,
    ) -> RoutingSolution {
        let mut routes = Vec::with_capacity(state.routes.len());

        for plan in &state.routes {
            if plan.seq.is_empty() {
                continue;
            }
            let schedule = ctx
                .simulate(&plan.seq)
                .expect("searched routes stay schedule-feasible");
            let vehicle = self.fleet.types()[plan.type_idx].instance(plan.unit);
            debug_assert!(ctx.feasible(&plan.seq, &vehicle));
            debug_assert!(schedule.end_time <= self.config.max_route_minutes);

            let mut route = Route::new(vehicle, self.source.clone());

            let earliest_window = plan
                .seq
                .iter()
                .map(|&c| ctx.order(c).window().start())
                .min()
                .expect("non-empty route");
            let first_arrival = schedule.times[0].0;
            let first_transit = ctx.transit(0, plan.seq[0]);
            // At the first stop on time, never promising an impossible
            // departure later than arrival minus travel, never before the
            // source opens.
            let departure = (earliest_window - DEPARTURE_HEAD_START)
                .min(first_arrival - first_transit)
                .max(self.config.earliest_departure)
                .max(0);
            route.set_departure_time(departure);

            let mut cumulative = 0.0;
            let mut prev = 0usize;
            for (i, &c) in plan.seq.iter().enumerate() {
                let order = ctx.order(c);
                cumulative += order.weight_kg();
                let (arrival, departure) = schedule.times[i];
                route.push_stop(RouteStop {
                    order: order.clone(),
                    arrival,
                    departure,
                    distance_from_prev_km: self.travel.distance_km(prev, c),
                    cumulative_weight_kg: cumulative,
                    sequence: i,
                });
                prev = c;
            }

            let mut distance = ctx.seq_distance(&plan.seq);
            if self.fleet.params().return_to_depot {
                distance += self.travel.distance_km(prev, 0);
            }
            let cost = distance * route.vehicle().cost_per_km();
            route.set_totals(distance, cost);
            routes.push(route);
        }

        let unassigned = state
            .unassigned
            .iter()
            .map(|&c| ctx.order(c).clone())
            .collect();

        RoutingSolution::new(routes, unassigned, self.config.strategy, elapsed)
    }
}
