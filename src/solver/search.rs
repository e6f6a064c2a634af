//! Deadline-bounded metaheuristic improvement.
//!
//! Ruin-and-recreate over the insertion solution: remove a few customers
//! (randomly or by worst detour), re-insert them greedily together with any
//! unassigned orders, and occasionally polish routes with the intra-route
//! operators. Acceptance is strategy-specific: plain descent for the
//! balanced objective, simulated annealing for cost minimization, and a
//! heavy per-route weight plus route-elimination attempts when minimizing
//! vehicles.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::models::Strategy;
use crate::solver::insertion::{best_insertion, open_route, PlanState};
use crate::solver::local_search::{or_opt_improve, two_opt_improve, tour_distance};
use crate::solver::schedule::Ctx;

/// Objective weight of one active route under `MinimizeVehicles`.
const VEHICLE_WEIGHT: f64 = 1_000_000.0;

/// Iterations without improvement before the search gives up early.
const STALL_LIMIT: usize = 400;

/// Search control knobs.
pub(crate) struct SearchParams {
    pub strategy: Strategy,
    pub deadline: Instant,
    pub max_iterations: usize,
    pub drop_penalty: f64,
    pub seed: u64,
}

/// Objective value of a state under the configured strategy; lower is
/// better. Dropped orders always pay the drop penalty.
pub(crate) fn state_cost(ctx: &Ctx, state: &PlanState, params: &SearchParams) -> f64 {
    let mut cost = state.unassigned.len() as f64 * params.drop_penalty;
    for route in &state.routes {
        let rate = ctx.fleet.types()[route.type_idx].cost_per_km();
        cost += tour_distance(ctx, &route.seq) * rate;
    }
    if params.strategy == Strategy::MinimizeVehicles {
        cost += state.routes.len() as f64 * VEHICLE_WEIGHT;
    }
    cost
}

/// Improves `state` in place until the deadline, the iteration cap, or a
/// long stall.
pub(crate) fn improve(ctx: &Ctx, state: &mut PlanState, params: &SearchParams) {
    if ctx.orders.is_empty() {
        return;
    }
    let mut rng = StdRng::seed_from_u64(params.seed);

    polish(ctx, state);
    let mut current = state.clone();
    let mut current_cost = state_cost(ctx, &current, params);
    let mut best = current.clone();
    let mut best_cost = current_cost;

    // Annealing temperature proportional to the starting objective.
    let mut temperature = (best_cost * 0.05).max(1.0);
    let mut stall = 0usize;

    for iteration in 0..params.max_iterations {
        if Instant::now() >= params.deadline || stall >= STALL_LIMIT {
            break;
        }

        let mut candidate = current.clone();
        mutate(ctx, &mut candidate, params, &mut rng);
        if iteration % 20 == 0 {
            polish(ctx, &mut candidate);
        }
        let candidate_cost = state_cost(ctx, &candidate, params);

        let accept = match params.strategy {
            Strategy::MinimizeCost => {
                candidate_cost < current_cost - 1e-9 || {
                    let delta = candidate_cost - current_cost;
                    rng.random::<f64>() < (-delta / temperature).exp()
                }
            }
            Strategy::Balanced | Strategy::MinimizeVehicles => {
                candidate_cost < current_cost - 1e-9
            }
        };
        temperature = (temperature * 0.995).max(1e-3);

        if accept {
            current = candidate;
            current_cost = candidate_cost;
        }

        if current_cost < best_cost - 1e-9 {
            best = current.clone();
            best_cost = current_cost;
            stall = 0;
        } else {
            stall += 1;
        }
    }

    polish(ctx, &mut best);
    best.drop_empty_routes();
    debug!(
        routes = best.routes.len(),
        unassigned = best.unassigned.len(),
        cost = best_cost,
        "search finished"
    );
    *state = best;
}

/// One ruin-and-recreate step.
fn mutate(ctx: &Ctx, state: &mut PlanState, params: &SearchParams, rng: &mut StdRng) {
    let mut removed: Vec<usize> = Vec::new();

    let eliminate_route = params.strategy == Strategy::MinimizeVehicles
        && !state.routes.is_empty()
        && rng.random::<f64>() < 0.3;

    if eliminate_route {
        // Empty the smallest route and try to re-place its customers.
        let (ri, _) = state
            .routes
            .iter()
            .enumerate()
            .min_by_key(|(_, r)| r.seq.len())
            .expect("checked non-empty");
        let route = state.routes.remove(ri);
        removed.extend(route.seq);
    } else {
        let total: usize = state.routes.iter().map(|r| r.seq.len()).sum();
        if total > 0 {
            let quota = rng.random_range(1..=total.min(6));
            if rng.random::<f64>() < 0.5 {
                remove_random(state, quota, rng, &mut removed);
            } else {
                remove_worst(ctx, state, quota, &mut removed);
            }
        }
    }

    // Re-insert the removed customers together with the unassigned pool.
    removed.append(&mut state.unassigned);
    removed.shuffle(rng);

    let mut leftover: Vec<usize> = Vec::new();
    for customer in removed {
        let mut best: Option<(usize, usize, f64)> = None;
        for (ri, route) in state.routes.iter().enumerate() {
            if let Some((pos, delta)) = best_insertion(ctx, route, customer) {
                let rate = ctx.fleet.types()[route.type_idx].cost_per_km();
                let weighted = delta * rate;
                if best.as_ref().is_none_or(|b| weighted < b.2) {
                    best = Some((ri, pos, weighted));
                }
            }
        }
        match best {
            Some((ri, pos, _)) => state.routes[ri].seq.insert(pos, customer),
            None => leftover.push(customer),
        }
    }

    // Whatever still has no home may open fresh vehicles (the per-route
    // weight steers MinimizeVehicles away from keeping them open).
    let mut unplaced = leftover;
    while !unplaced.is_empty() {
        if !open_route(ctx, state, &mut unplaced) {
            break;
        }
        // Newly opened route can absorb more of the unplaced customers.
        let opened = state.routes.len() - 1;
        let mut i = 0;
        while i < unplaced.len() {
            let c = unplaced[i];
            if let Some((pos, _)) = best_insertion(ctx, &state.routes[opened], c) {
                state.routes[opened].seq.insert(pos, c);
                unplaced.remove(i);
            } else {
                i += 1;
            }
        }
    }
    state.unassigned = unplaced;
    state.drop_empty_routes();
}

fn remove_random(
    state: &mut PlanState,
    quota: usize,
    rng: &mut StdRng,
    removed: &mut Vec<usize>,
) {
    for _ in 0..quota {
        let candidates: Vec<usize> = state
            .routes
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.seq.is_empty())
            .map(|(i, _)| i)
            .collect();
        let Some(&ri) = candidates.as_slice().choose(rng) else {
            break;
        };
        let pos = rng.random_range(0..state.routes[ri].seq.len());
        removed.push(state.routes[ri].seq.remove(pos));
    }
}

/// Removes the customers whose removal saves the most distance.
fn remove_worst(ctx: &Ctx, state: &mut PlanState, quota: usize, removed: &mut Vec<usize>) {
    for _ in 0..quota {
        let mut worst: Option<(usize, usize, f64)> = None;
        for (ri, route) in state.routes.iter().enumerate() {
            for pos in 0..route.seq.len() {
                let prev = if pos == 0 { 0 } else { route.seq[pos - 1] };
                let next = if pos + 1 == route.seq.len() {
                    0
                } else {
                    route.seq[pos + 1]
                };
                let c = route.seq[pos];
                let saving = ctx.travel.distance_km(prev, c)
                    + ctx.travel.distance_km(c, next)
                    - ctx.travel.distance_km(prev, next);
                if worst.as_ref().is_none_or(|w| saving > w.2) {
                    worst = Some((ri, pos, saving));
                }
            }
        }
        let Some((ri, pos, _)) = worst else { break };
        removed.push(state.routes[ri].seq.remove(pos));
    }
}

/// Applies the intra-route operators to every route.
fn polish(ctx: &Ctx, state: &mut PlanState) {
    for route in &mut state.routes {
        let (seq, _) = two_opt_improve(ctx, &route.seq);
        let (seq, _) = or_opt_improve(ctx, &seq);
        route.seq = seq;
    }
}
