//! The per-phase capacitated VRP solver with time windows.
//!
//! - [`CvrptwSolver`] — problem assembly, solve, extraction
//! - [`SolverConfig`] — objective, budget, seed, service time
//! - internals: schedule simulation, cheapest insertion, intra-route
//!   operators, and the ruin-and-recreate search loop

mod engine;
mod insertion;
mod local_search;
mod schedule;
mod search;

pub use engine::{CvrptwSolver, SolverConfig, DEFAULT_SERVICE_TIME};
