//! # tourplan
//!
//! One-day delivery tour planning for a grocery logistics operator: given
//! dated orders, a heterogeneous fleet, a warehouse, and optional
//! consolidation hubs, emits per-vehicle visit sequences with arrival and
//! departure times.
//!
//! ## Modules
//!
//! - [`models`] — Orders, locations, vehicles, routes, solutions
//! - [`matrix`] — Travel matrices, indexing, the road oracle and its cache
//! - [`assign`] — Depot-vs-hub source assignment
//! - [`cluster`] — Time-window clustering into temporal phases
//! - [`blindvan`] — The hub consolidation leg
//! - [`solver`] — The per-phase CVRPTW engine
//! - [`multitrip`] — Physical vehicle reuse across phases
//! - [`plan`] — The end-to-end planner
//! - [`config`] — YAML configuration loading
//! - [`io`] — CSV order ingestion and reports

pub mod assign;
pub mod blindvan;
pub mod cluster;
pub mod config;
pub mod error;
pub mod io;
pub mod matrix;
pub mod models;
pub mod multitrip;
pub mod plan;
pub mod solver;

pub use error::{Error, Result};
