//! Command-line entry point: plan one day of delivery tours.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tourplan::config::load_config;
use tourplan::io::{read_orders, ReportWriter};
use tourplan::matrix::{HttpOracle, MatrixCache, MatrixProvider};
use tourplan::models::{GeoPoint, Location, Strategy};
use tourplan::plan::{PlannerConfig, TourPlanner};
use tourplan::solver::SolverConfig;

#[derive(Parser)]
#[command(
    name = "tourplan",
    about = "Plan one-day delivery tours from orders, a fleet, and optional hubs"
)]
struct Args {
    /// Orders CSV file
    #[arg(long)]
    orders: PathBuf,

    /// Fleet and hub configuration YAML
    #[arg(long, default_value = "conf.yaml")]
    config: PathBuf,

    /// Optimization objective: minimize_vehicles, minimize_cost, balanced
    #[arg(long, default_value = "balanced")]
    strategy: String,

    /// Overall solve budget in seconds, divided among clusters
    #[arg(long, default_value_t = 300)]
    time_limit: u64,

    /// Directory for the route and summary reports
    #[arg(long, default_value = "results")]
    output_dir: PathBuf,

    /// Solver seed; identical inputs and seed reproduce the plan
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let Some(strategy) = Strategy::parse(&args.strategy) else {
        bail!(
            "unknown strategy '{}', expected minimize_vehicles, minimize_cost, or balanced",
            args.strategy
        );
    };

    let app = load_config(&args.config).context("loading configuration")?;
    let depot = depot_from_env().context("reading depot from environment")?;
    let orders = read_orders(&args.orders).context("reading orders")?;

    let oracle = match std::env::var("MATRIX_API_URL") {
        Ok(url) => Some(HttpOracle::new(url).context("building oracle client")?),
        Err(_) => None,
    };
    let cache = MatrixCache::new(
        &app.cache.directory,
        app.cache.ttl_hours,
        app.cache.enabled,
    );
    let provider = MatrixProvider::new(oracle, cache);

    let planner_config = PlannerConfig {
        solver: SolverConfig {
            strategy,
            time_limit: Duration::from_secs(args.time_limit),
            seed: args.seed,
            ..SolverConfig::default()
        },
        ..PlannerConfig::default()
    };
    let planner = TourPlanner::new(depot.clone(), app.fleet.clone(), app.hubs.clone());
    let solution = planner
        .plan(&orders, &provider, &planner_config)
        .context("planning tours")?;

    std::fs::create_dir_all(&args.output_dir).context("creating output directory")?;
    let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    let routes_path = args
        .output_dir
        .join(format!("routing_result_{timestamp}.csv"));
    let summary_path = args
        .output_dir
        .join(format!("routing_summary_{timestamp}.csv"));

    let writer = ReportWriter::new(depot.name(), Some(&app.hubs));
    writer
        .write_routes(&solution, &routes_path)
        .context("writing route report")?;
    writer
        .write_summary(&solution, &summary_path)
        .context("writing summary report")?;

    info!(
        routes = solution.routes().len(),
        delivered = solution.orders_delivered(),
        unassigned = solution.unassigned().len(),
        distance_km = solution.total_distance_km(),
        cost = solution.total_cost(),
        "done"
    );
    println!("routes:  {}", routes_path.display());
    println!("summary: {}", summary_path.display());
    if !solution.unassigned().is_empty() {
        println!(
            "warning: {} orders could not be assigned, see the summary",
            solution.unassigned().len()
        );
    }
    Ok(())
}

/// The warehouse comes from the environment: `DEPOT_LAT`, `DEPOT_LNG`,
/// optional `DEPOT_NAME` and `DEPOT_ADDRESS`.
fn depot_from_env() -> anyhow::Result<Location> {
    let lat: f64 = std::env::var("DEPOT_LAT")
        .context("DEPOT_LAT is not set")?
        .parse()
        .context("DEPOT_LAT is not a number")?;
    let lng: f64 = std::env::var("DEPOT_LNG")
        .context("DEPOT_LNG is not set")?
        .parse()
        .context("DEPOT_LNG is not a number")?;
    let Some(point) = GeoPoint::new(lat, lng) else {
        bail!("depot coordinates out of range: {lat}, {lng}");
    };
    let name = std::env::var("DEPOT_NAME").unwrap_or_else(|_| "Depot".to_string());
    let mut depot = Location::depot(name, point);
    if let Ok(address) = std::env::var("DEPOT_ADDRESS") {
        depot = depot.with_address(address);
    }
    Ok(depot)
}
