//! Domain model types for delivery tour planning.
//!
//! Orders with time windows and weights, locations with roles, vehicle
//! types and fleet parameters, and routes with timed stops.

mod location;
mod order;
mod route;
mod vehicle;

pub use location::{GeoPoint, Location, LocationKind, EARTH_RADIUS_KM};
pub use order::{format_hhmm, parse_hhmm, Order, OrderKind, TimeWindow};
pub use route::{Route, RouteStop, RoutingSolution, Source, Strategy};
pub use vehicle::{Fleet, MultiTripParams, RoutingParams, Vehicle, VehicleType};
