//! YAML configuration document and its validation into domain types.

use std::path::Path;

use serde::Deserialize;

use crate::config::{
    BlindVanMode, EnRoutePolicy, HubConfig, MultiHubConfig, SourceAssignmentConfig,
    SourceMode, UnassignedZonePolicy,
};
use crate::error::{Error, Result};
use crate::models::{
    parse_hhmm, Fleet, GeoPoint, Location, MultiTripParams, RoutingParams, VehicleType,
};

/// Matrix cache settings.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub directory: String,
    pub ttl_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: ".cache".to_string(),
            ttl_hours: 24,
        }
    }
}

/// Fully validated run configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub fleet: Fleet,
    pub hubs: MultiHubConfig,
    pub cache: CacheConfig,
}

#[derive(Deserialize)]
struct ConfigDoc {
    vehicles: Vec<VehicleDoc>,
    #[serde(default)]
    routing: RoutingDoc,
    #[serde(default)]
    hubs: Option<HubsDoc>,
    #[serde(default)]
    cache: Option<CacheDoc>,
}

#[derive(Deserialize)]
struct VehicleDoc {
    name: String,
    capacity_kg: f64,
    cost_per_km: f64,
    #[serde(default = "default_one")]
    fixed_count: usize,
    #[serde(default)]
    unlimited: bool,
}

fn default_one() -> usize {
    1
}

#[derive(Deserialize)]
struct RoutingDoc {
    #[serde(default = "default_true")]
    return_to_depot: bool,
    #[serde(default)]
    multiple_trips: Option<bool>,
    #[serde(default)]
    priority_time_tolerance: i64,
    #[serde(default = "default_non_priority_tolerance")]
    non_priority_time_tolerance: i64,
    #[serde(default)]
    relax_time_windows: bool,
    #[serde(default)]
    time_window_relaxation_minutes: i64,
    #[serde(default = "default_zone_cap")]
    max_zones_per_route: usize,
    #[serde(default)]
    multi_trip: Option<MultiTripDoc>,
}

impl Default for RoutingDoc {
    fn default() -> Self {
        Self {
            return_to_depot: true,
            multiple_trips: None,
            priority_time_tolerance: 0,
            non_priority_time_tolerance: default_non_priority_tolerance(),
            relax_time_windows: false,
            time_window_relaxation_minutes: 0,
            max_zones_per_route: default_zone_cap(),
            multi_trip: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_non_priority_tolerance() -> i64 {
    20
}

fn default_zone_cap() -> usize {
    2
}

#[derive(Deserialize)]
struct MultiTripDoc {
    #[serde(default)]
    enabled: Option<bool>,
    #[serde(default = "default_buffer")]
    buffer_minutes: i64,
    #[serde(default)]
    clustering: Option<ClusteringDoc>,
    #[serde(default)]
    vehicle_reuse: Option<VehicleReuseDoc>,
}

fn default_buffer() -> i64 {
    60
}

#[derive(Deserialize)]
struct ClusteringDoc {
    #[serde(default = "default_gap")]
    gap_threshold_minutes: i64,
    #[serde(default = "default_one")]
    min_cluster_size: usize,
}

fn default_gap() -> i64 {
    60
}

#[derive(Deserialize)]
struct VehicleReuseDoc {
    #[serde(default = "default_true")]
    same_source_only: bool,
    #[serde(default = "default_max_trips")]
    max_trips_per_vehicle: usize,
}

fn default_max_trips() -> usize {
    3
}

#[derive(Deserialize)]
struct HubsDoc {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    blind_van_departure: Option<String>,
    #[serde(default)]
    blind_van_arrival: Option<String>,
    #[serde(default)]
    motor_start_time: Option<String>,
    #[serde(default)]
    unassigned_zone_behavior: Option<String>,
    #[serde(default)]
    blind_van_return_to_depot: bool,
    #[serde(default)]
    blind_van_vehicle: Option<String>,
    #[serde(default)]
    source_assignment: Option<SourceAssignmentDoc>,
    #[serde(default)]
    list: Vec<HubDoc>,
}

#[derive(Deserialize)]
struct SourceAssignmentDoc {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    min_cost_advantage_percent: Option<f64>,
    #[serde(default)]
    distance_weight: Option<f64>,
    #[serde(default)]
    time_weight: Option<f64>,
}

#[derive(Deserialize)]
struct HubDoc {
    id: String,
    name: String,
    lat: f64,
    lng: f64,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    zones: Vec<String>,
    #[serde(default)]
    blind_van: Option<HubBlindVanDoc>,
}

#[derive(Deserialize)]
struct HubBlindVanDoc {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    en_route_delivery: Option<EnRouteDoc>,
}

#[derive(Deserialize)]
struct EnRouteDoc {
    #[serde(default)]
    max_stops: usize,
    #[serde(default = "default_detour_minutes")]
    max_detour_minutes: i64,
    #[serde(default = "default_detour_km")]
    max_detour_km: f64,
    #[serde(default = "default_reserve")]
    reserve_capacity_kg: f64,
}

fn default_detour_minutes() -> i64 {
    10
}

fn default_detour_km() -> f64 {
    5.0
}

fn default_reserve() -> f64 {
    100.0
}

#[derive(Deserialize)]
struct CacheDoc {
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default)]
    directory: Option<String>,
    #[serde(default)]
    ttl_hours: Option<u64>,
}

/// Loads and validates the YAML configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("cannot read {}: {e}", path.display()))
    })?;
    parse_config(&text)
}

/// Parses and validates a YAML configuration document.
pub fn parse_config(text: &str) -> Result<AppConfig> {
    let doc: ConfigDoc =
        serde_yaml::from_str(text).map_err(|e| Error::Config(format!("invalid YAML: {e}")))?;

    let fleet = build_fleet(&doc)?;
    let hubs = build_hubs(doc.hubs.as_ref())?;

    if hubs.enabled && !hubs.hubs.is_empty() && fleet.type_by_name(&hubs.blind_van_vehicle).is_none()
    {
        return Err(Error::Config(format!(
            "hub routing requires vehicle type '{}' in the fleet",
            hubs.blind_van_vehicle
        )));
    }

    let cache = match doc.cache {
        Some(c) => CacheConfig {
            enabled: c.enabled,
            directory: c.directory.unwrap_or_else(|| ".cache".to_string()),
            ttl_hours: c.ttl_hours.unwrap_or(24),
        },
        None => CacheConfig::default(),
    };

    Ok(AppConfig { fleet, hubs, cache })
}

fn build_fleet(doc: &ConfigDoc) -> Result<Fleet> {
    let mut types = Vec::with_capacity(doc.vehicles.len());
    for v in &doc.vehicles {
        types.push(
            VehicleType::new(v.name.clone(), v.capacity_kg, v.cost_per_km)?
                .with_fixed_count(v.fixed_count)
                .with_unlimited(v.unlimited),
        );
    }

    let r = &doc.routing;
    let mt = r.multi_trip.as_ref();
    let reuse = mt.and_then(|m| m.vehicle_reuse.as_ref());
    let clustering = mt.and_then(|m| m.clustering.as_ref());

    let same_source_only = reuse.map(|v| v.same_source_only).unwrap_or(true);
    if !same_source_only {
        // Where a reused vehicle departs from after a cross-source trip is
        // undefined; refuse the configuration until that is specified.
        return Err(Error::Config(
            "vehicle_reuse.same_source_only = false is not supported".into(),
        ));
    }

    let multi_trip = MultiTripParams {
        enabled: mt
            .and_then(|m| m.enabled)
            .or(r.multiple_trips)
            .unwrap_or(true),
        buffer_minutes: mt.map(|m| m.buffer_minutes).unwrap_or(60),
        gap_threshold_minutes: clustering.map(|c| c.gap_threshold_minutes).unwrap_or(60),
        min_cluster_size: clustering.map(|c| c.min_cluster_size).unwrap_or(1),
        same_source_only,
        max_trips_per_vehicle: reuse.map(|v| v.max_trips_per_vehicle).unwrap_or(3),
    };

    let params = RoutingParams {
        return_to_depot: r.return_to_depot,
        priority_time_tolerance: r.priority_time_tolerance,
        non_priority_time_tolerance: r.non_priority_time_tolerance,
        relax_time_windows: r.relax_time_windows,
        time_window_relaxation_minutes: r.time_window_relaxation_minutes,
        max_zones_per_route: r.max_zones_per_route,
        multi_trip,
    };

    Fleet::new(types, params)
}

fn build_hubs(doc: Option<&HubsDoc>) -> Result<MultiHubConfig> {
    let Some(doc) = doc else {
        return Ok(MultiHubConfig::default());
    };

    let mut config = MultiHubConfig {
        enabled: doc.enabled,
        blind_van_return_to_depot: doc.blind_van_return_to_depot,
        ..MultiHubConfig::default()
    };

    if let Some(t) = &doc.blind_van_departure {
        config.blind_van_departure = parse_time(t, "hubs.blind_van_departure")?;
    }
    if let Some(t) = &doc.blind_van_arrival {
        config.blind_van_arrival = parse_time(t, "hubs.blind_van_arrival")?;
    }
    if let Some(t) = &doc.motor_start_time {
        config.earliest_hub_delivery = parse_time(t, "hubs.motor_start_time")?;
    }
    if let Some(b) = &doc.unassigned_zone_behavior {
        config.unassigned_zone_policy = UnassignedZonePolicy::parse(b).ok_or_else(|| {
            Error::Config(format!(
                "unknown unassigned_zone_behavior '{b}', expected nearest or depot"
            ))
        })?;
    }
    if let Some(v) = &doc.blind_van_vehicle {
        config.blind_van_vehicle = v.clone();
    }

    if let Some(sa) = &doc.source_assignment {
        let mut assignment = SourceAssignmentConfig::default();
        if let Some(mode) = &sa.mode {
            assignment.mode = SourceMode::parse(mode).ok_or_else(|| {
                Error::Config(format!(
                    "unknown source_assignment.mode '{mode}', expected zone_based, dynamic, or hybrid"
                ))
            })?;
        }
        if let Some(p) = sa.min_cost_advantage_percent {
            assignment.min_cost_advantage_percent = p;
        }
        if let Some(w) = sa.distance_weight {
            assignment.distance_weight = w;
        }
        if let Some(w) = sa.time_weight {
            assignment.time_weight = w;
        }
        config.source_assignment = assignment;
    }

    for hub in &doc.list {
        if config.hub_by_id(&hub.id).is_some() {
            return Err(Error::Config(format!("duplicate hub id '{}'", hub.id)));
        }
        let point = GeoPoint::new(hub.lat, hub.lng).ok_or_else(|| {
            Error::Config(format!(
                "hub '{}' has invalid coordinates ({}, {})",
                hub.id, hub.lat, hub.lng
            ))
        })?;
        let mut location = Location::hub(hub.name.clone(), point);
        if let Some(addr) = &hub.address {
            location = location.with_address(addr.clone());
        }

        let mut hub_config = HubConfig::new(hub.id.clone(), location, hub.zones.clone());
        if let Some(bv) = &hub.blind_van {
            if let Some(mode) = &bv.mode {
                let mode = BlindVanMode::parse(mode).ok_or_else(|| {
                    Error::Config(format!("hub '{}': unknown blind_van.mode '{mode}'", hub.id))
                })?;
                hub_config = hub_config.with_mode(mode);
            }
            if let Some(er) = &bv.en_route_delivery {
                hub_config = hub_config.with_en_route(EnRoutePolicy {
                    max_stops: er.max_stops,
                    max_detour_minutes: er.max_detour_minutes,
                    max_detour_km: er.max_detour_km,
                    reserve_capacity_kg: er.reserve_capacity_kg,
                });
            }
        }
        config.hubs.push(hub_config);
    }

    Ok(config)
}

fn parse_time(s: &str, field: &str) -> Result<i64> {
    parse_hhmm(s)
        .ok_or_else(|| Error::Config(format!("{field}: invalid HH:MM time '{s}'")))
}
