//! Hub network configuration.

use std::collections::HashMap;

use crate::models::Location;

/// Blind-van operating mode for one hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlindVanMode {
    /// Mode A: visit the hub, drop the consolidation load, move on.
    ConsolidationOnly,
    /// Mode B: additionally deliver depot-pool orders on the way in.
    ConsolidationWithDelivery,
}

impl BlindVanMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "consolidation_only" => Some(Self::ConsolidationOnly),
            "consolidation_with_delivery" => Some(Self::ConsolidationWithDelivery),
            _ => None,
        }
    }
}

/// En-route delivery limits for a Mode B hub.
#[derive(Debug, Clone)]
pub struct EnRoutePolicy {
    /// Maximum inserted stops before reaching the hub; 0 disables.
    pub max_stops: usize,
    pub max_detour_minutes: i64,
    pub max_detour_km: f64,
    /// Capacity kept free on the blind van for this hub's drop-off, kg.
    pub reserve_capacity_kg: f64,
}

impl Default for EnRoutePolicy {
    fn default() -> Self {
        Self {
            max_stops: 0,
            max_detour_minutes: 10,
            max_detour_km: 5.0,
            reserve_capacity_kg: 100.0,
        }
    }
}

/// One hub: identity, place, the zones routed through it, and its
/// blind-van behaviour.
#[derive(Debug, Clone)]
pub struct HubConfig {
    id: String,
    location: Location,
    zones: Vec<String>,
    mode: BlindVanMode,
    en_route: EnRoutePolicy,
}

impl HubConfig {
    pub fn new(id: impl Into<String>, location: Location, zones: Vec<String>) -> Self {
        Self {
            id: id.into(),
            location,
            zones: zones.into_iter().map(|z| z.to_uppercase()).collect(),
            mode: BlindVanMode::ConsolidationOnly,
            en_route: EnRoutePolicy::default(),
        }
    }

    pub fn with_mode(mut self, mode: BlindVanMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_en_route(mut self, policy: EnRoutePolicy) -> Self {
        self.en_route = policy;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Zones routed via this hub, uppercased.
    pub fn zones(&self) -> &[String] {
        &self.zones
    }

    pub fn mode(&self) -> BlindVanMode {
        self.mode
    }

    pub fn en_route(&self) -> &EnRoutePolicy {
        &self.en_route
    }

    /// True when the blind van may insert deliveries before this hub.
    pub fn delivery_enabled(&self) -> bool {
        self.mode == BlindVanMode::ConsolidationWithDelivery && self.en_route.max_stops > 0
    }
}

/// Where orders from unmapped zones are served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnassignedZonePolicy {
    /// Geographically nearest hub.
    Nearest,
    /// Straight from the depot.
    Depot,
}

impl UnassignedZonePolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "nearest" => Some(Self::Nearest),
            "depot" => Some(Self::Depot),
            _ => None,
        }
    }
}

/// Source assignment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    ZoneBased,
    Dynamic,
    Hybrid,
}

impl SourceMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "zone_based" => Some(Self::ZoneBased),
            "dynamic" => Some(Self::Dynamic),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }
}

/// Knobs for the source assigner.
#[derive(Debug, Clone)]
pub struct SourceAssignmentConfig {
    pub mode: SourceMode,
    /// Hybrid mode switches away from the zone source only when the dynamic
    /// choice is at least this many percent cheaper.
    pub min_cost_advantage_percent: f64,
    pub distance_weight: f64,
    pub time_weight: f64,
}

impl Default for SourceAssignmentConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::ZoneBased,
            min_cost_advantage_percent: 10.0,
            distance_weight: 1.0,
            time_weight: 0.5,
        }
    }
}

/// The whole hub network plus blind-van scheduling.
#[derive(Debug, Clone)]
pub struct MultiHubConfig {
    pub enabled: bool,
    pub hubs: Vec<HubConfig>,
    /// Blind van leaves the depot at this time, minutes from midnight.
    pub blind_van_departure: i64,
    /// Hub arrival deadline, minutes from midnight.
    pub blind_van_arrival: i64,
    /// Earliest customer delivery from a hub, minutes from midnight.
    pub earliest_hub_delivery: i64,
    pub unassigned_zone_policy: UnassignedZonePolicy,
    pub blind_van_return_to_depot: bool,
    /// Fleet type name used for the consolidation leg.
    pub blind_van_vehicle: String,
    pub source_assignment: SourceAssignmentConfig,
}

impl Default for MultiHubConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            hubs: Vec::new(),
            blind_van_departure: 330,
            blind_van_arrival: 360,
            earliest_hub_delivery: 360,
            unassigned_zone_policy: UnassignedZonePolicy::Nearest,
            blind_van_return_to_depot: false,
            blind_van_vehicle: "Blind Van".to_string(),
            source_assignment: SourceAssignmentConfig::default(),
        }
    }
}

impl MultiHubConfig {
    /// True when hub routing is off or no hubs are declared.
    pub fn is_zero_hub(&self) -> bool {
        !self.enabled || self.hubs.is_empty()
    }

    pub fn hub_ids(&self) -> Vec<String> {
        self.hubs.iter().map(|h| h.id().to_string()).collect()
    }

    pub fn hub_by_id(&self, id: &str) -> Option<&HubConfig> {
        self.hubs.iter().find(|h| h.id() == id)
    }

    /// Zone name → hub id, zones uppercased.
    pub fn zone_to_hub(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for hub in &self.hubs {
            for zone in hub.zones() {
                map.insert(zone.clone(), hub.id().to_string());
            }
        }
        map
    }
}
