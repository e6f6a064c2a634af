//! Vehicle types, vehicle instances, and the fleet.

use crate::error::{Error, Result};
use crate::models::Order;

/// A class of vehicle in the fleet (e.g. a motorcycle or a box van).
///
/// `unlimited` means the fleet owns *at least* `fixed_count` units and the
/// solver may mint additional virtual units of this type when demand
/// requires them.
#[derive(Debug, Clone)]
pub struct VehicleType {
    name: String,
    capacity_kg: f64,
    cost_per_km: f64,
    fixed_count: usize,
    unlimited: bool,
}

impl VehicleType {
    /// Creates a vehicle type. Capacity must be positive, cost non-negative.
    pub fn new(name: impl Into<String>, capacity_kg: f64, cost_per_km: f64) -> Result<Self> {
        let name = name.into();
        if !capacity_kg.is_finite() || capacity_kg <= 0.0 {
            return Err(Error::Config(format!(
                "vehicle {name}: capacity must be positive, got {capacity_kg}"
            )));
        }
        if !cost_per_km.is_finite() || cost_per_km < 0.0 {
            return Err(Error::Config(format!(
                "vehicle {name}: cost per km must be non-negative, got {cost_per_km}"
            )));
        }
        Ok(Self {
            name,
            capacity_kg,
            cost_per_km,
            fixed_count: 1,
            unlimited: false,
        })
    }

    /// Number of owned units of this type.
    pub fn with_fixed_count(mut self, count: usize) -> Self {
        self.fixed_count = count;
        self
    }

    /// Allows minting units beyond `fixed_count`.
    pub fn with_unlimited(mut self, unlimited: bool) -> Self {
        self.unlimited = unlimited;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity_kg(&self) -> f64 {
        self.capacity_kg
    }

    pub fn cost_per_km(&self) -> f64 {
        self.cost_per_km
    }

    pub fn fixed_count(&self) -> usize {
        self.fixed_count
    }

    pub fn unlimited(&self) -> bool {
        self.unlimited
    }

    /// Materializes unit `unit` (1-based) of this type.
    pub fn instance(&self, unit: usize) -> Vehicle {
        Vehicle {
            type_name: self.name.clone(),
            unit,
            capacity_kg: self.capacity_kg,
            cost_per_km: self.cost_per_km,
        }
    }
}

/// A physical (or minted virtual) unit of a vehicle type.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    type_name: String,
    unit: usize,
    capacity_kg: f64,
    cost_per_km: f64,
}

impl Vehicle {
    /// Display name, `"{type}_{unit}"`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.type_name, self.unit)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn unit(&self) -> usize {
        self.unit
    }

    pub fn capacity_kg(&self) -> f64 {
        self.capacity_kg
    }

    pub fn cost_per_km(&self) -> f64 {
        self.cost_per_km
    }

    /// The same vehicle re-labelled with a different unit number. Used by
    /// the trip assembler when binding routes to physical units.
    pub fn with_unit(&self, unit: usize) -> Vehicle {
        Vehicle {
            type_name: self.type_name.clone(),
            unit,
            capacity_kg: self.capacity_kg,
            cost_per_km: self.cost_per_km,
        }
    }
}

/// Multi-trip and clustering knobs.
#[derive(Debug, Clone)]
pub struct MultiTripParams {
    pub enabled: bool,
    /// Reload buffer between two trips of one physical vehicle, minutes.
    pub buffer_minutes: i64,
    /// Idle gap that starts a new temporal cluster, minutes.
    pub gap_threshold_minutes: i64,
    pub min_cluster_size: usize,
    /// Reuse a physical vehicle only for routes with the same source.
    pub same_source_only: bool,
    pub max_trips_per_vehicle: usize,
}

impl Default for MultiTripParams {
    fn default() -> Self {
        Self {
            enabled: true,
            buffer_minutes: 60,
            gap_threshold_minutes: 60,
            min_cluster_size: 1,
            same_source_only: true,
            max_trips_per_vehicle: 3,
        }
    }
}

/// Global routing parameters shared by every solve.
#[derive(Debug, Clone)]
pub struct RoutingParams {
    pub return_to_depot: bool,
    /// Lateness tolerance for priority orders, minutes.
    pub priority_time_tolerance: i64,
    /// Lateness tolerance for non-priority orders, minutes.
    pub non_priority_time_tolerance: i64,
    pub relax_time_windows: bool,
    pub time_window_relaxation_minutes: i64,
    /// Maximum distinct administrative zones per route; 0 disables the cap.
    pub max_zones_per_route: usize,
    pub multi_trip: MultiTripParams,
}

impl Default for RoutingParams {
    fn default() -> Self {
        Self {
            return_to_depot: true,
            priority_time_tolerance: 0,
            non_priority_time_tolerance: 20,
            relax_time_windows: false,
            time_window_relaxation_minutes: 0,
            max_zones_per_route: 2,
            multi_trip: MultiTripParams::default(),
        }
    }
}

/// The heterogeneous vehicle pool plus its routing parameters.
#[derive(Debug, Clone)]
pub struct Fleet {
    types: Vec<VehicleType>,
    params: RoutingParams,
}

impl Fleet {
    /// Creates a fleet; at least one vehicle type is required.
    pub fn new(types: Vec<VehicleType>, params: RoutingParams) -> Result<Self> {
        if types.is_empty() {
            return Err(Error::Config(
                "fleet must have at least one vehicle type".into(),
            ));
        }
        Ok(Self { types, params })
    }

    pub fn types(&self) -> &[VehicleType] {
        &self.types
    }

    pub fn params(&self) -> &RoutingParams {
        &self.params
    }

    pub fn type_by_name(&self, name: &str) -> Option<&VehicleType> {
        self.types.iter().find(|t| t.name() == name)
    }

    /// A fleet containing only the named type, same routing parameters.
    pub fn only(&self, name: &str) -> Option<Fleet> {
        let t = self.type_by_name(name)?.clone();
        Some(Fleet {
            types: vec![t],
            params: self.params.clone(),
        })
    }

    /// The fleet minus the named type, same routing parameters. `None` if
    /// nothing remains.
    pub fn without(&self, name: &str) -> Option<Fleet> {
        let types: Vec<VehicleType> = self
            .types
            .iter()
            .filter(|t| t.name() != name)
            .cloned()
            .collect();
        if types.is_empty() {
            return None;
        }
        Some(Fleet {
            types,
            params: self.params.clone(),
        })
    }

    pub fn has_unlimited(&self) -> bool {
        self.types.iter().any(|t| t.unlimited())
    }

    /// Effective lateness tolerance for an order, including global
    /// relaxation when enabled.
    pub fn tolerance_for(&self, order: &Order) -> i64 {
        let base = if order.is_priority() {
            self.params.priority_time_tolerance
        } else {
            self.params.non_priority_time_tolerance
        };
        if self.params.relax_time_windows {
            base + self.params.time_window_relaxation_minutes
        } else {
            base
        }
    }
}
