//! Geographic points and tagged locations.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS-84 coordinate pair.
///
/// # Examples
///
/// ```
/// use tourplan::models::GeoPoint;
///
/// let depot = GeoPoint::new(-6.2088, 106.8456).unwrap();
/// let customer = GeoPoint::new(-6.2100, 106.8500).unwrap();
/// assert!(depot.haversine_km(&customer) < 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting out-of-range or non-finite coordinates.
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return None;
        }
        Some(Self { lat, lng })
    }

    /// Latitude in decimal degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees.
    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Great-circle distance to another point, in kilometers.
    pub fn haversine_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}

/// Role of a location in the delivery network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Depot,
    Hub,
    Customer,
}

/// A named place in the delivery network.
///
/// Depot, hubs, and customer sites share the same shape; role-specific
/// behaviour lives in the planner, not here.
#[derive(Debug, Clone)]
pub struct Location {
    kind: LocationKind,
    name: String,
    point: GeoPoint,
    address: Option<String>,
}

impl Location {
    /// Creates the warehouse location.
    pub fn depot(name: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            kind: LocationKind::Depot,
            name: name.into(),
            point,
            address: None,
        }
    }

    /// Creates an intermediate consolidation hub.
    pub fn hub(name: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            kind: LocationKind::Hub,
            name: name.into(),
            point,
            address: None,
        }
    }

    /// Creates a customer delivery site.
    pub fn customer(name: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            kind: LocationKind::Customer,
            name: name.into(),
            point,
            address: None,
        }
    }

    /// Attaches a street address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn kind(&self) -> LocationKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn point(&self) -> GeoPoint {
        self.point
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_valid() {
        let p = GeoPoint::new(-6.2088, 106.8456).expect("valid");
        assert_eq!(p.lat(), -6.2088);
        assert_eq!(p.lng(), 106.8456);
    }

    #[test]
    fn test_geo_point_invalid() {
        assert!(GeoPoint::new(91.0, 0.0).is_none());
        assert!(GeoPoint::new(-91.0, 0.0).is_none());
        assert!(GeoPoint::new(0.0, 181.0).is_none());
        assert!(GeoPoint::new(0.0, -181.0).is_none());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_none());
    }

    #[test]
    fn test_haversine_known_distance() {
        // Jakarta Monas to Kota Tua is roughly 4.5 km
        let monas = GeoPoint::new(-6.1754, 106.8272).expect("valid");
        let kota = GeoPoint::new(-6.1352, 106.8133).expect("valid");
        let d = monas.haversine_km(&kota);
        assert!(d > 3.0 && d < 6.0, "got {d}");
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = GeoPoint::new(-6.2, 106.8).expect("valid");
        let b = GeoPoint::new(-6.3, 106.9).expect("valid");
        assert!((a.haversine_km(&b) - b.haversine_km(&a)).abs() < 1e-12);
        assert!(a.haversine_km(&a).abs() < 1e-12);
    }

    #[test]
    fn test_location_roles() {
        let p = GeoPoint::new(-6.2, 106.8).expect("valid");
        let depot = Location::depot("Warehouse", p);
        let hub = Location::hub("North Hub", p).with_address("Jl. Pluit 1");
        assert_eq!(depot.kind(), LocationKind::Depot);
        assert_eq!(hub.kind(), LocationKind::Hub);
        assert_eq!(hub.address(), Some("Jl. Pluit 1"));
        assert!(depot.address().is_none());
    }
}
