//! Delivery orders and in-day time windows.

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::models::GeoPoint;

/// Parses an `HH:MM` string into minutes from midnight.
pub fn parse_hhmm(s: &str) -> Option<i64> {
    let (h, m) = s.trim().split_once(':')?;
    let h: i64 = h.parse().ok()?;
    let m: i64 = m.parse().ok()?;
    if !(0..24).contains(&h) || !(0..60).contains(&m) {
        return None;
    }
    Some(h * 60 + m)
}

/// Formats minutes from midnight as `HH:MM`.
pub fn format_hhmm(minutes: i64) -> String {
    let minutes = minutes.max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// The interval during which arrival at a stop is acceptable.
///
/// Times are minutes from midnight of the delivery date. A point window has
/// `start == end`; lateness tolerance is applied by the solver, not stored
/// here.
///
/// # Examples
///
/// ```
/// use tourplan::models::TimeWindow;
///
/// let w = TimeWindow::parse("04:00-05:00").unwrap();
/// assert_eq!(w.start(), 240);
/// assert_eq!(w.end(), 300);
///
/// let point = TimeWindow::parse("07:30").unwrap();
/// assert_eq!(point.start(), point.end());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: i64,
    end: i64,
}

impl TimeWindow {
    /// Creates a window. Returns `None` if `start > end` or either bound
    /// falls outside the day.
    pub fn new(start: i64, end: i64) -> Option<Self> {
        if start > end || start < 0 || end >= 24 * 60 {
            return None;
        }
        Some(Self { start, end })
    }

    /// Creates a point window (`start == end`).
    pub fn point(at: i64) -> Option<Self> {
        Self::new(at, at)
    }

    /// Parses `HH:MM` (point) or `HH:MM-HH:MM` (range).
    pub fn parse(s: &str) -> Option<Self> {
        match s.split_once('-') {
            Some((a, b)) => Self::new(parse_hhmm(a)?, parse_hhmm(b)?),
            None => Self::point(parse_hhmm(s)?),
        }
    }

    /// Earliest acceptable arrival, minutes from midnight.
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Latest acceptable arrival before tolerance, minutes from midnight.
    pub fn end(&self) -> i64 {
        self.end
    }

    /// Waiting time when arriving at `arrival`; zero if within or after.
    pub fn waiting(&self, arrival: i64) -> i64 {
        (self.start - arrival).max(0)
    }

    /// True if `arrival` misses the window even with `tolerance` extra
    /// minutes of lateness.
    pub fn is_late(&self, arrival: i64, tolerance: i64) -> bool {
        arrival > self.end + tolerance
    }

    /// `HH:MM` or `HH:MM-HH:MM` display form.
    pub fn display(&self) -> String {
        if self.start == self.end {
            format_hhmm(self.start)
        } else {
            format!("{}-{}", format_hhmm(self.start), format_hhmm(self.end))
        }
    }
}

/// Distinguishes real customer deliveries from the synthetic hub drop-off
/// emitted on the blind-van route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    Delivery,
    HubConsolidation,
}

/// A single dated delivery order.
///
/// Orders are immutable inputs; the planner never mutates them.
#[derive(Debug, Clone)]
pub struct Order {
    id: String,
    delivery_date: NaiveDate,
    window: TimeWindow,
    weight_kg: f64,
    customer_id: String,
    customer_name: String,
    address: String,
    point: GeoPoint,
    zone: Option<String>,
    priority: bool,
    kind: OrderKind,
}

impl Order {
    /// Creates a validated order. Weight must be strictly positive.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        delivery_date: NaiveDate,
        window: TimeWindow,
        weight_kg: f64,
        customer_id: impl Into<String>,
        customer_name: impl Into<String>,
        address: impl Into<String>,
        point: GeoPoint,
    ) -> Result<Self> {
        let id = id.into();
        if !weight_kg.is_finite() || weight_kg <= 0.0 {
            return Err(Error::InvalidOrder {
                order_id: id,
                message: format!("weight must be positive, got {weight_kg}"),
            });
        }
        Ok(Self {
            id,
            delivery_date,
            window,
            weight_kg,
            customer_id: customer_id.into(),
            customer_name: customer_name.into(),
            address: address.into(),
            point,
            zone: None,
            priority: false,
            kind: OrderKind::Delivery,
        })
    }

    /// Attaches an administrative zone (normalized to uppercase).
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        let zone = zone.into().trim().to_uppercase();
        if !zone.is_empty() {
            self.zone = Some(zone);
        }
        self
    }

    /// Marks the order as priority (strict lateness tolerance).
    pub fn with_priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }

    /// Builds the synthetic consolidation drop-off for a hub visit.
    pub fn consolidation(
        hub_id: impl Into<String>,
        hub_name: &str,
        hub_address: Option<&str>,
        point: GeoPoint,
        weight_kg: f64,
        delivery_date: NaiveDate,
        window: TimeWindow,
    ) -> Self {
        let hub_id = hub_id.into();
        Self {
            id: hub_id.clone(),
            delivery_date,
            window,
            weight_kg,
            customer_id: hub_id,
            customer_name: format!("Consolidation to {hub_name}"),
            address: hub_address.unwrap_or(hub_name).to_string(),
            point,
            zone: None,
            priority: true,
            kind: OrderKind::HubConsolidation,
        }
    }

    /// Parses `YYYY-MM-DD` or an ISO-8601 instant, keeping the date part.
    pub fn parse_date(s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        if let Some((date, _)) = s.split_once('T') {
            return NaiveDate::parse_from_str(date, "%Y-%m-%d").ok();
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn delivery_date(&self) -> NaiveDate {
        self.delivery_date
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// Order weight in kilograms, always > 0.
    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn point(&self) -> GeoPoint {
        self.point
    }

    /// Administrative zone, uppercased; `None` when unknown.
    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    pub fn is_priority(&self) -> bool {
        self.priority
    }

    pub fn kind(&self) -> OrderKind {
        self.kind
    }
}
