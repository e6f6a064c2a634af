//! Forward schedule simulation for candidate routes.
//!
//! A route is a sequence of customer indices over a source-rooted travel
//! matrix (row 0 = source, row i = the i-th order of the sub-problem).
//! Simulation walks the sequence computing arrival and departure times with
//! waiting allowed before a window opens; a sequence is feasible when every
//! arrival lands inside its window plus tolerance and the tour finishes
//! within the day.

use crate::matrix::TravelMatrix;
use crate::models::{Fleet, Order, Vehicle};

/// Solve-scoped problem data shared by construction and search.
pub(crate) struct Ctx<'a> {
    /// Orders of this sub-problem; customer index `i` maps to `orders[i-1]`.
    pub orders: &'a [Order],
    /// Source-rooted submatrix (row 0 = source).
    pub travel: &'a TravelMatrix,
    pub fleet: &'a Fleet,
    /// Fixed per-stop dwell, minutes.
    pub service_time: i64,
    /// Earliest departure from the source, minutes from midnight.
    pub start_time: i64,
    /// Latest allowed tour end, minutes from midnight.
    pub max_route_minutes: i64,
    /// Max distinct known zones per route; 0 disables the cap.
    pub zone_cap: usize,
}

/// Arrival/departure times along a feasible sequence.
pub(crate) struct Schedule {
    /// `(arrival, departure)` per stop, minutes from midnight.
    pub times: Vec<(i64, i64)>,
    /// Last departure plus the return transit, minutes from midnight.
    pub end_time: i64,
}

impl<'a> Ctx<'a> {
    pub fn order(&self, customer: usize) -> &Order {
        &self.orders[customer - 1]
    }

    /// Whole-minute transit time between two rows.
    pub fn transit(&self, from: usize, to: usize) -> i64 {
        self.travel.duration_min(from, to).ceil() as i64
    }

    /// Travel distance of the outbound sequence, excluding the return leg.
    pub fn seq_distance(&self, seq: &[usize]) -> f64 {
        let mut dist = 0.0;
        let mut prev = 0;
        for &c in seq {
            dist += self.travel.distance_km(prev, c);
            prev = c;
        }
        dist
    }

    /// Total load of a sequence, kg.
    pub fn load(&self, seq: &[usize]) -> f64 {
        seq.iter().map(|&c| self.order(c).weight_kg()).sum()
    }

    /// Distinct known zones visited by a sequence.
    pub fn zone_count(&self, seq: &[usize]) -> usize {
        let mut zones: Vec<&str> = Vec::new();
        for &c in seq {
            if let Some(z) = self.order(c).zone() {
                if !zones.contains(&z) {
                    zones.push(z);
                }
            }
        }
        zones.len()
    }

    /// True when adding `candidate` keeps the route inside the zone cap.
    pub fn zones_allow(&self, seq: &[usize], candidate: usize) -> bool {
        if self.zone_cap == 0 {
            return true;
        }
        let Some(zone) = self.order(candidate).zone() else {
            return true;
        };
        let mut zones: Vec<&str> = vec![zone];
        for &c in seq {
            if let Some(z) = self.order(c).zone() {
                if !zones.contains(&z) {
                    zones.push(z);
                }
            }
        }
        zones.len() <= self.zone_cap
    }

    /// Simulates the sequence, returning `None` when a window (plus the
    /// order's tolerance) is missed or the tour runs past the day end.
    pub fn simulate(&self, seq: &[usize]) -> Option<Schedule> {
        let mut times = Vec::with_capacity(seq.len());
        let mut clock = self.start_time;
        let mut prev = 0usize;

        for &c in seq {
            let order = self.order(c);
            let window = order.window();
            let reached = clock + self.transit(prev, c);
            let arrival = reached.max(window.start());
            if window.is_late(arrival, self.fleet.tolerance_for(order)) {
                return None;
            }
            let departure = arrival + self.service_time;
            times.push((arrival, departure));
            clock = departure;
            prev = c;
        }

        let end_time = clock + self.transit(prev, 0);
        if end_time > self.max_route_minutes {
            return None;
        }
        Some(Schedule { times, end_time })
    }

    /// Full feasibility of a sequence on a vehicle: capacity, zone cap,
    /// and time windows.
    pub fn feasible(&self, seq: &[usize], vehicle: &Vehicle) -> bool {
        if self.load(seq) > vehicle.capacity_kg() + 1e-9 {
            return false;
        }
        if self.zone_cap > 0 && self.zone_count(seq) > self.zone_cap {
            return false;
        }
        self.simulate(seq).is_some()
    }
}
