//! Time-window clustering for multi-trip routing.
//!
//! Splits a source's orders into temporal phases separated by large idle
//! gaps; each phase is solved independently and the trip assembler reuses
//! physical vehicles across them.

use crate::models::{format_hhmm, Order};

/// A group of orders with adjacent time windows.
#[derive(Debug, Clone)]
pub struct TimeWindowCluster {
    pub id: usize,
    pub orders: Vec<Order>,
    /// Minimum window start among members, minutes from midnight.
    pub earliest_start: i64,
    /// Maximum window end among members, minutes from midnight.
    pub latest_end: i64,
}

impl TimeWindowCluster {
    fn from_orders(id: usize, orders: Vec<Order>) -> Self {
        let earliest_start = orders
            .iter()
            .map(|o| o.window().start())
            .min()
            .unwrap_or(0);
        let latest_end = orders.iter().map(|o| o.window().end()).max().unwrap_or(0);
        Self {
            id,
            orders,
            earliest_start,
            latest_end,
        }
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// `HH:MM-HH:MM` span for logs.
    pub fn span(&self) -> String {
        format!(
            "{}-{}",
            format_hhmm(self.earliest_start),
            format_hhmm(self.latest_end)
        )
    }
}

/// Groups orders into phases separated by idle gaps.
#[derive(Debug, Clone)]
pub struct TimeWindowClusterer {
    gap_threshold_minutes: i64,
    min_cluster_size: usize,
}

impl TimeWindowClusterer {
    pub fn new(gap_threshold_minutes: i64, min_cluster_size: usize) -> Self {
        Self {
            gap_threshold_minutes,
            min_cluster_size,
        }
    }

    /// Clusters orders by window start, splitting where the gap to the
    /// running maximum window end exceeds the threshold, then merges
    /// undersized clusters into their chronological predecessor (the
    /// successor for the first cluster). Clusters come back in
    /// chronological order with contiguous ids from 0.
    pub fn cluster(&self, orders: &[Order]) -> Vec<TimeWindowCluster> {
        if orders.is_empty() {
            return Vec::new();
        }

        let mut sorted: Vec<Order> = orders.to_vec();
        sorted.sort_by_key(|o| (o.window().start(), o.window().end()));

        let mut clusters: Vec<Vec<Order>> = Vec::new();
        let mut current = vec![sorted[0].clone()];
        let mut running_end = sorted[0].window().end();

        for order in sorted.into_iter().skip(1) {
            let gap = order.window().start() - running_end;
            if gap > self.gap_threshold_minutes {
                clusters.push(std::mem::take(&mut current));
                running_end = order.window().end();
                current.push(order);
            } else {
                running_end = running_end.max(order.window().end());
                current.push(order);
            }
        }
        clusters.push(current);

        self.merge_small(&mut clusters);

        clusters
            .into_iter()
            .enumerate()
            .map(|(id, orders)| TimeWindowCluster::from_orders(id, orders))
            .collect()
    }

    fn merge_small(&self, clusters: &mut Vec<Vec<Order>>) {
        if self.min_cluster_size <= 1 || clusters.len() <= 1 {
            return;
        }

        let mut merged: Vec<Vec<Order>> = Vec::with_capacity(clusters.len());
        for cluster in clusters.drain(..) {
            if cluster.len() < self.min_cluster_size && !merged.is_empty() {
                merged
                    .last_mut()
                    .expect("checked non-empty")
                    .extend(cluster);
            } else {
                merged.push(cluster);
            }
        }

        // A first cluster that stayed undersized merges into its successor.
        if merged.len() > 1 && merged[0].len() < self.min_cluster_size {
            let first = merged.remove(0);
            merged[0].splice(0..0, first);
        }

        *clusters = merged;
    }
}
