//! Stable location indexing for the full travel matrix.
//!
//! Index layout: depot at 0, hubs at 1..=H in configuration order,
//! customers from H+1 onward in order-list order.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Translates between domain identifiers and matrix rows.
#[derive(Debug, Clone)]
pub struct LocationIndex {
    hub_ids: Vec<String>,
    hub_positions: HashMap<String, usize>,
}

impl LocationIndex {
    /// Depot row, always 0.
    pub const DEPOT: usize = 0;

    pub fn new(hub_ids: Vec<String>) -> Self {
        let hub_positions = hub_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i + 1))
            .collect();
        Self {
            hub_ids,
            hub_positions,
        }
    }

    pub fn num_hubs(&self) -> usize {
        self.hub_ids.len()
    }

    /// Matrix row of a hub. Unknown ids are a configuration error.
    pub fn hub_index(&self, hub_id: &str) -> Result<usize> {
        self.hub_positions.get(hub_id).copied().ok_or_else(|| {
            Error::Config(format!(
                "unknown hub '{hub_id}', registered hubs: [{}]",
                self.hub_ids.join(", ")
            ))
        })
    }

    /// The hub id occupying a matrix row, if that row is a hub row.
    pub fn hub_id_at(&self, index: usize) -> Option<&str> {
        if index == 0 || index > self.hub_ids.len() {
            return None;
        }
        Some(&self.hub_ids[index - 1])
    }

    /// First customer row.
    pub fn customer_start(&self) -> usize {
        self.hub_ids.len() + 1
    }

    /// Matrix row of the customer at position `order_pos` in the order list.
    pub fn customer_index(&self, order_pos: usize) -> usize {
        self.customer_start() + order_pos
    }

    /// All hub rows, in configuration order.
    pub fn hub_indices(&self) -> Vec<usize> {
        (1..=self.hub_ids.len()).collect()
    }

    pub fn hub_ids(&self) -> &[String] {
        &self.hub_ids
    }
}
