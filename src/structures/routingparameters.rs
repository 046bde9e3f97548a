use serde::{Deserialize, Serialize};

use crate::structures::{EdgeData, RoutingConfig};

pub static DEFAULT_EXPONENT: f64 = 2.0;
pub static DEFAULT_ZERO_THRESHOLD: f64 = 0.01;

/// Edge weight formula shared by the search and the route statistics.
///
/// `weight = length + barrier_weight * accessibility_cost ^ exponent`, or just
/// `length` when `barrier_weight` is below `zero_threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutingParameters {
    pub barrier_weight: f64,
    pub exponent: f64,
    pub zero_threshold: f64,
}

impl RoutingParameters {
    /// Distance only.
    pub fn standard() -> Self {
        Self::with_barrier_weight(0.0)
    }

    pub fn with_barrier_weight(barrier_weight: f64) -> Self {
        RoutingParameters {
            barrier_weight,
            exponent: DEFAULT_EXPONENT,
            zero_threshold: DEFAULT_ZERO_THRESHOLD,
        }
    }

    pub fn from_config(barrier_weight: f64, config: &RoutingConfig) -> Self {
        RoutingParameters {
            barrier_weight,
            exponent: config.exponent,
            zero_threshold: config.zero_threshold,
        }
    }

    pub fn ignores_barriers(&self) -> bool {
        self.barrier_weight < self.zero_threshold
    }

    pub fn edge_weight(&self, edge: &EdgeData) -> f64 {
        if self.ignores_barriers() {
            return edge.length;
        }
        edge.length + self.barrier_weight * edge.accessibility_cost.powf(self.exponent)
    }
}
