use serde::{Deserialize, Serialize};

use crate::structures::{LatLng, NodeID};

/// Position of an edge in the graph's edge table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeIndex(pub usize);

/// Stable identity of a directed edge: `(from, to, parallel key)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub origin: NodeID,
    pub destination: NodeID,
    pub key: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeData {
    pub origin: NodeID,
    pub destination: NodeID,
    pub key: u32,
    /// Meters.
    pub length: f64,
    pub accessibility_cost: f64,
    pub barrier_count: u32,
    pub total_cost: f64,
    /// Reverse edge built from the same street segment, if any.
    pub twin: Option<EdgeIndex>,
    /// Intermediate shape points, endpoints excluded.
    pub geometry: Vec<LatLng>,
}

impl EdgeData {
    pub fn edge_key(&self) -> EdgeKey {
        EdgeKey {
            origin: self.origin,
            destination: self.destination,
            key: self.key,
        }
    }
}

/// A segment to insert into the graph; costs start at zero.
#[derive(Debug, Clone)]
pub struct NewEdge {
    pub origin: NodeID,
    pub destination: NodeID,
    pub length: f64,
    pub geometry: Vec<LatLng>,
}
