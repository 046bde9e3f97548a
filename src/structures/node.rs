use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::structures::{LatLng, Point};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeData {
    pub eid: String,
    pub lat_lng: LatLng,
    pub xy: Point,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeID(pub usize);

impl Display for NodeID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
