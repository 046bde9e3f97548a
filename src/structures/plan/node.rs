use async_graphql::SimpleObject;

use crate::structures::{Graph, LatLng, NodeID};

#[derive(Debug, SimpleObject, Clone, Copy, PartialEq)]
pub struct PlanCoordinate {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for PlanCoordinate {
    fn from(loc: LatLng) -> Self {
        PlanCoordinate {
            lat: loc.latitude,
            lng: loc.longitude,
        }
    }
}

#[derive(Debug, SimpleObject, Clone, PartialEq)]
pub struct PlanNode {
    pub id: usize,
    /// Source identifier, e.g. `map#osm#123`.
    pub eid: String,
    pub lat: f64,
    pub lng: f64,
}

impl PlanNode {
    pub fn from_node_id(g: &Graph, id: NodeID) -> Option<PlanNode> {
        let node = g.get_node(id)?;

        Some(PlanNode {
            id: id.0,
            eid: node.eid.clone(),
            lat: node.lat_lng.latitude,
            lng: node.lat_lng.longitude,
        })
    }
}
