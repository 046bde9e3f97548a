use std::sync::Arc;

use async_graphql::{ComplexObject, Context, Result, SimpleObject};

use crate::{
    routing::routing::ResolvedRoute,
    structures::{Graph, NodeID, plan::PlanNode},
};

/// GeoJSON-style `LineString`, coordinates as `[lng, lat]`.
#[derive(Debug, SimpleObject, Clone, PartialEq)]
#[graphql(complex)]
pub struct RouteGeometry {
    #[graphql(name = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<f64>>,
    pub node_ids: Vec<usize>,

    #[graphql(skip)]
    pub path: Vec<NodeID>,
}

impl RouteGeometry {
    pub fn from_resolved(route: &ResolvedRoute) -> RouteGeometry {
        RouteGeometry {
            kind: "LineString".to_string(),
            coordinates: route
                .geometry
                .iter()
                .map(|loc| vec![loc.longitude, loc.latitude])
                .collect(),
            node_ids: route.nodes.iter().map(|id| id.0).collect(),
            path: route.nodes.clone(),
        }
    }
}

#[ComplexObject]
impl RouteGeometry {
    pub async fn nodes(&self, ctx: &Context<'_>) -> Result<Vec<PlanNode>> {
        let graph = ctx.data::<Arc<Graph>>()?;

        Ok(self
            .path
            .iter()
            .filter_map(|id| PlanNode::from_node_id(graph, *id))
            .collect())
    }
}
