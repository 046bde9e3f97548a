use std::collections::HashMap;

use kdtree::KdTree;
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    structures::{
        Bounds, EdgeData, EdgeIndex, EdgeKey, LatLng, NewEdge, NodeData, NodeID, Projection,
        RoutingParameters,
    },
};

/// All edges leaving one node towards the same destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neighbor {
    pub node: NodeID,
    /// Parallel edges, ordered by key.
    pub edges: Vec<EdgeIndex>,
}

/// Directed pedestrian multigraph.
///
/// Nodes carry both geographic and projected coordinates, computed once at
/// insertion through the graph's projection. Outgoing edges are grouped per
/// destination so parallel segments are always resolved together, see
/// [`Graph::cheapest_edge`].
#[derive(Serialize, Deserialize)]
pub struct Graph {
    projection: Projection,
    bounds: Option<Bounds>,
    nodes: Vec<NodeData>,
    edges: Vec<EdgeData>,
    neighbors: Vec<Vec<Neighbor>>,
    nodes_tree: KdTree<f64, NodeID, [f64; 2]>,
    id_mapper: HashMap<String, NodeID>,
}

impl Graph {
    pub fn new(projection: Projection) -> Graph {
        Graph {
            projection,
            bounds: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            neighbors: Vec::new(),
            nodes_tree: KdTree::new(2),
            id_mapper: HashMap::new(),
        }
    }

    /// Inserts a node, or returns the existing one with the same external id.
    pub fn add_node(&mut self, eid: String, lat_lng: LatLng) -> Result<NodeID> {
        if let Some(id) = self.id_mapper.get(&eid) {
            return Ok(*id);
        }
        if !lat_lng.is_finite() {
            return Err(Error::InvalidInput(format!(
                "node '{eid}' has a non-finite coordinate"
            )));
        }

        let id = NodeID(self.nodes.len());
        self.nodes_tree
            .add([lat_lng.latitude, lat_lng.longitude], id)
            .map_err(|e| Error::InvalidInput(format!("cannot index node '{eid}': {e:?}")))?;

        match self.bounds.as_mut() {
            Some(bounds) => bounds.extend(lat_lng),
            None => self.bounds = Some(Bounds::around(lat_lng)),
        }

        self.nodes.push(NodeData {
            eid: eid.clone(),
            lat_lng,
            xy: self.projection.project(lat_lng),
        });
        self.neighbors.push(Vec::new());
        self.id_mapper.insert(eid, id);

        Ok(id)
    }

    /// Inserts a directed edge. Its parallel key is the number of edges
    /// already connecting the same ordered node pair.
    pub fn add_edge(&mut self, edge: NewEdge) -> Result<EdgeIndex> {
        for id in [edge.origin, edge.destination] {
            if id.0 >= self.nodes.len() {
                return Err(Error::NodeNotFound(id));
            }
        }
        if !edge.length.is_finite() || edge.length < 0.0 {
            return Err(Error::InvalidInput(format!(
                "edge {} -> {} has invalid length {}",
                edge.origin, edge.destination, edge.length
            )));
        }

        let index = EdgeIndex(self.edges.len());
        let group = &mut self.neighbors[edge.origin.0];
        let key = match group.iter_mut().find(|n| n.node == edge.destination) {
            Some(neighbor) => {
                neighbor.edges.push(index);
                neighbor.edges.len() - 1
            }
            None => {
                group.push(Neighbor {
                    node: edge.destination,
                    edges: vec![index],
                });
                0
            }
        };

        self.edges.push(EdgeData {
            origin: edge.origin,
            destination: edge.destination,
            key: key as u32,
            length: edge.length,
            accessibility_cost: 0.0,
            barrier_count: 0,
            total_cost: edge.length,
            twin: None,
            geometry: edge.geometry,
        });

        Ok(index)
    }

    /// Inserts a walkable segment in both directions, linking the two
    /// directed edges as twins.
    pub fn add_street(&mut self, edge: NewEdge) -> Result<(EdgeIndex, EdgeIndex)> {
        let reverse = NewEdge {
            origin: edge.destination,
            destination: edge.origin,
            length: edge.length,
            geometry: edge.geometry.iter().rev().copied().collect(),
        };
        let forward = self.add_edge(edge)?;
        let backward = self.add_edge(reverse)?;
        self.edges[forward.0].twin = Some(backward);
        self.edges[backward.0].twin = Some(forward);
        Ok((forward, backward))
    }

    pub fn get_id(&self, eid: &str) -> Option<&NodeID> {
        self.id_mapper.get(eid)
    }

    pub fn get_node(&self, id: NodeID) -> Option<&NodeData> {
        self.nodes.get(id.0)
    }

    pub fn node(&self, id: NodeID) -> Result<&NodeData> {
        self.nodes.get(id.0).ok_or(Error::NodeNotFound(id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge(&self, index: EdgeIndex) -> &EdgeData {
        &self.edges[index.0]
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, &EdgeData)> {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeIndex(i), e))
    }

    pub(crate) fn edges_mut(&mut self) -> &mut [EdgeData] {
        &mut self.edges
    }

    pub fn edge_by_key(&self, key: EdgeKey) -> Option<EdgeIndex> {
        self.parallel_edges(key.origin, key.destination)
            .get(key.key as usize)
            .copied()
    }

    pub fn neighbors(&self, id: NodeID) -> &[Neighbor] {
        self.neighbors
            .get(id.0)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn parallel_edges(&self, from: NodeID, to: NodeID) -> &[EdgeIndex] {
        self.neighbors(from)
            .iter()
            .find(|n| n.node == to)
            .map(|n| n.edges.as_slice())
            .unwrap_or_default()
    }

    /// The parallel edge `from -> to` with the lowest weight under `params`,
    /// with that weight. The planner, the statistics and the geometry all go
    /// through this, so they always agree on which segment was walked.
    pub fn cheapest_edge(
        &self,
        from: NodeID,
        to: NodeID,
        params: &RoutingParameters,
    ) -> Option<(EdgeIndex, f64)> {
        self.cheapest_of(self.parallel_edges(from, to), params)
    }

    /// Minimum-weight candidate; ties keep the lowest parallel key.
    pub fn cheapest_of(
        &self,
        candidates: &[EdgeIndex],
        params: &RoutingParameters,
    ) -> Option<(EdgeIndex, f64)> {
        let mut best: Option<(EdgeIndex, f64)> = None;
        for &index in candidates {
            let weight = params.edge_weight(self.edge(index));
            match best {
                Some((_, current)) if current <= weight => {}
                _ => best = Some((index, weight)),
            }
        }
        best
    }

    /// Full shape of an edge, endpoints included.
    pub fn edge_shape(&self, index: EdgeIndex) -> Vec<LatLng> {
        let edge = self.edge(index);
        let mut shape = Vec::with_capacity(edge.geometry.len() + 2);
        shape.push(self.nodes[edge.origin.0].lat_lng);
        shape.extend(edge.geometry.iter().copied());
        shape.push(self.nodes[edge.destination.0].lat_lng);
        shape
    }

    pub fn nearest_node(&self, lat: f64, lon: f64) -> Option<(f64, NodeID)> {
        match self.nodes_tree.iter_nearest(&[lat, lon], &LatLng::distance) {
            Ok(mut it) => it.next().map(|(dist, id)| (dist, *id)),
            Err(e) => {
                tracing::warn!("Failed to find a node close to ({lat}, {lon}): {e:?}");
                None
            }
        }
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Street segments carrying at least one barrier. A street and its
    /// reverse twin count once.
    pub fn edges_with_barriers(&self) -> usize {
        self.edges()
            .filter(|(index, e)| e.barrier_count > 0 && e.twin.is_none_or(|twin| twin > *index))
            .count()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Empty graph projected around downtown Seattle.
    pub fn graph() -> Graph {
        Graph::new(Projection::new(LatLng::new(47.6, -122.33)))
    }

    /// Node at `(x, y)` meters from the projection origin.
    pub fn node(g: &mut Graph, name: &str, x: f64, y: f64) -> NodeID {
        let loc = g.projection().unproject(crate::structures::Point { x, y });
        g.add_node(name.to_string(), loc).unwrap()
    }

    pub fn street(g: &mut Graph, a: NodeID, b: NodeID, length: f64) -> (EdgeIndex, EdgeIndex) {
        g.add_street(NewEdge {
            origin: a,
            destination: b,
            length,
            geometry: Vec::new(),
        })
        .unwrap()
    }

    /// Sets a barrier cost on a street in both directions, bypassing snapping.
    pub fn set_cost(g: &mut Graph, edge: EdgeIndex, cost: f64, count: u32) {
        let twin = g.edge(edge).twin;
        for index in std::iter::once(edge).chain(twin) {
            let e = &mut g.edges_mut()[index.0];
            e.accessibility_cost = cost;
            e.barrier_count = count;
            e.total_cost = e.length + cost;
        }
    }
}
