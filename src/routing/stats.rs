use crate::{
    Error, Result,
    structures::{EdgeIndex, Graph, LatLng, NodeID, RoutingParameters},
};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RouteStats {
    pub length: f64,
    pub barrier_cost: f64,
    pub barrier_count: u32,
}

/// Edge walked for each hop of `nodes` under `params`: the cheapest parallel
/// edge, exactly as the search picks it.
pub fn selected_edges(
    graph: &Graph,
    nodes: &[NodeID],
    params: &RoutingParameters,
) -> Result<Vec<EdgeIndex>> {
    nodes
        .windows(2)
        .map(|hop| {
            graph
                .cheapest_edge(hop[0], hop[1], params)
                .map(|(edge, _)| edge)
                .ok_or_else(|| {
                    Error::InvalidInput(format!("no edge between {} and {}", hop[0], hop[1]))
                })
        })
        .collect()
}

/// Length and barrier exposure of a resolved route, for the same `params`
/// that produced it.
pub fn route_stats(
    graph: &Graph,
    nodes: &[NodeID],
    params: &RoutingParameters,
) -> Result<RouteStats> {
    Ok(selected_edges(graph, nodes, params)?
        .into_iter()
        .map(|index| graph.edge(index))
        .fold(RouteStats::default(), |acc, edge| RouteStats {
            length: acc.length + edge.length,
            barrier_cost: acc.barrier_cost + edge.accessibility_cost,
            barrier_count: acc.barrier_count + edge.barrier_count,
        }))
}

/// Line geometry of a resolved route, following the shape of each selected
/// edge.
pub fn route_geometry(
    graph: &Graph,
    nodes: &[NodeID],
    params: &RoutingParameters,
) -> Result<Vec<LatLng>> {
    let mut line = Vec::new();
    if let Some(first) = nodes.first() {
        line.push(graph.node(*first)?.lat_lng);
    }
    for edge in selected_edges(graph, nodes, params)? {
        line.extend(graph.edge_shape(edge).into_iter().skip(1));
    }
    Ok(line)
}
