use tracing::debug;

use crate::{
    Error, Result,
    routing::{
        search::Route,
        stats::{RouteStats, route_geometry, route_stats},
    },
    structures::{EdgeIndex, Graph, LatLng, NodeID, RoutingConfig, RoutingParameters},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteQuery {
    pub start: LatLng,
    pub end: LatLng,
    /// Explicit weight, within `[0, max_barrier_weight]`.
    pub barrier_weight: Option<f64>,
    /// Slider value in `[0, 100]`; 100 ignores barriers.
    pub tolerance: Option<f64>,
}

/// One route of a [`DualRoute`], with everything recomputed for the weight
/// it was searched with.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    pub nodes: Vec<NodeID>,
    pub edges: Vec<EdgeIndex>,
    pub stats: RouteStats,
    pub geometry: Vec<LatLng>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DualRoute {
    pub accessible: ResolvedRoute,
    pub standard: ResolvedRoute,
    pub snapped_start: LatLng,
    pub snapped_end: LatLng,
    pub barrier_weight: f64,
}

/// Maps the tolerance slider onto a barrier weight: 0 is the most
/// barrier-averse, 100 ignores barriers.
pub fn tolerance_to_barrier_weight(tolerance: f64, max_barrier_weight: f64) -> f64 {
    (100.0 - tolerance) * max_barrier_weight / 100.0
}

impl RouteQuery {
    pub fn resolve_barrier_weight(&self, config: &RoutingConfig) -> Result<f64> {
        let weight = match (self.barrier_weight, self.tolerance) {
            (Some(_), Some(_)) => {
                return Err(Error::InvalidInput(
                    "give either barrier_weight or tolerance, not both".to_string(),
                ));
            }
            (Some(weight), None) => weight,
            (None, Some(tolerance)) => {
                if !(tolerance.is_finite() && (0.0..=100.0).contains(&tolerance)) {
                    return Err(Error::InvalidInput(format!(
                        "tolerance must lie in [0, 100], got {tolerance}"
                    )));
                }
                tolerance_to_barrier_weight(tolerance, config.max_barrier_weight)
            }
            (None, None) => config.default_barrier_weight,
        };

        if !(weight.is_finite() && (0.0..=config.max_barrier_weight).contains(&weight)) {
            return Err(Error::InvalidInput(format!(
                "barrier_weight must lie in [0, {}], got {weight}",
                config.max_barrier_weight
            )));
        }
        Ok(weight)
    }

    fn validate_point(graph: &Graph, name: &str, loc: LatLng, margin: f64) -> Result<()> {
        if !loc.is_finite() {
            return Err(Error::InvalidInput(format!("{name} is not a finite coordinate")));
        }
        match graph.bounds() {
            Some(bounds) if !bounds.contains(loc, margin) => Err(Error::InvalidInput(format!(
                "{name} ({loc}) is outside the network area"
            ))),
            _ => Ok(()),
        }
    }
}

/// Computes the standard and the accessible route for a query.
pub fn route(graph: &Graph, query: &RouteQuery, config: &RoutingConfig) -> Result<DualRoute> {
    let barrier_weight = query.resolve_barrier_weight(config)?;
    RouteQuery::validate_point(graph, "start", query.start, config.bounds_margin)?;
    RouteQuery::validate_point(graph, "end", query.end, config.bounds_margin)?;

    let (from, to) = (snap_endpoint(graph, query.start)?, snap_endpoint(graph, query.end)?);
    let (accessible, standard) = dual_route(graph, from, to, barrier_weight, config)?;

    Ok(DualRoute {
        accessible,
        standard,
        snapped_start: graph.node(from)?.lat_lng,
        snapped_end: graph.node(to)?.lat_lng,
        barrier_weight,
    })
}

/// Accessible and standard routes between two nodes, in that order.
pub fn dual_route(
    graph: &Graph,
    from: NodeID,
    to: NodeID,
    barrier_weight: f64,
    config: &RoutingConfig,
) -> Result<(ResolvedRoute, ResolvedRoute)> {
    let standard_params = RoutingParameters::from_config(0.0, config);
    let accessible_params = RoutingParameters::from_config(barrier_weight, config);

    let standard = graph.shortest_path(from, to, &standard_params)?;
    let accessible = if accessible_params.ignores_barriers() {
        standard.clone()
    } else {
        graph.shortest_path(from, to, &accessible_params)?
    };

    Ok((
        resolve(graph, accessible, &accessible_params)?,
        resolve(graph, standard, &standard_params)?,
    ))
}

fn snap_endpoint(graph: &Graph, loc: LatLng) -> Result<NodeID> {
    let (distance, id) = graph
        .nearest_node(loc.latitude, loc.longitude)
        .ok_or_else(|| Error::SnapFailure(format!("no network node near {loc}")))?;
    debug!("Snapped ({loc}) to node {id} at {distance:.1}m");
    Ok(id)
}

fn resolve(graph: &Graph, route: Route, params: &RoutingParameters) -> Result<ResolvedRoute> {
    Ok(ResolvedRoute {
        stats: route_stats(graph, &route.nodes, params)?,
        geometry: route_geometry(graph, &route.nodes, params)?,
        nodes: route.nodes,
        edges: route.edges,
    })
}
