use async_graphql::SimpleObject;

use crate::{
    routing::routing::DualRoute,
    structures::plan::{PlanCoordinate, RouteGeometry},
};

#[derive(Debug, SimpleObject, Clone, Copy, PartialEq)]
pub struct RouteComparison {
    pub accessible_length: f64,
    pub accessible_barrier_cost: f64,
    pub accessible_barrier_count: u32,
    pub standard_length: f64,
    pub standard_barrier_cost: f64,
    pub standard_barrier_count: u32,
}

#[derive(Debug, SimpleObject, Clone, PartialEq)]
pub struct RoutePlan {
    pub accessible_route: RouteGeometry,
    pub standard_route: RouteGeometry,
    pub stats: RouteComparison,
    pub snapped_start: PlanCoordinate,
    pub snapped_end: PlanCoordinate,
    pub barrier_weight: f64,
}

impl From<&DualRoute> for RoutePlan {
    fn from(dual: &DualRoute) -> Self {
        let (accessible, standard) = (&dual.accessible.stats, &dual.standard.stats);
        RoutePlan {
            accessible_route: RouteGeometry::from_resolved(&dual.accessible),
            standard_route: RouteGeometry::from_resolved(&dual.standard),
            stats: RouteComparison {
                accessible_length: accessible.length,
                accessible_barrier_cost: accessible.barrier_cost,
                accessible_barrier_count: accessible.barrier_count,
                standard_length: standard.length,
                standard_barrier_cost: standard.barrier_cost,
                standard_barrier_count: standard.barrier_count,
            },
            snapped_start: dual.snapped_start.into(),
            snapped_end: dual.snapped_end.into(),
            barrier_weight: dual.barrier_weight,
        }
    }
}
