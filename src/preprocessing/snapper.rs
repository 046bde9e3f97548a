//! Nearest-edge assignment of barrier observations.
//!
//! Each observation is credited in full to the single street segment closest
//! to it, measured point-to-segment in the projected plane. Two-way streets
//! are indexed once (through their lower-index direction); the cost assigner
//! mirrors the credit onto the twin.

use rayon::prelude::*;
use rstar::{
    PointDistance, RTree,
    primitives::{GeomWithData, Line},
};
use tracing::{info, warn};

use crate::structures::{BarrierObservation, EdgeIndex, EdgeKey, Graph, LatLng};

/// One straight piece of an edge's shape, in projected meters.
type Segment = GeomWithData<Line<[f64; 2]>, EdgeIndex>;

pub struct EdgeSnapper<'a> {
    graph: &'a Graph,
    tree: RTree<Segment>,
    max_distance: Option<f64>,
}

/// Result of snapping a batch of observations, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapReport {
    pub assignments: Vec<Option<EdgeKey>>,
    pub dropped: usize,
}

impl SnapReport {
    pub fn snapped(&self) -> usize {
        self.assignments.len() - self.dropped
    }
}

impl<'a> EdgeSnapper<'a> {
    pub fn new(graph: &'a Graph, max_distance: Option<f64>) -> Self {
        let projection = graph.projection();
        let mut segments = Vec::new();

        for (index, edge) in graph.edges() {
            if edge.twin.is_some_and(|twin| twin < index) {
                continue;
            }
            let shape = graph
                .edge_shape(index)
                .into_iter()
                .map(|loc| projection.project(loc).as_array())
                .collect::<Vec<_>>();
            for pair in shape.windows(2) {
                segments.push(Segment::new(Line::new(pair[0], pair[1]), index));
            }
        }

        EdgeSnapper {
            graph,
            tree: RTree::bulk_load(segments),
            max_distance,
        }
    }

    /// Nearest edge to `loc` and its distance in meters. Equidistant edges
    /// resolve to the lowest edge index.
    pub fn snap(&self, loc: LatLng) -> Option<(EdgeIndex, f64)> {
        if !loc.is_finite() {
            return None;
        }
        let point = self.graph.projection().project(loc).as_array();

        let mut candidates = self.tree.nearest_neighbor_iter(&point);
        let first = candidates.next()?;
        let best_2 = first.distance_2(&point);
        let edge = candidates
            .take_while(|s| s.distance_2(&point) <= best_2)
            .map(|s| s.data)
            .fold(first.data, |a, b| a.min(b));

        let distance = best_2.sqrt();
        match self.max_distance {
            Some(max) if distance > max => None,
            _ => Some((edge, distance)),
        }
    }
}

/// Assigns every observation to its nearest edge. Observations that cannot be
/// placed (empty network, bad coordinates, too far away) are dropped.
pub fn snap_barriers(
    graph: &Graph,
    barriers: &[BarrierObservation],
    max_distance: Option<f64>,
) -> SnapReport {
    if graph.edge_count() == 0 {
        if !barriers.is_empty() {
            warn!(
                "Network has no edges, dropping all {} barriers",
                barriers.len()
            );
        }
        return SnapReport {
            assignments: vec![None; barriers.len()],
            dropped: barriers.len(),
        };
    }

    info!("Snapping {} barriers to nearest edges...", barriers.len());
    let snapper = EdgeSnapper::new(graph, max_distance);

    let assignments = barriers
        .par_iter()
        .map(|barrier| {
            snapper
                .snap(barrier.lat_lng)
                .map(|(edge, _)| graph.edge(edge).edge_key())
        })
        .collect::<Vec<_>>();

    let dropped = assignments.iter().filter(|a| a.is_none()).count();
    if dropped > 0 {
        warn!("{dropped} barriers could not be snapped to any edge");
    }

    SnapReport {
        assignments,
        dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::{NewEdge, Point, fixtures::*};

    fn barrier_at(g: &Graph, x: f64, y: f64) -> BarrierObservation {
        BarrierObservation {
            lat_lng: g.projection().unproject(Point { x, y }),
            severity: 3,
            adjusted_severity: 6.0,
            label: "CurbRamp".to_string(),
            neighborhood: "Downtown".to_string(),
            is_temporary: false,
        }
    }

    #[test]
    fn snaps_to_closest_segment_not_closest_node() {
        // a ---- b
        // |
        // c
        let mut g = graph();
        let a = node(&mut g, "a", 0.0, 0.0);
        let b = node(&mut g, "b", 200.0, 0.0);
        let c = node(&mut g, "c", 0.0, -200.0);
        let (ab, _) = street(&mut g, a, b, 200.0);
        let (ac, _) = street(&mut g, a, c, 200.0);

        let report = snap_barriers(
            &g,
            &[barrier_at(&g, 100.0, 5.0), barrier_at(&g, 4.0, -120.0)],
            None,
        );

        assert_eq!(report.dropped, 0);
        assert_eq!(report.assignments[0], Some(g.edge(ab).edge_key()));
        assert_eq!(report.assignments[1], Some(g.edge(ac).edge_key()));
    }

    #[test]
    fn follows_edge_shape() {
        // The a-b street bends north through (100, 100); a straight a-d
        // street runs slightly south.
        let mut g = graph();
        let a = node(&mut g, "a", 0.0, 0.0);
        let b = node(&mut g, "b", 200.0, 0.0);
        let d = node(&mut g, "d", 200.0, -30.0);
        let bend = g.projection().unproject(Point { x: 100.0, y: 100.0 });
        let (curved, _) = g
            .add_street(NewEdge {
                origin: a,
                destination: b,
                length: 283.0,
                geometry: vec![bend],
            })
            .unwrap();
        let (straight, _) = street(&mut g, a, d, 202.0);

        let snapper = EdgeSnapper::new(&g, None);

        let (edge, distance) = snapper.snap(barrier_at(&g, 100.0, 95.0).lat_lng).unwrap();
        assert_eq!(edge, curved);
        assert!(distance < 5.0);

        let (edge, _) = snapper.snap(barrier_at(&g, 100.0, 2.0).lat_lng).unwrap();
        assert_eq!(edge, straight);
    }

    #[test]
    fn distance_clamps_to_segment_ends() {
        let mut g = graph();
        let a = node(&mut g, "a", 0.0, 0.0);
        let b = node(&mut g, "b", 10.0, 0.0);
        street(&mut g, a, b, 10.0);

        let snapper = EdgeSnapper::new(&g, None);
        let distance = |x, y| snapper.snap(barrier_at(&g, x, y).lat_lng).unwrap().1;

        assert!((distance(5.0, 3.0) - 3.0).abs() < 1e-6);
        assert!((distance(-4.0, 3.0) - 5.0).abs() < 1e-6);
        assert!((distance(13.0, -4.0) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn parallel_edges_tie_to_lowest_index() {
        let mut g = graph();
        let a = node(&mut g, "a", 0.0, 0.0);
        let b = node(&mut g, "b", 100.0, 0.0);
        let (first, _) = street(&mut g, a, b, 100.0);
        street(&mut g, a, b, 100.0);

        let snapper = EdgeSnapper::new(&g, None);

        let (edge, _) = snapper.snap(barrier_at(&g, 50.0, 3.0).lat_lng).unwrap();
        assert_eq!(edge, first);
    }

    #[test]
    fn drops_far_and_invalid_barriers() {
        let mut g = graph();
        let a = node(&mut g, "a", 0.0, 0.0);
        let b = node(&mut g, "b", 100.0, 0.0);
        street(&mut g, a, b, 100.0);

        let mut invalid = barrier_at(&g, 0.0, 0.0);
        invalid.lat_lng.latitude = f64::NAN;
        let report = snap_barriers(
            &g,
            &[barrier_at(&g, 50.0, 10.0), barrier_at(&g, 50.0, 500.0), invalid],
            Some(50.0),
        );

        assert_eq!(report.dropped, 2);
        assert_eq!(report.snapped(), 1);
        assert!(report.assignments[0].is_some());
    }

    #[test]
    fn empty_network_drops_everything() {
        let g = graph();
        let barrier = BarrierObservation {
            lat_lng: LatLng::new(47.6, -122.33),
            severity: 1,
            adjusted_severity: 2.0,
            label: String::new(),
            neighborhood: String::new(),
            is_temporary: true,
        };

        let report = snap_barriers(&g, &[barrier], None);

        assert_eq!(report.assignments, vec![None]);
        assert_eq!(report.dropped, 1);
    }
}
