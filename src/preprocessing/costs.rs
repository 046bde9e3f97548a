use tracing::{info, warn};

use crate::structures::{BarrierObservation, EdgeKey, Graph};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CostSummary {
    /// Observations credited to an edge.
    pub assigned: usize,
    /// Observations whose edge is not in this graph.
    pub discarded: usize,
    pub edges_with_barriers: usize,
}

/// Writes `accessibility_cost`, `barrier_count` and `total_cost` on every
/// edge from scratch.
///
/// `assignments[i]` is the edge barrier `i` was snapped to, `None` when the
/// snapper dropped it. Each observation adds its adjusted severity to that
/// edge and to its reverse twin. Assignments naming an edge absent from
/// `graph` are skipped and counted as discarded.
pub fn assign_edge_costs(
    graph: &mut Graph,
    barriers: &[BarrierObservation],
    assignments: &[Option<EdgeKey>],
) -> CostSummary {
    let mut summary = CostSummary::default();

    for edge in graph.edges_mut() {
        edge.accessibility_cost = 0.0;
        edge.barrier_count = 0;
    }

    for (barrier, assignment) in barriers.iter().zip(assignments) {
        let Some(key) = assignment else {
            continue;
        };
        let Some(index) = graph.edge_by_key(*key) else {
            summary.discarded += 1;
            continue;
        };

        let severity = if barrier.adjusted_severity.is_finite() {
            barrier.adjusted_severity.max(0.0)
        } else {
            0.0
        };
        let twin = graph.edge(index).twin;
        let edges = graph.edges_mut();
        for target in std::iter::once(index).chain(twin) {
            edges[target.0].accessibility_cost += severity;
            edges[target.0].barrier_count += 1;
        }
        summary.assigned += 1;
    }

    for edge in graph.edges_mut() {
        edge.total_cost = edge.length + edge.accessibility_cost;
    }

    summary.edges_with_barriers = graph.edges_with_barriers();

    if summary.discarded > 0 {
        warn!(
            "{} barriers referenced edges missing from the network",
            summary.discarded
        );
    }
    info!(
        "Edge costs calculated! {} street segments carry barriers",
        summary.edges_with_barriers
    );

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        preprocessing::snap_barriers,
        structures::{NodeID, Point, fixtures::*},
    };

    fn barrier(g: &Graph, x: f64, y: f64, adjusted_severity: f64) -> BarrierObservation {
        BarrierObservation {
            lat_lng: g.projection().unproject(Point { x, y }),
            severity: 3,
            adjusted_severity,
            label: "Obstacle".to_string(),
            neighborhood: "Capitol Hill".to_string(),
            is_temporary: false,
        }
    }

    #[test]
    fn sums_severities_per_edge() {
        // a --- b --- c
        //       |
        //       d
        let mut g = graph();
        let a = node(&mut g, "a", 0.0, 0.0);
        let b = node(&mut g, "b", 100.0, 0.0);
        let c = node(&mut g, "c", 200.0, 0.0);
        let d = node(&mut g, "d", 100.0, -100.0);
        let (ab, ba) = street(&mut g, a, b, 100.0);
        let (bc, _) = street(&mut g, b, c, 100.0);
        let (bd, db) = street(&mut g, b, d, 100.0);

        let barriers = vec![
            barrier(&g, 30.0, 4.0, 6.0),
            barrier(&g, 70.0, -3.0, 2.5),
            barrier(&g, 103.0, -50.0, 10.0),
        ];
        let report = snap_barriers(&g, &barriers, None);
        let summary = assign_edge_costs(&mut g, &barriers, &report.assignments);

        assert_eq!(summary.assigned, 3);
        assert_eq!(summary.discarded, 0);
        assert_eq!(summary.edges_with_barriers, 2);

        for index in [ab, ba] {
            assert_eq!(g.edge(index).accessibility_cost, 8.5);
            assert_eq!(g.edge(index).barrier_count, 2);
            assert_eq!(g.edge(index).total_cost, 108.5);
        }
        for index in [bd, db] {
            assert_eq!(g.edge(index).accessibility_cost, 10.0);
            assert_eq!(g.edge(index).barrier_count, 1);
        }
        assert_eq!(g.edge(bc).accessibility_cost, 0.0);
        assert_eq!(g.edge(bc).total_cost, 100.0);
    }

    #[test]
    fn parallel_edges_are_not_double_counted() {
        let mut g = graph();
        let a = node(&mut g, "a", 0.0, 0.0);
        let b = node(&mut g, "b", 100.0, 0.0);
        let (first, _) = street(&mut g, a, b, 100.0);
        let (second, _) = street(&mut g, a, b, 140.0);

        let barriers = vec![barrier(&g, 50.0, 0.0, 4.0)];
        let report = snap_barriers(&g, &barriers, None);
        assign_edge_costs(&mut g, &barriers, &report.assignments);

        let total: f64 = g.edges().map(|(_, e)| e.accessibility_cost).sum();
        assert_eq!(total, 8.0);
        assert_eq!(g.edge(first).accessibility_cost, 4.0);
        assert_eq!(g.edge(second).accessibility_cost, 0.0);
    }

    #[test]
    fn rerunning_reproduces_costs() {
        let mut g = graph();
        let a = node(&mut g, "a", 0.0, 0.0);
        let b = node(&mut g, "b", 100.0, 0.0);
        let (ab, _) = street(&mut g, a, b, 100.0);

        let barriers = vec![barrier(&g, 50.0, 1.0, 3.0)];
        let report = snap_barriers(&g, &barriers, None);
        assign_edge_costs(&mut g, &barriers, &report.assignments);
        assign_edge_costs(&mut g, &barriers, &report.assignments);

        assert_eq!(g.edge(ab).accessibility_cost, 3.0);
        assert_eq!(g.edge(ab).barrier_count, 1);
    }

    #[test]
    fn unknown_edges_are_discarded() {
        let mut g = graph();
        let a = node(&mut g, "a", 0.0, 0.0);
        let b = node(&mut g, "b", 100.0, 0.0);
        let (ab, _) = street(&mut g, a, b, 100.0);

        let barriers = vec![
            barrier(&g, 50.0, 1.0, 3.0),
            barrier(&g, 50.0, 1.0, -2.0),
            barrier(&g, 50.0, 1.0, 9.0),
        ];
        let assignments = vec![
            Some(g.edge(ab).edge_key()),
            Some(g.edge(ab).edge_key()),
            Some(EdgeKey {
                origin: a,
                destination: NodeID(42),
                key: 0,
            }),
        ];
        let summary = assign_edge_costs(&mut g, &barriers, &assignments);

        assert_eq!(summary.assigned, 2);
        assert_eq!(summary.discarded, 1);
        assert_eq!(g.edge(ab).accessibility_cost, 3.0);
        assert_eq!(g.edge(ab).barrier_count, 2);
        assert!(g.edges().all(|(_, e)| e.accessibility_cost >= 0.0));
    }
}
