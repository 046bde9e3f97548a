use std::time::Instant;

use tracing::info;

use crate::{
    Error, Result,
    ingestion::{barriers::load_barriers, osm},
    preprocessing::{CostSummary, assign_edge_costs, snap_barriers},
    structures::{BarrierObservation, BuildConfig, Graph},
};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BuildReport {
    pub barriers: usize,
    /// Dropped by the snapper (no edge, bad coordinates, too far).
    pub unsnapped: usize,
    pub costs: CostSummary,
}

impl BuildReport {
    pub fn discard_ratio(&self) -> f64 {
        if self.barriers == 0 {
            return 0.0;
        }
        (self.unsnapped + self.costs.discarded) as f64 / self.barriers as f64
    }
}

/// Loads the configured network and barrier inputs and produces the
/// cost-annotated graph.
pub fn build_graph(config: &BuildConfig) -> Result<(Graph, BuildReport)> {
    let network = config.network()?;
    info!("Loading '{}'...", network.label());
    let before = Instant::now();
    let mut graph = osm::load_pbf_file(&network.resolve_path()?)?;
    info!(
        "Loaded '{}' in {}ms",
        network.label(),
        before.elapsed().as_millis()
    );

    let mut barriers = Vec::new();
    for input in config.barriers() {
        info!("Loading '{}'...", input.label());
        barriers.extend(load_barriers(&input.resolve_path()?)?);
    }

    let report = annotate_graph(&mut graph, &barriers, config)?;
    Ok((graph, report))
}

/// Snaps `barriers` onto `graph` and writes the edge costs.
///
/// Fails with [`Error::SnapFailure`] when more than
/// `config.max_discard_ratio` of the barriers could not be used.
pub fn annotate_graph(
    graph: &mut Graph,
    barriers: &[BarrierObservation],
    config: &BuildConfig,
) -> Result<BuildReport> {
    let before = Instant::now();
    let snapped = snap_barriers(graph, barriers, config.max_snap_distance);
    let costs = assign_edge_costs(graph, barriers, &snapped.assignments);
    info!("Barriers processed in {}ms", before.elapsed().as_millis());

    let report = BuildReport {
        barriers: barriers.len(),
        unsnapped: snapped.dropped,
        costs,
    };

    if report.discard_ratio() > config.max_discard_ratio {
        return Err(Error::SnapFailure(format!(
            "{} of {} barriers could not be assigned to an edge ({:.1}% > {:.1}%)",
            report.unsnapped + report.costs.discarded,
            report.barriers,
            report.discard_ratio() * 100.0,
            config.max_discard_ratio * 100.0
        )));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::{LatLng, Point, fixtures::*};

    fn build_config(max_snap_distance: Option<f64>) -> BuildConfig {
        BuildConfig {
            inputs: Vec::new(),
            output: "network.bin".to_string(),
            max_snap_distance,
            max_discard_ratio: 0.5,
        }
    }

    fn barrier(lat_lng: LatLng) -> BarrierObservation {
        BarrierObservation {
            lat_lng,
            severity: 4,
            adjusted_severity: 8.0,
            label: "NoSidewalk".to_string(),
            neighborhood: "Ballard".to_string(),
            is_temporary: false,
        }
    }

    #[test]
    fn annotates_and_reports() {
        let mut g = graph();
        let a = node(&mut g, "a", 0.0, 0.0);
        let b = node(&mut g, "b", 100.0, 0.0);
        let (ab, _) = street(&mut g, a, b, 100.0);
        let near = g.projection().unproject(Point { x: 50.0, y: 3.0 });
        let far = g.projection().unproject(Point { x: 50.0, y: 900.0 });

        let report = annotate_graph(
            &mut g,
            &[barrier(near), barrier(near), barrier(far)],
            &build_config(Some(100.0)),
        )
        .unwrap();

        assert_eq!(report.barriers, 3);
        assert_eq!(report.unsnapped, 1);
        assert_eq!(report.costs.assigned, 2);
        assert_eq!(g.edge(ab).accessibility_cost, 16.0);
    }

    #[test]
    fn too_many_discards_abort_the_build() {
        let mut g = graph();
        let a = node(&mut g, "a", 0.0, 0.0);
        let b = node(&mut g, "b", 100.0, 0.0);
        street(&mut g, a, b, 100.0);
        let far = g.projection().unproject(Point { x: 50.0, y: 900.0 });

        let result = annotate_graph(&mut g, &[barrier(far)], &build_config(Some(100.0)));

        assert!(matches!(result, Err(Error::SnapFailure(_))));
    }

    #[test]
    fn no_barriers_is_fine() {
        let mut g = graph();
        let a = node(&mut g, "a", 0.0, 0.0);
        let b = node(&mut g, "b", 100.0, 0.0);
        street(&mut g, a, b, 100.0);

        let report = annotate_graph(&mut g, &[], &build_config(None)).unwrap();

        assert_eq!(report.discard_ratio(), 0.0);
        assert_eq!(g.edges_with_barriers(), 0);
    }
}
