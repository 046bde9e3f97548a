use std::collections::{HashMap, HashSet};

use osmpbf::{Element, ElementReader};
use tracing::{debug, info};

use crate::{
    Result,
    structures::{Graph, LatLng, NewEdge, Projection},
};

/// Builds the pedestrian network from an OSM PBF extract.
///
/// Ways are split at intersections (nodes shared by several ways, and way
/// endpoints); intermediate nodes become the edge shape. Every piece is
/// walkable in both directions.
pub fn load_pbf_file(pbf_path: &str) -> Result<Graph> {
    let reader = ElementReader::from_path(pbf_path)?;
    let mut ways = Vec::<Vec<i64>>::new();

    reader.for_each(|element| {
        if let Element::Way(w) = element {
            if !is_walkable(w.tags()) {
                return;
            }
            let refs = w.refs().collect::<Vec<_>>();
            if refs.len() >= 2 {
                ways.push(refs);
            }
        }
    })?;

    let wanted = ways.iter().flatten().copied().collect::<HashSet<_>>();
    let reader = ElementReader::from_path(pbf_path)?;
    let mut locations = HashMap::<i64, LatLng>::new();
    reader.for_each(|element| match element {
        Element::DenseNode(n) if wanted.contains(&n.id()) => {
            locations.insert(n.id(), LatLng::new(n.lat(), n.lon()));
        }
        Element::Node(n) if wanted.contains(&n.id()) => {
            locations.insert(n.id(), LatLng::new(n.lat(), n.lon()));
        }
        _ => {}
    })?;

    assemble_graph(&ways, &locations)
}

/// A stretch of way between two consecutive intersections.
#[derive(Debug, Clone, PartialEq)]
struct StreetPiece {
    from: i64,
    to: i64,
    length: f64,
    shape: Vec<LatLng>,
}

/// Turns walkable ways (as node id lists) into a graph, splitting them at
/// intersections.
fn assemble_graph(ways: &[Vec<i64>], locations: &HashMap<i64, LatLng>) -> Result<Graph> {
    let mut usage = HashMap::<i64, u32>::new();
    let mut endpoints = HashSet::<i64>::new();
    for refs in ways {
        for r in refs {
            *usage.entry(*r).or_default() += 1;
        }
        if let (Some(first), Some(last)) = (refs.first(), refs.last()) {
            endpoints.insert(*first);
            endpoints.insert(*last);
        }
    }

    let is_intersection =
        |id: &i64| endpoints.contains(id) || usage.get(id).is_some_and(|count| *count > 1);

    let mut intersections = locations
        .keys()
        .copied()
        .filter(is_intersection)
        .collect::<Vec<_>>();
    intersections.sort_unstable();

    let projection =
        Projection::centered_on(intersections.iter().filter_map(|id| locations.get(id)));
    let mut g = Graph::new(projection);
    for id in &intersections {
        if let Some(loc) = locations.get(id) {
            g.add_node(node_eid(*id), *loc)?;
        }
    }

    let mut n = 0usize;
    let mut failed = 0usize;

    for refs in ways {
        let (pieces, dropped) = split_way(refs, locations, is_intersection);
        n += pieces.len() + dropped;
        failed += dropped;
        for piece in pieces {
            if !insert_street(&mut g, piece) {
                failed += 1;
            }
        }
    }

    if failed > 0 {
        debug!("{failed} segments dropped because of missing nodes or endpoints");
    }
    if n > 0 {
        info!(
            "Successfully imported {} street segments out of {} ({}%)",
            n - failed,
            n,
            (n - failed) * 100 / n
        );
    }
    info!(
        "Network has {} nodes and {} directed edges",
        g.node_count(),
        g.edge_count()
    );

    Ok(g)
}

/// Splits one way at every intersection it passes through.
///
/// A node without a location drops the piece being built; splitting resumes
/// at the next intersection. Returns the pieces and the number dropped.
fn split_way(
    refs: &[i64],
    locations: &HashMap<i64, LatLng>,
    is_intersection: impl Fn(&i64) -> bool,
) -> (Vec<StreetPiece>, usize) {
    let mut pieces = Vec::new();
    let mut dropped = 0usize;
    let mut start: Option<i64> = None;
    let mut shape = Vec::<LatLng>::new();
    let mut length = 0.0;
    let mut previous: Option<LatLng> = None;

    for r in refs {
        let Some(loc) = locations.get(r).copied() else {
            if start.is_some() {
                dropped += 1;
            }
            start = None;
            previous = None;
            continue;
        };

        if let Some(p) = previous {
            length += p.dist(loc);
        }
        previous = Some(loc);

        if !is_intersection(r) {
            if start.is_some() {
                shape.push(loc);
            }
            continue;
        }

        if let Some(from) = start {
            pieces.push(StreetPiece {
                from,
                to: *r,
                length,
                shape: std::mem::take(&mut shape),
            });
        }
        start = Some(*r);
        shape.clear();
        length = 0.0;
    }

    (pieces, dropped)
}

fn node_eid(id: i64) -> String {
    format!("map#osm#{id}")
}

/// Pedestrian access from a way's tags.
fn is_walkable<'a>(tags: impl IntoIterator<Item = (&'a str, &'a str)>) -> bool {
    let (mut highway, mut foot, mut access) = (None, None, None);
    for (key, value) in tags {
        match key {
            "highway" => highway = Some(value),
            "foot" => foot = Some(value),
            "access" => access = Some(value),
            _ => {}
        }
    }

    if !matches!(
        highway,
        Some(
            "trunk"
                | "primary"
                | "secondary"
                | "tertiary"
                | "unclassified"
                | "residential"
                | "service"
                | "living_street"
                | "trunk_link"
                | "primary_link"
                | "secondary_link"
                | "tertiary_link"
                | "footway"
                | "path"
                | "track"
                | "pedestrian"
                | "steps"
                | "corridor"
                | "elevator"
        )
    ) {
        return false;
    }

    match foot {
        Some("no") => return false,
        Some("yes" | "designated" | "permissive") => return true,
        _ => {}
    }

    !matches!(access, Some("no" | "private" | "agricultural" | "forestry"))
}

fn insert_street(g: &mut Graph, piece: StreetPiece) -> bool {
    let (Some(from_id), Some(to_id)) = (
        g.get_id(&node_eid(piece.from)).copied(),
        g.get_id(&node_eid(piece.to)).copied(),
    ) else {
        return false;
    };

    g.add_street(NewEdge {
        origin: from_id,
        destination: to_id,
        length: piece.length,
        geometry: piece.shape,
    })
    .is_ok()
}
