use std::{
    cmp::{Ordering, Reverse},
    collections::{HashMap, HashSet},
};

use priority_queue::PriorityQueue;

use crate::{
    Error, Result,
    structures::{EdgeIndex, Graph, NodeID, RoutingParameters},
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Weight(f64);

impl Eq for Weight {}

impl PartialOrd for Weight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Weight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Lower weight first, then lower node id.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SearchPriority {
    weight: Weight,
    node: NodeID,
}

/// A path found by [`Graph::shortest_path`].
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub nodes: Vec<NodeID>,
    /// The parallel edge taken for each hop.
    pub edges: Vec<EdgeIndex>,
    pub weight: f64,
}

impl Graph {
    /// Dijkstra from `from` to `to` under `params`.
    ///
    /// Each hop costs the cheapest of its parallel edges, see
    /// [`Graph::cheapest_edge`]. All search state is local to the call.
    pub fn shortest_path(
        &self,
        from: NodeID,
        to: NodeID,
        params: &RoutingParameters,
    ) -> Result<Route> {
        self.node(from)?;
        self.node(to)?;

        let mut pq = PriorityQueue::<NodeID, Reverse<SearchPriority>>::new();
        let mut origins = HashMap::<NodeID, (NodeID, EdgeIndex)>::new();
        let mut visited = HashSet::<NodeID>::new();
        pq.push(
            from,
            Reverse(SearchPriority {
                weight: Weight(0.0),
                node: from,
            }),
        );

        while let Some((id, Reverse(p))) = pq.pop() {
            if id == to {
                tracing::debug!(
                    "Found a path after visiting {} nodes (weight {:.1})",
                    visited.len(),
                    p.weight.0
                );
                return Ok(Graph::reconstruct_path(&origins, from, to, p.weight.0));
            }
            visited.insert(id);

            for neighbor in self.neighbors(id) {
                if visited.contains(&neighbor.node) {
                    continue;
                }
                let Some((edge, edge_weight)) = self.cheapest_of(&neighbor.edges, params) else {
                    continue;
                };
                let weight = Weight(p.weight.0 + edge_weight);
                let priority = Reverse(SearchPriority {
                    weight,
                    node: neighbor.node,
                });

                match pq.get_priority(&neighbor.node) {
                    Some(Reverse(current)) if current.weight <= weight => {}
                    Some(_) => {
                        pq.change_priority(&neighbor.node, priority);
                        origins.insert(neighbor.node, (id, edge));
                    }
                    None => {
                        pq.push(neighbor.node, priority);
                        origins.insert(neighbor.node, (id, edge));
                    }
                }
            }
        }

        tracing::debug!(
            "Didn't find a path from {from} to {to} after visiting {} nodes",
            visited.len()
        );
        Err(Error::NoPathFound { from, to })
    }

    fn reconstruct_path(
        origins: &HashMap<NodeID, (NodeID, EdgeIndex)>,
        from: NodeID,
        to: NodeID,
        weight: f64,
    ) -> Route {
        let mut nodes = vec![to];
        let mut edges = Vec::new();
        let mut current = to;

        while current != from {
            let Some(&(previous, edge)) = origins.get(&current) else {
                break;
            };
            nodes.push(previous);
            edges.push(edge);
            current = previous;
        }

        nodes.reverse();
        edges.reverse();
        Route {
            nodes,
            edges,
            weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::fixtures::*;

    #[test]
    fn same_node_is_a_trivial_route() {
        let mut g = graph();
        let a = node(&mut g, "a", 0.0, 0.0);

        let route = g
            .shortest_path(a, a, &RoutingParameters::standard())
            .unwrap();

        assert_eq!(route.nodes, vec![a]);
        assert!(route.edges.is_empty());
        assert_eq!(route.weight, 0.0);
    }

    #[test]
    fn disconnected_nodes_have_no_path() {
        let mut g = graph();
        let a = node(&mut g, "a", 0.0, 0.0);
        let b = node(&mut g, "b", 100.0, 0.0);
        let c = node(&mut g, "c", 500.0, 0.0);
        street(&mut g, a, b, 100.0);

        let result = g.shortest_path(a, c, &RoutingParameters::standard());

        assert!(matches!(result, Err(Error::NoPathFound { from, to }) if from == a && to == c));
    }

    #[test]
    fn unknown_node_is_reported() {
        let mut g = graph();
        let a = node(&mut g, "a", 0.0, 0.0);

        let result = g.shortest_path(a, NodeID(3), &RoutingParameters::standard());

        assert!(matches!(result, Err(Error::NodeNotFound(NodeID(3)))));
    }

    #[test]
    fn respects_edge_direction() {
        let mut g = graph();
        let a = node(&mut g, "a", 0.0, 0.0);
        let b = node(&mut g, "b", 100.0, 0.0);
        g.add_edge(crate::structures::NewEdge {
            origin: a,
            destination: b,
            length: 100.0,
            geometry: Vec::new(),
        })
        .unwrap();

        let params = RoutingParameters::standard();
        assert!(g.shortest_path(a, b, &params).is_ok());
        assert!(matches!(
            g.shortest_path(b, a, &params),
            Err(Error::NoPathFound { .. })
        ));
    }

    #[test]
    fn takes_cheapest_parallel_edge() {
        let mut g = graph();
        let a = node(&mut g, "a", 0.0, 0.0);
        let b = node(&mut g, "b", 100.0, 0.0);
        let (long, _) = street(&mut g, a, b, 130.0);
        let (short, _) = street(&mut g, a, b, 100.0);
        set_cost(&mut g, short, 4.0, 2);

        let standard = g
            .shortest_path(a, b, &RoutingParameters::standard())
            .unwrap();
        assert_eq!(standard.edges, vec![short]);
        assert_eq!(standard.weight, 100.0);

        let avoiding = g
            .shortest_path(a, b, &RoutingParameters::with_barrier_weight(2.0))
            .unwrap();
        assert_eq!(avoiding.edges, vec![long]);
        assert_eq!(avoiding.weight, 130.0);
    }
}
