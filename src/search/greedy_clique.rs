use std::cmp::Reverse;

use bit_set::BitSet;
use tracing::debug;

use crate::graph::{Graph, VertexId};

/** grows a clique from the vertex `start`. Marks its neighbors as "candidates".
Then, while the set of candidates is not empty, adds the candidate with the largest
degree (ties: smallest index) and keeps as candidates its neighbors only.
*/
pub fn grow_clique(graph:&Graph, start:VertexId) -> Vec<VertexId> {
    let mut res = vec![start];
    let mut candidates:BitSet = graph.neighbor_set(start).clone();
    while let Some(current_vertex) = candidates.iter()
        .max_by_key(|v| (graph.degree(*v), Reverse(*v))) {
        res.push(current_vertex);
        // only the neighbors of the new vertex stay candidates
        candidates.intersect_with(graph.neighbor_set(current_vertex));
    }
    res
}

/** greedy heuristic that finds a "large" clique: grows a clique from every vertex
and returns the largest one (the first one found in case of ties).
The returned vertices are sorted.
*/
pub fn greedy_clique(graph:&Graph) -> Vec<VertexId> {
    let mut best:Vec<VertexId> = Vec::new();
    for v in graph.vertices() {
        let clique = grow_clique(graph, v);
        if clique.len() > best.len() {
            best = clique;
        }
    }
    best.sort_unstable();
    debug!(size = best.len(), "greedy clique");
    best
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{complete, cycle, random_graph, two_triangles};

    #[test]
    fn test_complete_graph() {
        assert_eq!(greedy_clique(&complete(6)), vec![0,1,2,3,4,5]);
    }

    #[test]
    fn test_small_graphs() {
        assert_eq!(greedy_clique(&cycle(5)).len(), 2);
        assert_eq!(greedy_clique(&two_triangles()), vec![0,1,2]);
        assert_eq!(greedy_clique(&Graph::from_edges(3, &[])), vec![0]);
        assert!(greedy_clique(&Graph::new(vec![])).is_empty());
    }

    #[test]
    fn test_always_a_clique() {
        for seed in 0..10 {
            let g = random_graph(40, 0.5, seed);
            let clique = greedy_clique(&g);
            assert!(!clique.is_empty());
            assert!(g.is_clique(&clique));
            // maximal: no vertex can be added
            for v in g.vertices().filter(|v| !clique.contains(v)) {
                assert!(clique.iter().any(|u| !g.are_adjacent(*u, v)));
            }
        }
    }
}
