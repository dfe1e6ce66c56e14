use std::cmp::{Ordering, Reverse};
use std::collections::VecDeque;

use bit_set::BitSet;
use fastrand::Rng;
use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;
use serde::{Deserialize, Serialize};

use crate::graph::{Graph, VertexId};

/** Coloring of a graph (represented as a partition).
partition[c]: vertices colored with c. Each color class is an independent set.
*/
pub type Partition = Vec<Vec<VertexId>>;

/// vertex ordering used by the greedy coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColoringStrategy {
    /// decreasing degree
    LargestFirst,
    /// uniformly random order
    RandomSequential,
    /// repeatedly removes a vertex of minimum degree, colors in reverse removal order
    SmallestLast,
    /// DSATUR: vertex seeing the most colors first (ties: largest degree)
    SaturationLargestFirst,
    /// breadth first traversal of each connected component
    ConnectedSequentialBfs,
    /// depth first traversal of each connected component
    ConnectedSequentialDfs,
    /// RLF: builds one maximal independent set at a time
    RecursiveLargestFirst,
    /// decreasing fractional weight (ties: largest degree), LargestFirst without weights
    LargestWeightFirst,
}

impl ColoringStrategy {

    /// true if two runs may produce different colorings
    pub fn is_randomized(&self) -> bool {
        matches!(self, ColoringStrategy::RandomSequential)
    }

    /// strategies used to build the base independent sets of a graph with n vertices
    pub fn default_strategies(n:usize) -> Vec<Self> {
        let mut res = vec![
            Self::LargestFirst,
            Self::RandomSequential,
            Self::ConnectedSequentialBfs,
            Self::ConnectedSequentialDfs,
            Self::SaturationLargestFirst,
            Self::SmallestLast,
        ];
        if n < 500 { // RLF is quadratic per color class
            res.push(Self::RecursiveLargestFirst);
        }
        res
    }
}

/** colors the graph with the given strategy.
weights are only used by LargestWeightFirst, rng only by RandomSequential.
*/
pub fn color_graph(graph:&Graph, strategy:ColoringStrategy, weights:Option<&[f64]>, rng:&Rng) -> Partition {
    match strategy {
        ColoringStrategy::LargestFirst => greedy_color(graph, &largest_first_order(graph)),
        ColoringStrategy::RandomSequential => {
            let mut order:Vec<VertexId> = graph.vertices().collect();
            rng.shuffle(&mut order);
            greedy_color(graph, &order)
        },
        ColoringStrategy::SmallestLast => greedy_color(graph, &smallest_last_order(graph)),
        ColoringStrategy::SaturationLargestFirst => greedy_dsatur(graph),
        ColoringStrategy::ConnectedSequentialBfs => greedy_color(graph, &connected_order(graph, true)),
        ColoringStrategy::ConnectedSequentialDfs => greedy_color(graph, &connected_order(graph, false)),
        ColoringStrategy::RecursiveLargestFirst => greedy_rlf(graph),
        ColoringStrategy::LargestWeightFirst => match weights {
            None => greedy_color(graph, &largest_first_order(graph)),
            Some(w) => greedy_color(graph, &largest_weight_order(graph, w)),
        },
    }
}

/** greedy sequential coloring: each vertex (in the given order) receives the
smallest color not used by its already colored neighbors.
*/
pub fn greedy_color(graph:&Graph, order:&[VertexId]) -> Partition {
    let mut colors:Vec<Option<usize>> = vec![None ; graph.nb_vertices()];
    let mut res:Partition = Vec::new();
    for v in order {
        let mut adj_colors = BitSet::new();
        for u in graph.neighbors(*v) {
            if let Some(c) = colors[*u] { adj_colors.insert(c); }
        }
        let mut color = 0;
        while adj_colors.contains(color) { color += 1; }
        colors[*v] = Some(color);
        if color == res.len() { res.push(Vec::new()); }
        res[color].push(*v);
    }
    res
}

/// vertices by decreasing degree (ties: smallest index)
fn largest_first_order(graph:&Graph) -> Vec<VertexId> {
    let mut res:Vec<VertexId> = graph.vertices().collect();
    res.sort_by_key(|v| Reverse(graph.degree(*v)));
    res
}

/// vertices by decreasing weight (ties: largest degree, then smallest index)
fn largest_weight_order(graph:&Graph, weights:&[f64]) -> Vec<VertexId> {
    let mut res:Vec<VertexId> = graph.vertices().collect();
    res.sort_by_key(|v| (Reverse(OrderedFloat(weights[*v])), Reverse(graph.degree(*v))));
    res
}

/// smallest-last ordering (uses the degrees in the remaining graph)
fn smallest_last_order(graph:&Graph) -> Vec<VertexId> {
    let n = graph.nb_vertices();
    let mut remaining:PriorityQueue<VertexId, (Reverse<usize>, Reverse<VertexId>)> = PriorityQueue::new();
    let mut degrees:Vec<usize> = graph.vertices().map(|v| graph.degree(v)).collect();
    for v in graph.vertices() {
        remaining.push(v, (Reverse(degrees[v]), Reverse(v)));
    }
    let mut removed = BitSet::with_capacity(n);
    let mut res = Vec::with_capacity(n);
    while let Some((v,_)) = remaining.pop() {
        removed.insert(v);
        res.push(v);
        for u in graph.neighbors(v) {
            if !removed.contains(*u) {
                degrees[*u] -= 1;
                remaining.change_priority(u, (Reverse(degrees[*u]), Reverse(*u)));
            }
        }
    }
    res.reverse();
    res
}

/// traversal order of each connected component (components in index order)
fn connected_order(graph:&Graph, breadth_first:bool) -> Vec<VertexId> {
    let n = graph.nb_vertices();
    let mut visited = BitSet::with_capacity(n);
    let mut res = Vec::with_capacity(n);
    for source in graph.vertices() {
        if visited.contains(source) { continue; }
        let mut frontier:VecDeque<VertexId> = VecDeque::new();
        frontier.push_back(source);
        if breadth_first { visited.insert(source); }
        while let Some(v) = if breadth_first { frontier.pop_front() } else { frontier.pop_back() } {
            if !breadth_first {
                if visited.contains(v) { continue; }
                visited.insert(v);
            }
            res.push(v);
            if breadth_first {
                for u in graph.neighbors(v) {
                    if !visited.contains(*u) {
                        visited.insert(*u);
                        frontier.push_back(*u);
                    }
                }
            } else {
                // reversed so that the smallest neighbor is explored first
                for u in graph.neighbors(v).iter().rev() {
                    if !visited.contains(*u) { frontier.push_back(*u); }
                }
            }
        }
    }
    res
}

#[derive(PartialEq, Eq)]
struct DSatInfo {
    dsat: usize,
    degree: usize,
    vertex: Reverse<VertexId>,
}

impl Ord for DSatInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dsat.cmp(&other.dsat)
            .then_with(|| self.degree.cmp(&other.degree))
            .then_with(|| self.vertex.cmp(&other.vertex))
    }
}

impl PartialOrd for DSatInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/** greedy DSATUR:
    1. choose an uncolored vertex that sees the most colors (break ties by the largest degree)
    2. add it to the first color available
    3. mark all its neighbors seeing this color
    4. repeat until every vertex is colored
*/
fn greedy_dsatur(graph:&Graph) -> Partition {
    let n = graph.nb_vertices();
    let mut remaining_vertices:PriorityQueue<VertexId, DSatInfo> = PriorityQueue::new();
    for v in graph.vertices() {
        remaining_vertices.push(v, DSatInfo { dsat:0, degree:graph.degree(v), vertex:Reverse(v) });
    }
    let mut colors:Vec<Option<usize>> = vec![None ; n]; // colors[v] -> color assigned to vertex v
    let mut adj_colors:Vec<BitSet> = vec![BitSet::default() ; n]; // adj_colors[v] -> colors v sees
    let mut res:Partition = Vec::new();
    while let Some((current_vertex,_)) = remaining_vertices.pop() {
        let mut color:usize = 0;
        while adj_colors[current_vertex].contains(color) { color += 1; }
        colors[current_vertex] = Some(color);
        if color == res.len() { res.push(Vec::new()); }
        res[color].push(current_vertex);
        // update saturation degree information
        for conflict_vertex in graph.neighbors(current_vertex).iter()
        .filter(|u| colors[**u].is_none()) {
            if !adj_colors[*conflict_vertex].contains(color) {
                adj_colors[*conflict_vertex].insert(color);
                remaining_vertices.change_priority_by(conflict_vertex, |p| { p.dsat += 1; });
            }
        }
    }
    res
}

/** Recursive Largest First: colors vertices one color at a time
    1. selects the uncolored vertex with the largest degree (among uncolored vertices)
    2. marks its neighbors unreachable
    3. selects a reachable vertex that has the most unreachable neighbors
       (ties: fewest reachable neighbors)
    4. when there are no reachable vertices, start over with a new color
*/
fn greedy_rlf(graph:&Graph) -> Partition {
    let n = graph.nb_vertices();
    let mut colored = BitSet::with_capacity(n);
    let mut res:Partition = Vec::new();
    while colored.len() < n {
        let mut reachable:BitSet = graph.vertices().filter(|v| !colored.contains(*v)).collect();
        let mut unreachable = BitSet::with_capacity(n);
        let mut class = Vec::new();
        // first vertex: largest degree in the uncolored graph
        let mut next = reachable.iter().max_by_key(|v| {
            (graph.neighbor_set(*v).intersection(&reachable).count(), Reverse(*v))
        });
        while let Some(current_vertex) = next {
            class.push(current_vertex);
            colored.insert(current_vertex);
            reachable.remove(current_vertex);
            for u in graph.neighbors(current_vertex) {
                if reachable.remove(*u) { unreachable.insert(*u); }
            }
            next = reachable.iter().max_by_key(|v| {
                let neighbors = graph.neighbor_set(*v);
                (
                    neighbors.intersection(&unreachable).count(),
                    Reverse(neighbors.intersection(&reachable).count()),
                    Reverse(*v),
                )
            });
        }
        res.push(class);
    }
    res
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{complete, cycle, random_graph};

    const ALL_STRATEGIES:[ColoringStrategy; 8] = [
        ColoringStrategy::LargestFirst,
        ColoringStrategy::RandomSequential,
        ColoringStrategy::SmallestLast,
        ColoringStrategy::SaturationLargestFirst,
        ColoringStrategy::ConnectedSequentialBfs,
        ColoringStrategy::ConnectedSequentialDfs,
        ColoringStrategy::RecursiveLargestFirst,
        ColoringStrategy::LargestWeightFirst,
    ];

    /// checks that the partition covers every vertex once with independent classes
    fn assert_valid_partition(graph:&Graph, partition:&Partition) {
        let mut seen = BitSet::new();
        for class in partition {
            assert!(!class.is_empty());
            for (i,u) in class.iter().enumerate() {
                assert!(seen.insert(*u), "vertex {} colored twice", u);
                for v in &class[i+1..] {
                    assert!(!graph.are_adjacent(*u, *v), "{} and {} share a color", u, v);
                }
            }
        }
        assert_eq!(seen.len(), graph.nb_vertices());
    }

    #[test]
    fn test_complete_graph_trivial_partition() {
        let g = complete(7);
        let rng = Rng::with_seed(3);
        for strategy in ALL_STRATEGIES.iter() {
            let partition = color_graph(&g, *strategy, None, &rng);
            assert_eq!(partition.len(), 7, "{:?}", strategy);
            assert!(partition.iter().all(|c| c.len() == 1), "{:?}", strategy);
            assert_valid_partition(&g, &partition);
        }
    }

    #[test]
    fn test_valid_partitions() {
        let rng = Rng::with_seed(11);
        for seed in 0..5 {
            let g = random_graph(25, 0.3, seed);
            let weights:Vec<f64> = (0..25).map(|i| (i % 7) as f64 / 7.).collect();
            for strategy in ALL_STRATEGIES.iter() {
                let partition = color_graph(&g, *strategy, Some(weights.as_slice()), &rng);
                assert_valid_partition(&g, &partition);
            }
        }
    }

    #[test]
    fn test_even_cycle_two_colors() {
        let g = cycle(6);
        let rng = Rng::with_seed(0);
        for strategy in [ColoringStrategy::ConnectedSequentialBfs, ColoringStrategy::SaturationLargestFirst,
            ColoringStrategy::RecursiveLargestFirst].iter() {
            assert_eq!(color_graph(&g, *strategy, None, &rng).len(), 2, "{:?}", strategy);
        }
    }

    #[test]
    fn test_empty_graph() {
        let g = Graph::new(vec![]);
        let rng = Rng::with_seed(0);
        for strategy in ALL_STRATEGIES.iter() {
            assert!(color_graph(&g, *strategy, None, &rng).is_empty());
        }
    }

    #[test]
    fn test_largest_weight_order() {
        let g = cycle(4);
        let order = largest_weight_order(&g, &[0.1, 0.9, 0.5, 0.9]);
        assert_eq!(order, vec![1,3,2,0]);
    }
}
