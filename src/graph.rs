use bit_set::BitSet;
use tracing::info;

/** Vertex Id */
pub type VertexId = usize;

/** result of a clique check on a set of vertices */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliqueCheck {
    /// the induced subgraph is complete
    Clique,
    /// the induced subgraph is not complete. Contains its complement edges (u < v)
    NotClique(Vec<(VertexId,VertexId)>),
}

impl CliqueCheck {
    /// true if the checked vertices form a clique
    pub fn is_clique(&self) -> bool { matches!(self, CliqueCheck::Clique) }
}

/** models an undirected graph for the maximum clique problem.
The complement edges (non-adjacent pairs) are computed once at construction.
*/
#[derive(Debug, Clone)]
pub struct Graph {
    /// nb vertices
    n: usize,
    /// nb edges
    m: usize,
    /// edges of the graph (u < v)
    edges: Vec<(VertexId,VertexId)>,
    /// adj_list[i]: list of vertices adjacent to i (sorted)
    adj_list: Vec<Vec<VertexId>>,
    /// adj_matrix[i] represents a bitset of its neighbors
    adj_matrix: Vec<BitSet>,
    /// non-adjacent pairs (u < v), each unordered pair once
    non_edges: Vec<(VertexId,VertexId)>,
}

impl Graph {

    /** constructor using an adjacency list. Self-loops and duplicated edges are ignored. */
    pub fn new(adj_list:Vec<Vec<VertexId>>) -> Self {
        let n = adj_list.len();
        let mut adj_matrix = vec![BitSet::with_capacity(n); n];
        for (a,l) in adj_list.iter().enumerate() {
            for b in l {
                if a != *b {
                    adj_matrix[a].insert(*b);
                    adj_matrix[*b].insert(a);
                }
            }
        }
        // rebuild the adjacency lists from the matrix (symmetric, sorted, no duplicates)
        let adj_list:Vec<Vec<VertexId>> = adj_matrix.iter()
            .map(|neighbors| neighbors.iter().collect())
            .collect();
        let edges = Self::build_edges(&adj_list);
        let m = edges.len();
        let non_edges = Self::build_non_edges(n, &adj_matrix);
        Self { n, m, edges, adj_list, adj_matrix, non_edges }
    }

    /** constructor using an edge list (vertices in 0..n) */
    pub fn from_edges(n:usize, edges:&[(VertexId,VertexId)]) -> Self {
        let mut adj_list = vec![Vec::new(); n];
        for (a,b) in edges {
            adj_list[*a].push(*b);
            adj_list[*b].push(*a);
        }
        Self::new(adj_list)
    }

    /// builds the edge list
    fn build_edges(adj_list:&[Vec<VertexId>]) -> Vec<(VertexId,VertexId)> {
        let mut res = Vec::new();
        for (i,l) in adj_list.iter().enumerate() {
            for j in l {
                if i < *j {
                    res.push((i,*j));
                }
            }
        }
        res
    }

    /// builds the complement edge list
    fn build_non_edges(n:usize, adj_matrix:&[BitSet]) -> Vec<(VertexId,VertexId)> {
        let mut res = Vec::new();
        for i in 0..n {
            for j in i+1..n {
                if !adj_matrix[i].contains(j) {
                    res.push((i,j));
                }
            }
        }
        res
    }

    /// number of vertices
    pub fn nb_vertices(&self) -> usize { self.n }

    /// number of edges
    pub fn nb_edges(&self) -> usize { self.m }

    /// iterator over the vertices
    pub fn vertices(&self) -> std::ops::Range<VertexId> { 0..self.n }

    /// vertices adjacent to u (sorted)
    pub fn neighbors(&self, u:VertexId) -> &[VertexId] { &self.adj_list[u] }

    /// neighborhood of u as a bitset
    pub fn neighbor_set(&self, u:VertexId) -> &BitSet { &self.adj_matrix[u] }

    /// degree of u
    pub fn degree(&self, u:VertexId) -> usize { self.adj_list[u].len() }

    /// returns if u and v are adjacent (O(1))
    pub fn are_adjacent(&self, u:VertexId, v:VertexId) -> bool {
        self.adj_matrix[u].contains(v)
    }

    /// edge list (u < v)
    pub fn edges(&self) -> &[(VertexId, VertexId)] { &self.edges }

    /// non-adjacent pairs (u < v) not yet dropped by `drop_covered_non_edges`
    pub fn complement_edges(&self) -> &[(VertexId, VertexId)] { &self.non_edges }

    /** checks if the given vertices induce a complete subgraph.
    If not, returns the complement edges of the induced subgraph.
    */
    pub fn check_clique(&self, vertices:&[VertexId]) -> CliqueCheck {
        let k = vertices.len();
        let mut nb_induced_edges = 0;
        let mut missing = Vec::new();
        for (i,u) in vertices.iter().enumerate() {
            for v in &vertices[i+1..] {
                if self.are_adjacent(*u, *v) {
                    nb_induced_edges += 1;
                } else if u != v {
                    missing.push((*u.min(v), *u.max(v)));
                }
            }
        }
        if nb_induced_edges == k * k.saturating_sub(1) / 2 {
            CliqueCheck::Clique
        } else {
            CliqueCheck::NotClique(missing)
        }
    }

    /// returns true if the given vertices form a clique
    pub fn is_clique(&self, vertices:&[VertexId]) -> bool {
        self.check_clique(vertices).is_clique()
    }

    /** removes the non-edges (u,v) already covered by an independent set containing both u
    and v. Only the first `filtration_limit` non-edges are examined, the remaining ones are kept.
    Returns the number of dropped non-edges.
    */
    pub fn drop_covered_non_edges(&mut self, sets:&[Vec<VertexId>], filtration_limit:usize) -> usize {
        let set_bitsets:Vec<BitSet> = sets.iter().map(|s| {
            let mut res = BitSet::with_capacity(self.n);
            for v in s { res.insert(*v); }
            res
        }).collect();
        let before = self.non_edges.len();
        let mut idx = 0;
        self.non_edges.retain(|(u,v)| {
            idx += 1;
            if idx > filtration_limit { return true; }
            !set_bitsets.iter().any(|s| s.contains(*u) && s.contains(*v))
        });
        before - self.non_edges.len()
    }

    /// logs statistics of the graph
    pub fn display_statistics(&self) {
        let min_degree = self.vertices().map(|u| self.degree(u)).min().unwrap_or(0);
        let max_degree = self.vertices().map(|u| self.degree(u)).max().unwrap_or(0);
        info!(
            vertices = self.nb_vertices(),
            edges = self.nb_edges(),
            non_edges = self.non_edges.len(),
            min_degree,
            max_degree,
            "graph statistics"
        );
    }
}


#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// cycle of length n
    pub fn cycle(n:usize) -> Graph {
        let edges:Vec<(usize,usize)> = (0..n).map(|i| (i, (i+1)%n)).collect();
        Graph::from_edges(n, &edges)
    }

    /// complete graph on n vertices
    pub fn complete(n:usize) -> Graph {
        let mut edges = Vec::new();
        for i in 0..n { for j in i+1..n { edges.push((i,j)); } }
        Graph::from_edges(n, &edges)
    }

    /// two disjoint triangles {0,1,2} and {3,4,5}
    pub fn two_triangles() -> Graph {
        Graph::from_edges(6, &[(0,1),(1,2),(0,2),(3,4),(4,5),(3,5)])
    }

    /// random graph with edge probability p (deterministic given the seed)
    pub fn random_graph(n:usize, p:f64, seed:u64) -> Graph {
        let rng = fastrand::Rng::with_seed(seed);
        let mut edges = Vec::new();
        for i in 0..n {
            for j in i+1..n {
                if rng.f64() < p { edges.push((i,j)); }
            }
        }
        Graph::from_edges(n, &edges)
    }

    #[test]
    fn test_build_graph() {
        let g = cycle(5);
        assert_eq!(g.nb_vertices(), 5);
        assert_eq!(g.nb_edges(), 5);
        assert_eq!(g.neighbors(0), &[1,4]);
        assert!(g.are_adjacent(4, 0));
        assert!(!g.are_adjacent(0, 2));
        assert_eq!(g.complement_edges().len(), 5);
    }

    #[test]
    fn test_duplicates_and_self_loops_ignored() {
        let g = Graph::from_edges(3, &[(0,1),(1,0),(1,1),(1,2)]);
        assert_eq!(g.nb_edges(), 2);
        assert_eq!(g.degree(1), 2);
        assert_eq!(g.complement_edges(), &[(0,2)]);
    }

    #[test]
    fn test_complement_edges_unique() {
        let g = random_graph(12, 0.4, 7);
        let non_edges = g.complement_edges();
        assert_eq!(non_edges.len() + g.nb_edges(), 12*11/2);
        for (u,v) in non_edges {
            assert!(u < v);
            assert!(!g.are_adjacent(*u, *v));
        }
    }

    #[test]
    fn test_check_clique() {
        let g = two_triangles();
        assert!(g.is_clique(&[0,1,2]));
        assert!(g.is_clique(&[4]));
        assert!(g.is_clique(&[]));
        assert_eq!(g.check_clique(&[0,1,3]), CliqueCheck::NotClique(vec![(0,3),(1,3)]));
        assert_eq!(g.check_clique(&[4,0]), CliqueCheck::NotClique(vec![(0,4)]));
    }

    #[test]
    fn test_drop_covered_non_edges() {
        let mut g = cycle(5); // non-edges: (0,2) (0,3) (1,3) (1,4) (2,4)
        let dropped = g.drop_covered_non_edges(&[vec![0,2], vec![1,3]], usize::MAX);
        assert_eq!(dropped, 2);
        assert_eq!(g.complement_edges(), &[(0,3),(1,4),(2,4)]);
        // the filtration limit keeps the non-edges after the limit
        let mut g = cycle(5);
        let dropped = g.drop_covered_non_edges(&[vec![1,3], vec![2,4]], 2);
        assert_eq!(dropped, 0);
        assert_eq!(g.complement_edges().len(), 5);
    }
}
