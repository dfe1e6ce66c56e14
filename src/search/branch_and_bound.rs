use tracing::warn;

use crate::relaxation::{RelaxationModel, RelaxationSolver};
use crate::search::engine::{rounded_assignment, vertices_of, MaxCliqueSolver};

impl<S:RelaxationSolver> MaxCliqueSolver<S> {

    /** branch & bound node. The base model holds every (uncovered) non-edge, so
    an integral relaxation point is always a clique.
    */
    pub(super) fn branch_and_bound(&mut self, model:&mut RelaxationModel, depth:usize) {
        if !self.enter_node(depth) { return; }
        let sol = match self.solve_node(model) {
            Some(sol) => sol,
            None => return,
        };
        if self.is_pruned(&sol) { return; }
        match self.brancher.select(&sol.values, &self.pinned) {
            Some(var) => self.branch_on(model, var, depth, Self::branch_and_bound),
            None => {
                let assignment = rounded_assignment(&sol.values);
                if self.graph.is_clique(&vertices_of(&assignment)) {
                    self.update_incumbent(assignment);
                } else {
                    warn!(depth, objective = sol.objective, "integral point is not a clique, node ignored");
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use crate::config::{Algorithm, SolverConfig};
    use crate::graph::Graph;
    use crate::graph::tests::{cycle, random_graph};
    use crate::relaxation::lp::GoodLpSolver;
    use crate::search::engine::MaxCliqueSolver;

    fn bnb() -> SolverConfig {
        SolverConfig { algorithm: Algorithm::BranchAndBound, ..SolverConfig::default() }
    }

    #[test]
    fn test_integral_root() {
        // a triangle plus an isolated vertex: the root relaxation is already integral
        let g = Graph::from_edges(4, &[(0,1),(1,2),(0,2)]);
        let mut solver = MaxCliqueSolver::new(g, bnb(), GoodLpSolver::new()).unwrap();
        let res = solver.solve().unwrap();
        assert_eq!(res.max_clique_size, 3);
        assert_eq!(res.clique(), vec![0,1,2]);
        assert_eq!(res.stats.nodes, 1);
    }

    #[test]
    fn test_odd_cycle_branches() {
        // C7 relaxation: 3.5 > 2 = greedy clique, branching is needed
        let mut solver = MaxCliqueSolver::new(cycle(7), bnb(), GoodLpSolver::new()).unwrap();
        let res = solver.solve().unwrap();
        assert_eq!(res.max_clique_size, 2);
        assert!(res.stats.nodes > 1);
        assert!(res.stats.max_depth >= 1);
        assert!(res.stats.pruned_by_bound > 0);
        assert_eq!(res.stats.cuts_added, 0);
        assert_eq!(res.stats.repairs, 0);
    }

    #[test]
    fn test_without_filtration() {
        let g = random_graph(12, 0.5, 4);
        let filtered = MaxCliqueSolver::new(g.clone(), bnb(), GoodLpSolver::new()).unwrap().solve().unwrap();
        let config = SolverConfig { filter_covered_non_edges: false, ..bnb() };
        let mut solver = MaxCliqueSolver::new(g.clone(), config, GoodLpSolver::new()).unwrap();
        assert_eq!(solver.stats().nb_dropped_non_edges, 0);
        assert_eq!(solver.stats().nb_base_non_edges, g.complement_edges().len());
        let unfiltered = solver.solve().unwrap();
        assert_eq!(filtered.max_clique_size, unfiltered.max_clique_size);
    }
}
