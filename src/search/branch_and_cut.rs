use std::time::Instant;

use tracing::{debug, warn};

use crate::graph::CliqueCheck;
use crate::relaxation::{
    ConstraintKind, ConstraintScope, LinearConstraint, RelaxationModel, RelaxationSolver, RelaxedSolution,
};
use crate::search::engine::{rounded_assignment, vertices_of, MaxCliqueSolver};

impl<S:RelaxationSolver> MaxCliqueSolver<S> {

    /** branch & cut node.
    Solves the relaxation, then separates violated independent sets until the
    tailing-off budget elapses or no violated set is found. If the point is integral
    but not a clique, the non-edges it uses are added and the node is processed again
    (at most max_repair_rounds times). Cuts and repairs live until the node is left.
    */
    pub(super) fn branch_and_cut(&mut self, model:&mut RelaxationModel, depth:usize) {
        if !self.enter_node(depth) { return; }
        let mut scope = model.scope();
        let mut repair_rounds = 0;
        loop {
            let sol = match self.cutting_loop(&mut scope) {
                Some(sol) => sol,
                None => return,
            };
            let var = match self.brancher.select(&sol.values, &self.pinned) {
                Some(var) => var,
                None => {
                    let assignment = rounded_assignment(&sol.values);
                    match self.graph.check_clique(&vertices_of(&assignment)) {
                        CliqueCheck::Clique => self.update_incumbent(assignment),
                        CliqueCheck::NotClique(non_edges) => {
                            if repair_rounds >= self.config.max_repair_rounds {
                                self.stats.repair_limit_hits += 1;
                                warn!(depth, repair_rounds, "repair limit reached, node abandoned");
                                return;
                            }
                            repair_rounds += 1;
                            self.stats.repairs += 1;
                            debug!(depth, nb_non_edges = non_edges.len(), "repairing an integral point");
                            for (u,v) in non_edges {
                                scope.add(
                                    ConstraintKind::Repair,
                                    format!("r{}_{}", u, v),
                                    LinearConstraint::at_most_one(&[u,v])
                                );
                            }
                            continue;
                        }
                    }
                    return;
                }
            };
            self.branch_on(&mut scope, var, depth, Self::branch_and_cut);
            return;
        }
    }

    /** solves the node and adds cuts while they improve the relaxation.
    The cuts are owned by the node scope. Returns None if the node is pruned.
    */
    fn cutting_loop(&mut self, scope:&mut ConstraintScope<'_>) -> Option<RelaxedSolution> {
        let mut sol = self.solve_node(scope)?;
        if self.is_pruned(&sol) { return None; }
        let start = Instant::now();
        let tailing_off = self.config.tailing_off_duration();
        while start.elapsed() <= tailing_off {
            if self.brancher.all_integral(&sol.values) { break; }
            let sets = self.separator.generate_weighted(&sol.values);
            if sets.is_empty() { break; }
            for set in sets.into_iter().take(self.config.cuts_per_round) {
                self.stats.cuts_added += 1;
                debug!(size = set.len(), weight = set.weight, "cut");
                scope.add(
                    ConstraintKind::Cut,
                    format!("cut{}", self.stats.cuts_added),
                    LinearConstraint::at_most_one(&set.vertices)
                );
            }
            sol = self.solve_node(scope)?;
            if self.is_pruned(&sol) { return None; }
        }
        Some(sol)
    }
}


#[cfg(test)]
mod tests {
    use crate::config::{Algorithm, SolverConfig};
    use crate::graph::Graph;
    use crate::graph::tests::{cycle, random_graph};
    use crate::relaxation::lp::GoodLpSolver;
    use crate::search::branching::BranchingStrategy;
    use crate::search::engine::MaxCliqueSolver;
    use crate::search::engine::tests::brute_force_max_clique;

    fn bnc() -> SolverConfig {
        SolverConfig { algorithm: Algorithm::BranchAndCut, ..SolverConfig::default() }
    }

    #[test]
    fn test_repair_then_cut() {
        // no base set (min size 4 > 3 vertices): the root point is all ones, repaired
        // into x_i + x_j <= 1, then the set {0,1,2} is separated
        let config = SolverConfig { min_set_size: 4, ..bnc() };
        let mut solver = MaxCliqueSolver::new(Graph::from_edges(3, &[]), config, GoodLpSolver::new()).unwrap();
        let res = solver.solve().unwrap();
        assert_eq!(res.max_clique_size, 1);
        assert_eq!(res.stats.repairs, 1);
        assert_eq!(res.stats.cuts_added, 1);
        assert_eq!(res.stats.nodes, 1);
        assert_eq!(solver.model().dynamic_len(), 0);
    }

    #[test]
    fn test_odd_cycle() {
        let mut solver = MaxCliqueSolver::new(cycle(5), bnc(), GoodLpSolver::new()).unwrap();
        let res = solver.solve().unwrap();
        assert_eq!(res.max_clique_size, 2);
        assert!(res.stats.repairs >= 1);
        assert!(res.is_certified_clique);
    }

    #[test]
    fn test_repair_limit() {
        let config = SolverConfig { max_repair_rounds: 0, ..bnc() };
        let mut solver = MaxCliqueSolver::new(cycle(5), config, GoodLpSolver::new()).unwrap();
        let res = solver.solve().unwrap();
        assert_eq!(res.stats.repair_limit_hits, 1);
        assert_eq!(res.stats.repairs, 0);
        // the greedy clique is kept
        assert_eq!(res.max_clique_size, 2);
        assert_eq!(solver.model().dynamic_len(), 0);
    }

    #[test]
    fn test_cuts_below_branchings() {
        // sparse base model without incumbent: cuts are separated in nodes that carry pins
        let seeds:Vec<u64> = (0..10).chain(vec![31, 40]).collect();
        let mut total_cuts = 0;
        let mut max_depth = 0;
        for seed in seeds {
            let n = 10 + (seed as usize % 6);
            let g = random_graph(n, 0.5, seed);
            let expected = brute_force_max_clique(&g);
            for branching in [BranchingStrategy::MaxFractional, BranchingStrategy::RandomFractional].iter() {
                let config = SolverConfig {
                    min_set_size: 6, use_heuristic: false, branching: *branching, seed, ..bnc()
                };
                let mut solver = MaxCliqueSolver::new(g.clone(), config, GoodLpSolver::new()).unwrap();
                let res = solver.solve().unwrap();
                assert_eq!(res.max_clique_size, expected, "seed {} {:?}", seed, branching);
                assert!(res.is_certified_clique);
                assert_eq!(solver.model().dynamic_len(), 0, "seed {} {:?}", seed, branching);
                total_cuts += res.stats.cuts_added;
                max_depth = max_depth.max(res.stats.max_depth);
            }
        }
        assert!(total_cuts > 0);
        assert!(max_depth > 0);
    }

    #[test]
    fn test_model_balanced_after_every_solve() {
        let g = random_graph(14, 0.5, 7);
        let config = SolverConfig { min_set_size: 6, use_heuristic: false, ..bnc() };
        let mut solver = MaxCliqueSolver::new(g, config, GoodLpSolver::new()).unwrap();
        let base_len = solver.model().base().len();
        let first = solver.solve().unwrap();
        assert_eq!(solver.model().dynamic_len(), 0);
        assert_eq!(solver.model().base().len(), base_len);
        // a leaked pin would make the second search infeasible
        let second = solver.solve().unwrap();
        assert_eq!(first.max_clique_size, second.max_clique_size);
        assert_eq!(solver.model().dynamic_len(), 0);
    }
}
