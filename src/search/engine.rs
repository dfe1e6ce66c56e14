use std::rc::Rc;
use std::time::{Duration, Instant};

use bit_set::BitSet;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Algorithm, SolverConfig};
use crate::error::CliqueError;
use crate::graph::{Graph, VertexId};
use crate::relaxation::{
    ConstraintKind, LinearConstraint, OracleError, RelaxationModel, RelaxationSolver, RelaxedSolution,
};
use crate::relaxation::lp::GoodLpSolver;
use crate::search::branching::{objective_bound, Brancher, BranchingStrategy, BranchingVariable};
use crate::search::coloring::ColoringStrategy;
use crate::search::greedy_clique::greedy_clique;
use crate::search::independent_sets::{IndependentSet, IndependentSetGenerator};


/// incumbent bookkeeping of a search
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// best_solution[v]: v belongs to the incumbent
    pub best_solution: Vec<bool>,
    /// size of the incumbent
    pub best_size: usize,
    /// number of branchings so far (names the branch constraints)
    pub branch_counter: usize,
    /// true once an incumbent exists
    pub found: bool,
    /// true if the global time limit interrupted the search
    pub timed_out: bool,
}

/// diagnostics of a solve
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStats {
    /// independent set constraints in the base model
    pub nb_base_sets: usize,
    /// non-edge constraints in the base model
    pub nb_base_non_edges: usize,
    /// non-edges dropped because an independent set covers them
    pub nb_dropped_non_edges: usize,
    /// size of the greedy clique
    pub heuristic_size: usize,
    /// nodes explored
    pub nodes: usize,
    /// deepest node
    pub max_depth: usize,
    /// nodes pruned by the bound
    pub pruned_by_bound: usize,
    /// nodes with an infeasible relaxation
    pub pruned_infeasible: usize,
    /// nodes abandoned after a relaxation solver failure
    pub oracle_failures: usize,
    /// separated cuts
    pub cuts_added: usize,
    /// repair rounds (integral points that are not cliques)
    pub repairs: usize,
    /// nodes abandoned after too many repair rounds
    pub repair_limit_hits: usize,
    /// largest bound of a pruned node
    pub max_pruned_bound: Option<usize>,
    /// successive incumbent sizes
    pub incumbent_history: Vec<usize>,
    /// time spent in the search (seconds)
    pub time_searched: f32,
}

/// how the search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolveStatus {
    /// the search tree was exhausted: the clique is maximum
    Optimal,
    /// the time limit interrupted the search, the clique may not be maximum
    TimeLimitReached,
    /// the time limit elapsed before any clique was found
    NoSolution,
}

/// result of a solve
#[derive(Debug, Clone, Serialize)]
pub struct CliqueSolution {
    /// size of the best clique found
    pub max_clique_size: usize,
    /// assignment[v]: v belongs to the clique
    pub assignment: Vec<bool>,
    /// true if the assignment was checked to be a clique
    pub is_certified_clique: bool,
    /// how the search ended
    pub status: SolveStatus,
    /// diagnostics
    pub stats: SearchStats,
}

impl CliqueSolution {
    /// vertices of the clique
    pub fn clique(&self) -> Vec<VertexId> {
        vertices_of(&self.assignment)
    }
}

/// vertices set to true in the assignment
pub(super) fn vertices_of(assignment:&[bool]) -> Vec<VertexId> {
    assignment.iter().enumerate().filter(|(_,b)| **b).map(|(v,_)| v).collect()
}

/// rounds a relaxation point (every value is assumed integral)
pub(super) fn rounded_assignment(values:&[f64]) -> Vec<bool> {
    values.iter().map(|x| x.round() >= 1.).collect()
}

/** Maximum clique solver. Builds the base relaxation at construction
(independent sets from colorings, plus the uncovered non-edges for BnB)
and runs a branch & bound or branch & cut search when `solve` is called.
*/
#[derive(Debug)]
pub struct MaxCliqueSolver<S:RelaxationSolver> {
    /// graph
    pub(super) graph: Rc<Graph>,
    /// parameters
    pub(super) config: SolverConfig,
    /// relaxation solver
    pub(super) oracle: S,
    /// relaxation model (taken out of the solver during the search)
    pub(super) model: RelaxationModel,
    /// incumbent
    pub(super) state: SearchState,
    /// diagnostics
    pub(super) stats: SearchStats,
    /// branching policy
    pub(super) brancher: Brancher,
    /// cut separation (BnC)
    pub(super) separator: IndependentSetGenerator,
    /// variables pinned by the current branch
    pub(super) pinned: BitSet,
    /// beginning of the search
    pub(super) start: Instant,
}

impl<S:RelaxationSolver> MaxCliqueSolver<S> {

    /// builds the base model of the graph
    pub fn new(mut graph:Graph, config:SolverConfig, oracle:S) -> Result<Self, CliqueError> {
        config.validate()?;
        graph.display_statistics();
        let n = graph.nb_vertices();
        let sets = Self::base_sets(&graph, &config);
        let mut stats = SearchStats { nb_base_sets: sets.len(), ..SearchStats::default() };
        let mut base:Vec<LinearConstraint> = sets.iter()
            .map(|s| LinearConstraint::at_most_one(&s.vertices))
            .collect();
        if config.algorithm == Algorithm::BranchAndBound {
            if config.filter_covered_non_edges {
                let set_members:Vec<Vec<VertexId>> = sets.into_iter().map(|s| s.vertices).collect();
                stats.nb_dropped_non_edges = graph.drop_covered_non_edges(&set_members, config.filtration_limit);
            }
            stats.nb_base_non_edges = graph.complement_edges().len();
            base.extend(graph.complement_edges().iter().map(|(u,v)| LinearConstraint::at_most_one(&[*u,*v])));
        }
        info!(
            algorithm = ?config.algorithm,
            sets = stats.nb_base_sets,
            non_edges = stats.nb_base_non_edges,
            dropped_non_edges = stats.nb_dropped_non_edges,
            "base model built"
        );
        let graph = Rc::new(graph);
        let brancher = Brancher::new(config.branching, config.eps, config.seed);
        let separator = Self::build_separator(graph.clone(), &config);
        Ok(Self {
            model: RelaxationModel::new(n, base),
            graph, config, oracle, stats, brancher, separator,
            state: SearchState::default(),
            pinned: BitSet::with_capacity(n),
            start: Instant::now(),
        })
    }

    /// independent sets of the base model (the generator works on its own copy of the graph)
    fn base_sets(graph:&Graph, config:&SolverConfig) -> Vec<IndependentSet> {
        IndependentSetGenerator::new(
            Rc::new(graph.clone()),
            ColoringStrategy::default_strategies(graph.nb_vertices()),
            config.coloring_iterations,
            config.coloring_duration(),
            config.min_set_size,
            config.seed,
        ).generate()
    }

    /// generator used to separate violated independent sets
    fn build_separator(graph:Rc<Graph>, config:&SolverConfig) -> IndependentSetGenerator {
        IndependentSetGenerator::new(
            graph,
            vec![ColoringStrategy::RandomSequential, ColoringStrategy::LargestWeightFirst],
            1,
            config.tailing_off_duration(),
            config.cut_min_set_size,
            config.seed.wrapping_add(1),
        ).with_eps(config.eps)
    }

    /// graph (non-edges possibly filtered)
    pub fn graph(&self) -> &Graph { &self.graph }

    /// relaxation model
    pub fn model(&self) -> &RelaxationModel { &self.model }

    /// incumbent of the last solve
    pub fn state(&self) -> &SearchState { &self.state }

    /// diagnostics of the last solve
    pub fn stats(&self) -> &SearchStats { &self.stats }

    /// relaxation solver
    pub fn oracle(&self) -> &S { &self.oracle }

    /// runs the search. Two calls with the same configuration give the same result.
    pub fn solve(&mut self) -> Result<CliqueSolution, CliqueError> {
        let n = self.graph.nb_vertices();
        self.start = Instant::now();
        self.state = SearchState { best_solution: vec![false ; n], ..SearchState::default() };
        self.stats = SearchStats {
            nb_base_sets: self.stats.nb_base_sets,
            nb_base_non_edges: self.stats.nb_base_non_edges,
            nb_dropped_non_edges: self.stats.nb_dropped_non_edges,
            ..SearchStats::default()
        };
        self.brancher = Brancher::new(self.config.branching, self.config.eps, self.config.seed);
        self.separator = Self::build_separator(self.graph.clone(), &self.config);
        self.pinned.clear();
        if n == 0 { // the empty clique is optimal
            self.state.found = true;
        } else {
            if self.config.use_heuristic {
                let clique = greedy_clique(&self.graph);
                if !self.graph.is_clique(&clique) {
                    return Err(CliqueError::HeuristicNotClique(clique));
                }
                info!(size = clique.len(), "initial heuristic");
                self.stats.heuristic_size = clique.len();
                let mut assignment = vec![false ; n];
                for v in clique { assignment[v] = true; }
                self.update_incumbent(assignment);
            }
            let mut model = std::mem::take(&mut self.model);
            match self.config.algorithm {
                Algorithm::BranchAndBound => self.branch_and_bound(&mut model, 0),
                Algorithm::BranchAndCut => self.branch_and_cut(&mut model, 0),
            }
            debug_assert_eq!(model.dynamic_len(), 0, "constraints leaked by the search");
            self.model = model;
        }
        self.stats.time_searched = self.start.elapsed().as_secs_f32();
        let clique = vertices_of(&self.state.best_solution);
        let status = if !self.state.found {
            SolveStatus::NoSolution
        } else if self.state.timed_out {
            SolveStatus::TimeLimitReached
        } else {
            SolveStatus::Optimal
        };
        let is_certified_clique = self.state.found && self.graph.is_clique(&clique);
        match status {
            SolveStatus::NoSolution => warn!("no solution found within the time limit"),
            _ => info!(
                size = self.state.best_size,
                ?status,
                is_clique = is_certified_clique,
                nodes = self.stats.nodes,
                time = self.stats.time_searched,
                "search finished"
            ),
        }
        Ok(CliqueSolution {
            max_clique_size: self.state.best_size,
            assignment: self.state.best_solution.clone(),
            is_certified_clique,
            status,
            stats: self.stats.clone(),
        })
    }

    /// true (and marks the search as interrupted) if the global time limit is exceeded
    pub(super) fn time_exceeded(&mut self) -> bool {
        if self.state.timed_out { return true; }
        match self.config.time_limit {
            Some(t) if self.start.elapsed() >= Duration::from_secs_f64(t) => {
                info!(time_limit = t, "time limit reached, unwinding the search");
                self.state.timed_out = true;
                true
            },
            _ => false
        }
    }

    /// registers a new node. Returns false if the search must stop
    pub(super) fn enter_node(&mut self, depth:usize) -> bool {
        if self.time_exceeded() { return false; }
        self.stats.nodes += 1;
        self.stats.max_depth = self.stats.max_depth.max(depth);
        true
    }

    /// solves the relaxation. None if the node must be pruned (infeasible or solver failure)
    pub(super) fn solve_node(&mut self, model:&RelaxationModel) -> Option<RelaxedSolution> {
        match self.oracle.solve(model) {
            Ok(sol) => Some(sol),
            Err(OracleError::Infeasible) => {
                self.stats.pruned_infeasible += 1;
                debug!(constraints = model.dynamic_len(), "infeasible relaxation");
                None
            },
            Err(e) => {
                self.stats.oracle_failures += 1;
                warn!(error = %e, "relaxation solver failed, pruning the node");
                None
            }
        }
    }

    /// true if the relaxation bound cannot beat the incumbent
    pub(super) fn is_pruned(&mut self, sol:&RelaxedSolution) -> bool {
        let bound = objective_bound(sol.objective, self.config.eps);
        if self.state.found && bound <= self.state.best_size {
            self.stats.pruned_by_bound += 1;
            self.stats.max_pruned_bound = Some(self.stats.max_pruned_bound.map_or(bound, |b| b.max(bound)));
            true
        } else {
            false
        }
    }

    /// replaces the incumbent if the assignment is strictly better
    pub(super) fn update_incumbent(&mut self, assignment:Vec<bool>) {
        let size = assignment.iter().filter(|b| **b).count();
        if !self.state.found || size > self.state.best_size {
            debug!(size, previous = self.state.best_size, "new incumbent");
            self.state.found = true;
            self.state.best_size = size;
            self.state.best_solution = assignment;
            self.stats.incumbent_history.push(size);
        }
    }

    /** branches on var: pins it to one value, explores, pins it to the other value, explores.
    The side closest to the fractional value is explored first. Each pin only lives
    during the exploration of its side.
    */
    pub(super) fn branch_on(
        &mut self,
        model:&mut RelaxationModel,
        var:BranchingVariable,
        depth:usize,
        explore:fn(&mut Self, &mut RelaxationModel, usize),
    ) {
        self.state.branch_counter += 1;
        let branch = self.state.branch_counter;
        let (left, right) = var.pins();
        let sides = if var.right_first() { [right, left] } else { [left, right] };
        self.pinned.insert(var.vertex);
        for (i,pin) in sides.iter().enumerate() {
            if i > 0 && self.time_exceeded() { break; }
            let mut scope = model.scope();
            scope.add(ConstraintKind::Branch, format!("c{}", branch), LinearConstraint::pin(var.vertex, *pin));
            debug!(branch, vertex = var.vertex, value = var.value, pin, depth, "branching");
            explore(self, &mut *scope, depth+1);
        }
        self.pinned.remove(var.vertex);
    }
}

/** solves the maximum clique problem with the default parameters.
tailing_off: None runs a branch & bound, Some(budget) a branch & cut whose cutting
loops last at most budget per node.
*/
pub fn solve(
    graph:Graph,
    branching:BranchingStrategy,
    tailing_off:Option<Duration>,
) -> Result<CliqueSolution, CliqueError> {
    let mut config = SolverConfig { branching, ..SolverConfig::default() };
    if let Some(t) = tailing_off {
        config.algorithm = Algorithm::BranchAndCut;
        config.tailing_off = t.as_secs_f64();
    }
    solve_with_config(graph, &config)
}

/// solves the maximum clique problem with the given parameters and the good_lp relaxation solver
pub fn solve_with_config(graph:Graph, config:&SolverConfig) -> Result<CliqueSolution, CliqueError> {
    MaxCliqueSolver::new(graph, config.clone(), GoodLpSolver::new())?.solve()
}
