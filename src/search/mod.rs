//! Exact maximum clique search: LP relaxations explored by branch & bound or branch & cut.

/// greedy colorings (orderings used to build independent sets)
pub mod coloring;

/// independent sets generated from repeated colorings
pub mod independent_sets;

/// greedy clique heuristic (initial incumbent)
pub mod greedy_clique;

/// branching variable selection and integrality tests
pub mod branching;

/// solver state, statistics and shared node logic
pub mod engine;

/// branch & bound nodes
mod branch_and_bound;

/// branch & cut nodes
mod branch_and_cut;

pub use engine::{solve, solve_with_config, CliqueSolution, MaxCliqueSolver, SearchStats, SolveStatus};
