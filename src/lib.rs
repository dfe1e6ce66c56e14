//! Exact maximum clique solver based on LP relaxations (branch & bound, branch & cut)

// #![warn(clippy::all, clippy::pedantic)]
// useful additional warnings if docs are missing, or crates imported but unused, etc.
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unsafe_code)]
#![warn(unused_extern_crates)]
#![warn(variant_size_differences)]

// not sure if already by default in clippy
#![warn(clippy::similar_names)]
#![warn(clippy::shadow_unrelated)]
#![warn(clippy::shadow_same)]
#![warn(clippy::shadow_reuse)]


/// graph model (adjacency, complement edges, clique checks)
pub mod graph;

/// read DIMACS graphs
pub mod dimacs;

/// error types
pub mod error;

/// solver parameters
pub mod config;

/// LP relaxation model and solvers
pub mod relaxation;

/// exact search and heuristics
pub mod search;

/// helper and utility methods for executables
pub mod util;
