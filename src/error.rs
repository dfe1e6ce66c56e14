use thiserror::Error;

use crate::graph::VertexId;

/// errors reported by the maximum clique solver
#[derive(Debug, Error)]
pub enum CliqueError {
    /// unable to read or write a file
    #[error("unable to access {path}: {source}")]
    Io {
        /// file concerned
        path: String,
        /// underlying error
        #[source]
        source: std::io::Error,
    },

    /// malformed DIMACS (or benchmark list) input
    #[error("parse error at line {line}: {msg}")]
    Parse {
        /// line number (starting at 1)
        line: usize,
        /// what went wrong
        msg: String,
    },

    /// invalid solver configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// (de)serialization of configuration or results
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// the greedy heuristic returned a set of vertices that is not a clique.
    /// This is a logic defect, the whole solve is aborted.
    #[error("initial heuristic produced a non-clique: {0:?}")]
    HeuristicNotClique(Vec<VertexId>),
}

impl CliqueError {
    /// builds an I/O error for the given path
    pub fn io(path:&str, source:std::io::Error) -> Self {
        Self::Io { path: path.to_string(), source }
    }
}
