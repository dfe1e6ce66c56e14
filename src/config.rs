use std::fs;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CliqueError;
use crate::search::branching::BranchingStrategy;


/// tree search used to solve the relaxations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// branch & bound over the independent set + non-edge relaxation
    BranchAndBound,
    /// branch & cut: independent set relaxation tightened by separated cuts
    BranchAndCut,
}

impl Algorithm {
    /// parses "bnb" / "bnc" (case insensitive)
    pub fn from_name(name:&str) -> Result<Self, CliqueError> {
        match name.to_lowercase().as_str() {
            "bnb" | "branch_and_bound" => Ok(Self::BranchAndBound),
            "bnc" | "branch_and_cut" => Ok(Self::BranchAndCut),
            _ => Err(CliqueError::Config(format!("unknown algorithm \"{}\" (valid: bnb, bnc)", name)))
        }
    }
}

/** parameters of the maximum clique solver.
Every field has a default value, so a JSON configuration file only needs
the fields it overrides.
*/
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// BnB or BnC
    pub algorithm: Algorithm,
    /// branching variable selection
    pub branching: BranchingStrategy,
    /// seed for every random component (colorings, random branching)
    pub seed: u64,
    /// relative tolerance for integrality tests
    pub eps: f64,
    /// number of coloring passes to build the base independent sets
    pub coloring_iterations: usize,
    /// time budget (seconds) of the base independent set generation
    pub coloring_time_limit: f64,
    /// minimum size of an independent set in the base model
    pub min_set_size: usize,
    /// minimum size of a separated independent set (BnC)
    pub cut_min_set_size: usize,
    /// number of cuts added per separation round (BnC)
    pub cuts_per_round: usize,
    /// time budget (seconds) of the cutting loop of a node (BnC)
    pub tailing_off: f64,
    /// maximum number of repair rounds on an integral non-clique point (BnC)
    pub max_repair_rounds: usize,
    /// global time limit (seconds), None: search until proven optimal
    pub time_limit: Option<f64>,
    /// drops the non-edges covered by an independent set (BnB)
    pub filter_covered_non_edges: bool,
    /// only the first non-edges are examined by the filter
    pub filtration_limit: usize,
    /// seeds the incumbent using the greedy heuristic
    pub use_heuristic: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::BranchAndBound,
            branching: BranchingStrategy::MaxFractional,
            seed: 0,
            eps: 1e-5,
            coloring_iterations: 50,
            coloring_time_limit: 500.,
            min_set_size: 3,
            cut_min_set_size: 2,
            cuts_per_round: 2,
            tailing_off: 1.,
            max_repair_rounds: 64,
            time_limit: None,
            filter_covered_non_edges: true,
            filtration_limit: 300_000,
            use_heuristic: true,
        }
    }
}

/// a time budget must be a finite, non-negative number of seconds that fits in a Duration
fn check_seconds(name:&str, seconds:f64) -> Result<Duration, CliqueError> {
    Duration::try_from_secs_f64(seconds).map_err(|e| {
        CliqueError::Config(format!("invalid {} ({} s): {}", name, seconds, e))
    })
}

impl SolverConfig {

    /// reads a configuration from a JSON file (missing fields take their default value)
    pub fn from_file(filename:&str) -> Result<Self, CliqueError> {
        let content = fs::read_to_string(filename)
            .map_err(|e| CliqueError::io(filename, e))?;
        let res:Self = serde_json::from_str(&content)?;
        res.validate()?;
        Ok(res)
    }

    /// checks that the parameters are consistent
    pub fn validate(&self) -> Result<(), CliqueError> {
        if !(self.eps > 0. && self.eps < 0.5) {
            return Err(CliqueError::Config(format!("eps must be in (0, 0.5) (current: {})", self.eps)));
        }
        if self.cuts_per_round == 0 {
            return Err(CliqueError::Config("cuts_per_round must be positive".to_string()));
        }
        if self.min_set_size < 2 || self.cut_min_set_size < 2 {
            return Err(CliqueError::Config("independent sets must contain at least 2 vertices".to_string()));
        }
        check_seconds("tailing_off", self.tailing_off)?;
        check_seconds("coloring_time_limit", self.coloring_time_limit)?;
        if let Some(t) = self.time_limit {
            check_seconds("time_limit", t)?;
        }
        Ok(())
    }

    /// cutting loop budget
    pub fn tailing_off_duration(&self) -> Duration { Duration::from_secs_f64(self.tailing_off) }

    /// independent set generation budget
    pub fn coloring_duration(&self) -> Duration { Duration::from_secs_f64(self.coloring_time_limit) }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json() {
        let config:SolverConfig = serde_json::from_str(
            r#"{"algorithm": "BranchAndCut", "branching": "RandomFractional", "cuts_per_round": 3}"#
        ).unwrap();
        assert_eq!(config.algorithm, Algorithm::BranchAndCut);
        assert_eq!(config.branching, BranchingStrategy::RandomFractional);
        assert_eq!(config.cuts_per_round, 3);
        assert_eq!(config.min_set_size, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        assert!(SolverConfig::default().validate().is_ok());
        let config = SolverConfig { eps: 0., ..SolverConfig::default() };
        assert!(config.validate().is_err());
        let config = SolverConfig { cut_min_set_size: 1, ..SolverConfig::default() };
        assert!(config.validate().is_err());
        let config = SolverConfig { time_limit: Some(-1.), ..SolverConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_time_budgets_fit_a_duration() {
        let config = SolverConfig { time_limit: Some(1e20), ..SolverConfig::default() };
        assert!(matches!(config.validate(), Err(CliqueError::Config(_))));
        let config = SolverConfig { tailing_off: f64::INFINITY, ..SolverConfig::default() };
        assert!(config.validate().is_err());
        let config = SolverConfig { coloring_time_limit: f64::NAN, ..SolverConfig::default() };
        assert!(config.validate().is_err());
        let config = SolverConfig { time_limit: Some(3600.), tailing_off: 0., ..SolverConfig::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!(Algorithm::from_name("BnC").unwrap(), Algorithm::BranchAndCut);
        assert_eq!(Algorithm::from_name("bnb").unwrap(), Algorithm::BranchAndBound);
        assert!(Algorithm::from_name("dfs").is_err());
    }
}
