use bit_set::BitSet;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::graph::VertexId;


/// branching variable selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchingStrategy {
    /// largest fractional value (ties: smallest index)
    MaxFractional,
    /// uniformly random among the fractional variables
    RandomFractional,
}

impl BranchingStrategy {
    /// parses "max" / "random"
    pub fn from_name(name:&str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "max" => Some(Self::MaxFractional),
            "random" => Some(Self::RandomFractional),
            _ => None
        }
    }
}

/// variable chosen for branching
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchingVariable {
    /// vertex of the variable
    pub vertex: VertexId,
    /// its value in the current relaxation
    pub value: f64,
}

impl BranchingVariable {
    /** values of the two equality pins (left, right).
    left is floor(value), solver noise slightly below 0 (floor = -1) is clamped to 0.
    */
    pub fn pins(&self) -> (f64, f64) {
        let mut left = self.value.floor();
        if left == -1. { left = 0.; }
        (left, left + 1.)
    }

    /// true if the right (x = 1) branch is explored first
    pub fn right_first(&self) -> bool { self.value > 0.5 }
}

/// x is integral if |x - round(x)| <= eps * max(|x|, |round(x)|)
pub fn is_integral(x:f64, eps:f64) -> bool {
    let r = x.round();
    (x - r).abs() <= eps * x.abs().max(r.abs())
}

/** upper bound given by a relaxation objective: rounded if it is integral
within the tolerance, rounded up otherwise.
*/
pub fn objective_bound(objective:f64, eps:f64) -> usize {
    let res = if is_integral(objective, eps) { objective.round() } else { objective.ceil() };
    res.max(0.) as usize
}

/** selects the branching variable. The policy is fixed at construction. */
#[derive(Debug)]
pub struct Brancher {
    /// policy
    strategy: BranchingStrategy,
    /// tolerance of the integrality test
    eps: f64,
    /// random generator (random policy)
    rng: StdRng,
}

impl Brancher {
    /// creates a branching selector
    pub fn new(strategy:BranchingStrategy, eps:f64, seed:u64) -> Self {
        Self { strategy, eps, rng: StdRng::seed_from_u64(seed) }
    }

    /// policy
    pub fn strategy(&self) -> BranchingStrategy { self.strategy }

    /// true if every value is integral
    pub fn all_integral(&self, values:&[f64]) -> bool {
        values.iter().all(|x| is_integral(*x, self.eps))
    }

    /** returns the branching variable, None if every variable is integral.
    Variables in `pinned` (already fixed by an ancestor) are never selected: their
    fractional part can only be solver noise.
    */
    pub fn select(&mut self, values:&[f64], pinned:&BitSet) -> Option<BranchingVariable> {
        let eps = self.eps;
        let fractional = values.iter().enumerate()
            .filter(|(v,x)| !pinned.contains(*v) && !is_integral(**x, eps))
            .map(|(vertex,x)| BranchingVariable { vertex, value:*x });
        match self.strategy {
            BranchingStrategy::MaxFractional => {
                let mut best:Option<BranchingVariable> = None;
                for var in fractional {
                    match best {
                        Some(b) if b.value >= var.value => {},
                        _ => best = Some(var),
                    }
                }
                best
            },
            BranchingStrategy::RandomFractional => {
                let candidates:Vec<BranchingVariable> = fractional.collect();
                if candidates.is_empty() { return None; }
                let i = self.rng.gen_range(0..candidates.len());
                Some(candidates[i])
            }
        }
    }
}
