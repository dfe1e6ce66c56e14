use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::{Duration, Instant};

use fastrand::Rng;
use ordered_float::OrderedFloat;
use tracing::{debug, info};

use crate::graph::{Graph, VertexId};
use crate::search::coloring::{color_graph, ColoringStrategy, Partition};


/** independent set (sorted distinct vertices, pairwise non-adjacent).
When produced by the weighted generation, carries the sum of the fractional
values of its members.
*/
#[derive(Debug, Clone, PartialEq)]
pub struct IndependentSet {
    /// members (sorted)
    pub vertices: Vec<VertexId>,
    /// ∑ x_v over the members (weighted generation only)
    pub weight: Option<f64>,
}

impl IndependentSet {
    /// number of members
    pub fn len(&self) -> usize { self.vertices.len() }

    /// true if the set has no member
    pub fn is_empty(&self) -> bool { self.vertices.is_empty() }
}

/** generates maximal independent sets from repeated greedy colorings.
Each color class of a coloring is an independent set.
*/
#[derive(Debug)]
pub struct IndependentSetGenerator {
    /// graph
    graph: Rc<Graph>,
    /// coloring strategies applied at each pass
    strategies: Vec<ColoringStrategy>,
    /// number of coloring passes
    nb_iterations: usize,
    /// time budget of a generation
    time_limit: Duration,
    /// minimum size of a returned set
    min_size: usize,
    /// tolerance on the weight (weighted generation)
    eps: f64,
    /// random number generator (random-sequential strategy)
    rng: Rng,
}

impl IndependentSetGenerator {

    /** creates a generator given:
     - graph: the graph
     - strategies: orderings used by the colorings
     - nb_iterations: number of passes (deterministic strategies only run on the first one)
     - time_limit: budget of a generation
     - min_size: minimum size of a set
     - seed: seed of the random orderings
    */
    pub fn new(
        graph:Rc<Graph>,
        strategies:Vec<ColoringStrategy>,
        nb_iterations:usize,
        time_limit:Duration,
        min_size:usize,
        seed:u64,
    ) -> Self {
        Self {
            graph, strategies, nb_iterations, time_limit, min_size,
            eps: 1e-5,
            rng: Rng::with_seed(seed),
        }
    }

    /// sets the tolerance used by the weighted generation (weight > 1 + eps)
    pub fn with_eps(mut self, eps:f64) -> Self {
        self.eps = eps;
        self
    }

    /// strategies used at each pass
    pub fn strategies(&self) -> &[ColoringStrategy] { &self.strategies }

    /// color classes of a single coloring (weights are only used by the largest-weight-first strategy)
    pub fn coloring(&self, strategy:ColoringStrategy, weights:Option<&[f64]>) -> Partition {
        color_graph(&self.graph, strategy, weights, &self.rng)
    }

    /// strategies to apply at the given pass
    fn pass_strategies(&self, pass:usize) -> impl Iterator<Item=ColoringStrategy> + '_ {
        self.strategies.iter().cloned().filter(move |s| pass == 0 || s.is_randomized())
    }

    /** runs the coloring passes and returns the distinct color classes of size >= min_size
    (sorted by members). Returns an empty result if the budget elapses before any class is found.
    */
    pub fn generate(&mut self) -> Vec<IndependentSet> {
        let start = Instant::now();
        let mut res:BTreeSet<Vec<VertexId>> = BTreeSet::new();
        'passes: for pass in 0..self.nb_iterations {
            let strategies:Vec<ColoringStrategy> = self.pass_strategies(pass).collect();
            if strategies.is_empty() { break; } // nothing left that could differ
            for strategy in strategies {
                if start.elapsed() >= self.time_limit {
                    info!(pass, "independent set generation: time limit reached");
                    break 'passes;
                }
                for mut class in self.coloring(strategy, None) {
                    if class.len() >= self.min_size {
                        class.sort_unstable();
                        res.insert(class);
                    }
                }
            }
        }
        debug!(
            nb_sets = res.len(),
            time = start.elapsed().as_secs_f32(),
            "independent set generation"
        );
        res.into_iter().map(|vertices| IndependentSet { vertices, weight:None }).collect()
    }

    /** weighted generation: for each coloring pass and color class, keeps the class
    if its size is >= min_size and the sum of the values of its members exceeds 1 + eps
    (it is violated by the point `values`). The result is sorted by decreasing weight.
    */
    pub fn generate_weighted(&mut self, values:&[f64]) -> Vec<IndependentSet> {
        let start = Instant::now();
        let mut seen:BTreeSet<Vec<VertexId>> = BTreeSet::new();
        let mut res = Vec::new();
        'passes: for pass in 0..self.nb_iterations {
            let strategies:Vec<ColoringStrategy> = self.pass_strategies(pass).collect();
            if strategies.is_empty() { break; }
            for strategy in strategies {
                if start.elapsed() >= self.time_limit { break 'passes; }
                for mut class in self.coloring(strategy, Some(values)) {
                    if class.len() < self.min_size { continue; }
                    let weight:f64 = class.iter().map(|v| values[*v]).sum();
                    if weight > 1. + self.eps {
                        class.sort_unstable();
                        if seen.insert(class.clone()) {
                            res.push(IndependentSet { vertices: class, weight: Some(weight) });
                        }
                    }
                }
            }
        }
        res.sort_by(|a,b| {
            OrderedFloat(b.weight.unwrap_or(0.)).cmp(&OrderedFloat(a.weight.unwrap_or(0.)))
                .then_with(|| a.vertices.cmp(&b.vertices))
        });
        res
    }
}
