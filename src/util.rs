use std::fs;
use std::path::Path;
use std::time::Instant;

use clap::ArgMatches;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Algorithm, SolverConfig};
use crate::dimacs;
use crate::error::CliqueError;
use crate::graph::VertexId;
use crate::search::{solve_with_config, CliqueSolution};
use crate::search::branching::BranchingStrategy;


/** installs the tracing subscriber. RUST_LOG overrides the default level
(info, or debug if verbose). Calling it twice has no effect.
*/
pub fn init_logging(verbose:bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// parses the value of a command line option
fn parse_arg<T:std::str::FromStr>(args:&ArgMatches, name:&str) -> Result<Option<T>, CliqueError> {
    match args.value_of(name) {
        None => Ok(None),
        Some(v) => v.parse::<T>().map(Some).map_err(|_| {
            CliqueError::Config(format!("unable to parse the value of --{} (\"{}\")", name, v))
        }),
    }
}

/** reads the solver parameters: the configuration file if given (defaults otherwise),
then the command line options that override it. The result is validated.
*/
pub fn read_config(args:&ArgMatches) -> Result<SolverConfig, CliqueError> {
    let mut res = match args.value_of("config") {
        Some(filename) => {
            info!(file = filename, "reading solver parameters");
            SolverConfig::from_file(filename)?
        },
        None => SolverConfig::default(),
    };
    if let Some(name) = args.value_of("algorithm") {
        res.algorithm = Algorithm::from_name(name)?;
    }
    if let Some(name) = args.value_of("branching") {
        res.branching = BranchingStrategy::from_name(name).ok_or_else(|| {
            CliqueError::Config(format!("unknown branching strategy \"{}\" (valid: max, random)", name))
        })?;
    }
    if let Some(t) = parse_arg::<f64>(args, "time")? { res.time_limit = Some(t); }
    if let Some(t) = parse_arg::<f64>(args, "tailing_off")? { res.tailing_off = t; }
    if let Some(seed) = parse_arg::<u64>(args, "seed")? { res.seed = seed; }
    res.validate()?;
    Ok(res)
}

/// line of a benchmark list: `GraphName,CorrectMaxClique,Level`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkEntry {
    /// instance file name (e.g. brock200_1.clq)
    pub graph_name: String,
    /// known maximum clique size
    pub correct_max_clique: usize,
    /// difficulty class (easy, medium, hard...)
    pub level: String,
}

impl BenchmarkEntry {
    /// graph name without its extension
    pub fn stem(&self) -> &str {
        Path::new(&self.graph_name).file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.graph_name)
    }
}

/// parses a benchmark list. The first line is a header, empty lines are ignored.
pub fn parse_benchmarks(content:&str) -> Result<Vec<BenchmarkEntry>, CliqueError> {
    let mut res = Vec::new();
    for (i,line) in content.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() { continue; }
        let fields:Vec<&str> = line.split(',').map(|f| f.trim()).collect();
        if fields.len() != 3 {
            return Err(CliqueError::Parse {
                line: i+1, msg: format!("expected 3 fields, found {}", fields.len())
            });
        }
        let correct_max_clique = fields[1].parse::<usize>().map_err(|e| CliqueError::Parse {
            line: i+1, msg: format!("invalid clique size \"{}\": {}", fields[1], e)
        })?;
        res.push(BenchmarkEntry {
            graph_name: fields[0].to_string(),
            correct_max_clique,
            level: fields[2].to_string(),
        });
    }
    Ok(res)
}

/// reads a benchmark list file
pub fn read_benchmarks(filename:&str) -> Result<Vec<BenchmarkEntry>, CliqueError> {
    let content = fs::read_to_string(filename).map_err(|e| CliqueError::io(filename, e))?;
    parse_benchmarks(&content)
}

/// outcome of a benchmark instance
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    /// instance name (without extension)
    pub graph_name: String,
    /// known maximum clique size
    pub correct_max_clique: usize,
    /// difficulty class
    pub level: String,
    /// size found by the solver
    pub found_max_clique: usize,
    /// the solution was checked to be a clique
    pub is_clique: bool,
    /// solve status (Optimal, TimeLimitReached, NoSolution)
    pub status: String,
    /// solve time (seconds)
    pub consumed_time: f32,
}

impl BenchmarkResult {
    /// builds the result of an instance from its solution
    pub fn new(entry:&BenchmarkEntry, solution:&CliqueSolution, consumed_time:f32) -> Self {
        Self {
            graph_name: entry.stem().to_string(),
            correct_max_clique: entry.correct_max_clique,
            level: entry.level.clone(),
            found_max_clique: solution.max_clique_size,
            is_clique: solution.is_certified_clique,
            status: format!("{:?}", solution.status),
            consumed_time,
        }
    }

    /// the found clique has the known size
    pub fn is_correct(&self) -> bool {
        self.is_clique && self.found_max_clique == self.correct_max_clique
    }
}

/// reads and solves the graph of a benchmark entry (located in data_dir)
pub fn solve_benchmark_entry(
    entry:&BenchmarkEntry,
    data_dir:&Path,
    config:&SolverConfig,
) -> Result<BenchmarkResult, CliqueError> {
    let graph_path = data_dir.join(&entry.graph_name);
    let graph = dimacs::read_from_file(&graph_path.to_string_lossy())?;
    let t_start = Instant::now();
    let solution = solve_with_config(graph, config)?;
    let res = BenchmarkResult::new(entry, &solution, t_start.elapsed().as_secs_f32());
    if !res.is_correct() {
        warn!(
            graph = %res.graph_name,
            expected = res.correct_max_clique,
            found = res.found_max_clique,
            status = %res.status,
            "maximum clique not found"
        );
    }
    Ok(res)
}

/** solves every entry of a benchmark. An entry that cannot be read or solved is
logged and skipped, the other ones are still solved.
Returns the results and the skipped entries (name, error).
*/
pub fn run_benchmark(
    entries:&[BenchmarkEntry],
    data_dir:&Path,
    config:&SolverConfig,
) -> (Vec<BenchmarkResult>, Vec<(String, CliqueError)>) {
    let mut results = Vec::with_capacity(entries.len());
    let mut skipped = Vec::new();
    for (i,entry) in entries.iter().enumerate() {
        info!("[{}/{}] {} started", i+1, entries.len(), entry.graph_name);
        match solve_benchmark_entry(entry, data_dir, config) {
            Ok(res) => {
                info!(time = res.consumed_time, found = res.found_max_clique, "{} finished", entry.graph_name);
                results.push(res);
            },
            Err(e) => {
                error!(graph = %entry.graph_name, error = %e, "graph skipped");
                skipped.push((entry.graph_name.clone(), e));
            }
        }
    }
    (results, skipped)
}

/// CSV report of a benchmark (one line per instance, with a header)
pub fn benchmark_csv(results:&[BenchmarkResult]) -> String {
    let mut res = String::from(
        "Graph Name,Correct Max Clique,Graph Complexity,Found Max Clique,Is Clique,Status,Consumed Time\n"
    );
    for r in results {
        res.push_str(&format!(
            "{},{},{},{},{},{},{:.3}\n",
            r.graph_name, r.correct_max_clique, r.level,
            r.found_max_clique, r.is_clique, r.status, r.consumed_time
        ));
    }
    res
}

/// writes a string to a file, creating its parent directories if needed
pub fn write_file(filename:&str, content:&str) -> Result<(), CliqueError> {
    if let Some(parent) = Path::new(filename).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| CliqueError::io(filename, e))?;
        }
    }
    fs::write(filename, content).map_err(|e| CliqueError::io(filename, e))
}

/// exports statistics (json) to a file
pub fn export_stats(filename:&str, stats:&Value) -> Result<(), CliqueError> {
    write_file(filename, &serde_json::to_string_pretty(stats)?)?;
    info!(file = filename, "statistics exported");
    Ok(())
}

/// writes the clique in a file (one 1-based vertex id per line, DIMACS numbering)
pub fn write_solution(filename:&str, clique:&[VertexId]) -> Result<(), CliqueError> {
    let content:String = clique.iter().map(|v| format!("{}\n", v+1)).collect();
    write_file(filename, &content)?;
    info!(file = filename, size = clique.len(), "solution exported");
    Ok(())
}
