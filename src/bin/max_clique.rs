use std::time::Instant;

use clap::{App, ArgMatches, load_yaml};
use serde_json::json;
use tracing::{error, info};

use clique_bnc::dimacs;
use clique_bnc::error::CliqueError;
use clique_bnc::search::solve_with_config;
use clique_bnc::util::{export_stats, init_logging, read_config, write_solution};


/** reads the instance and the parameters, solves, exports the results */
fn run(main_args:&ArgMatches) -> Result<(), CliqueError> {
    let inst_filename = main_args.value_of("instance").unwrap_or_default();
    let config = read_config(main_args)?;
    info!(instance = inst_filename, ?config, "max clique");
    let graph = dimacs::read_from_file(inst_filename)?;

    // solve it
    let t_start = Instant::now();
    let solution = solve_with_config(graph, &config)?;
    let duration = t_start.elapsed().as_secs_f32();
    let clique = solution.clique();
    println!(
        "{:?} took {:.3} seconds. Max clique size: {} ({:?}, is clique: {})",
        config.algorithm, duration, solution.max_clique_size, solution.status, solution.is_certified_clique
    );
    println!("clique: {:?}", clique.iter().map(|v| v+1).collect::<Vec<_>>());

    // export results
    if let Some(filename) = main_args.value_of("perf") {
        let stats = json!({
            "inst_name": inst_filename,
            "algorithm": config.algorithm,
            "branching": config.branching,
            "max_clique_size": solution.max_clique_size,
            "is_clique": solution.is_certified_clique,
            "status": solution.status,
            "time_searched": duration,
            "stats": solution.stats,
        });
        export_stats(filename, &stats)?;
    }
    if let Some(filename) = main_args.value_of("solution") {
        write_solution(filename, &clique)?;
    }
    Ok(())
}

/** solves a maximum clique instance using an LP-based branch & bound or branch & cut */
pub fn main() {
    // parse arguments
    let yaml = load_yaml!("max_clique.yml");
    let main_args = App::from_yaml(yaml).get_matches();
    init_logging(main_args.is_present("verbose"));
    if let Err(e) = run(&main_args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
