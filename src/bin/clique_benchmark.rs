use std::path::Path;

use clap::{App, ArgMatches, load_yaml};
use tracing::{error, info, warn};

use clique_bnc::config::Algorithm;
use clique_bnc::error::CliqueError;
use clique_bnc::util::{
    benchmark_csv, init_logging, read_benchmarks, read_config, run_benchmark, write_file,
};


/** solves every graph of the benchmark list, writes one json file per graph
and a csv report in the output directory.
*/
fn run(main_args:&ArgMatches) -> Result<(), CliqueError> {
    let list_filename = main_args.value_of("benchmarks").unwrap_or_default();
    let data_dir = match main_args.value_of("data_dir") {
        Some(d) => Path::new(d).to_path_buf(),
        None => Path::new(list_filename).parent().map(|p| p.to_path_buf()).unwrap_or_default(),
    };
    let output_dir = Path::new(main_args.value_of("output").unwrap_or("results")).to_path_buf();
    let config = read_config(main_args)?;
    let algorithm_name = match config.algorithm {
        Algorithm::BranchAndBound => "BnB",
        Algorithm::BranchAndCut => "BnC",
    };
    let entries = read_benchmarks(list_filename)?;
    info!(nb_graphs = entries.len(), algorithm = algorithm_name, "benchmark started");

    let (results, skipped) = run_benchmark(&entries, &data_dir, &config);
    for result in &results {
        let json_path = output_dir.join("per_graph_results").join(algorithm_name)
            .join(format!("{}.json", result.graph_name));
        write_file(&json_path.to_string_lossy(), &serde_json::to_string_pretty(result)?)?;
    }
    if !skipped.is_empty() {
        warn!(nb_skipped = skipped.len(), "some graphs could not be solved");
    }

    let report_path = output_dir.join(format!("report_{}.csv", algorithm_name));
    write_file(&report_path.to_string_lossy(), &benchmark_csv(&results))?;
    let nb_correct = results.iter().filter(|r| r.is_correct()).count();
    println!(
        "{}/{} maximum cliques found ({} skipped). report: {}",
        nb_correct, results.len(), skipped.len(), report_path.display()
    );
    Ok(())
}

/** benchmarks the maximum clique solver over a list of DIMACS graphs */
pub fn main() {
    // parse arguments
    let yaml = load_yaml!("clique_benchmark.yml");
    let main_args = App::from_yaml(yaml).get_matches();
    init_logging(main_args.is_present("verbose"));
    if let Err(e) = run(&main_args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
