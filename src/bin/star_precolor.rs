#[macro_use]
extern crate clap;
use clap::App;

use star_precolor::instance::Instance;
use star_precolor::search::{verify_precoloring_extension, NullReporter, StdoutReporter};
use star_precolor::util::{exit_code_for_outcome, export_stats, RunConfig, INSTANCE_ERROR_EXIT_CODE};

/// loads an instance, verifies every admissible precoloring extends, and
/// reports the result (§6, §7).
pub fn main() {
    let yaml = load_yaml!("star_precolor.yml");
    // a missing/malformed argument prints a usage message to stdout (§6), not
    // clap's default stderr, so the matches are taken through the
    // non-exiting `get_matches_safe` instead of `get_matches`.
    let main_args = match App::from_yaml(yaml).get_matches_safe() {
        Ok(matches) => matches,
        Err(e) => {
            println!("{}", e.message);
            std::process::exit(1);
        }
    };

    let config = match RunConfig::from_matches(&main_args) {
        Ok(config) => config,
        Err(e) => {
            println!("{}", e.0);
            std::process::exit(1);
        }
    };

    println!("reading instance: {}...", config.instance_file);
    let inst = match Instance::load_from_path(&config.instance_file) {
        Ok(inst) => inst,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(INSTANCE_ERROR_EXIT_CODE);
        }
    };

    let outcome = if config.quiet {
        let mut reporter = NullReporter;
        verify_precoloring_extension(
            &inst,
            config.job_number,
            config.num_jobs,
            config.parallel_depth,
            &mut reporter,
        )
    } else {
        let mut reporter = StdoutReporter;
        verify_precoloring_extension(
            &inst,
            config.job_number,
            config.num_jobs,
            config.parallel_depth,
            &mut reporter,
        )
    };

    if let Some(ref path) = config.stats_file {
        if let Err(e) = export_stats(path, &outcome, &config) {
            eprintln!("couldn't write stats to {}: {}", path, e);
        }
    }

    std::process::exit(exit_code_for_outcome(&outcome));
}
