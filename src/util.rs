//! CLI parameter extraction, exit-code mapping, and the optional `--stats`
//! sidecar (§6, §7, §10.1).

use serde_json::json;

use crate::search::Outcome;

/// everything the binary needs to run a single worker, assembled from
/// `clap::ArgMatches` (§10.1). Mirrors the teacher's `read_params`, as a named
/// struct instead of a tuple so each field is self-documenting at call sites.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// path to the instance file.
    pub instance_file: String,
    /// this worker's job number, in `0..num_jobs`.
    pub job_number: usize,
    /// total number of cooperating workers.
    pub num_jobs: usize,
    /// depth at which the search tree is sharded across workers.
    pub parallel_depth: usize,
    /// optional path to write a JSON run summary to.
    pub stats_file: Option<String>,
    /// suppress periodic progress dumps.
    pub quiet: bool,
}

/// parse failure for one of the four positional arguments (already validated
/// as present/parseable by `clap`; this only covers the numeric conversion).
#[derive(Debug)]
pub struct ParamError(pub String);

impl RunConfig {
    /// reads command line input into a [`RunConfig`] (§10.1).
    pub fn from_matches(main_args: &clap::ArgMatches) -> Result<Self, ParamError> {
        let instance_file = main_args.value_of("instance").unwrap().to_string();
        let job_number = parse_arg(main_args, "job_number")?;
        let num_jobs = parse_arg(main_args, "num_jobs")?;
        let parallel_depth = parse_arg(main_args, "depth")?;
        let stats_file = main_args.value_of("stats").map(|s| {
            println!("printing stats in: {}", s);
            s.to_string()
        });
        let quiet = main_args.is_present("quiet");
        Ok(RunConfig {
            instance_file,
            job_number,
            num_jobs,
            parallel_depth,
            stats_file,
            quiet,
        })
    }
}

fn parse_arg(main_args: &clap::ArgMatches, name: &str) -> Result<usize, ParamError> {
    let raw = main_args.value_of(name).unwrap();
    raw.parse::<usize>()
        .map_err(|e| ParamError(format!("unable to parse `{}` ({}): {}", name, raw, e)))
}

/// the process exit code for a completed [`Outcome`] (§6, §7).
pub fn exit_code_for_outcome(outcome: &Outcome) -> i32 {
    if outcome.success {
        0
    } else {
        1
    }
}

/// the process exit code for an instance-structural error (§7, category 1/3).
pub const INSTANCE_ERROR_EXIT_CODE: i32 = 99;

/// writes the `--stats` JSON sidecar, mirroring `util::export_results`'s
/// perf-file export.
pub fn export_stats(
    path: &str,
    outcome: &Outcome,
    config: &RunConfig,
) -> std::io::Result<()> {
    let stats = json!({
        "num_precolorings": outcome.num_precolorings,
        "num_failures": outcome.num_failures,
        "job_number": config.job_number,
        "num_jobs": config.num_jobs,
        "parallel_depth": config.parallel_depth,
        "result": if outcome.success { "done" } else { "fail" },
    });
    std::fs::write(path, serde_json::to_string(&stats).unwrap())
}
