//! DST ruleset generator and detector test runner
//!
//! `dst-rulegen generate` asks the rule oracle for the transitions of every
//! ambiguous zone and writes the ruleset. `dst-rulegen test` runs the
//! detector once per catalogued zone and prints the zones it got wrong.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

use std::{ffi::OsString, io, path::PathBuf, process::ExitCode};

use clap::{error::ErrorKind, Args, CommandFactory, Parser, Subcommand, ValueEnum};
use color_eyre::{eyre::WrapErr, Result};
use dst_rules::{
    catalog, generate_artifact, run_detection, ArtifactFormat, Catalog, ProcessDetector,
    ProcessOracle, Reporter, YearRange, DEFAULT_NAMESPACE,
};
use jiff::Timestamp;
use log::{info, warn};

/// Generate the DST disambiguation ruleset or test the detector against it.
#[derive(Debug, Parser)]
#[command(name = "dst-rulegen", version)]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Query the oracle for every ambiguous zone and write the ruleset.
    Generate(GenerateArgs),
    /// Run the detector once for every catalogued zone.
    Test(TestArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Artifact format: `json` or `module`.
    #[arg(long, default_value_t = ArtifactFormat::Json)]
    format: ArtifactFormat,
    /// Destination file. Defaults to `rules.json` or `dst_rules.js`.
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Field the module form assigns the ruleset to.
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    namespace: String,
    #[arg(long, default_value_t = YearRange::DEFAULT.first())]
    first_year: i32,
    #[arg(long, default_value_t = YearRange::DEFAULT.last())]
    last_year: i32,
    /// Oracle program, invoked as `<oracle> <oracle-arg>... <zone> <year>...`.
    #[arg(long, default_value = "node")]
    oracle: String,
    #[arg(long = "oracle-arg", default_values_t = [String::from("dst.js")], allow_hyphen_values = true)]
    oracle_args: Vec<String>,
}

#[derive(Debug, Args)]
struct TestArgs {
    /// Pass `include-success` to print every zone's output, not only failures.
    #[arg(value_enum)]
    verbosity: Option<Verbosity>,
    /// Run detections concurrently.
    #[arg(long)]
    parallel: bool,
    /// Detector program, invoked as `<detector> <detector-arg>... <zone>`.
    #[arg(long, default_value = "node")]
    detector: String,
    #[arg(long = "detector-arg", default_values_t = [String::from("test.js")], allow_hyphen_values = true)]
    detector_args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Verbosity {
    IncludeSuccess,
}

/// Program entry point.
fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    env_logger::init();

    let args: Vec<OsString> = std::env::args_os().collect();
    let cli = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        // An unknown mode only earns the usage text, not an error status.
        Err(e) if is_unknown_mode(&e, &args) => {
            Cli::command().print_help()?;
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => e.exit(),
    };

    match cli.mode {
        Some(Mode::Generate(args)) => generate(args),
        Some(Mode::Test(args)) => test(args),
        None => {
            Cli::command().print_help()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Whether `e` was raised for the mode argument itself rather than for the
/// arguments of a recognized mode.
fn is_unknown_mode(e: &clap::Error, args: &[OsString]) -> bool {
    match e.kind() {
        ErrorKind::InvalidSubcommand => true,
        ErrorKind::UnknownArgument => args
            .get(1)
            .is_some_and(|mode| Cli::command().find_subcommand(mode).is_none()),
        _ => false,
    }
}

fn generate(args: GenerateArgs) -> Result<ExitCode> {
    let years = YearRange::new(args.first_year, args.last_year)?;
    let oracle = ProcessOracle::new(args.oracle, args.oracle_args);

    info!(
        target: "dst_rulegen",
        "Generating rules for {} zones over {years}",
        catalog::AMBIGUOUS_ZONES.len()
    );
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(args.format.default_file_name()));
    generate_artifact(
        &oracle,
        catalog::AMBIGUOUS_ZONES.iter().copied(),
        years,
        args.format,
        &args.namespace,
        Timestamp::now(),
        &output,
    )
    .wrap_err_with(|| format!("rule generation aborted, `{}` was not written", output.display()))?;

    println!("Written to {}", output.display());
    Ok(ExitCode::SUCCESS)
}

fn test(args: TestArgs) -> Result<ExitCode> {
    let zones: Vec<&str> = catalog::all_zones().map(|(_, zone)| zone).collect();
    let detector = ProcessDetector::new(args.detector, args.detector_args);
    let include_success = args.verbosity == Some(Verbosity::IncludeSuccess);
    let mut reporter = Reporter::new(io::stdout().lock(), include_success);

    for catalog in Catalog::ALL {
        info!(
            target: "dst_rulegen",
            "{} catalog: {} zones",
            catalog.as_str(),
            catalog.zones().len()
        );
    }
    info!(target: "dst_rulegen", "Testing detection of {} zones", zones.len());
    let run = run_detection(&detector, &zones, args.parallel, &mut reporter)
        .wrap_err("could not report detector results")?;

    if run.succeeded() {
        return Ok(ExitCode::SUCCESS);
    }
    warn!(
        target: "dst_rulegen",
        "{} of {} zones failed detection",
        run.failures.len(),
        run.total
    );
    for catalog in Catalog::ALL {
        let failed = run.failures_in(catalog);
        if failed > 0 {
            warn!(target: "dst_rulegen", "{} catalog: {failed} failed", catalog.as_str());
        }
    }
    Ok(ExitCode::FAILURE)
}
