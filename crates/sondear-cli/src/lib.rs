//! Sondeador: command-line driver for the Sondear fuzzing engine.
//!
//! ## Usage
//!
//! ```bash
//! sondeador --unit MenuParser --namespace menu --timeout 30
//! sondeador -c MenuParser -p menu -t 10 --seed 42 --quiet
//! ```
//!
//! The driver resolves the named unit in the demo registry, fuzzes it
//! under a wall-clock timeout, writes the generated regression tests, and
//! emits console/XML/HTML/JSON coverage reports into the report
//! directory.

pub mod demo;
mod error;

pub use error::{CliError, CliResult};

use clap::Parser;
use sondear::coverage::formatters::{HtmlFormatter, XmlFormatter};
use sondear::coverage::render_console;
use sondear::testgen::TestFileWriter;
use sondear::{
    CoverageContext, CoverageSummary, FuzzingEngine, RenderProfile, Seed, TimeoutCondition,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

/// Command-line options.
#[derive(Debug, Parser)]
#[command(
    name = "sondeador",
    version,
    about = "Coverage-guided fuzzing with regression-test synthesis"
)]
pub struct Cli {
    /// Name of the unit to fuzz.
    #[arg(short = 'c', long = "unit")]
    pub unit: String,

    /// Namespace that contains the unit to fuzz.
    #[arg(short = 'p', long = "namespace")]
    pub namespace: String,

    /// Timeout in seconds for the fuzzing run.
    #[arg(short = 't', long, default_value = "10", value_parser = parse_timeout, allow_hyphen_values = true)]
    pub timeout: u64,

    /// Do not print the coverage table.
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Session seed; derived from the clock when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory for generated tests and coverage artifacts.
    #[arg(long, default_value = "fuzzing-report")]
    pub report_dir: PathBuf,
}

fn parse_timeout(text: &str) -> Result<u64, String> {
    let seconds: i64 = text
        .parse()
        .map_err(|_| "timeout must be an integer number of seconds".to_string())?;
    if seconds < 0 {
        return Err("timeout must be a non-negative number of seconds".to_string());
    }
    Ok(seconds as u64)
}

/// Run one fuzzing session for the configured target.
pub fn run(cli: &Cli) -> CliResult<()> {
    init_tracing(cli.quiet);

    let context = CoverageContext::new();
    let registry = demo::registry(&context);
    let unit = registry
        .resolve(&cli.namespace, &cli.unit)
        .map_err(|source| {
            error!(%source, available = ?registry.unit_names(), "cannot resolve target");
            CliError::from(source)
        })?;

    let seed = cli.seed.unwrap_or_else(clock_seed);
    info!(
        unit = %unit.qualified_name(),
        seed,
        timeout_secs = cli.timeout,
        "starting fuzzing session"
    );

    let mut engine = FuzzingEngine::new(
        Box::new(TimeoutCondition::new(Duration::from_secs(cli.timeout))),
        context.clone(),
        Seed::from_u64(seed),
    );
    engine.fuzz_unit(&unit);

    let result = engine
        .take_unit_result()
        .expect("a finished unit session always packages a result");

    let writer = TestFileWriter::default()
        .with_report_dir(&cli.report_dir)
        .with_profile(RenderProfile::new("registry()"));
    let test_path = writer.write_unit_tests(&result)?;
    info!(
        path = %test_path.display(),
        tests = result.results().len(),
        coverage = engine.current_coverage(),
        "wrote generated tests"
    );

    write_coverage_reports(&context, cli)?;
    Ok(())
}

fn write_coverage_reports(context: &CoverageContext, cli: &Cli) -> CliResult<()> {
    let snapshot = context.snapshot();

    if !cli.quiet {
        print!("{}", render_console(&snapshot));
    }

    std::fs::create_dir_all(&cli.report_dir)?;
    std::fs::write(
        cli.report_dir.join("coverage.xml"),
        XmlFormatter::new(&snapshot).generate(),
    )?;
    std::fs::write(
        cli.report_dir.join("index.html"),
        HtmlFormatter::new(&snapshot)
            .with_title(format!("Fuzzing coverage: {}::{}", cli.namespace, cli.unit))
            .generate(),
    )?;
    let summary = CoverageSummary::from_map(&snapshot);
    std::fs::write(
        cli.report_dir.join("coverage.json"),
        serde_json::to_string_pretty(&summary)?,
    )?;
    Ok(())
}

fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(1)
}

fn init_tracing(quiet: bool) {
    use tracing_subscriber::EnvFilter;
    let default = if quiet { "warn" } else { "debug" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
