use std::ffi::OsString;
use std::io::Write;
use std::str::FromStr;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, Parser};
use log::{debug, LevelFilter};

use crate::error::GridSirError;
use crate::execution_stats::{
    log_execution_statistics, write_execution_statistics, ExecutionProfilingCollector,
};
use crate::log::{apply_log_spec, LogSpec};
use crate::parameters::{Parameters, DEFAULT_SEED};
use crate::simulation::Simulation;
use crate::summary::{ConsoleReporter, Reporter, Summary, SummaryFormat};

/// Command line arguments for the grid SIR runner
#[derive(Parser, Debug)]
#[command(
    name = "gridsir",
    version,
    about = "Simulates S→I→R spread among hosts walking on a toroidal grid"
)]
pub struct Args {
    /// Coordinate bound: positions range over [-k, k]
    #[arg(allow_negative_numbers = true)]
    pub k: i64,

    /// Number of hosts
    #[arg(allow_negative_numbers = true)]
    pub m: i64,

    /// Rounds a host stays infected
    #[arg(value_name = "T", allow_negative_numbers = true)]
    pub t: i64,

    /// Number of spatial hash buckets
    #[arg(value_name = "N", allow_negative_numbers = true)]
    pub n: i64,

    /// Random seed
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub random_seed: u64,

    /// Enable logging: a level, or a comma separated list of `module=level` entries
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write one JSON object per round instead of the text table
    #[arg(long)]
    pub json: bool,

    /// Do not print execution statistics at the end of the run
    #[arg(long)]
    pub no_stats: bool,
}

/// What the command line asked for.
#[derive(Debug)]
pub enum Invocation {
    Run(Box<Args>),
    /// The positional arguments were missing or extra; print usage and stop.
    Usage,
}

/// Parses command line arguments. A wrong number of positional arguments is not an error.
///
/// # Errors
/// Returns the `clap::Error` for anything else clap rejects, including unknown flags,
/// `--help` and `--version`, which the caller should hand to `clap::Error::exit`.
pub fn parse_args<I, T>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(args) {
        Ok(args) => Ok(Invocation::Run(Box::new(args))),
        Err(e) if is_wrong_arity(&e) => Ok(Invocation::Usage),
        Err(e) => Err(e),
    }
}

/// A missing positional, or an extra token that is not a flag.
fn is_wrong_arity(error: &clap::Error) -> bool {
    match error.kind() {
        ErrorKind::MissingRequiredArgument => true,
        ErrorKind::UnknownArgument => match error.get(ContextKind::InvalidArg) {
            Some(ContextValue::String(arg)) => {
                !arg.starts_with('-') || arg.parse::<i64>().is_ok()
            }
            _ => false,
        },
        _ => false,
    }
}

#[must_use]
pub fn usage() -> String {
    Args::command().render_usage().to_string()
}

fn verbosity_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Off,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the logging configuration requested by `--log-level` and `-v`.
///
/// # Errors
/// Returns `GridSirError::LogError` if `--log-level` cannot be parsed.
pub fn configure_logging(args: &Args) -> Result<(), GridSirError> {
    let mut spec = match &args.log_level {
        Some(log_level) => LogSpec::from_str(log_level)?,
        None => LogSpec::default(),
    };
    if args.verbose > 0 {
        let level = verbosity_level(args.verbose);
        spec.global = Some(spec.global.map_or(level, |global| global.max(level)));
    }
    if spec.global.is_some() || !spec.modules.is_empty() {
        apply_log_spec(&spec);
    }
    Ok(())
}

/// Passes summaries through to `inner` while polling execution statistics.
struct ProfilingReporter<'a, R> {
    inner: R,
    collector: Option<&'a mut ExecutionProfilingCollector>,
}

impl<R: Reporter> Reporter for ProfilingReporter<'_, R> {
    fn report(&mut self, summary: &Summary) -> Result<(), GridSirError> {
        if let Some(collector) = self.collector.as_deref_mut() {
            collector.refresh();
        }
        self.inner.report(summary)
    }
}

/// Runs a complete simulation for `args`, writing summaries to `out` and execution statistics
/// to `err`. Returns the final round's summary.
///
/// # Errors
/// Returns an error if logging cannot be configured, a parameter is out of range, or writing
/// to `out` or `err` fails. No round is executed when the parameters are invalid.
pub fn run_with_args<O: Write, E: Write>(
    args: &Args,
    out: O,
    mut err: E,
) -> Result<Summary, GridSirError> {
    configure_logging(args)?;
    let parameters = Parameters::new(args.k, args.m, args.t, args.n)?.with_seed(args.random_seed);
    debug!("parsed arguments: {args:?}");

    let mut collector = (!args.no_stats).then(ExecutionProfilingCollector::new);
    let format = if args.json {
        SummaryFormat::Json
    } else {
        SummaryFormat::Text
    };
    let reporter = ProfilingReporter {
        inner: ConsoleReporter::new(out, format),
        collector: collector.as_mut(),
    };

    let mut simulation = Simulation::new(parameters);
    let summary = simulation.run(reporter)?;

    if let Some(collector) = collector.as_mut() {
        let stats = collector.compute_final_statistics(parameters.population, summary.round);
        log_execution_statistics(&stats);
        write_execution_statistics(&mut err, &stats)?;
    }
    Ok(summary)
}
