//! testbandit - Bayesian A/B and bandit testing from the command line
//!
//! Subcommands:
//! - `demo`: two-phase walk-through over a built-in three-variation test
//! - `evaluate`: probability of each variation being best
//! - `next`: Thompson pick of the variation to serve next
//! - `check`: validate an experiment file

use std::fmt;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tb_config::{load_config, resolve_config_path, ExperimentConfig};
use tb_core::exit_codes::ExitCode;
use tb_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use tb_core::output::OutputFormat;
use tb_core::{Error, Experiment, ExperimentReport, Result, VariationSummary};
use tracing::{debug, info};

/// Second batch of the demo walk-through: (successes, trials) for A, B, C.
const DEMO_SECOND_BATCH: [(u64, u64); 3] = [(52, 100), (64, 100), (43, 100)];

/// Bayesian A/B and multi-armed-bandit testing over Bernoulli trials
#[derive(Parser)]
#[command(name = "testbandit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "human")]
    format: OutputFormat,

    /// Log level for testbandit events on stderr
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    /// Log format on stderr
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through a built-in three-variation experiment in two phases
    Demo(DemoArgs),

    /// Estimate each variation's probability of being best
    Evaluate(EvaluateArgs),

    /// Pick the next variation to serve by Thompson Sampling
    Next(NextArgs),

    /// Validate an experiment file without sampling
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct DemoArgs {
    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Monte Carlo rounds for each winner estimate
    #[arg(long)]
    samples: Option<usize>,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Experiment file (TOML or JSON)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Monte Carlo rounds (overrides the file)
    #[arg(long)]
    samples: Option<usize>,

    /// Seed for reproducible sampling (overrides the file)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct NextArgs {
    /// Experiment file (TOML or JSON)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Thompson rounds; more than one takes a majority vote
    #[arg(long)]
    rounds: Option<usize>,

    /// Seed for reproducible sampling (overrides the file)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Experiment file (TOML or JSON)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format);
    init_logging(&log_config);

    let result = match &cli.command {
        Commands::Demo(args) => run_demo(&cli.global, args),
        Commands::Evaluate(args) => run_evaluate(&cli.global, args),
        Commands::Next(args) => run_next(&cli.global, args),
        Commands::Check(args) => run_check(&cli.global, args),
    };

    let exit_code = match result {
        Ok(()) => ExitCode::Ok,
        Err(err) => output_error(&cli.global, &err),
    };
    exit_code.into()
}

// ============================================================================
// Command implementations
// ============================================================================

/// Payload of `testbandit demo`.
#[derive(Serialize)]
struct DemoOutput {
    first_round: ExperimentReport,
    next_variation: String,
    second_round: ExperimentReport,
    winner: Option<VariationSummary>,
}

impl fmt::Display for DemoOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Phase 1: 10 trials per variation")?;
        writeln!(f, "{}", self.first_round)?;
        writeln!(f)?;
        writeln!(f, "Next variation to serve: {}", self.next_variation)?;
        writeln!(f)?;
        writeln!(f, "Phase 2: 100 more trials per variation")?;
        writeln!(f, "{}", self.second_round)?;
        if let Some(winner) = &self.winner {
            writeln!(f)?;
            write!(f, "{}", winner)?;
        }
        Ok(())
    }
}

fn run_demo(global: &GlobalOpts, args: &DemoArgs) -> Result<()> {
    let mut config = ExperimentConfig::builtin_demo();
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    let samples = args.samples.unwrap_or(config.sample_count);

    let mut experiment = Experiment::from_config(&config)?;
    experiment.compute_winner(samples)?;
    let first_round = experiment.report();

    let next_variation = experiment.thompson_sample(1)?.name().to_string();

    for (index, (successes, trials)) in DEMO_SECOND_BATCH.into_iter().enumerate() {
        experiment.record_trials(index, successes, trials)?;
    }
    experiment.compute_winner(samples)?;

    let output = DemoOutput {
        first_round,
        next_variation,
        second_round: experiment.report(),
        winner: experiment.winning_variation().map(|v| v.summary()),
    };
    emit(global, &output)
}

fn load_experiment(
    path: Option<&PathBuf>,
    seed: Option<u64>,
) -> Result<(ExperimentConfig, Experiment)> {
    let (mut config, source) = load_config(path.map(PathBuf::as_path))?;
    info!(source = %source, variations = config.variations.len(), "experiment loaded");
    if seed.is_some() {
        config.seed = seed;
    }
    let experiment = Experiment::from_config(&config)?;
    Ok((config, experiment))
}

fn run_evaluate(global: &GlobalOpts, args: &EvaluateArgs) -> Result<()> {
    let (config, mut experiment) = load_experiment(args.config.as_ref(), args.seed)?;
    let samples = args.samples.unwrap_or(config.sample_count);
    experiment.compute_winner(samples)?;
    emit(global, &experiment.report())
}

/// Payload of `testbandit next`.
#[derive(Serialize)]
struct NextOutput {
    variation: String,
    index: usize,
    rounds: usize,
}

impl fmt::Display for NextOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Next variation to serve: {}", self.variation)
    }
}

fn run_next(global: &GlobalOpts, args: &NextArgs) -> Result<()> {
    let (config, mut experiment) = load_experiment(args.config.as_ref(), args.seed)?;
    let rounds = args.rounds.unwrap_or(config.thompson_rounds);
    let index = experiment.thompson_sample_index(rounds)?;
    let variation = experiment
        .variation(index)
        .map(|v| v.name().to_string())
        .ok_or_else(|| Error::Sampling(format!("selected index {} out of range", index)))?;
    emit(
        global,
        &NextOutput {
            variation,
            index,
            rounds,
        },
    )
}

/// Payload of `testbandit check`.
#[derive(Serialize)]
struct CheckOutput {
    valid: bool,
    source: String,
    path: Option<PathBuf>,
    schema_version: String,
    variations: Vec<String>,
    sample_count: usize,
    thompson_rounds: usize,
}

impl fmt::Display for CheckOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => writeln!(f, "✓ {} ({})", path.display(), self.source)?,
            None => writeln!(f, "✓ built-in demo experiment")?,
        }
        writeln!(f, "  Variations:      {}", self.variations.join(", "))?;
        writeln!(f, "  Sample count:    {}", self.sample_count)?;
        write!(f, "  Thompson rounds: {}", self.thompson_rounds)
    }
}

fn run_check(global: &GlobalOpts, args: &CheckArgs) -> Result<()> {
    let resolved = resolve_config_path(args.config.as_deref());
    let (config, _) = load_config(resolved.path.as_deref())?;
    let source = resolved.source;
    debug!(source = %source, "experiment file is valid");
    emit(
        global,
        &CheckOutput {
            valid: true,
            source: source.to_string(),
            path: resolved.path,
            schema_version: config.schema_version,
            variations: config.variations.into_iter().map(|v| v.name).collect(),
            sample_count: config.sample_count,
            thompson_rounds: config.thompson_rounds,
        },
    )
}

// ============================================================================
// Output helpers
// ============================================================================

/// Print a command payload on stdout in the selected format.
fn emit<T: Serialize + fmt::Display>(global: &GlobalOpts, payload: &T) -> Result<()> {
    match global.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(payload)?),
        OutputFormat::Human => println!("{}", payload),
    }
    Ok(())
}

fn output_error(global: &GlobalOpts, error: &Error) -> ExitCode {
    let exit_code = ExitCode::from(error);
    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "error": error.report(),
                "exit_code": exit_code.as_i32(),
                "exit_code_name": exit_code.code_name(),
            });
            eprintln!("{}", response);
        }
        OutputFormat::Human => eprintln!("{}", error.format_human()),
    }
    exit_code
}
