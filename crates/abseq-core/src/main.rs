//! abseq CLI entry point.
//!
//! Sequential A/B testing over hourly engagement counts: build per-trial
//! sequences, run the conditional SPRT, print the decision as JSON.

use std::path::PathBuf;

use abseq_common::{Arm, Error};
use abseq_config::{load_params, LoadOptions, ParamOverrides, ResolvedParams, TestParams};
use abseq_core::aggregate::{aggregate_hourly, read_bucket_file, read_impressions};
use abseq_core::exit_codes::ExitCode;
use abseq_core::logging::config::ENV_LOG_LEVEL;
use abseq_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogFormat, LogLevel, Stage,
};
use abseq_core::sequence::{rng_from_seed, SequenceBuilder};
use abseq_core::sprt::{SprtEngine, WaldBoundaries};
use abseq_core::TracingSink;
use abseq_math::descriptive::ProportionSummary;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

/// Sequential A/B testing with Meeker's conditional SPRT
#[derive(Parser, Debug)]
#[command(name = "abseq")]
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
    /// Parameter file (default: ABSEQ_PARAMS, ABSEQ_CONFIG_DIR, then XDG config)
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error, off
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format on stderr: human or jsonl
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    quiet: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build both trial sequences and run the sequential test
    Run(RunArgs),
    /// Print one arm's reconstructed trial sequence
    Sequence(SequenceArgs),
    /// Print the Wald boundaries for a pair of error rates
    Bounds(BoundsArgs),
    /// Fixed-sample descriptive statistics for two proportions
    Describe(DescribeArgs),
    /// Inspect the effective parameters
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// JSON bucket file: {"treatment": [...], "control": [...]}
    #[arg(long, required_unless_present = "impressions", conflicts_with = "impressions")]
    buckets: Option<PathBuf>,

    /// Impression CSV, aggregated per hour before testing
    #[arg(long)]
    impressions: Option<PathBuf>,

    /// Odds ratio under the alternative hypothesis
    #[arg(long)]
    odds_ratio: Option<f64>,

    /// Type I error bound
    #[arg(long)]
    alpha: Option<f64>,

    /// Type II error bound
    #[arg(long)]
    beta: Option<f64>,

    /// Force a decision after this many paired observations
    #[arg(long)]
    truncate: Option<usize>,

    /// Seed for the intra-bucket shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Omit the per-step traces from the output
    #[arg(long)]
    no_trace: bool,
}

#[derive(Args, Debug)]
struct SequenceArgs {
    /// JSON bucket file
    #[arg(long)]
    buckets: PathBuf,

    /// Arm to reconstruct: treatment or control
    #[arg(long)]
    arm: Arm,

    /// Seed for the intra-bucket shuffle
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct BoundsArgs {
    #[arg(long, default_value_t = 0.05)]
    alpha: f64,

    #[arg(long, default_value_t = 0.10)]
    beta: f64,
}

#[derive(Args, Debug)]
struct DescribeArgs {
    /// Significance level for the z-score
    #[arg(long, default_value_t = 0.05)]
    alpha: f64,

    /// Pooled success proportion
    #[arg(long)]
    p: f64,

    /// Control group size
    #[arg(long)]
    control_total: f64,

    /// Exposed group size
    #[arg(long)]
    exposed_total: f64,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Print the resolved parameters and where they came from
    Show,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                ExitCode::ArgsError.as_i32()
            } else {
                0
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    let explicit_level = cli.global.log_level.is_some()
        || cli.global.verbose > 0
        || cli.global.quiet > 0
        || std::env::var_os(ENV_LOG_LEVEL).is_some();
    let log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format)
        .with_verbosity(cli.global.verbose, cli.global.quiet);
    init_logging(&log_config, explicit_level);

    let run_id = generate_run_id();
    tracing::debug!(
        event = event_names::RUN_STARTED,
        run_id = %run_id,
        stage = %Stage::Init,
        command = command_name(&cli.command),
        "starting"
    );

    let outcome = match &cli.command {
        Commands::Run(args) => run_test(&cli.global, args, &run_id),
        Commands::Sequence(args) => run_sequence(args, &run_id),
        Commands::Bounds(args) => run_bounds(args),
        Commands::Describe(args) => run_describe(args),
        Commands::Config(args) => match args.command {
            ConfigCommands::Show => run_config_show(&cli.global),
        },
    };

    let exit_code = match outcome {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(
                event = event_names::INTERNAL_ERROR,
                run_id = %run_id,
                code = err.code(),
                category = %err.category(),
                "{}",
                err
            );
            eprintln!("Error [{}]: {}", err.headline(), err);
            eprintln!("  hint: {}", err.remediation());
            ExitCode::from_error(&err)
        }
    };

    tracing::debug!(
        event = event_names::RUN_FINISHED,
        run_id = %run_id,
        exit_code = exit_code.as_i32(),
        "finished"
    );
    std::process::exit(exit_code.as_i32());
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Run(_) => "run",
        Commands::Sequence(_) => "sequence",
        Commands::Bounds(_) => "bounds",
        Commands::Describe(_) => "describe",
        Commands::Config(_) => "config",
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn resolve(global: &GlobalOpts, overrides: ParamOverrides) -> Result<ResolvedParams, Error> {
    let resolved = load_params(&LoadOptions {
        params_path: global.params.clone(),
        overrides,
    })?;
    tracing::debug!(
        event = event_names::CONFIG_LOADED,
        stage = %Stage::Init,
        source = %resolved.source,
        path = ?resolved.path,
        hash = %resolved.snapshot.effective_hash,
        "parameters resolved"
    );
    Ok(resolved)
}

fn run_test(global: &GlobalOpts, args: &RunArgs, run_id: &str) -> Result<ExitCode, Error> {
    let resolved = resolve(
        global,
        ParamOverrides {
            odds_ratio: args.odds_ratio,
            alpha: args.alpha,
            beta: args.beta,
            truncation_point: args.truncate,
            seed: args.seed,
        },
    )?;

    let buckets = match (&args.buckets, &args.impressions) {
        (Some(path), _) => read_bucket_file(path)?,
        (None, Some(path)) => aggregate_hourly(&read_impressions(path)?)?,
        (None, None) => {
            return Err(Error::Input(
                "one of --buckets or --impressions is required".to_string(),
            ))
        }
    };
    tracing::info!(
        event = event_names::INPUT_LOADED,
        run_id = %run_id,
        stage = %Stage::Load,
        treatment_buckets = buckets.treatment.len(),
        control_buckets = buckets.control.len(),
        "input loaded"
    );

    let sink = TracingSink::new(run_id);
    let mut rng = rng_from_seed(resolved.params.seed);
    let sequences = SequenceBuilder::new()
        .with_sink(&sink)
        .build_arms(&buckets, &mut rng)?;

    tracing::info!(
        event = event_names::SPRT_STARTED,
        run_id = %run_id,
        stage = %Stage::Test,
        treatment = sequences.treatment.len(),
        control = sequences.control.len(),
        odds_ratio = resolved.params.odds_ratio,
        "running sequential test"
    );
    let result = SprtEngine::new(resolved.params.clone())
        .with_sink(&sink)
        .run(sequences.treatment.as_slice(), sequences.control.as_slice())?;

    let exit_code = ExitCode::from_outcome(result.outcome);
    let summary = result.outcome.summary();
    let result = if args.no_trace {
        result.without_traces()
    } else {
        result
    };

    print_json(&json!({
        "run_id": run_id,
        "summary": summary,
        "params": resolved.snapshot,
        "sequences": {
            "treatment": {
                "length": sequences.treatment.len(),
                "successes": sequences.treatment.successes(),
            },
            "control": {
                "length": sequences.control.len(),
                "successes": sequences.control.successes(),
            },
        },
        "result": result,
    }))?;
    Ok(exit_code)
}

fn run_sequence(args: &SequenceArgs, run_id: &str) -> Result<ExitCode, Error> {
    let buckets = read_bucket_file(&args.buckets)?;
    let sink = TracingSink::new(run_id);
    let mut rng = rng_from_seed(args.seed);
    let sequence = SequenceBuilder::new()
        .with_sink(&sink)
        .build(buckets.arm(args.arm), &mut rng)?;

    print_json(&json!({
        "arm": args.arm,
        "length": sequence.len(),
        "successes": sequence.successes(),
        "sequence": sequence,
    }))?;
    Ok(ExitCode::Conclusive)
}

fn run_bounds(args: &BoundsArgs) -> Result<ExitCode, Error> {
    abseq_config::validate::validate_params(&TestParams::new(2.0, args.alpha, args.beta))?;
    let boundaries = WaldBoundaries::from_error_rates(args.alpha, args.beta);
    print_json(&json!({
        "alpha": args.alpha,
        "beta": args.beta,
        "l": boundaries.l,
        "u": boundaries.u,
    }))?;
    Ok(ExitCode::Conclusive)
}

fn run_describe(args: &DescribeArgs) -> Result<ExitCode, Error> {
    if !(args.alpha > 0.0 && args.alpha < 1.0) {
        return Err(invalid("alpha", "must be in (0, 1)"));
    }
    if !(0.0..=1.0).contains(&args.p) {
        return Err(invalid("p", "must be in [0, 1]"));
    }
    if !(args.control_total > 0.0 && args.exposed_total > 0.0) {
        return Err(invalid("control_total/exposed_total", "must be positive"));
    }
    let summary =
        ProportionSummary::compute(args.alpha, args.p, args.control_total, args.exposed_total);
    print_json(&summary)?;
    Ok(ExitCode::Conclusive)
}

fn run_config_show(global: &GlobalOpts) -> Result<ExitCode, Error> {
    let resolved = resolve(global, ParamOverrides::default())?;
    print_json(&json!({
        "source": resolved.source,
        "path": resolved.path,
        "params": resolved.params,
        "warnings": resolved.warnings,
        "effective_hash": resolved.snapshot.effective_hash,
    }))?;
    Ok(ExitCode::Conclusive)
}

fn invalid(field: &str, message: &str) -> Error {
    Error::InvalidParameter {
        field: field.to_string(),
        message: message.to_string(),
    }
}
