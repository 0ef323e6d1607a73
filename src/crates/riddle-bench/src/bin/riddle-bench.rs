//! riddle-bench CLI
//!
//! Main entry point for running prompting-strategy experiments.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use llm::remote::ClaudeClient;
use riddle_bench::{
    logging, BenchConfig, BenchError, ConfigLoader, ExperimentRunner, Orchestrator, Overrides,
    PromptBuilder, ResultWriter, RetryingCaller, Strategy,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "riddle-bench")]
#[command(about = "Compare prompting strategies on a reasoning riddle", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load only this config file instead of the user and project files
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every strategy for the configured number of iterations
    Run(RunArgs),

    /// Print the opening prompt of each strategy without calling the model
    Prompts {
        /// Strategy to show: raw, cot, rb (repeatable; default all)
        #[arg(short, long = "strategy")]
        strategies: Vec<Strategy>,

        /// Read the task description from this file
        #[arg(long)]
        task_file: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Trials per strategy
    #[arg(short = 'n', long)]
    iterations: Option<u32>,

    /// Strategy to run: raw, cot, rb (repeatable; default all)
    #[arg(short, long = "strategy")]
    strategies: Vec<Strategy>,

    /// Directory for result files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Maximum tasks in flight
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Read the task description from this file
    #[arg(long)]
    task_file: Option<PathBuf>,

    /// Write a JSON batch report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("✗ {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<ExitCode> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::explicit(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load().await.context("loading configuration")?;

    logging::init_logging(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Run(args) => {
            let report_path = args.report.clone();
            config.apply(Overrides {
                iterations: args.iterations,
                strategies: args.strategies,
                output_dir: args.output_dir,
                max_concurrency: args.max_concurrency,
                task_file: args.task_file,
            });
            run(config, report_path).await
        }
        Commands::Prompts {
            strategies,
            task_file,
        } => {
            config.apply(Overrides {
                strategies,
                task_file,
                ..Overrides::default()
            });
            print_prompts(&config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn prompt_builder(config: &BenchConfig) -> Result<PromptBuilder, BenchError> {
    match &config.experiment.task_file {
        Some(path) => PromptBuilder::from_file(path),
        None => Ok(PromptBuilder::default()),
    }
}

async fn run(config: BenchConfig, report_path: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    config.validate()?;

    // Everything that can fail fatally is resolved before the first task starts.
    let prompts = prompt_builder(&config)?;
    let policy = config.retry.to_policy()?;
    let client = ClaudeClient::new(config.remote_llm_config()?)?;

    info!(
        model = client.model(),
        iterations = config.experiment.iterations,
        strategies = ?config.experiment.strategies,
        "Starting experiment"
    );

    let caller = RetryingCaller::new(Arc::new(client), policy);
    let runner = ExperimentRunner::new(caller, prompts);
    let orchestrator = Orchestrator::new(runner, ResultWriter::new(&config.experiment.output_dir))
        .with_max_concurrency(config.experiment.max_concurrency);

    let report = orchestrator
        .run_all(&config.experiment.strategies, config.experiment.iterations)
        .await;

    println!(
        "{} of {} task(s) succeeded; results in {}",
        report.succeeded(),
        report.total(),
        config.experiment.output_dir.display()
    );

    if !report.is_success() {
        eprint!("{}", report.failure_summary());
    }
    Ok(ExitCode::from(report.conclude(report_path.as_deref())))
}

fn print_prompts(config: &BenchConfig) -> anyhow::Result<()> {
    let prompts = prompt_builder(config)?;

    for strategy in &config.experiment.strategies {
        println!("=== {} ({} call(s)) ===", strategy, strategy.turns());
        for message in prompts.opening(*strategy) {
            println!("[{}]", message.role);
            println!("{}", message.content);
        }
        println!();
    }
    Ok(())
}
