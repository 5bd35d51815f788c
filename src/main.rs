//! stylesim CLI entry point.
//!
//! Provides `run`, `stats`, and `prompt` subcommands for generating
//! preference-conditioned records, inspecting a dataset, or printing the
//! prompts for one document without calling a model.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use stylesim::config::{parse_optional_model, Config, ModelsConfig};
use stylesim::credentials::load_or_env;
use stylesim::dataset::{catalog, ExampleLoader, SourceLoader};
use stylesim::driver::{RunDriver, RunReport, Stages};
use stylesim::pipeline::{ModelCaller, ProviderCaller};
use stylesim::preferences::PreferenceRegistry;
use stylesim::providers::router::ModelRouter;
use stylesim::task::{Task, TaskKind, TaskStrategy};

/// stylesim: preference-conditioned prompt and record generation.
#[derive(Parser)]
#[command(name = "stylesim", version, about)]
struct Cli {
    /// Config file (default: `$STYLESIM_CONFIG`, then `./stylesim.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Credentials file read when present.
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Generate records for every configured task and dataset.
    Run {
        /// Test mode: process only this many examples per dataset.
        #[arg(long)]
        test_samples: Option<usize>,
        /// Base model spec (`<provider>/<model>`, or `none`).
        #[arg(long)]
        base_model: Option<String>,
        /// Edit model spec (`<provider>/<model>`).
        #[arg(long)]
        edit_model: Option<String>,
        /// Skip the base stage and call the edit model once per example.
        #[arg(long)]
        single_stage: bool,
        /// Directory receiving record files.
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Local JSONL file used instead of fetching datasets.
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Show statistics for a dataset after user assignment.
    Stats {
        /// Dataset name.
        #[arg(long)]
        dataset: String,
        /// Task the dataset belongs to.
        #[arg(long, default_value = "summarization")]
        task: String,
        /// Number of documents to load.
        #[arg(long)]
        samples: Option<usize>,
        /// Local JSONL file used instead of fetching the dataset.
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Print the direct and base prompts for one document.
    Prompt {
        /// Task name.
        #[arg(long)]
        task: String,
        /// Dataset name.
        #[arg(long)]
        dataset: String,
        /// User id from the preference registry.
        #[arg(long)]
        user: String,
        /// Document text.
        #[arg(long, conflicts_with = "input", required_unless_present = "input")]
        text: Option<String>,
        /// File holding the document text.
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            test_samples,
            base_model,
            edit_model,
            single_stage,
            output_dir,
            input,
        } => {
            let mut config = Config::load(cli.config.as_deref())?;
            if let Some(spec) = base_model {
                config.models.base = parse_optional_model(&spec);
            }
            if single_stage {
                config.models.base = None;
            }
            if let Some(spec) = edit_model {
                config.models.edit = spec;
            }
            if let Some(dir) = output_dir {
                config.run.output_dir = dir;
            }
            handle_run(config, &cli.env_file, test_samples, input).await
        }
        Command::Stats {
            dataset,
            task,
            samples,
            input,
        } => {
            stylesim::logging::init_cli();
            let config = Config::load(cli.config.as_deref())?;
            handle_stats(&config, &task, &dataset, samples, input).await
        }
        Command::Prompt {
            task,
            dataset,
            user,
            text,
            input,
        } => {
            stylesim::logging::init_cli();
            let config = Config::load(cli.config.as_deref())?;
            let document = match (text, input) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                (None, None) => anyhow::bail!("either --text or --input is required"),
            };
            handle_prompt(&config, &task, &dataset, &user, &document)
        }
    }
}

fn build_registry(config: &Config) -> anyhow::Result<Arc<PreferenceRegistry>> {
    let registry = PreferenceRegistry::builtin()
        .with_overrides(&config.preferences)
        .context("invalid [preferences] config")?;
    Ok(Arc::new(registry))
}

fn build_caller(
    router: &mut ModelRouter,
    spec: &str,
    stage: &'static str,
    models: &ModelsConfig,
) -> anyhow::Result<Arc<dyn ModelCaller>> {
    let provider = router
        .resolve(spec)
        .with_context(|| format!("failed to load model '{spec}'"))?;
    Ok(Arc::new(
        ProviderCaller::new(provider)
            .with_max_tokens(models.max_tokens)
            .with_temperature(models.temperature)
            .with_stage(stage),
    ))
}

/// Generate records for every configured task and dataset.
async fn handle_run(
    config: Config,
    env_file: &Path,
    test_samples: Option<usize>,
    input: Option<PathBuf>,
) -> anyhow::Result<()> {
    let _logging_guard = stylesim::logging::init_run(&config.run.logs_dir)?;

    let credentials = load_or_env(env_file)
        .with_context(|| format!("failed to load {}", env_file.display()))?;
    let registry = build_registry(&config)?;
    let plan = config.task_plan().context("invalid [tasks] config")?;

    let mut router = ModelRouter::new(config.providers.clone(), credentials);
    let edit = build_caller(&mut router, &config.models.edit, "edit", &config.models)?;
    let stages = match &config.models.base {
        Some(spec) => Stages::Two {
            base: build_caller(&mut router, spec, "base", &config.models)?,
            edit,
        },
        None => Stages::Single { model: edit },
    };

    let samples = test_samples.unwrap_or(config.run.num_examples);
    info!(
        base = config.models.base.as_deref().unwrap_or("none"),
        edit = %config.models.edit,
        samples,
        test_mode = test_samples.is_some(),
        models = ?router.available_specs(),
        "starting run"
    );

    let loader = SourceLoader::new(Arc::clone(&registry), samples, config.run.num_users)
        .with_split(config.run.split.clone())
        .with_hub_url(config.providers.datasets_server_url.clone())
        .with_input(input);
    let driver = RunDriver::new(registry, stages, &config.run.output_dir, samples);
    let report = driver.run(&plan, &loader).await;

    print_report(&report);
    if report.total_records() == 0 && !report.datasets.is_empty() {
        anyhow::bail!("run produced no records");
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    for dataset in &report.datasets {
        match (&dataset.output, &dataset.error) {
            (Some(path), _) => println!(
                "{}/{}: {} records, {} failed -> {}",
                dataset.task,
                dataset.dataset,
                dataset.records,
                dataset.failures.len(),
                path.display()
            ),
            (None, Some(error)) => {
                println!("{}/{}: skipped ({error})", dataset.task, dataset.dataset);
            }
            (None, None) => println!(
                "{}/{}: no records, {} failed",
                dataset.task,
                dataset.dataset,
                dataset.failures.len()
            ),
        }
        for failure in &dataset.failures {
            println!("  {} ({}): {}", failure.example_id, failure.user_id, failure.error);
        }
    }
    println!(
        "Total: {} records, {} failed examples",
        report.total_records(),
        report.total_failures()
    );
}

/// Load a dataset, assign users, and print statistics.
async fn handle_stats(
    config: &Config,
    task: &str,
    dataset: &str,
    samples: Option<usize>,
    input: Option<PathBuf>,
) -> anyhow::Result<()> {
    let kind: TaskKind = task.parse()?;
    if input.is_none() && catalog::lookup(kind, dataset).is_none() {
        let known: Vec<&str> = catalog::datasets_for(kind).map(|spec| spec.name).collect();
        anyhow::bail!(
            "unknown dataset '{dataset}' for task '{kind}' (known: {})",
            known.join(", ")
        );
    }

    let registry = build_registry(config)?;
    let loader = SourceLoader::new(
        registry,
        samples.unwrap_or(config.run.num_examples),
        config.run.num_users,
    )
    .with_split(config.run.split.clone())
    .with_hub_url(config.providers.datasets_server_url.clone())
    .with_input(input);

    let examples = loader.load(kind, dataset).await?;
    print!("{}", examples.stats());
    Ok(())
}

/// Print the prompts `run` would send for one document.
fn handle_prompt(
    config: &Config,
    task: &str,
    dataset: &str,
    user: &str,
    document: &str,
) -> anyhow::Result<()> {
    let kind: TaskKind = task.parse()?;
    let registry = build_registry(config)?;
    let intents = registry.intents_for(user)?.clone();
    let strategy = TaskStrategy::build(kind, dataset, registry)?;

    println!("=== direct prompt ({user}) ===");
    println!("{}", strategy.direct_prompt(document, Some(&intents), dataset));
    println!();
    println!("=== base prompt ===");
    println!("{}", strategy.base_prompt(document, dataset));
    Ok(())
}
