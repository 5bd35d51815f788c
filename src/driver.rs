//! Run driver: every configured task and dataset, one example at a time.
//!
//! Per-example failures become [`ExampleFailure`]s in the report and the
//! batch moves on. A dataset that cannot be loaded or has no strategy is
//! reported once and skipped.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::dataset::{Example, ExampleLoader, ExampleSet};
use crate::error::PipelineError;
use crate::pipeline::{IntentHandler, ModelCaller};
use crate::preferences::PreferenceRegistry;
use crate::record::{record_filename, write_records, PromptRecord};
use crate::task::TaskKind;

/// Which pipeline to run.
#[derive(Clone)]
pub enum Stages {
    /// One call per example with the direct prompt.
    Single {
        /// The only model.
        model: Arc<dyn ModelCaller>,
    },
    /// Guideline-only base pass, then a preference-conditioned edit.
    Two {
        /// First-stage model.
        base: Arc<dyn ModelCaller>,
        /// Second-stage model.
        edit: Arc<dyn ModelCaller>,
    },
}

impl Stages {
    /// Model producing the final output.
    pub fn final_model(&self) -> &Arc<dyn ModelCaller> {
        match self {
            Self::Single { model } => model,
            Self::Two { edit, .. } => edit,
        }
    }
}

/// A single example that did not produce a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleFailure {
    /// Example id.
    pub example_id: String,
    /// Assigned user.
    pub user_id: String,
    /// Rendered error.
    pub error: String,
    /// Whether the failure was a configuration error rather than a model call.
    pub config: bool,
}

/// Result of processing one example.
pub type ExampleOutcome = Result<PromptRecord, ExampleFailure>;

/// Outcome of one `(task, dataset)` pair.
#[derive(Debug, Clone)]
pub struct DatasetReport {
    /// Task name.
    pub task: TaskKind,
    /// Dataset name.
    pub dataset: String,
    /// Examples attempted.
    pub attempted: usize,
    /// Records written.
    pub records: usize,
    /// Examples that failed.
    pub failures: Vec<ExampleFailure>,
    /// File the records were written to.
    pub output: Option<PathBuf>,
    /// Dataset-level error that prevented processing.
    pub error: Option<String>,
}

impl DatasetReport {
    fn new(task: TaskKind, dataset: &str) -> Self {
        Self {
            task,
            dataset: dataset.to_owned(),
            attempted: 0,
            records: 0,
            failures: Vec::new(),
            output: None,
            error: None,
        }
    }

    fn aborted(task: TaskKind, dataset: &str, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(task, dataset)
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// One entry per `(task, dataset)` pair, in processing order.
    pub datasets: Vec<DatasetReport>,
}

impl RunReport {
    /// Records written across all datasets.
    pub fn total_records(&self) -> usize {
        self.datasets
            .iter()
            .fold(0_usize, |acc, d| acc.saturating_add(d.records))
    }

    /// Failed examples across all datasets.
    pub fn total_failures(&self) -> usize {
        self.datasets
            .iter()
            .fold(0_usize, |acc, d| acc.saturating_add(d.failures.len()))
    }

    /// Datasets that could not be processed at all.
    pub fn aborted_datasets(&self) -> impl Iterator<Item = &DatasetReport> {
        self.datasets.iter().filter(|d| d.error.is_some())
    }

    /// True when every example of every dataset produced a record.
    pub fn is_clean(&self) -> bool {
        self.total_failures() == 0 && self.aborted_datasets().next().is_none()
    }
}

/// Sequential batch runner.
pub struct RunDriver {
    registry: Arc<PreferenceRegistry>,
    stages: Stages,
    output_dir: PathBuf,
    samples: usize,
}

impl RunDriver {
    /// Create a driver writing record files to `output_dir`.
    ///
    /// `samples` is the requested per-dataset example count, embedded in filenames.
    pub fn new(
        registry: Arc<PreferenceRegistry>,
        stages: Stages,
        output_dir: impl Into<PathBuf>,
        samples: usize,
    ) -> Self {
        Self {
            registry,
            stages,
            output_dir: output_dir.into(),
            samples,
        }
    }

    /// Directory receiving record files.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Process every dataset of every task in `plan`.
    pub async fn run(
        &self,
        plan: &[(TaskKind, Vec<String>)],
        loader: &dyn ExampleLoader,
    ) -> RunReport {
        let mut report = RunReport::default();
        for (task, datasets) in plan {
            info!(task = %task, datasets = datasets.len(), "processing task");
            for dataset in datasets {
                report
                    .datasets
                    .push(self.run_dataset(*task, dataset, loader).await);
            }
        }
        info!(
            records = report.total_records(),
            failures = report.total_failures(),
            "run complete"
        );
        report
    }

    /// Load, process and persist one dataset.
    pub async fn run_dataset(
        &self,
        task: TaskKind,
        dataset: &str,
        loader: &dyn ExampleLoader,
    ) -> DatasetReport {
        info!(task = %task, dataset, "processing dataset");

        let mut handler = IntentHandler::new(
            Arc::clone(&self.registry),
            Arc::clone(self.stages.final_model()),
        );
        if let Err(e) = handler.resolve_task(task, dataset) {
            error!(task = %task, dataset, error = %e, "skipping dataset");
            return DatasetReport::aborted(task, dataset, e.to_string());
        }

        let examples = match loader.load(task, dataset).await {
            Ok(examples) => examples,
            Err(e) => {
                error!(task = %task, dataset, error = %format!("{e:#}"), "failed to load dataset");
                return DatasetReport::aborted(task, dataset, format!("{e:#}"));
            }
        };

        let mut report = DatasetReport::new(task, dataset);
        let records = self
            .process_examples(&mut handler, task, &examples, &mut report)
            .await;

        if records.is_empty() {
            warn!(task = %task, dataset, "no records produced");
            return report;
        }

        let filename = record_filename(task, dataset, self.samples, &Utc::now());
        match write_records(&self.output_dir, &filename, &records) {
            Ok(path) => {
                info!(path = %path.display(), records = records.len(), "saved records");
                report.records = records.len();
                report.output = Some(path);
            }
            Err(e) => {
                error!(error = %format!("{e:#}"), "failed to save records");
                report.error = Some(format!("{e:#}"));
            }
        }
        report
    }

    async fn process_examples(
        &self,
        handler: &mut IntentHandler,
        task: TaskKind,
        examples: &ExampleSet,
        report: &mut DatasetReport,
    ) -> Vec<PromptRecord> {
        let mut records = Vec::with_capacity(examples.len());
        for user_id in examples.unique_users() {
            for example in examples.examples_for_user(user_id) {
                report.attempted = report.attempted.saturating_add(1);
                match self.process_example(handler, task, example).await {
                    Ok(record) => {
                        info!(example_id = %example.id, user_id, "example processed");
                        records.push(record);
                    }
                    Err(failure) => {
                        warn!(
                            example_id = %failure.example_id,
                            user_id = %failure.user_id,
                            error = %failure.error,
                            "example failed, continuing"
                        );
                        report.failures.push(failure);
                    }
                }
            }
        }
        records
    }

    /// Run the configured pipeline on one example.
    pub async fn process_example(
        &self,
        handler: &mut IntentHandler,
        task: TaskKind,
        example: &Example,
    ) -> ExampleOutcome {
        let dataset = example.dataset.as_str();
        let guideline = handler
            .registry()
            .guideline_for(task, dataset)
            .to_owned();

        let result = match &self.stages {
            Stages::Single { model } => handler
                .process_with_prompt(task, dataset, &example.document, &example.user_id)
                .await
                .map(|output| {
                    PromptRecord::single_stage(task, example, &guideline, model.model_id(), output)
                }),
            Stages::Two { base, edit } => handler
                .process_two_stage(
                    task,
                    dataset,
                    &example.document,
                    &example.user_id,
                    base.as_ref(),
                    edit.as_ref(),
                )
                .await
                .map(|output| {
                    PromptRecord::two_stage(
                        task,
                        example,
                        &guideline,
                        base.model_id(),
                        edit.model_id(),
                        output,
                    )
                }),
        };

        result.map_err(|e: PipelineError| ExampleFailure {
            example_id: example.id.clone(),
            user_id: example.user_id.clone(),
            config: e.is_config(),
            error: e.to_string(),
        })
    }
}
