//! Persisted prompt records.
//!
//! One JSON array per `(task, dataset, run)` file. Prompt fields hold the
//! exact text sent to each model so prompt construction stays auditable.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dataset::Example;
use crate::pipeline::{SingleStageOutput, TwoStageOutput};
use crate::task::TaskKind;

/// Characters of the input document kept in a record.
pub const PREVIEW_CHARS: usize = 100;

/// One generated example with full provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRecord {
    /// Task name.
    pub task: TaskKind,
    /// Dataset name.
    pub dataset: String,
    /// Assigned user.
    pub user_id: String,
    /// Example id (`{document_id}_{user_id}`).
    pub example_id: String,
    /// First [`PREVIEW_CHARS`] characters of the document.
    pub document_preview: String,
    /// Guideline text used in the prompts.
    pub dataset_guideline: String,
    /// Serialized user preference (comma-joined intent descriptions).
    pub user_preference: String,
    /// Base model spec, two-stage runs only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_model: Option<String>,
    /// Edit (or single-stage) model spec.
    pub edit_model: String,
    /// Prompt sent to the base model, two-stage runs only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_prompt: Option<String>,
    /// Echo-stripped base output, two-stage runs only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_output: Option<String>,
    /// Prompt sent to the edit (or single-stage) model.
    pub prompt: String,
    /// Final model output.
    pub result: String,
    /// When the record was produced.
    pub timestamp: DateTime<Utc>,
}

impl PromptRecord {
    /// Record for a single-stage generation.
    pub fn single_stage(
        task: TaskKind,
        example: &Example,
        guideline: &str,
        model: &str,
        output: SingleStageOutput,
    ) -> Self {
        Self {
            base_model: None,
            base_prompt: None,
            base_output: None,
            prompt: output.prompt,
            result: output.output,
            ..Self::header(task, example, guideline, model)
        }
    }

    /// Record for a two-stage generation.
    pub fn two_stage(
        task: TaskKind,
        example: &Example,
        guideline: &str,
        base_model: &str,
        edit_model: &str,
        output: TwoStageOutput,
    ) -> Self {
        Self {
            base_model: Some(base_model.to_owned()),
            base_prompt: Some(output.base_prompt),
            base_output: Some(output.base_output),
            prompt: output.edit_prompt,
            result: output.edit_output,
            ..Self::header(task, example, guideline, edit_model)
        }
    }

    fn header(task: TaskKind, example: &Example, guideline: &str, edit_model: &str) -> Self {
        Self {
            task,
            dataset: example.dataset.clone(),
            user_id: example.user_id.clone(),
            example_id: example.id.clone(),
            document_preview: example.document.chars().take(PREVIEW_CHARS).collect(),
            dataset_guideline: guideline.to_owned(),
            user_preference: example.intents.describe(),
            base_model: None,
            edit_model: edit_model.to_owned(),
            base_prompt: None,
            base_output: None,
            prompt: String::new(),
            result: String::new(),
            timestamp: Utc::now(),
        }
    }
}

/// `{task}_{dataset}_samples{n}_{YYYYmmdd_HHMMSS}.json`.
///
/// `/` in hub-style dataset names becomes `_` so the file stays in one directory.
pub fn record_filename(
    task: TaskKind,
    dataset: &str,
    samples: usize,
    timestamp: &DateTime<Utc>,
) -> String {
    format!(
        "{task}_{}_samples{samples}_{}.json",
        dataset.replace(['/', '\\'], "_"),
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Write `records` as a pretty-printed JSON array to `dir/filename`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be written.
pub fn write_records(dir: &Path, filename: &str, records: &[PromptRecord]) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(filename);
    let json = serde_json::to_string_pretty(records).context("failed to serialize records")?;
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write records to {}", path.display()))?;
    Ok(path)
}

/// Read a record file back.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a record array.
pub fn read_records(path: &Path) -> anyhow::Result<Vec<PromptRecord>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read records at {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse records at {}", path.display()))
}
