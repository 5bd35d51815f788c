//! Intent-conditioned generation pipeline.
//!
//! [`IntentHandler`] resolves a user's intents and the task strategy for a
//! dataset, builds prompts, and drives one- or two-stage generation through
//! [`ModelCaller`]s. Errors are returned to the caller untouched; deciding
//! whether to skip an example is the run driver's job.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{ConfigError, PipelineError};
use crate::preferences::PreferenceRegistry;
use crate::providers::ProviderError;
use crate::task::{Task, TaskKind, TaskStrategy};

pub mod caller;

pub use caller::{ModelCaller, ProviderCaller};

/// Result of a single-stage generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleStageOutput {
    /// Direct prompt sent to the model.
    pub prompt: String,
    /// Raw model output.
    pub output: String,
}

/// Every artifact of a two-stage generation, for provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoStageOutput {
    /// Prompt sent to the base model.
    pub base_prompt: String,
    /// Prompt sent to the edit model. Embeds `base_output`.
    pub edit_prompt: String,
    /// Base model output with any prompt echo stripped.
    pub base_output: String,
    /// Edit model output as returned.
    pub edit_output: String,
}

/// Orchestrates prompt construction and model calls.
///
/// Task strategies are built on first use and scoped to the dataset of that
/// first request. Asking for the same task under another dataset is a
/// [`ConfigError::DatasetMismatch`]; use one handler per dataset.
pub struct IntentHandler {
    registry: Arc<PreferenceRegistry>,
    caller: Arc<dyn ModelCaller>,
    strategies: HashMap<TaskKind, TaskStrategy>,
}

impl IntentHandler {
    /// Create a handler. `caller` serves the single-stage path.
    pub fn new(registry: Arc<PreferenceRegistry>, caller: Arc<dyn ModelCaller>) -> Self {
        Self {
            registry,
            caller,
            strategies: HashMap::new(),
        }
    }

    /// Registry used for intent and guideline lookups.
    pub fn registry(&self) -> &PreferenceRegistry {
        &self.registry
    }

    /// Number of strategies built so far.
    pub fn resolved_count(&self) -> usize {
        self.strategies.len()
    }

    /// Return the strategy for `kind`, building it for `dataset` on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedDataset`] if the strategy cannot be
    /// built, or [`ConfigError::DatasetMismatch`] if it was already built for
    /// a different dataset.
    pub fn resolve_task(
        &mut self,
        kind: TaskKind,
        dataset: &str,
    ) -> Result<&TaskStrategy, ConfigError> {
        match self.strategies.entry(kind) {
            Entry::Occupied(entry) => {
                let strategy = entry.into_mut();
                if strategy.dataset() != dataset {
                    return Err(ConfigError::DatasetMismatch {
                        task: kind.name().to_owned(),
                        resolved: strategy.dataset().to_owned(),
                        requested: dataset.to_owned(),
                    });
                }
                Ok(strategy)
            }
            Entry::Vacant(entry) => {
                let strategy = TaskStrategy::build(kind, dataset, Arc::clone(&self.registry))?;
                debug!(task = %kind, dataset, "task strategy resolved");
                Ok(entry.insert(strategy))
            }
        }
    }

    /// Direct prompt for `user_id`'s intents on `document`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownUser`] for an unregistered user, or any
    /// error from [`Self::resolve_task`].
    pub fn construct_prompt(
        &mut self,
        kind: TaskKind,
        document: &str,
        user_id: &str,
        dataset: &str,
    ) -> Result<String, ConfigError> {
        let registry = Arc::clone(&self.registry);
        let intents = registry.intents_for(user_id)?;
        let strategy = self.resolve_task(kind, dataset)?;
        Ok(strategy.direct_prompt(document, Some(intents), dataset))
    }

    /// One-stage generation, returning only the model output.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if resolution fails, or
    /// [`PipelineError::ModelCall`] if the caller fails.
    pub async fn process(
        &mut self,
        kind: TaskKind,
        dataset: &str,
        document: &str,
        user_id: &str,
    ) -> Result<String, PipelineError> {
        Ok(self
            .process_with_prompt(kind, dataset, document, user_id)
            .await?
            .output)
    }

    /// One-stage generation, returning the prompt alongside the output.
    ///
    /// The prompt goes out as instructions and `document` as the input text.
    ///
    /// # Errors
    ///
    /// Same as [`Self::process`].
    pub async fn process_with_prompt(
        &mut self,
        kind: TaskKind,
        dataset: &str,
        document: &str,
        user_id: &str,
    ) -> Result<SingleStageOutput, PipelineError> {
        let prompt = self.construct_prompt(kind, document, user_id, dataset)?;
        let caller = Arc::clone(&self.caller);
        let output = caller
            .call_with_input(&prompt, document)
            .await
            .map_err(|source| model_call_error(caller.as_ref(), source))?;
        Ok(SingleStageOutput { prompt, output })
    }

    /// Two-stage generation: a guideline-only base pass, then a
    /// preference-conditioned edit of the base output.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if resolution fails, or
    /// [`PipelineError::ModelCall`] naming whichever caller failed. The edit
    /// model is not called when the base call fails.
    pub async fn process_two_stage(
        &mut self,
        kind: TaskKind,
        dataset: &str,
        document: &str,
        user_id: &str,
        base: &dyn ModelCaller,
        edit: &dyn ModelCaller,
    ) -> Result<TwoStageOutput, PipelineError> {
        let registry = Arc::clone(&self.registry);
        let intents = registry.intents_for(user_id)?;
        let strategy = self.resolve_task(kind, dataset)?.clone();

        let base_prompt = strategy.base_prompt(document, dataset);
        let raw_base = base
            .call(&base_prompt)
            .await
            .map_err(|source| model_call_error(base, source))?;
        let base_output = strip_prompt_echo(&raw_base, &base_prompt);

        let edit_prompt = strategy.edit_prompt(document, &base_output, intents, dataset);
        let edit_output = edit
            .call(&edit_prompt)
            .await
            .map_err(|source| model_call_error(edit, source))?;

        Ok(TwoStageOutput {
            base_prompt,
            edit_prompt,
            base_output,
            edit_output,
        })
    }
}

fn model_call_error(caller: &dyn ModelCaller, source: ProviderError) -> PipelineError {
    PipelineError::ModelCall {
        model: caller.model_id().to_owned(),
        source,
    }
}

/// Remove a leading copy of `prompt` from `response`, then trim.
///
/// Some completion-style backends echo their input before answering. A
/// response that does not start with the prompt is only trimmed.
pub fn strip_prompt_echo(response: &str, prompt: &str) -> String {
    match response.strip_prefix(prompt) {
        Some(rest) => {
            debug!("stripped prompt echo from base output");
            rest.trim().to_owned()
        }
        None => response.trim().to_owned(),
    }
}
