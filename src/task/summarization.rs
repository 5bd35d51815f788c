//! Summarization strategy.

use std::sync::Arc;

use crate::preferences::PreferenceRegistry;

use super::{Phrasing, Task, TaskKind};

/// Wording for summary prompts.
pub const PHRASING: Phrasing = Phrasing {
    input_label: "Article",
    output_label: "Summary",
    noun: "summary",
    plural: "summaries",
    generic_request: "Please write a summary of the above article.",
    compose: "Please write a summary of the above article",
    compose_inline: "please write a summary of the above article",
    judge_subject: "Is the above summary of the above article good",
};

/// Builds summarization prompts for one dataset.
#[derive(Debug, Clone)]
pub struct Summarization {
    dataset: String,
    registry: Arc<PreferenceRegistry>,
}

impl Summarization {
    /// Create the strategy for `dataset`.
    pub fn new(dataset: impl Into<String>, registry: Arc<PreferenceRegistry>) -> Self {
        Self {
            dataset: dataset.into(),
            registry,
        }
    }

    /// Dataset this strategy is scoped to.
    pub fn dataset(&self) -> &str {
        &self.dataset
    }
}

impl Task for Summarization {
    fn kind(&self) -> TaskKind {
        TaskKind::Summarization
    }

    fn phrasing(&self) -> &Phrasing {
        &PHRASING
    }

    fn registry(&self) -> &PreferenceRegistry {
        &self.registry
    }
}
