//! Email writing strategy: the input is a set of notes, the output a short email.

use std::sync::Arc;

use crate::preferences::PreferenceRegistry;

use super::{Phrasing, Task, TaskKind};

/// Wording for email prompts.
pub const PHRASING: Phrasing = Phrasing {
    input_label: "Notes",
    output_label: "Email",
    noun: "email",
    plural: "emails",
    generic_request: "Please write a short email based on your above notes.",
    compose: "Please write a short email based on the above notes",
    compose_inline: "please write an email based on the above notes",
    judge_subject: "Is the above email based on the above notes good",
};

/// Builds email prompts for one dataset.
#[derive(Debug, Clone)]
pub struct EmailWriting {
    dataset: String,
    registry: Arc<PreferenceRegistry>,
}

impl EmailWriting {
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

impl Task for EmailWriting {
    fn kind(&self) -> TaskKind {
        TaskKind::EmailWriting
    }

    fn phrasing(&self) -> &Phrasing {
        &PHRASING
    }

    fn registry(&self) -> &PreferenceRegistry {
        &self.registry
    }
}
