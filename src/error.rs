//! Error taxonomy shared by the registry, task strategies and the pipeline.
//!
//! Two classes matter to callers:
//! - [`ConfigError`]: a request that can never succeed as configured
//!   (unknown task, unknown user, missing dataset). Fatal to the request,
//!   never retried.
//! - [`PipelineError::ModelCall`]: a backend failure surfaced from a
//!   [`ModelCaller`](crate::pipeline::ModelCaller). The run driver logs it
//!   and moves on to the next example.
//!
//! A base response that echoes its own prompt is not an error; the pipeline
//! strips the echo in place.

use crate::providers::ProviderError;

/// Configuration errors: the request references something that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Task name outside the supported set.
    #[error("unknown task '{name}'")]
    UnknownTask {
        /// Raw task name as given.
        name: String,
    },
    /// User id absent from the preference registry.
    #[error("unknown user '{user_id}'")]
    UnknownUser {
        /// Requested user id.
        user_id: String,
    },
    /// Intent identifier that does not name an atomic intent.
    #[error("unknown intent '{name}'")]
    UnknownIntent {
        /// Raw intent identifier.
        name: String,
    },
    /// Dataset not available for the task.
    #[error("dataset '{dataset}' is not available for task '{task}'")]
    UnsupportedDataset {
        /// Task name.
        task: String,
        /// Requested dataset.
        dataset: String,
    },
    /// The registry holds no users to assign examples to.
    #[error("preference registry has no users")]
    NoUsers,
    /// A task strategy already resolved for one dataset was requested for another.
    #[error("task '{task}' is already resolved for dataset '{resolved}', cannot switch to '{requested}'")]
    DatasetMismatch {
        /// Task name.
        task: String,
        /// Dataset the cached strategy was built for.
        resolved: String,
        /// Dataset in the new request.
        requested: String,
    },
}

/// Errors surfaced by [`IntentHandler`](crate::pipeline::IntentHandler) operations.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Resolution failed before any model was called.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A model caller failed.
    #[error("model call to '{model}' failed: {source}")]
    ModelCall {
        /// Model spec of the failing caller.
        model: String,
        /// Underlying provider error.
        #[source]
        source: ProviderError,
    },
}

impl PipelineError {
    /// Returns true for configuration errors.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
