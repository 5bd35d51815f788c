//! Examples: documents paired with the synthetic users they are written for.
//!
//! [`ExampleSet::assign`] spreads documents over users round-robin, so
//! document `i` belongs to `users[i mod U]`. Users are the first `U`
//! registry ids in registration order.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::error::ConfigError;
use crate::preferences::{IntentSet, PreferenceRegistry};
use crate::task::TaskKind;

pub mod catalog;
pub mod source;

pub use catalog::DatasetSpec;
pub use source::{Document, DocumentSource, HubSource, JsonlSource, SourceError};

/// One unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    /// `{document_id}_{user_id}`.
    pub id: String,
    /// Input document text.
    pub document: String,
    /// Dataset of origin.
    pub dataset: String,
    /// Assigned user.
    pub user_id: String,
    /// The assigned user's intents.
    pub intents: IntentSet,
}

/// Examples of one dataset, in load order.
#[derive(Debug, Clone, Default)]
pub struct ExampleSet {
    dataset: String,
    examples: Vec<Example>,
}

impl ExampleSet {
    /// Assign `documents` to users round-robin.
    ///
    /// `num_users` is clamped to `1..=registry.len()`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoUsers`] when the registry is empty.
    pub fn assign(
        dataset: &str,
        documents: Vec<Document>,
        registry: &PreferenceRegistry,
        num_users: usize,
    ) -> Result<Self, ConfigError> {
        let users: Vec<&str> = registry
            .user_ids()
            .into_iter()
            .take(num_users.max(1))
            .collect();
        if users.is_empty() {
            return Err(ConfigError::NoUsers);
        }

        let mut examples = Vec::with_capacity(documents.len());
        for (document, user_id) in documents.into_iter().zip(users.iter().cycle()) {
            let intents = registry.intents_for(user_id)?.clone();
            examples.push(Example {
                id: format!("{}_{user_id}", document.id),
                document: document.text,
                dataset: dataset.to_owned(),
                user_id: (*user_id).to_owned(),
                intents,
            });
        }

        info!(
            dataset,
            examples = examples.len(),
            users = users.len(),
            "assigned examples to users"
        );
        Ok(Self {
            dataset: dataset.to_owned(),
            examples,
        })
    }

    /// Dataset name.
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Number of examples.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Iterate in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, Example> {
        self.examples.iter()
    }

    /// Users that received at least one example, in order of first appearance.
    pub fn unique_users(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.examples
            .iter()
            .map(|e| e.user_id.as_str())
            .filter(|user_id| seen.insert(*user_id))
            .collect()
    }

    /// Examples assigned to `user_id`, in load order.
    pub fn examples_for_user(&self, user_id: &str) -> Vec<&Example> {
        self.examples
            .iter()
            .filter(|e| e.user_id == user_id)
            .collect()
    }

    /// Summary statistics.
    pub fn stats(&self) -> DatasetStats {
        let mut per_user: BTreeMap<String, usize> = BTreeMap::new();
        for example in &self.examples {
            let count = per_user.entry(example.user_id.clone()).or_default();
            *count = count.saturating_add(1);
        }

        let word_counts: Vec<usize> = self
            .examples
            .iter()
            .map(|e| e.document.split_whitespace().count())
            .collect();
        let total_words = word_counts
            .iter()
            .fold(0_usize, |acc, n| acc.saturating_add(*n));

        #[allow(clippy::cast_precision_loss)] // word counts are small enough for f64
        let mean_words = if word_counts.is_empty() {
            0.0
        } else {
            total_words as f64 / word_counts.len() as f64
        };

        DatasetStats {
            dataset: self.dataset.clone(),
            examples: self.examples.len(),
            per_user,
            min_words: word_counts.iter().copied().min().unwrap_or(0),
            max_words: word_counts.iter().copied().max().unwrap_or(0),
            mean_words,
        }
    }
}

impl<'a> IntoIterator for &'a ExampleSet {
    type Item = &'a Example;
    type IntoIter = std::slice::Iter<'a, Example>;

    fn into_iter(self) -> Self::IntoIter {
        self.examples.iter()
    }
}

/// Per-dataset summary shown by `stylesim stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    /// Dataset name.
    pub dataset: String,
    /// Number of examples.
    pub examples: usize,
    /// Examples per user.
    pub per_user: BTreeMap<String, usize>,
    /// Shortest document, in words.
    pub min_words: usize,
    /// Longest document, in words.
    pub max_words: usize,
    /// Mean document length, in words.
    pub mean_words: f64,
}

impl std::fmt::Display for DatasetStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Dataset: {}", self.dataset)?;
        writeln!(f, "Examples: {}", self.examples)?;
        writeln!(
            f,
            "Words per document: min {}, max {}, mean {:.1}",
            self.min_words, self.max_words, self.mean_words
        )?;
        writeln!(f, "Examples per user:")?;
        for (user, count) in &self.per_user {
            writeln!(f, "  {user}: {count}")?;
        }
        Ok(())
    }
}

/// Fetch up to `limit` documents and assign them to users.
///
/// # Errors
///
/// Returns an error if the source fails or the registry has no users.
pub async fn load_examples(
    source: &dyn DocumentSource,
    dataset: &str,
    limit: usize,
    registry: &PreferenceRegistry,
    num_users: usize,
) -> anyhow::Result<ExampleSet> {
    let documents = source.fetch(limit).await.map_err(|e| {
        anyhow::anyhow!("failed to load dataset '{dataset}' from {}: {e}", source.describe())
    })?;
    Ok(ExampleSet::assign(dataset, documents, registry, num_users)?)
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

/// Produces the examples for one `(task, dataset)` pair.
#[async_trait]
pub trait ExampleLoader: Send + Sync {
    /// Load and assign examples.
    ///
    /// # Errors
    ///
    /// Returns an error when the dataset is unknown or cannot be read.
    async fn load(&self, task: TaskKind, dataset: &str) -> anyhow::Result<ExampleSet>;
}

/// Loads from a local JSONL file when one is given, else from the hub catalog.
#[derive(Debug, Clone)]
pub struct SourceLoader {
    registry: Arc<PreferenceRegistry>,
    limit: usize,
    num_users: usize,
    split: String,
    hub_url: String,
    input: Option<PathBuf>,
}

impl SourceLoader {
    /// Loader reading `limit` documents per dataset from the hub.
    pub fn new(registry: Arc<PreferenceRegistry>, limit: usize, num_users: usize) -> Self {
        Self {
            registry,
            limit,
            num_users,
            split: "train".to_owned(),
            hub_url: source::DEFAULT_DATASETS_SERVER_URL.to_owned(),
            input: None,
        }
    }

    /// Dataset split to read from the hub.
    pub fn with_split(mut self, split: impl Into<String>) -> Self {
        self.split = split.into();
        self
    }

    /// Use a different datasets-server.
    pub fn with_hub_url(mut self, hub_url: impl Into<String>) -> Self {
        self.hub_url = hub_url.into();
        self
    }

    /// Read every dataset from this local file instead of the hub.
    pub fn with_input(mut self, input: Option<PathBuf>) -> Self {
        self.input = input;
        self
    }

    fn source_for(&self, task: TaskKind, dataset: &str) -> Result<Box<dyn DocumentSource>, ConfigError> {
        if let Some(path) = &self.input {
            return Ok(Box::new(JsonlSource::new(path.clone())));
        }
        let spec = catalog::lookup(task, dataset).ok_or_else(|| ConfigError::UnsupportedDataset {
            task: task.name().to_owned(),
            dataset: dataset.to_owned(),
        })?;
        Ok(Box::new(
            HubSource::new(*spec, self.split.clone()).with_base_url(self.hub_url.clone()),
        ))
    }
}

#[async_trait]
impl ExampleLoader for SourceLoader {
    async fn load(&self, task: TaskKind, dataset: &str) -> anyhow::Result<ExampleSet> {
        let source = self.source_for(task, dataset)?;
        load_examples(source.as_ref(), dataset, self.limit, &self.registry, self.num_users).await
    }
}
