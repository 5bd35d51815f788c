//! Task strategies: prompt construction for each supported task.
//!
//! Every strategy exposes the same capability surface ([`Task`]). The
//! prompt-assembly logic lives in the trait's provided methods; a strategy
//! only supplies its [`Phrasing`]. Prompts are pure functions of their
//! arguments, and clauses always appear in the same order:
//!
//! 1. the input document (or prior examples, then the document)
//! 2. `Dataset guidelines: ...`
//! 3. `User preferences: ...` (omitted when the intent set is empty)
//! 4. the instruction
//!
//! Downstream consumers of persisted prompts rely on that order.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dataset::catalog;
use crate::error::ConfigError;
use crate::preferences::{IntentSet, PreferenceRegistry};

pub mod email;
pub mod summarization;

pub use email::EmailWriting;
pub use summarization::Summarization;

// ---------------------------------------------------------------------------
// Task kinds
// ---------------------------------------------------------------------------

/// The closed set of supported tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Summarize a document.
    Summarization,
    /// Write an email from notes.
    EmailWriting,
}

impl TaskKind {
    /// Every supported task.
    pub const ALL: [TaskKind; 2] = [Self::Summarization, Self::EmailWriting];

    /// Stable task name used in records, filenames and config.
    pub fn name(self) -> &'static str {
        match self {
            Self::Summarization => "summarization",
            Self::EmailWriting => "email_writing",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| ConfigError::UnknownTask { name: s.to_owned() })
    }
}

// ---------------------------------------------------------------------------
// Prompt inputs
// ---------------------------------------------------------------------------

/// One prior interaction: the model's original output and the user's revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    /// Output before the user's edits.
    pub original: String,
    /// Output after the user's edits.
    pub edited: String,
}

impl Correction {
    /// Build a correction pair.
    pub fn new(original: impl Into<String>, edited: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            edited: edited.into(),
        }
    }
}

/// Task-specific wording plugged into the shared prompt templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phrasing {
    /// Label in front of the input document (`Article`, `Notes`).
    pub input_label: &'static str,
    /// Capitalized output label (`Summary`, `Email`).
    pub output_label: &'static str,
    /// Lowercase output noun (`summary`, `email`).
    pub noun: &'static str,
    /// Plural of [`Self::noun`].
    pub plural: &'static str,
    /// Request used when no style constraints apply at all.
    pub generic_request: &'static str,
    /// Sentence opener asking for the output, without trailing punctuation.
    pub compose: &'static str,
    /// Lowercase variant of the request used after an introductory clause.
    pub compose_inline: &'static str,
    /// Opening of the yes/no suitability question.
    pub judge_subject: &'static str,
}

// ---------------------------------------------------------------------------
// Capability surface
// ---------------------------------------------------------------------------

/// The prompt-construction surface shared by every task strategy.
pub trait Task {
    /// Which task this strategy implements.
    fn kind(&self) -> TaskKind;

    /// The strategy's wording.
    fn phrasing(&self) -> &Phrasing;

    /// Registry used for guideline lookups.
    fn registry(&self) -> &PreferenceRegistry;

    /// Dataset guideline for this task, `""` when none is registered.
    fn guideline(&self, dataset: &str) -> &str {
        self.registry().guideline_for(self.kind(), dataset)
    }

    /// Single prompt requesting the task output.
    ///
    /// With `intents == None` the prompt asks for a generic output with no
    /// style constraints. Otherwise it carries the dataset guideline and the
    /// user's preferences and asks the model to satisfy both.
    fn direct_prompt(&self, document: &str, intents: Option<&IntentSet>, dataset: &str) -> String {
        let p = self.phrasing();
        let Some(intents) = intents else {
            return [labeled(p.input_label, document), p.generic_request.to_owned()].join("\n");
        };
        let instruction = if intents.is_empty() {
            format!("{} that follows the dataset guidelines.", p.compose)
        } else {
            format!(
                "{} that follows both the dataset guidelines and user preferences.",
                p.compose
            )
        };
        let mut lines = vec![
            labeled(p.input_label, document),
            guideline_line(self.guideline(dataset)),
        ];
        lines.extend(preference_line(intents));
        lines.push(instruction);
        lines.join("\n")
    }

    /// Guideline-only prompt for the style-agnostic base stage.
    fn base_prompt(&self, document: &str, dataset: &str) -> String {
        let p = self.phrasing();
        [
            labeled(p.input_label, document),
            guideline_line(self.guideline(dataset)),
            format!("{} following the dataset guidelines.", p.compose),
        ]
        .join("\n")
    }

    /// Prompt asking the model to revise `base_output` toward the guideline
    /// and the user's intents while keeping its factual content.
    fn edit_prompt(
        &self,
        document: &str,
        base_output: &str,
        intents: &IntentSet,
        dataset: &str,
    ) -> String {
        let p = self.phrasing();
        let instruction = if intents.is_empty() {
            format!(
                "Please revise the above base {noun} to better match the dataset guidelines \
                 while maintaining the key information.",
                noun = p.noun
            )
        } else {
            format!(
                "Please revise the above base {noun} to better match both the dataset guidelines \
                 and user preferences. Focus on making the {noun} more aligned with the user's \
                 preferred style while maintaining the key information.",
                noun = p.noun
            )
        };
        let mut lines = vec![
            labeled(p.input_label, document),
            labeled(&format!("Base {}", p.noun), base_output),
            guideline_line(self.guideline(dataset)),
        ];
        lines.extend(preference_line(intents));
        lines.push(instruction);
        lines.join("\n")
    }

    /// In-context preference transfer: prior `(original, edited)` pairs are
    /// shown first and the model infers the transformation for `document`.
    fn in_context_prompt(&self, document: &str, prior: &[Correction], dataset: &str) -> String {
        let p = self.phrasing();
        let mut prompt = corrections_block(p, prior);
        prompt.push_str(
            &[
                labeled(p.input_label, document),
                guideline_line(self.guideline(dataset)),
                format!(
                    "Based on the edits and revision by this user on the original {} in the above \
                     examples, {} following the dataset guidelines.",
                    p.noun, p.compose_inline
                ),
            ]
            .join("\n"),
        );
        prompt
    }

    /// Lists intent sets from prior successful interactions as evidence and
    /// asks the model to apply the most represented qualities.
    fn in_context_preference_prompt(
        &self,
        document: &str,
        preferences: &[IntentSet],
        dataset: &str,
    ) -> String {
        let p = self.phrasing();
        let mut prompt = preference_list_block(p, preferences);
        prompt.push_str(
            &[
                labeled(p.input_label, document),
                guideline_line(self.guideline(dataset)),
                format!(
                    "Using the qualities most represented in the above list of preferences and \
                     following the dataset guidelines, {}.",
                    p.compose_inline
                ),
            ]
            .join("\n"),
        );
        prompt
    }

    /// Asks the model to infer the user's generic style preference from
    /// their edit history, answered as a short phrase.
    fn preference_inference_prompt(&self, prior: &[Correction], dataset: &str) -> String {
        let p = self.phrasing();
        let mut prompt = corrections_block(p, prior);
        prompt.push_str(
            &[
                guideline_line(self.guideline(dataset)),
                format!(
                    "Based on the edits and revision by this user on the original {} in the above \
                     examples, what do you find about this user's generic preference in terms of \
                     writing style and formatting?",
                    p.noun
                ),
                "Please answer in a short phrase and only recommend those preferences that are \
                 widely used."
                    .to_owned(),
            ]
            .join("\n"),
        );
        prompt
    }

    /// Asks the model to summarize the dominant preference across several sets.
    fn majority_preference_prompt(&self, preferences: &[IntentSet], dataset: &str) -> String {
        let p = self.phrasing();
        let mut prompt = preference_list_block(p, preferences);
        prompt.push_str(&guideline_line(self.guideline(dataset)));
        prompt.push('\n');
        prompt.push_str(
            "Based on the above examples and dataset guidelines, please come up with short phrase \
             with the most represented writing preferences of this user.",
        );
        prompt
    }

    /// Yes/no question: does `output` suit a user with these intents?
    fn judge_prompt(
        &self,
        document: &str,
        output: &str,
        intents: &IntentSet,
        dataset: &str,
    ) -> String {
        let p = self.phrasing();
        let question = if intents.is_empty() {
            format!(
                "{} for a user following the dataset guidelines? Please answer yes or no.",
                p.judge_subject
            )
        } else {
            format!(
                "{} for a user who wants the following style: {}? Please answer yes or no.",
                p.judge_subject,
                intents.describe()
            )
        };
        let mut lines = vec![
            labeled(p.input_label, document),
            labeled(p.output_label, output),
            guideline_line(self.guideline(dataset)),
        ];
        lines.extend(preference_line(intents));
        lines.push(question);
        lines.join("\n")
    }
}

fn labeled(label: &str, body: &str) -> String {
    format!("{label}:\n{body}")
}

fn guideline_line(guideline: &str) -> String {
    format!("Dataset guidelines: {guideline}")
}

fn preference_line(intents: &IntentSet) -> Option<String> {
    if intents.is_empty() {
        None
    } else {
        Some(format!("User preferences: {}", intents.describe()))
    }
}

fn corrections_block(p: &Phrasing, prior: &[Correction]) -> String {
    prior
        .iter()
        .map(|c| {
            format!(
                "Original {noun}:\n{}\nRevised {noun}:\n{}\n\n",
                c.original,
                c.edited,
                noun = p.noun
            )
        })
        .collect()
}

// Empty sets carry no evidence and would leave a dangling "- " bullet.
fn preference_list_block(p: &Phrasing, preferences: &[IntentSet]) -> String {
    let mut block = format!(
        "List of user preferences successfully being used to generate {} of a similar kind:\n",
        p.plural
    );
    for intents in preferences.iter().filter(|i| !i.is_empty()) {
        block.push_str("- ");
        block.push_str(&intents.describe());
        block.push('\n');
    }
    block
}

// ---------------------------------------------------------------------------
// Judge verdicts
// ---------------------------------------------------------------------------

/// Parsed answer to a [`Task::judge_prompt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The output suits the user.
    Yes,
    /// The output does not suit the user.
    No,
    /// The answer was neither yes nor no.
    Unclear,
}

impl Verdict {
    /// Interpret a model's free-text answer.
    ///
    /// Leading whitespace, quotes and markdown emphasis are ignored; only the
    /// first word decides.
    pub fn parse(response: &str) -> Self {
        let first_word = response
            .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '"' | '\'' | '`'))
            .split(|c: char| !c.is_ascii_alphabetic())
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match first_word.as_str() {
            "yes" => Self::Yes,
            "no" => Self::No,
            _ => Self::Unclear,
        }
    }
}

// ---------------------------------------------------------------------------
// Strategy factory
// ---------------------------------------------------------------------------

/// A task strategy scoped to the dataset it was built for.
#[derive(Debug, Clone)]
pub enum TaskStrategy {
    /// Summarization prompts.
    Summarization(Summarization),
    /// Email writing prompts.
    EmailWriting(EmailWriting),
}

impl TaskStrategy {
    /// Build the strategy for `kind`, scoped to a single dataset.
    ///
    /// The dataset must be known for the task, either from the built-in
    /// catalog or because the registry holds a guideline for it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedDataset`] otherwise.
    pub fn build(
        kind: TaskKind,
        dataset: &str,
        registry: Arc<PreferenceRegistry>,
    ) -> Result<Self, ConfigError> {
        let known = catalog::lookup(kind, dataset).is_some()
            || !registry.guideline_for(kind, dataset).is_empty();
        if !known {
            return Err(ConfigError::UnsupportedDataset {
                task: kind.name().to_owned(),
                dataset: dataset.to_owned(),
            });
        }
        Ok(match kind {
            TaskKind::Summarization => Self::Summarization(Summarization::new(dataset, registry)),
            TaskKind::EmailWriting => Self::EmailWriting(EmailWriting::new(dataset, registry)),
        })
    }

    /// Dataset this strategy was built for.
    pub fn dataset(&self) -> &str {
        match self {
            Self::Summarization(s) => s.dataset(),
            Self::EmailWriting(e) => e.dataset(),
        }
    }

    fn inner(&self) -> &dyn Task {
        match self {
            Self::Summarization(s) => s,
            Self::EmailWriting(e) => e,
        }
    }
}

impl Task for TaskStrategy {
    fn kind(&self) -> TaskKind {
        self.inner().kind()
    }

    fn phrasing(&self) -> &Phrasing {
        self.inner().phrasing()
    }

    fn registry(&self) -> &PreferenceRegistry {
        self.inner().registry()
    }
}
