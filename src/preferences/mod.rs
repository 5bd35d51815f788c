//! Atomic stylistic intents and user intent profiles.
//!
//! An [`AtomicIntent`] is one named directive ("make it concise"). A user's
//! style is an [`IntentSet`], usually one intent per [`Perspective`]. The
//! [`registry::PreferenceRegistry`] maps user ids to their sets and
//! `(task, dataset)` pairs to free-text guidelines.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub mod registry;

pub use registry::PreferenceRegistry;

// ---------------------------------------------------------------------------
// Atomic intents
// ---------------------------------------------------------------------------

/// Documentation-only grouping of intents. Lookups never depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Perspective {
    /// Tone and verbosity.
    ContentStyle,
    /// Layout of the text.
    Structure,
    /// What the text emphasizes.
    Focus,
    /// What the text is for.
    Purpose,
}

/// A single named stylistic directive.
///
/// Ordering follows declaration order, which keeps every joined preference
/// string (and therefore every prompt) deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomicIntent {
    /// Short and direct.
    Concise,
    /// Expanded with details and examples.
    Expansive,
    /// Academic or professional tone.
    Formal,
    /// Conversational tone.
    Friendly,
    /// Segmented into sections or headings.
    Organized,
    /// Flowing narrative.
    StoryLike,
    /// Bullet points.
    Bulleted,
    /// Well-developed paragraphs.
    Paragraphic,
    /// Expert-level precision.
    Technical,
    /// Examples and direct applicability.
    HandsOn,
    /// Rigorous evaluation.
    Critical,
    /// Novel perspectives.
    Inventive,
    /// Educational.
    Teaching,
    /// Persuasive.
    Influencing,
    /// Divergent thinking.
    Brainstorming,
    /// Ends with actionable guidance.
    DecisionMaking,
}

impl AtomicIntent {
    /// Every intent, in declaration order.
    pub const ALL: [AtomicIntent; 16] = [
        Self::Concise,
        Self::Expansive,
        Self::Formal,
        Self::Friendly,
        Self::Organized,
        Self::StoryLike,
        Self::Bulleted,
        Self::Paragraphic,
        Self::Technical,
        Self::HandsOn,
        Self::Critical,
        Self::Inventive,
        Self::Teaching,
        Self::Influencing,
        Self::Brainstorming,
        Self::DecisionMaking,
    ];

    /// Stable identifier, as used in config files and serialized records.
    pub fn id(self) -> &'static str {
        match self {
            Self::Concise => "concise",
            Self::Expansive => "expansive",
            Self::Formal => "formal",
            Self::Friendly => "friendly",
            Self::Organized => "organized",
            Self::StoryLike => "story_like",
            Self::Bulleted => "bulleted",
            Self::Paragraphic => "paragraphic",
            Self::Technical => "technical",
            Self::HandsOn => "hands_on",
            Self::Critical => "critical",
            Self::Inventive => "inventive",
            Self::Teaching => "teaching",
            Self::Influencing => "influencing",
            Self::Brainstorming => "brainstorming",
            Self::DecisionMaking => "decision_making",
        }
    }

    /// Human-readable description, inserted verbatim into prompts.
    pub fn description(self) -> &'static str {
        match self {
            Self::Concise => "eliminate redundancy and make the text short and direct",
            Self::Expansive => "expand ideas with supporting details and examples",
            Self::Formal => "use academic or professional tone, avoiding casual language",
            Self::Friendly => {
                "use conversational tone, including contractions and approachable phrasing"
            }
            Self::Organized => "clearly segment content into logical sections or headings",
            Self::StoryLike => "present content as a flowing narrative or sequence of events",
            Self::Bulleted => "convert lists or ideas into bullet points for scannability",
            Self::Paragraphic => "keep ideas grouped into well-developed paragraphs",
            Self::Technical => {
                "emphasize precision, jargon, and specificity suitable for experts"
            }
            Self::HandsOn => "prioritize examples, instructions, and direct applicability",
            Self::Critical => "analyze, question, or evaluate the subject rigorously",
            Self::Inventive => "include imaginative ideas or novel perspectives",
            Self::Teaching => "make content clear and educational, suitable for learning",
            Self::Influencing => "persuade the reader toward a viewpoint or decision",
            Self::Brainstorming => "encourage open-ended, inclusive, or divergent thinking",
            Self::DecisionMaking => "present arguments and conclude with actionable guidance",
        }
    }

    /// The perspective this intent is filed under.
    pub fn perspective(self) -> Perspective {
        match self {
            Self::Concise | Self::Expansive | Self::Formal | Self::Friendly => {
                Perspective::ContentStyle
            }
            Self::Organized | Self::StoryLike | Self::Bulleted | Self::Paragraphic => {
                Perspective::Structure
            }
            Self::Technical | Self::HandsOn | Self::Critical | Self::Inventive => {
                Perspective::Focus
            }
            Self::Teaching | Self::Influencing | Self::Brainstorming | Self::DecisionMaking => {
                Perspective::Purpose
            }
        }
    }
}

impl fmt::Display for AtomicIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AtomicIntent {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|intent| intent.id() == normalized)
            .ok_or_else(|| ConfigError::UnknownIntent { name: s.to_owned() })
    }
}

// ---------------------------------------------------------------------------
// Intent sets and profiles
// ---------------------------------------------------------------------------

/// An unordered, duplicate-free set of intents with a deterministic iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentSet(BTreeSet<AtomicIntent>);

impl IntentSet {
    /// An empty set (no style constraints).
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the set has no intents.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of intents.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether `intent` is part of the set.
    pub fn contains(&self, intent: AtomicIntent) -> bool {
        self.0.contains(&intent)
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = AtomicIntent> + '_ {
        self.0.iter().copied()
    }

    /// The serialized preference string: descriptions joined with `", "`.
    ///
    /// Empty for an empty set.
    pub fn describe(&self) -> String {
        self.iter()
            .map(AtomicIntent::description)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Parse a list of intent identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownIntent`] for the first identifier that
    /// does not name an intent.
    pub fn parse_ids<S: AsRef<str>>(ids: &[S]) -> Result<Self, ConfigError> {
        ids.iter()
            .map(|id| id.as_ref().parse::<AtomicIntent>())
            .collect()
    }
}

impl FromIterator<AtomicIntent> for IntentSet {
    fn from_iter<I: IntoIterator<Item = AtomicIntent>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[AtomicIntent; N]> for IntentSet {
    fn from(intents: [AtomicIntent; N]) -> Self {
        intents.into_iter().collect()
    }
}

/// Immutable association of a user id to that user's intents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIntentProfile {
    /// User identifier (e.g. `user1`).
    pub user_id: String,
    /// The user's intents.
    pub intents: IntentSet,
}

impl UserIntentProfile {
    /// Build a profile.
    pub fn new(user_id: impl Into<String>, intents: IntentSet) -> Self {
        Self {
            user_id: user_id.into(),
            intents,
        }
    }
}
