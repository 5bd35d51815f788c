//! The preference registry: user profiles and dataset guidelines.
//!
//! Built once at startup from the built-in tables (optionally merged with
//! config-defined entries) and then shared read-only behind an `Arc`.

use std::collections::HashMap;

use tracing::debug;

use crate::config::PreferencesConfig;
use crate::error::ConfigError;
use crate::task::TaskKind;

use super::{AtomicIntent, IntentSet, UserIntentProfile};

const BUILTIN_USERS: [(&str, [AtomicIntent; 4]); 5] = [
    (
        "user1",
        [
            AtomicIntent::Concise,
            AtomicIntent::Organized,
            AtomicIntent::Technical,
            AtomicIntent::Teaching,
        ],
    ),
    (
        "user2",
        [
            AtomicIntent::Expansive,
            AtomicIntent::StoryLike,
            AtomicIntent::HandsOn,
            AtomicIntent::Influencing,
        ],
    ),
    (
        "user3",
        [
            AtomicIntent::Formal,
            AtomicIntent::Bulleted,
            AtomicIntent::Critical,
            AtomicIntent::DecisionMaking,
        ],
    ),
    (
        "user4",
        [
            AtomicIntent::Friendly,
            AtomicIntent::Paragraphic,
            AtomicIntent::Inventive,
            AtomicIntent::Brainstorming,
        ],
    ),
    (
        "user5",
        [
            AtomicIntent::Concise,
            AtomicIntent::Organized,
            AtomicIntent::HandsOn,
            AtomicIntent::Teaching,
        ],
    ),
];

const BUILTIN_GUIDELINES: [(TaskKind, &str, &str); 9] = [
    (
        TaskKind::Summarization,
        "cnn_dailymail",
        "style targeted to young children, storytelling, short sentences, playful language, interactive, positive",
    ),
    (
        TaskKind::Summarization,
        "slf5k",
        "second person narrative, brief, show emotions, invoke personal reflection, immersive",
    ),
    (
        TaskKind::Summarization,
        "wikipedia",
        "bullet points, parallel structure, brief",
    ),
    (
        TaskKind::Summarization,
        "CShorten/ML-ArXiv-Papers",
        "tweet style, simple English, inquisitive, skillful foreshadowing, with emojis",
    ),
    (
        TaskKind::Summarization,
        "imdb",
        "question answering style",
    ),
    (
        TaskKind::EmailWriting,
        "ccby",
        "structured, straight to the points, respectful, professional greeting and closing",
    ),
    (
        TaskKind::EmailWriting,
        "slf5k",
        "informal, conversational, no closing",
    ),
    (
        TaskKind::EmailWriting,
        "ampere",
        "casual tone, positive, clear, call to action",
    ),
    (
        TaskKind::EmailWriting,
        "paper_tweet",
        "engaging, personalized, professional tone, thankful closing",
    ),
];

/// Read-only lookups over user profiles and dataset guidelines.
///
/// Users keep registration order: built-ins first, then config users.
#[derive(Debug, Clone, Default)]
pub struct PreferenceRegistry {
    users: HashMap<String, UserIntentProfile>,
    order: Vec<String>,
    guidelines: HashMap<(TaskKind, String), String>,
}

impl PreferenceRegistry {
    /// An empty registry. Mostly useful in tests.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The five built-in users and the built-in guideline table.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (user_id, intents) in BUILTIN_USERS {
            registry.insert_user(UserIntentProfile::new(user_id, IntentSet::from(intents)));
        }
        for (task, dataset, guideline) in BUILTIN_GUIDELINES {
            registry.insert_guideline(task, dataset, guideline);
        }
        registry
    }

    /// Merge config-defined users and guidelines over this registry.
    ///
    /// Config entries replace built-in entries with the same key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownIntent`] or [`ConfigError::UnknownTask`]
    /// when the config names something that does not exist.
    pub fn with_overrides(mut self, config: &PreferencesConfig) -> Result<Self, ConfigError> {
        for (user_id, ids) in &config.users {
            let intents = IntentSet::parse_ids(ids)?;
            debug!(user_id = %user_id, intents = intents.len(), "registering configured user");
            self.insert_user(UserIntentProfile::new(user_id.clone(), intents));
        }
        for (task_name, datasets) in &config.guidelines {
            let task: TaskKind = task_name.parse()?;
            for (dataset, guideline) in datasets {
                self.insert_guideline(task, dataset, guideline);
            }
        }
        Ok(self)
    }

    /// Add a user profile, or replace one in place keeping its position.
    pub fn insert_user(&mut self, profile: UserIntentProfile) {
        let user_id = profile.user_id.clone();
        if self.users.insert(user_id.clone(), profile).is_none() {
            self.order.push(user_id);
        }
    }

    /// Add or replace a guideline.
    pub fn insert_guideline(&mut self, task: TaskKind, dataset: &str, guideline: &str) {
        self.guidelines
            .insert((task, dataset.to_owned()), guideline.to_owned());
    }

    /// The exact intent set stored for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownUser`] when the user is not registered.
    /// An unknown user is never treated as "no preference".
    pub fn intents_for(&self, user_id: &str) -> Result<&IntentSet, ConfigError> {
        self.profile(user_id).map(|p| &p.intents)
    }

    /// The full profile for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownUser`] when the user is not registered.
    pub fn profile(&self, user_id: &str) -> Result<&UserIntentProfile, ConfigError> {
        self.users
            .get(user_id)
            .ok_or_else(|| ConfigError::UnknownUser {
                user_id: user_id.to_owned(),
            })
    }

    /// Guideline for a `(task, dataset)` pair, or `""` when none is registered.
    pub fn guideline_for(&self, task: TaskKind, dataset: &str) -> &str {
        self.guidelines
            .get(&(task, dataset.to_owned()))
            .map_or("", String::as_str)
    }

    /// Registered user ids in registration order.
    pub fn user_ids(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no users are registered.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
