//! stylesim: simulated personalized rewriting.
//!
//! Pairs public-dataset documents with synthetic users, builds prompts that
//! honor a dataset guideline and the user's style intents, runs an optional
//! base model followed by an edit model, and persists every prompt and
//! output for audit.
//!
//! Layers, leaves first: [`preferences`] → [`task`] → [`pipeline`] →
//! [`driver`]. [`providers`] and [`dataset`] are the collaborators the
//! pipeline and driver talk to.
//!
//! See `DESIGN.md` for the module map and decisions.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;

pub mod preferences;
pub mod task;

pub mod pipeline;
pub mod providers;

pub mod dataset;
pub mod driver;
pub mod record;
