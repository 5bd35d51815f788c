//! Base, edit and judge prompts.

use std::sync::Arc;

use stylesim::preferences::{AtomicIntent, IntentSet, PreferenceRegistry};
use stylesim::task::{Task, TaskKind, TaskStrategy, Verdict};

fn summarizer() -> TaskStrategy {
    TaskStrategy::build(
        TaskKind::Summarization,
        "cnn_dailymail",
        Arc::new(PreferenceRegistry::builtin()),
    )
    .expect("cnn_dailymail should resolve")
}

#[test]
fn base_prompt_carries_guideline_but_no_preferences() {
    let strategy = summarizer();
    let prompt = strategy.base_prompt("Rain fell.", "cnn_dailymail");

    assert_eq!(
        prompt,
        format!(
            "Article:\nRain fell.\nDataset guidelines: {}\nPlease write a summary of the above article following the dataset guidelines.",
            strategy.guideline("cnn_dailymail")
        )
    );
}

#[test]
fn edit_prompt_embeds_base_output_before_guideline_and_preferences() {
    let strategy = summarizer();
    let intents = IntentSet::from([AtomicIntent::Bulleted]);
    let prompt = strategy.edit_prompt("Rain fell.", "It rained.", &intents, "cnn_dailymail");

    let base_at = prompt.find("Base summary:\nIt rained.").expect("base output present");
    let guideline_at = prompt.find("Dataset guidelines:").expect("guideline present");
    let preference_at = prompt.find("User preferences:").expect("preferences present");
    assert!(prompt.starts_with("Article:\nRain fell.\n"));
    assert!(base_at < guideline_at);
    assert!(guideline_at < preference_at);
    assert!(prompt.contains(AtomicIntent::Bulleted.description()));
    assert!(prompt.ends_with("while maintaining the key information."));
}

#[test]
fn edit_prompt_with_empty_intents_stays_well_formed() {
    let strategy = summarizer();
    let prompt = strategy.edit_prompt("Rain fell.", "It rained.", &IntentSet::new(), "cnn_dailymail");

    assert!(!prompt.contains("User preferences"));
    assert!(!prompt.contains("user preferences"));
    assert!(prompt.contains("to better match the dataset guidelines"));
}

#[test]
fn judge_prompt_asks_for_yes_or_no() {
    let strategy = summarizer();
    let intents = IntentSet::from([AtomicIntent::Concise]);
    let prompt = strategy.judge_prompt("Rain fell.", "It rained.", &intents, "cnn_dailymail");

    assert!(prompt.contains("Summary:\nIt rained."));
    assert!(prompt.contains(AtomicIntent::Concise.description()));
    assert!(prompt.ends_with("Please answer yes or no."));
}

#[test]
fn verdict_parses_model_answers() {
    assert_eq!(Verdict::parse("Yes."), Verdict::Yes);
    assert_eq!(Verdict::parse("no, too long"), Verdict::No);
    assert_eq!(Verdict::parse("Maybe"), Verdict::Unclear);
}
