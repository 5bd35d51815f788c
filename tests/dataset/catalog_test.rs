//! Dataset catalog lookups.

use stylesim::dataset::catalog::{datasets_for, lookup, CATALOG};
use stylesim::preferences::PreferenceRegistry;
use stylesim::task::TaskKind;

#[test]
fn lookup_is_scoped_by_task() {
    let summary = lookup(TaskKind::Summarization, "slf5k").expect("slf5k summarization");
    let email = lookup(TaskKind::EmailWriting, "slf5k").expect("slf5k email");
    assert_eq!(summary.hub_id, email.hub_id);
    assert_eq!(summary.task, TaskKind::Summarization);
    assert_eq!(email.task, TaskKind::EmailWriting);

    assert!(lookup(TaskKind::EmailWriting, "cnn_dailymail").is_none());
    assert!(lookup(TaskKind::Summarization, "ampere").is_none());
}

#[test]
fn datasets_for_preserves_catalog_order() {
    let names: Vec<&str> = datasets_for(TaskKind::EmailWriting)
        .map(|spec| spec.name)
        .collect();
    assert_eq!(names, vec!["slf5k", "ccby", "ampere", "paper_tweet"]);
}

#[test]
fn catalog_names_are_unique_per_task() {
    for task in TaskKind::ALL {
        let mut names: Vec<&str> = datasets_for(task).map(|spec| spec.name).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total, "duplicate dataset for {task}");
    }
}

#[test]
fn catalog_specs_name_a_text_column() {
    assert!(CATALOG.iter().all(|spec| !spec.text_field.is_empty()));
    assert!(CATALOG.iter().all(|spec| spec.hub_id.contains('/')));
}

#[test]
fn every_guideline_dataset_is_fetchable() {
    let registry = PreferenceRegistry::builtin();
    for (task, name) in [
        (TaskKind::Summarization, "cnn_dailymail"),
        (TaskKind::Summarization, "wikipedia"),
        (TaskKind::Summarization, "CShorten/ML-ArXiv-Papers"),
        (TaskKind::Summarization, "imdb"),
        (TaskKind::EmailWriting, "ccby"),
        (TaskKind::EmailWriting, "ampere"),
        (TaskKind::EmailWriting, "paper_tweet"),
    ] {
        assert!(lookup(task, name).is_some(), "{task}/{name}");
        assert!(!registry.guideline_for(task, name).is_empty(), "{task}/{name}");
    }
}
