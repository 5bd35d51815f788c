//! Record construction, filenames and JSON persistence.

use chrono::{TimeZone, Utc};

use stylesim::dataset::Example;
use stylesim::pipeline::{SingleStageOutput, TwoStageOutput};
use stylesim::preferences::{AtomicIntent, IntentSet};
use stylesim::record::{read_records, record_filename, write_records, PromptRecord, PREVIEW_CHARS};
use stylesim::task::TaskKind;

fn example(document: &str) -> Example {
    Example {
        id: "doc7_user2".to_owned(),
        document: document.to_owned(),
        dataset: "slf5k".to_owned(),
        user_id: "user2".to_owned(),
        intents: IntentSet::from([AtomicIntent::Concise, AtomicIntent::Friendly]),
    }
}

fn two_stage_record() -> PromptRecord {
    PromptRecord::two_stage(
        TaskKind::EmailWriting,
        &example("Lunch moved to 1pm."),
        "informal, conversational, no closing",
        "ollama/phi4-mini",
        "openai/gpt-4o-mini",
        TwoStageOutput {
            base_prompt: "base prompt".to_owned(),
            edit_prompt: "edit prompt".to_owned(),
            base_output: "draft".to_owned(),
            edit_output: "final".to_owned(),
        },
    )
}

#[test]
fn filename_has_task_dataset_samples_and_timestamp() {
    let ts = Utc
        .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
        .single()
        .expect("valid timestamp");
    assert_eq!(
        record_filename(TaskKind::Summarization, "cnn_dailymail", 100, &ts),
        "summarization_cnn_dailymail_samples100_20240309_140507.json"
    );
}

#[test]
fn filename_flattens_hub_style_names() {
    let ts = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid timestamp");
    let name = record_filename(TaskKind::Summarization, "CShorten/ML-ArXiv-Papers", 5, &ts);
    assert_eq!(
        name,
        "summarization_CShorten_ML-ArXiv-Papers_samples5_20240101_000000.json"
    );
    assert!(!name.contains('/'));
}

#[test]
fn two_stage_record_keeps_both_prompts() {
    let record = two_stage_record();
    assert_eq!(record.task, TaskKind::EmailWriting);
    assert_eq!(record.example_id, "doc7_user2");
    assert_eq!(record.base_model.as_deref(), Some("ollama/phi4-mini"));
    assert_eq!(record.edit_model, "openai/gpt-4o-mini");
    assert_eq!(record.base_prompt.as_deref(), Some("base prompt"));
    assert_eq!(record.base_output.as_deref(), Some("draft"));
    assert_eq!(record.prompt, "edit prompt");
    assert_eq!(record.result, "final");
    assert_eq!(
        record.user_preference,
        IntentSet::from([AtomicIntent::Concise, AtomicIntent::Friendly]).describe()
    );
}

#[test]
fn single_stage_record_omits_base_fields_in_json() {
    let record = PromptRecord::single_stage(
        TaskKind::Summarization,
        &example("Body."),
        "guideline",
        "openai/gpt-4o-mini",
        SingleStageOutput {
            prompt: "direct prompt".to_owned(),
            output: "summary".to_owned(),
        },
    );

    let value = serde_json::to_value(&record).expect("record should serialize");
    assert_eq!(value["task"], "summarization");
    assert_eq!(value["prompt"], "direct prompt");
    assert!(value.get("base_model").is_none());
    assert!(value.get("base_prompt").is_none());
    assert!(value.get("base_output").is_none());
}

#[test]
fn preview_is_truncated_by_characters() {
    let document = "é".repeat(PREVIEW_CHARS.saturating_add(20));
    let record = PromptRecord::single_stage(
        TaskKind::Summarization,
        &example(&document),
        "",
        "m/m",
        SingleStageOutput {
            prompt: String::new(),
            output: String::new(),
        },
    );
    assert_eq!(record.document_preview.chars().count(), PREVIEW_CHARS);
}

#[test]
fn write_then_read_returns_same_records() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let out = dir.path().join("nested").join("synthesized");
    let records = vec![two_stage_record(), two_stage_record()];

    let path = write_records(&out, "email_writing_slf5k.json", &records)
        .expect("records should be written");
    assert_eq!(path, out.join("email_writing_slf5k.json"));

    let raw = std::fs::read_to_string(&path).expect("file should exist");
    assert!(raw.starts_with("[\n"));

    let loaded = read_records(&path).expect("records should load");
    assert_eq!(loaded, records);
}

#[test]
fn read_records_rejects_non_array() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{\"task\": \"summarization\"}").expect("file should be written");
    assert!(read_records(&path).is_err());
}
