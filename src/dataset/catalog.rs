//! Known datasets per task and where to fetch them.

use crate::task::TaskKind;

/// Coordinates of a dataset on the Hugging Face hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetSpec {
    /// Task the dataset feeds.
    pub task: TaskKind,
    /// Short name used in config, records and filenames.
    pub name: &'static str,
    /// Hub repository id.
    pub hub_id: &'static str,
    /// Hub config (subset) name.
    pub config: &'static str,
    /// Column holding a stable row id. `None` uses the row index.
    pub id_field: Option<&'static str>,
    /// Column holding the input document.
    pub text_field: &'static str,
}

const fn spec(
    task: TaskKind,
    name: &'static str,
    hub_id: &'static str,
    config: &'static str,
    id_field: Option<&'static str>,
    text_field: &'static str,
) -> DatasetSpec {
    DatasetSpec {
        task,
        name,
        hub_id,
        config,
        id_field,
        text_field,
    }
}

/// Every dataset the CLI can fetch without a local file.
pub const CATALOG: &[DatasetSpec] = &[
    spec(
        TaskKind::Summarization,
        "cnn_dailymail",
        "abisee/cnn_dailymail",
        "3.0.0",
        Some("id"),
        "article",
    ),
    spec(
        TaskKind::Summarization,
        "xsum",
        "EdinburghNLP/xsum",
        "default",
        Some("id"),
        "document",
    ),
    spec(
        TaskKind::Summarization,
        "slf5k",
        "JeremyAlain/SLF5K",
        "default",
        Some("id"),
        "post",
    ),
    spec(
        TaskKind::Summarization,
        "wikipedia",
        "legacy-datasets/wikipedia",
        "20220301.simple",
        Some("id"),
        "text",
    ),
    spec(
        TaskKind::Summarization,
        "CShorten/ML-ArXiv-Papers",
        "CShorten/ML-ArXiv-Papers",
        "default",
        Some("Unnamed: 0.1"),
        "abstract",
    ),
    // The label column repeats, so rows are keyed by index.
    spec(
        TaskKind::Summarization,
        "imdb",
        "stanfordnlp/imdb",
        "plain_text",
        None,
        "text",
    ),
    spec(
        TaskKind::EmailWriting,
        "slf5k",
        "JeremyAlain/SLF5K",
        "default",
        Some("id"),
        "post",
    ),
    spec(
        TaskKind::EmailWriting,
        "ccby",
        "orieg/elsevier-oa-cc-by",
        "default",
        Some("id"),
        "abstract",
    ),
    spec(
        TaskKind::EmailWriting,
        "ampere",
        "launch/ampere",
        "default",
        Some("doc_id"),
        "text",
    ),
    spec(
        TaskKind::EmailWriting,
        "paper_tweet",
        "nitsanb/paper_tweet",
        "default",
        None,
        "text",
    ),
];

/// Find a dataset by task and name.
pub fn lookup(task: TaskKind, name: &str) -> Option<&'static DatasetSpec> {
    CATALOG
        .iter()
        .find(|spec| spec.task == task && spec.name == name)
}

/// Datasets available for a task, in catalog order.
pub fn datasets_for(task: TaskKind) -> impl Iterator<Item = &'static DatasetSpec> {
    CATALOG.iter().filter(move |spec| spec.task == task)
}
