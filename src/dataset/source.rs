//! Document sources: where raw `(id, text)` documents come from.
//!
//! - [`JsonlSource`]: a local file, one JSON object per line
//! - [`HubSource`]: the Hugging Face datasets-server `/rows` endpoint

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::providers::{check_http_response, ProviderError};

use super::catalog::DatasetSpec;

/// Default datasets-server base URL.
pub const DEFAULT_DATASETS_SERVER_URL: &str = "https://datasets-server.huggingface.co";

/// Maximum rows the datasets-server returns per request.
pub const HUB_PAGE_SIZE: usize = 100;

/// A raw input document before user assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Source-local identifier.
    pub id: String,
    /// Document text.
    pub text: String,
}

impl Document {
    /// Build a document.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Errors while reading documents.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Local file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// A record could not be interpreted.
    #[error("malformed record at {location}: {reason}")]
    Malformed {
        /// Line number or row index.
        location: String,
        /// What was wrong.
        reason: String,
    },
    /// Remote fetch failed.
    #[error("dataset fetch failed: {0}")]
    Fetch(#[from] ProviderError),
}

/// Anything that yields documents.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch up to `limit` documents in source order.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the source cannot be read or a record is malformed.
    async fn fetch(&self, limit: usize) -> Result<Vec<Document>, SourceError>;

    /// Human-readable origin for logs.
    fn describe(&self) -> String;
}

// ---------------------------------------------------------------------------
// Local JSONL
// ---------------------------------------------------------------------------

/// Local JSONL file with `{"id": ..., "text": ...}` objects.
///
/// `id` may be a string or a number and defaults to the line index when
/// absent. Blank lines are skipped.
#[derive(Debug, Clone)]
pub struct JsonlSource {
    path: PathBuf,
}

#[derive(Deserialize)]
struct JsonlLine {
    #[serde(default)]
    id: Option<Value>,
    text: String,
}

impl JsonlSource {
    /// Read from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DocumentSource for JsonlSource {
    async fn fetch(&self, limit: usize) -> Result<Vec<Document>, SourceError> {
        let contents =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| SourceError::Io {
                    path: self.path.clone(),
                    source,
                })?;

        let mut documents = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if documents.len() >= limit {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            let parsed: JsonlLine =
                serde_json::from_str(line).map_err(|e| SourceError::Malformed {
                    location: format!("{}:{}", self.path.display(), index.saturating_add(1)),
                    reason: e.to_string(),
                })?;
            let id = parsed
                .id
                .as_ref()
                .and_then(value_to_id)
                .unwrap_or_else(|| index.to_string());
            documents.push(Document::new(id, parsed.text));
        }

        debug!(path = %self.path.display(), count = documents.len(), "read documents from file");
        Ok(documents)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// Hugging Face datasets-server
// ---------------------------------------------------------------------------

/// Paged reader over the datasets-server `/rows` endpoint.
#[derive(Debug, Clone)]
pub struct HubSource {
    spec: DatasetSpec,
    split: String,
    base_url: String,
    client: reqwest::Client,
}

/// `/rows` response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct RowsPage {
    /// Rows in this page.
    pub rows: Vec<RowEntry>,
    /// Total rows in the split.
    #[serde(default)]
    pub num_rows_total: Option<usize>,
}

/// One row with its index.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct RowEntry {
    /// Position in the split.
    pub row_idx: usize,
    /// Column values.
    pub row: serde_json::Map<String, Value>,
}

impl HubSource {
    /// Read `split` of a catalog dataset.
    pub fn new(spec: DatasetSpec, split: impl Into<String>) -> Self {
        Self {
            spec,
            split: split.into(),
            base_url: DEFAULT_DATASETS_SERVER_URL.to_owned(),
            client: reqwest::Client::new(),
        }
    }

    /// Point at a different datasets-server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    async fn fetch_page(&self, offset: usize, length: usize) -> Result<RowsPage, SourceError> {
        let url = format!("{}/rows", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("dataset", self.spec.hub_id.to_owned()),
                ("config", self.spec.config.to_owned()),
                ("split", self.split.clone()),
                ("offset", offset.to_string()),
                ("length", length.to_string()),
            ])
            .send()
            .await
            .map_err(ProviderError::from)?;
        let body = check_http_response(response).await?;
        serde_json::from_str(&body).map_err(|e| SourceError::Malformed {
            location: format!("{} offset {offset}", self.spec.hub_id),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl DocumentSource for HubSource {
    async fn fetch(&self, limit: usize) -> Result<Vec<Document>, SourceError> {
        let mut documents = Vec::new();
        let mut offset = 0_usize;

        while documents.len() < limit {
            let remaining = limit.saturating_sub(documents.len());
            let page = self
                .fetch_page(offset, remaining.min(HUB_PAGE_SIZE))
                .await?;
            if page.rows.is_empty() {
                break;
            }
            offset = offset.saturating_add(page.rows.len());
            for entry in &page.rows {
                documents.push(row_to_document(&self.spec, entry)?);
            }
            if page.num_rows_total.is_some_and(|total| offset >= total) {
                break;
            }
        }

        documents.truncate(limit);
        info!(
            dataset = self.spec.hub_id,
            split = %self.split,
            count = documents.len(),
            "fetched documents from hub"
        );
        Ok(documents)
    }

    fn describe(&self) -> String {
        format!("{}:{}:{}", self.spec.hub_id, self.spec.config, self.split)
    }
}

/// Map a hub row to a document using the catalog's field names.
///
/// List-valued text columns are joined with spaces.
///
/// # Errors
///
/// Returns [`SourceError::Malformed`] when the text column is missing or not text.
#[doc(hidden)]
pub fn row_to_document(spec: &DatasetSpec, entry: &RowEntry) -> Result<Document, SourceError> {
    let malformed = |reason: String| SourceError::Malformed {
        location: format!("{} row {}", spec.hub_id, entry.row_idx),
        reason,
    };

    let text = match entry.row.get(spec.text_field) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" "),
        Some(other) => {
            return Err(malformed(format!(
                "column '{}' is not text: {other}",
                spec.text_field
            )))
        }
        None => return Err(malformed(format!("missing column '{}'", spec.text_field))),
    };

    let id = spec
        .id_field
        .and_then(|field| entry.row.get(field))
        .and_then(value_to_id)
        .unwrap_or_else(|| entry.row_idx.to_string());

    Ok(Document::new(id, text))
}

fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
