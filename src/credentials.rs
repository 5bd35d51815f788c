//! Credential loading from a `.env` file and the process environment.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};

/// Keys read from the process environment when the `.env` file lacks them.
const ENV_KEYS: [&str; 1] = [crate::providers::router::OPENAI_API_KEY];

/// API credentials for hosted model backends.
#[derive(Clone, Default)]
pub struct Credentials {
    vars: BTreeMap<String, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("keys", &self.vars.keys().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Build credentials from a key-value map.
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Returns a non-empty credential value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Returns a required credential or an error when missing.
    ///
    /// # Errors
    ///
    /// Returns an error when the key does not exist in loaded credentials.
    pub fn require(&self, key: &str) -> anyhow::Result<String> {
        self.get(key)
            .map(str::to_owned)
            .ok_or_else(|| anyhow::anyhow!("missing required credential: {key}"))
    }

    /// Fill keys missing from the map using a resolver (normally `std::env::var`).
    fn fill_from(&mut self, env: impl Fn(&str) -> Option<String>) {
        for key in ENV_KEYS {
            if self.get(key).is_none() {
                if let Some(value) = env(key) {
                    self.vars.insert(key.to_owned(), value);
                }
            }
        }
    }
}

/// Load credentials from a `.env` file.
///
/// # Errors
///
/// Returns an error if the file does not exist or cannot be parsed.
pub fn load_credentials(path: &Path) -> anyhow::Result<Credentials> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "credentials file does not exist: {}",
            path.display()
        ));
    }

    warn_if_shared(path);

    let mut vars = BTreeMap::new();
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("failed to read credentials at {}", path.display()))?;

    for item in iter {
        let (key, value) = item.with_context(|| {
            format!(
                "failed to parse key-value entry in credentials file {}",
                path.display()
            )
        })?;
        vars.insert(key, value);
    }

    Ok(Credentials { vars })
}

/// Load credentials from `path` when it exists, then fill gaps from the environment.
///
/// # Errors
///
/// Returns an error only when an existing file cannot be parsed.
pub fn load_or_env(path: &Path) -> anyhow::Result<Credentials> {
    let mut credentials = if path.exists() {
        load_credentials(path)?
    } else {
        debug!(path = %path.display(), "no credentials file, using process environment");
        Credentials::default()
    };
    credentials.fill_from(|key| std::env::var(key).ok());
    Ok(credentials)
}

#[cfg(unix)]
fn warn_if_shared(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(metadata) = fs::metadata(path) {
        let mode = metadata.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            warn!(path = %path.display(), mode = format!("{mode:o}"), "credentials file is readable by other users");
        }
    }
}

#[cfg(not(unix))]
fn warn_if_shared(_path: &Path) {}
