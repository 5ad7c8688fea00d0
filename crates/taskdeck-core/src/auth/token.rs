//! Bearer credential storage.
//!
//! Persists the session credential in `<TASKDECK_HOME>/credentials.json` with
//! restricted permissions (0600). The token is opaque pass-through: no format
//! validation and no local expiry tracking. Expiry is only ever discovered
//! through a rejected authenticated call.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// Stored credential payload.
///
/// Exactly one key. The name is load-bearing: writer and reader must agree
/// on it, and it matches what the API hands back as `accessToken`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredential {
    access_token: String,
}

/// Single-slot store for the session credential.
///
/// At most one value is held; `save` overwrites any previous one.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore {
    /// Creates a store backed by the default credential path.
    pub fn new() -> Self {
        Self {
            path: paths::credentials_path(),
        }
    }

    /// Creates a store backed by a specific file path.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Persists the credential, overwriting any previous value.
    ///
    /// Writes with restricted permissions (0600) on Unix.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let payload = StoredCredential {
            access_token: token.to_string(),
        };
        let contents =
            serde_json::to_string_pretty(&payload).context("Failed to serialize credential")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }

    /// Returns the current credential, or `None` when absent.
    ///
    /// A missing, unreadable, or corrupt file is treated as absence.
    pub fn get(&self) -> Option<String> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let parsed: StoredCredential = match serde_json::from_str(&contents) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "credential file is corrupt; treating as signed out"
                );
                return None;
            }
        };

        let token = parsed.access_token;
        if token.trim().is_empty() {
            return None;
        }
        Some(token)
    }

    /// Removes the credential. Removing an already-absent credential is fine.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove credential at {}", self.path.display())),
        }
    }
}
