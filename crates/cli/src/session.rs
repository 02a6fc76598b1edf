use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::CliConfig;

/// Persisted session context: the bearer token plus account flags.
///
/// Commands that need authentication load this explicitly; `logout` clears
/// it. There is no other place the token lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    /// Account email the session belongs to.
    pub email: String,
    /// Bearer token issued by the backend.
    pub token: String,
    /// The backend requires a password reset before anything else.
    pub must_reset: bool,
    /// When the session was created.
    pub issued_at: DateTime<Utc>,
}

impl SessionContext {
    /// Create a fresh session context.
    pub fn new(email: &str, token: &str, must_reset: bool) -> Self {
        Self {
            email: email.to_string(),
            token: token.to_string(),
            must_reset,
            issued_at: Utc::now(),
        }
    }

    /// Return the session file path.
    pub fn session_path() -> Result<PathBuf> {
        Ok(CliConfig::ensure_config_dir()?.join("session.json"))
    }

    /// Save the session to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::session_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize session")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write session: {}", path.display()))?;
        debug!(email = %self.email, path = %path.display(), "Session saved");
        Ok(())
    }

    /// Load the persisted session, if any.
    pub fn load() -> Result<Option<Self>> {
        Self::load_from(&Self::session_path()?)
    }

    fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read session: {}", path.display()))?;
        let session: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse session: {}", path.display()))?;
        Ok(Some(session))
    }

    /// Load the session or fail with a "not logged in" error.
    pub fn require() -> Result<Self> {
        Self::load()?.context("not logged in (run `chanjo login`)")
    }

    /// Like [`require`], but also refuses sessions stuck behind a forced
    /// password reset.
    ///
    /// [`require`]: SessionContext::require
    pub fn require_active() -> Result<Self> {
        let session = Self::require()?;
        if session.must_reset {
            anyhow::bail!("password reset required (run `chanjo reset-password`)");
        }
        Ok(session)
    }

    /// Remove the persisted session. Returns whether one existed.
    pub fn clear() -> Result<bool> {
        let path = Self::session_path()?;
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("failed to remove session: {}", path.display()))?;
            debug!(path = %path.display(), "Session cleared");
            return Ok(true);
        }
        Ok(false)
    }
}
