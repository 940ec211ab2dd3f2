//! Persisted sign-in state.
//!
//! The app keeps a single saved session: the account email, its password,
//! and the last bearer token the server issued. The gateway reads it for
//! every call and rewrites it after a re-login.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The saved sign-in state.
///
/// Stored as plain JSON in the data directory; this file *is* the local
/// credential store, so keeping it readable only by the owning user is the
/// platform's job.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub email: String,
    pub password: String,
    pub token: String,
}

impl StoredSession {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            token: token.into(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }
}

impl std::fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSession")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Where the saved session lives.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredSession>>;
    fn save(&self, session: &StoredSession) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// File-backed token store: one `session.json` under the data directory.
pub struct JsonTokenStore {
    path: PathBuf,
}

impl JsonTokenStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data dir: {data_dir:?}"))?;
        Ok(Self {
            path: data_dir.join("session.json"),
        })
    }
}

impl TokenStore for JsonTokenStore {
    fn load(&self) -> Result<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file: {:?}", self.path))?;

        let session: StoredSession = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse session file: {:?}", self.path))?;

        Ok(Some(session))
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        let content =
            serde_json::to_string_pretty(session).context("Failed to serialize session")?;

        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write session file: {:?}", self.path))?;

        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to delete session file: {:?}", self.path))?;
        }
        Ok(())
    }
}

/// In-memory token store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    session: Mutex<Option<StoredSession>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: StoredSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<StoredSession>> {
        Ok(self.session.lock().expect("session lock poisoned").clone())
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        *self.session.lock().expect("session lock poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.session.lock().expect("session lock poisoned") = None;
        Ok(())
    }
}
