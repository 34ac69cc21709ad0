//! JSON-file session store under the user's home directory.

use async_trait::async_trait;
use inkpress_types::{AccessCredential, Draft, GatewayError, SessionStore, traits::Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk shape of the session file. Unknown fields from newer versions
/// are dropped rather than rejected.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    credential: Option<AccessCredential>,
    #[serde(default)]
    drafts: Vec<Draft>,
}

/// A [`SessionStore`] persisting to a single JSON file, by default
/// `~/.inkpress/session.json`.
///
/// Reads tolerate a missing file (fresh install) and writes create parent
/// directories as needed. Corrupt files are treated as empty and logged,
/// never propagated: losing a session is recoverable, wedging the client
/// on startup is not.
pub struct JsonSessionStore {
    path: PathBuf,
}

impl JsonSessionStore {
    /// Creates a store at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the default location under the home directory.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] when the home directory is unknown.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(crate::paths::session_path()?))
    }

    /// The file this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<SessionFile> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SessionFile::default());
            }
            Err(e) => {
                return Err(GatewayError::Storage(format!(
                    "read {}: {e}",
                    self.path.display()
                )));
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(file) => Ok(file),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt session file, starting empty");
                Ok(SessionFile::default())
            }
        }
    }

    async fn write(&self, file: &SessionFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| GatewayError::Storage(format!("mkdir {}: {e}", parent.display())))?;
        }
        let bytes = serde_json::to_vec_pretty(file)
            .map_err(|e| GatewayError::Storage(format!("encode session: {e}")))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| GatewayError::Storage(format!("write {}: {e}", self.path.display())))
    }
}

#[async_trait]
impl SessionStore for JsonSessionStore {
    async fn load_credential(&self) -> Result<Option<AccessCredential>> {
        Ok(self.read().await?.credential)
    }

    async fn save_credential(&self, credential: &AccessCredential) -> Result<()> {
        let mut file = self.read().await?;
        file.credential = Some(credential.clone());
        self.write(&file).await
    }

    async fn clear_credential(&self) -> Result<()> {
        let mut file = self.read().await?;
        file.credential = None;
        self.write(&file).await
    }

    async fn load_drafts(&self) -> Result<Vec<Draft>> {
        Ok(self.read().await?.drafts)
    }

    async fn save_drafts(&self, drafts: &[Draft]) -> Result<()> {
        let mut file = self.read().await?;
        file.drafts = drafts.to_vec();
        self.write(&file).await
    }
}
