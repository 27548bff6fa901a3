use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info};

use crate::cache::token::Credential;

/// On-disk copy of a vendor credential, used to warm the cache after a restart.
///
/// File layout: `{"token": "...", "expires_at": <unix seconds>}`.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file is not an error.
    pub async fn load(&self) -> Result<Option<Credential>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "token file absent");
                return Ok(None);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading token file {}", self.path.display()))
            }
        };
        let credential: Credential = serde_json::from_str(&content)
            .with_context(|| format!("decoding token file {}", self.path.display()))?;
        Ok(Some(credential))
    }

    /// Atomic write: tmp file with 0600 permissions, then rename over the target.
    pub async fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating token dir {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("tmp");
        let content = serde_json::to_vec(credential)?;
        fs::write(&tmp, content)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }

        fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("renaming {} to {}", tmp.display(), self.path.display()))?;
        info!(path = %self.path.display(), "token persisted");
        Ok(())
    }
}
