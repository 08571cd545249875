//! Filesystem asset store for uploaded audio
//!
//! Each upload lands at `<root>/<uuid>/<basename>`: the random key directory
//! keeps repeat uploads of the same filename apart, while the basename is kept
//! so downloads carry the name the client uploaded.

use crate::validation::sanitize_filename;
use crate::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// Asset store rooted at one directory
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

/// An opened stored file, ready to stream
#[derive(Debug)]
pub struct StoredAsset {
    pub file: fs::File,
    pub download_name: String,
    pub len: u64,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under a fresh key and return the storage path.
    ///
    /// The root directory is created if absent.
    pub async fn store(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let basename = sanitize_filename(filename)?;
        let key_dir = self.root.join(Uuid::new_v4().to_string());
        fs::create_dir_all(&key_dir).await?;

        let path = key_dir.join(basename);
        fs::write(&path, bytes).await?;

        debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Open a stored file for download
    pub async fn open(&self, path: &Path) -> Result<StoredAsset> {
        let file = match fs::File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::not_found(format!(
                    "Stored file {} is missing",
                    path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(Error::not_found(format!(
                "Stored file {} is missing",
                path.display()
            )));
        }

        let download_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "download".to_string());

        Ok(StoredAsset {
            file,
            download_name,
            len: metadata.len(),
        })
    }

    /// Best-effort removal of a stored file and its key directory.
    ///
    /// Failures are logged, never returned: the database row is the source of
    /// truth and a leftover blob is harmless.
    pub async fn remove(&self, path: &Path) {
        match fs::remove_file(path).await {
            Ok(()) => debug!("Removed stored file {}", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                warn!("Failed to remove stored file {}: {}", path.display(), e);
                return;
            }
        }

        // Only drop key directories that sit directly under our root
        if let Some(parent) = path.parent() {
            if parent.parent() == Some(self.root.as_path()) {
                if let Err(e) = fs::remove_dir(parent).await {
                    if e.kind() != ErrorKind::NotFound {
                        warn!("Failed to remove key directory {}: {}", parent.display(), e);
                    }
                }
            }
        }
    }
}
