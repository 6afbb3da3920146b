use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tracing::{debug, info, warn};

use crate::models::Category;

/// Local file tree: `<root>/<category>/<identifier>`
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create every category partition. Safe to call repeatedly.
    pub async fn ensure_partitions(&self) -> io::Result<()> {
        for category in Category::ALL {
            let dir = self.root.join(category.as_str());
            fs::create_dir_all(&dir).await?;
            debug!(path = %dir.display(), "Storage partition ready");
        }
        info!(root = %self.root.display(), "Local storage initialized");
        Ok(())
    }

    pub fn path_for(&self, category: Category, identifier: &str) -> PathBuf {
        self.root.join(category.as_str()).join(identifier)
    }

    /// Open a fresh file for writing; fails if the name is already taken
    pub async fn create(&self, category: Category, identifier: &str) -> io::Result<(PathBuf, File)> {
        let path = self.path_for(category, identifier);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        Ok((path, file))
    }

    /// Open a stored file for reading, `None` if it does not exist
    pub async fn open(&self, category: Category, identifier: &str) -> io::Result<Option<File>> {
        let path = self.path_for(category, identifier);
        match File::open(&path).await {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Best-effort removal of a local copy
    pub async fn remove(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Failed to remove local copy");
            }
        }
    }
}
