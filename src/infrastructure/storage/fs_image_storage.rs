use std::path::{Component, Path, PathBuf};

use anyhow::bail;
use async_trait::async_trait;

use crate::application::ports::image_storage::ImageStorage;

/// Image files kept on the local filesystem under `root`; `images/...` paths resolve below it.
pub struct FsImageStorage {
    root: PathBuf,
}

impl FsImageStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative_path: &str) -> anyhow::Result<PathBuf> {
        let rel = Path::new(relative_path);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            bail!("invalid storage path {relative_path}");
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl ImageStorage for FsImageStorage {
    async fn write(&self, relative_path: &str, bytes: &[u8]) -> anyhow::Result<()> {
        let full = self.resolve(relative_path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;
        Ok(())
    }

    async fn exists(&self, relative_path: &str) -> anyhow::Result<bool> {
        let full = self.resolve(relative_path)?;
        Ok(tokio::fs::try_exists(&full).await?)
    }

    async fn read(&self, relative_path: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let full = self.resolve(relative_path)?;
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn remove(&self, relative_path: &str) -> anyhow::Result<()> {
        let full = self.resolve(relative_path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
