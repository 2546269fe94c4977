use super::{MANIFEST_FILE, PartStore};
use crate::codec;
use crate::manifest::Manifest;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Read a whole source file into memory
pub async fn read_source(path: &Path) -> Result<Vec<u8>> {
    fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Part directory on the local filesystem
///
/// Parts are stored as hex text files next to a pretty-printed
/// `manifest.json`.
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `file` inside the store, refusing anything that would escape it
    fn resolve(&self, file: &str) -> Result<PathBuf> {
        let relative = Path::new(file);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            bail!("Refusing part path outside the store: {file}");
        }
        Ok(self.root.join(relative))
    }

    async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create {}", self.root.display()))
    }
}

#[async_trait]
impl PartStore for DirStore {
    async fn write_part(&self, file: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(file)?;
        self.ensure_root().await?;
        fs::write(&path, codec::encode(bytes))
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    async fn read_part(&self, file: &str) -> Result<Vec<u8>> {
        let path = self.resolve(file)?;
        let text = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read part {}", path.display()))?;
        codec::decode(&text).with_context(|| format!("Corrupt part {}", path.display()))
    }

    async fn write_manifest(&self, manifest: &Manifest) -> Result<()> {
        self.ensure_root().await?;
        let path = self.root.join(MANIFEST_FILE);
        fs::write(&path, manifest.to_json()?)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    async fn read_manifest(&self) -> Result<Manifest> {
        let path = self.root.join(MANIFEST_FILE);
        let json = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        Manifest::from_json(&json).with_context(|| format!("Invalid manifest {}", path.display()))
    }
}
