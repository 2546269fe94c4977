mod local;

pub use local::{DirStore, read_source};

use anyhow::Result;
use async_trait::async_trait;

use crate::manifest::Manifest;

/// Name of the manifest inside a part directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Trait for persisting segment payloads and their manifest
#[async_trait]
pub trait PartStore: Send + Sync {
    /// Encode and store the bytes of one part under `file`
    async fn write_part(&self, file: &str, bytes: &[u8]) -> Result<()>;

    /// Load and decode the part stored under `file`
    async fn read_part(&self, file: &str) -> Result<Vec<u8>>;

    async fn write_manifest(&self, manifest: &Manifest) -> Result<()>;

    async fn read_manifest(&self) -> Result<Manifest>;
}
