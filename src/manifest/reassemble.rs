use tracing::{debug, info, warn};

use crate::error::Result;

use super::structures::{Manifest, ManifestEntry};

/// Supplies the decoded bytes of one manifest entry.
///
/// The reassembler knows nothing about where payloads live; any closure
/// `FnMut(&ManifestEntry) -> Result<Vec<u8>>` is a loader.
pub trait SegmentLoader {
    fn load(&mut self, entry: &ManifestEntry) -> Result<Vec<u8>>;
}

impl<F> SegmentLoader for F
where
    F: FnMut(&ManifestEntry) -> Result<Vec<u8>>,
{
    fn load(&mut self, entry: &ManifestEntry) -> Result<Vec<u8>> {
        self(entry)
    }
}

/// Result of comparing the rebuilt length with the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integrity {
    Intact,
    SizeMismatch { expected: u64, actual: u64 },
}

impl Integrity {
    pub fn is_intact(&self) -> bool {
        matches!(self, Integrity::Intact)
    }
}

/// Rebuilt bytes plus the integrity verdict
#[derive(Debug, Clone)]
pub struct Reassembly {
    pub bytes: Vec<u8>,
    pub integrity: Integrity,
}

/// Concatenate every entry's payload in ascending offset order.
///
/// The manifest itself is left untouched; a stable sort over borrowed
/// entries decides the order, so entries sharing an offset keep their
/// listing order. A length that disagrees with `total_size` is reported
/// through [`Integrity::SizeMismatch`] and the bytes are still returned.
///
/// # Errors
///
/// Only failures of the loader itself are propagated.
pub fn reassemble<L: SegmentLoader>(manifest: &Manifest, mut loader: L) -> Result<Reassembly> {
    let mut ordered: Vec<&ManifestEntry> = manifest.parts.iter().collect();
    ordered.sort_by_key(|entry| entry.offset);

    let mut bytes = Vec::new();
    for entry in ordered {
        let data = loader.load(entry)?;
        if data.len() as u64 != entry.size {
            warn!(
                part = %entry.name,
                recorded = entry.size,
                loaded = data.len(),
                "segment size differs from manifest"
            );
        }
        debug!(part = %entry.name, offset = entry.offset, size = data.len(), "loaded segment");
        bytes.extend_from_slice(&data);
    }

    let actual = bytes.len() as u64;
    let integrity = if actual == manifest.total_size {
        info!(size = actual, "reassembled");
        Integrity::Intact
    } else {
        warn!(
            expected = manifest.total_size,
            actual, "reassembled size does not match original size"
        );
        Integrity::SizeMismatch {
            expected: manifest.total_size,
            actual,
        }
    };

    Ok(Reassembly { bytes, integrity })
}
