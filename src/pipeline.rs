//! High-level convert/restore/scan operations over a [`PartStore`].
//!
//! These glue the synchronous engine (classifier, extractors, reassembler)
//! to asynchronous storage. Payloads are always loaded completely before
//! reassembly starts, so the engine never waits on I/O.

use std::collections::HashMap;

use anyhow::Result;
use tracing::info;

use crate::error::Error;
use crate::format::{Classification, Classifier, Clock};
use crate::io::PartStore;
use crate::manifest::{Integrity, Manifest, ManifestEntry, reassemble};
use crate::scan::{ScanReport, scan_segment};
use crate::segment;

/// Outcome of splitting one buffer into a store
#[derive(Debug, Clone)]
pub struct Conversion {
    pub classification: Classification,
    pub manifest: Manifest,
}

/// Outcome of rebuilding a file from a store
#[derive(Debug, Clone)]
pub struct Restoration {
    pub manifest: Manifest,
    pub bytes: Vec<u8>,
    pub integrity: Integrity,
    /// Classification of the rebuilt bytes
    pub classification: Classification,
}

/// Classify and segment `buffer`, then write every part and the manifest.
pub async fn convert<C: Clock, S: PartStore + ?Sized>(
    classifier: &Classifier<C>,
    buffer: &[u8],
    source_id: &str,
    store: &S,
) -> Result<Conversion> {
    let classification = classifier.classify(buffer, source_id);
    let segments = segment::extract(buffer, &classification);
    let manifest = Manifest::build(source_id, &classification, &segments);

    for (segment, entry) in segments.iter().zip(&manifest.parts) {
        store.write_part(&entry.file, segment.data).await?;
    }
    store.write_manifest(&manifest).await?;

    info!(
        source = source_id,
        file_type = %classification.file_type,
        parts = manifest.parts.len(),
        "converted"
    );
    Ok(Conversion {
        classification,
        manifest,
    })
}

/// Read the manifest and parts back and rebuild the original bytes.
///
/// `source_id` labels the re-classification of the rebuilt bytes.
pub async fn restore<C: Clock, S: PartStore + ?Sized>(
    classifier: &Classifier<C>,
    store: &S,
    source_id: &str,
) -> Result<Restoration> {
    let manifest = store.read_manifest().await?;

    let mut payloads = HashMap::with_capacity(manifest.parts.len());
    for entry in &manifest.parts {
        let bytes = store.read_part(&entry.file).await?;
        payloads.insert(entry.file.clone(), bytes);
    }

    let rebuilt = reassemble(&manifest, |entry: &ManifestEntry| {
        payloads
            .remove(&entry.file)
            .ok_or_else(|| Error::MissingSegment(entry.file.clone()))
    })?;

    let classification = classifier.classify(&rebuilt.bytes, source_id);
    Ok(Restoration {
        manifest,
        bytes: rebuilt.bytes,
        integrity: rebuilt.integrity,
        classification,
    })
}

/// Run the hidden-data scanner over every part listed in the manifest.
pub async fn scan<S: PartStore + ?Sized>(
    store: &S,
) -> Result<(Manifest, Vec<(ManifestEntry, ScanReport)>)> {
    let manifest = store.read_manifest().await?;
    let mut reports = Vec::with_capacity(manifest.parts.len());
    for entry in &manifest.parts {
        let bytes = store.read_part(&entry.file).await?;
        let report = scan_segment(&entry.name, &bytes);
        reports.push((entry.clone(), report));
    }
    Ok((manifest, reports))
}
