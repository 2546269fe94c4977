use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Result;
use crate::format::{Classification, MetaValue, Metadata};
use crate::segment::Segment;

/// Extension of the per-segment payload files
pub const PART_EXTENSION: &str = ".hex";

/// Index of every segment written for one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub original_file: String,
    pub file_type: String,
    pub extension: String,
    pub total_size: u64,
    /// RFC 3339 in UTC with millisecond precision, like the classification
    #[serde(serialize_with = "rfc3339_millis")]
    pub timestamp: DateTime<Utc>,
    /// Listing order; reassembly orders by offset instead
    pub parts: Vec<ManifestEntry>,
}

fn rfc3339_millis<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// One segment as recorded in a manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    /// Key under which the encoded payload is stored
    pub file: String,
    pub description: String,
    #[serde(default)]
    pub offset: u64,
    pub size: u64,
    #[serde(default)]
    pub metadata: Metadata,
}

impl ManifestEntry {
    pub fn from_segment(segment: &Segment<'_>) -> Self {
        Self {
            name: segment.name.clone(),
            file: format!("{}{PART_EXTENSION}", segment.name),
            description: segment.description.clone(),
            offset: segment.offset as u64,
            size: segment.len() as u64,
            metadata: segment.metadata.clone(),
        }
    }
}

impl Manifest {
    /// Bind `segments` to the classification of the buffer they came from.
    ///
    /// `total_size` is the classified buffer length, not the sum of the
    /// segments, so best-effort layouts keep the true original size.
    pub fn build(
        source_id: &str,
        classification: &Classification,
        segments: &[Segment<'_>],
    ) -> Self {
        let total_size = match classification.metadata.get("size") {
            Some(MetaValue::Number(size)) => *size,
            _ => segments.iter().map(|s| s.len() as u64).sum(),
        };

        Self {
            original_file: source_id.to_string(),
            file_type: classification.file_type.clone(),
            extension: classification.extension.clone(),
            total_size,
            timestamp: classification.timestamp,
            parts: segments.iter().map(ManifestEntry::from_segment).collect(),
        }
    }

    /// Sum of the recorded segment sizes
    pub fn parts_size(&self) -> u64 {
        self.parts.iter().map(|part| part.size).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
