//! Best-effort hidden-data report for extracted segments.
//!
//! Metadata-like segments (name containing `metadata` or `exif`) are searched
//! for printable strings and a few well-known patterns. Header segments are
//! searched for signatures of other formats embedded inside them. Nothing
//! here fails on content; odd bytes simply produce an empty report.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::codec;

/// Bytes of a metadata segment inspected for text
const TEXT_SCAN_LIMIT: usize = 1000;

/// Printable strings reported per segment
const MAX_STRINGS: usize = 10;

/// Header bytes echoed as hex
const HEADER_PREVIEW: usize = 16;

static PRINTABLE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x20-\x7E]{4,}").expect("valid regex"));

static PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("GPS coordinates", r"(?i)GPS"),
        ("Camera make", r"(?i)(Canon|Nikon|Sony|Apple|Samsung)"),
        ("Software", r"(?i)(Photoshop|GIMP|Lightroom)"),
        ("Timestamps", r"\d{4}[:\-]\d{2}[:\-]\d{2}"),
        ("Email addresses", r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"),
        ("URLs", r"https?://\S+"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("valid regex")))
    .collect()
});

const EMBEDDED: &[(&str, &[u8])] = &[
    ("Embedded JPEG", &[0xFF, 0xD8, 0xFF]),
    ("Embedded PNG", &[0x89, 0x50, 0x4E, 0x47]),
    ("Embedded PDF", &[0x25, 0x50, 0x44, 0x46]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternHit {
    pub pattern: &'static str,
    pub matched: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddedSignature {
    pub name: &'static str,
    pub offset: usize,
}

/// Findings for one segment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub strings: Vec<String>,
    pub patterns: Vec<PatternHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_hex: Option<String>,
    pub embedded: Vec<EmbeddedSignature>,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
            && self.patterns.is_empty()
            && self.header_hex.is_none()
            && self.embedded.is_empty()
    }
}

/// Scan the payload of the segment called `name`.
pub fn scan_segment(name: &str, bytes: &[u8]) -> ScanReport {
    let mut report = ScanReport::default();

    if name.contains("metadata") || name.contains("exif") {
        let text = String::from_utf8_lossy(&bytes[..bytes.len().min(TEXT_SCAN_LIMIT)]);
        report.strings = PRINTABLE_RUN
            .find_iter(&text)
            .take(MAX_STRINGS)
            .map(|m| m.as_str().to_string())
            .collect();
        report.patterns = PATTERNS
            .iter()
            .filter_map(|(pattern, regex)| {
                regex.find(&text).map(|m| PatternHit {
                    pattern: *pattern,
                    matched: m.as_str().to_string(),
                })
            })
            .collect();
    }

    if name.contains("header") {
        report.header_hex = Some(codec::encode(&bytes[..bytes.len().min(HEADER_PREVIEW)]));
        report.embedded = find_embedded(bytes);
    }

    report
}

fn find_embedded(bytes: &[u8]) -> Vec<EmbeddedSignature> {
    EMBEDDED
        .iter()
        .flat_map(|&(name, pattern)| {
            bytes
                .windows(pattern.len())
                .enumerate()
                .filter(move |(_, window)| *window == pattern)
                .map(move |(offset, _)| EmbeddedSignature { name, offset })
        })
        .collect()
}
