//! Structural segmentation of classified buffers.
//!
//! Each [`Layout`] walks the framing of one container family and cuts the
//! buffer into named, offset-addressed [`Segment`]s:
//!
//! - [`jpeg`]: SOI header, optional APP1/EXIF block, entropy-coded data, EOI
//! - [`png`]: 8-byte signature followed by length-prefixed chunks
//! - [`mp4`]: top-level ISO BMFF boxes (MP4 and QuickTime)
//! - [`mp3`]: ID3v2 tag, audio frames, ID3v1 trailer
//! - [`pdf`]: text-anchored regions (header, `/Info`, body, trailer)
//! - [`generic`]: fixed header, bounded body chunks and footer
//!
//! Except for PDF, the segments of every layout partition the buffer: sorted
//! by offset they are contiguous, non-overlapping and cover every byte.
//! Corrupt or truncated framing never fails an extraction; walkers stop at
//! the last well-formed unit and hand the rest over as one trailing segment.

pub mod generic;
pub mod jpeg;
pub mod mp3;
pub mod mp4;
pub mod pdf;
pub mod png;

use std::collections::HashMap;
use std::ops::Range;

use tracing::debug;

use crate::format::{Classification, FileFormat, MetaValue, Metadata};

/// A named, contiguous byte range of a source buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<'a> {
    /// Unique within one extraction; doubles as a file name stem
    pub name: String,
    pub data: &'a [u8],
    pub description: String,
    /// Start of `data` within the source buffer
    pub offset: usize,
    pub metadata: Metadata,
}

impl<'a> Segment<'a> {
    /// Cut `range` out of `buffer`.
    ///
    /// The range is clamped to the buffer, so callers may pass raw lengths
    /// read from untrusted headers.
    pub fn new(
        name: impl Into<String>,
        buffer: &'a [u8],
        range: Range<usize>,
        description: impl Into<String>,
    ) -> Self {
        let end = range.end.min(buffer.len());
        let start = range.start.min(end);
        Self {
            name: name.into(),
            data: &buffer[start..end],
            description: description.into(),
            offset: start,
            metadata: Metadata::new(),
        }
    }

    /// Attach one metadata entry.
    pub fn with(mut self, key: &str, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// One past the last byte covered
    pub fn end(&self) -> usize {
        self.offset + self.data.len()
    }
}

/// Segmentation strategy, one per supported container family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Jpeg,
    Png,
    /// MP4 and QuickTime MOV
    IsoBmff,
    Mp3,
    Pdf,
    Generic,
}

impl Layout {
    /// Pick the layout for a classified format; anything without a
    /// dedicated walker is segmented generically.
    pub fn for_format(format: Option<FileFormat>) -> Self {
        match format {
            Some(FileFormat::Jpeg) => Layout::Jpeg,
            Some(FileFormat::Png) => Layout::Png,
            Some(FileFormat::Mp4 | FileFormat::Mov) => Layout::IsoBmff,
            Some(FileFormat::Mp3) => Layout::Mp3,
            Some(FileFormat::Pdf) => Layout::Pdf,
            _ => Layout::Generic,
        }
    }

    /// Whether the segments always partition the whole buffer.
    pub fn guarantees_coverage(&self) -> bool {
        !matches!(self, Layout::Pdf)
    }

    pub fn extract<'a>(&self, buffer: &'a [u8]) -> Vec<Segment<'a>> {
        match self {
            Layout::Jpeg => jpeg::extract(buffer),
            Layout::Png => png::extract(buffer),
            Layout::IsoBmff => mp4::extract(buffer),
            Layout::Mp3 => mp3::extract(buffer),
            Layout::Pdf => pdf::extract(buffer),
            Layout::Generic => generic::extract(buffer),
        }
    }
}

/// Segment `buffer` according to its classification.
pub fn extract<'a>(buffer: &'a [u8], classification: &Classification) -> Vec<Segment<'a>> {
    let format = classification
        .format
        .or_else(|| FileFormat::from_name(&classification.file_type));
    let layout = Layout::for_format(format);
    let segments = layout.extract(buffer);
    debug!(
        ?layout,
        file_type = %classification.file_type,
        segments = segments.len(),
        "extracted segments"
    );
    segments
}

/// Hands out segment names that stay unique when a container repeats a tag
/// (several `IDAT` chunks, several `free` boxes).
#[derive(Debug, Default)]
pub(crate) struct NameAllocator {
    seen: HashMap<String, usize>,
}

impl NameAllocator {
    /// `prefix` followed by the tag, lowercased, with anything that is not
    /// an ASCII letter or digit replaced so the name is a safe file stem.
    pub fn tagged(&mut self, prefix: &str, tag: &[u8]) -> String {
        let tag: String = tag
            .iter()
            .map(|&b| {
                if b.is_ascii_alphanumeric() {
                    b.to_ascii_lowercase() as char
                } else {
                    '_'
                }
            })
            .collect();
        self.unique(format!("{prefix}{tag}"))
    }

    pub fn unique(&mut self, name: String) -> String {
        let count = self.seen.entry(name.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            name
        } else {
            format!("{name}_{count}")
        }
    }
}

/// Printable form of a four-character code.
pub(crate) fn fourcc(tag: &[u8]) -> String {
    String::from_utf8_lossy(tag).into_owned()
}
