//! The signature registry.
//!
//! Entries are scanned top to bottom and the first fully matching group wins,
//! so the table order is the tie-break between formats that share a prefix.
//! DOCX, XLSX, PPTX and ZIP all start with `PK\x03\x04`; DOCX is listed first
//! and therefore claims every ZIP-framed input. DOC, XLS and PPT share the
//! OLE2 compound-file magic in the same way. MOV must precede MP4 because
//! MP4 only checks the `ftyp` box, which also leaves HEIC unreachable.

use tracing::trace;

use super::structures::{Condition, FileFormat, FormatDescriptor, HEADER_WINDOW, TEXT_WINDOW};

const ZIP_LOCAL_HEADER: &[u8] = b"PK\x03\x04";
const OLE2: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const RIFF: &[u8] = b"RIFF";
const FTYP: &[u8] = b"ftyp";

macro_rules! descriptor {
    ($format:expr, [$([$($offset:expr => $pattern:expr),+ $(,)?]),* $(,)?]) => {
        FormatDescriptor {
            format: $format,
            groups: &[$(&[$(Condition::at($offset, $pattern)),+]),*],
            text_check: None,
        }
    };
}

fn looks_like_svg(text: &str) -> bool {
    text.contains("<svg") || text.contains("<?xml")
}

/// All known formats in match priority order
pub static SIGNATURES: &[FormatDescriptor] = &[
    // Images
    descriptor!(FileFormat::Jpeg, [[0 => &[0xFF, 0xD8, 0xFF]]]),
    descriptor!(
        FileFormat::Png,
        [[0 => &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]]]
    ),
    descriptor!(FileFormat::Gif, [[0 => b"GIF8"]]),
    descriptor!(FileFormat::Bmp, [[0 => b"BM"]]),
    descriptor!(
        FileFormat::Tiff,
        [[0 => &[0x49, 0x49, 0x2A, 0x00]], [0 => &[0x4D, 0x4D, 0x00, 0x2A]]]
    ),
    descriptor!(FileFormat::WebP, [[0 => RIFF, 8 => b"WEBP"]]),
    // Video
    descriptor!(FileFormat::Mov, [[4 => FTYP, 8 => b"qt  "]]),
    descriptor!(FileFormat::Mp4, [[4 => FTYP]]),
    descriptor!(FileFormat::Avi, [[0 => RIFF, 8 => b"AVI "]]),
    descriptor!(FileFormat::Mkv, [[0 => &[0x1A, 0x45, 0xDF, 0xA3]]]),
    // Vector
    descriptor!(FileFormat::Pdf, [[0 => b"%PDF-"]]),
    FormatDescriptor {
        format: FileFormat::Svg,
        groups: &[],
        text_check: Some(looks_like_svg),
    },
    // Audio
    descriptor!(FileFormat::Mp3, [[0 => b"ID3"]]),
    descriptor!(FileFormat::Wav, [[0 => RIFF, 8 => b"WAVE"]]),
    descriptor!(FileFormat::Flac, [[0 => b"fLaC"]]),
    descriptor!(FileFormat::Ogg, [[0 => b"OggS"]]),
    // Documents
    descriptor!(FileFormat::Docx, [[0 => ZIP_LOCAL_HEADER]]),
    descriptor!(FileFormat::Xlsx, [[0 => ZIP_LOCAL_HEADER]]),
    descriptor!(FileFormat::Pptx, [[0 => ZIP_LOCAL_HEADER]]),
    descriptor!(FileFormat::Doc, [[0 => OLE2]]),
    descriptor!(FileFormat::Xls, [[0 => OLE2]]),
    descriptor!(FileFormat::Ppt, [[0 => OLE2]]),
    // Archives
    descriptor!(FileFormat::Zip, [[0 => ZIP_LOCAL_HEADER]]),
    descriptor!(FileFormat::Rar, [[0 => b"Rar!"]]),
    descriptor!(
        FileFormat::SevenZip,
        [[0 => &[0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C]]]
    ),
    // Lies beyond the header window, so never matches
    descriptor!(FileFormat::Tar, [[257 => b"ustar"]]),
    descriptor!(FileFormat::Gzip, [[0 => &[0x1F, 0x8B]]]),
    descriptor!(FileFormat::Ico, [[0 => &[0x00, 0x00, 0x01, 0x00]]]),
    descriptor!(FileFormat::Heic, [[4 => b"ftypheic"]]),
    // Executables
    descriptor!(FileFormat::Exe, [[0 => b"MZ"]]),
    // Fonts
    descriptor!(FileFormat::Ttf, [[0 => &[0x00, 0x01, 0x00, 0x00]]]),
    descriptor!(FileFormat::Otf, [[0 => b"OTTO"]]),
    // Database
    descriptor!(FileFormat::Sqlite, [[0 => b"SQLite format 3\x00"]]),
    descriptor!(FileFormat::Psd, [[0 => b"8BPS"]]),
    descriptor!(FileFormat::Midi, [[0 => b"MThd"]]),
    descriptor!(
        FileFormat::Wmv,
        [[0 => &[
            0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62,
            0xCE, 0x6C,
        ]]]
    ),
    descriptor!(FileFormat::Flv, [[0 => b"FLV"]]),
];

/// The leading window compared against binary signatures.
pub fn header_window(buffer: &[u8]) -> &[u8] {
    &buffer[..buffer.len().min(HEADER_WINDOW)]
}

/// Find the first descriptor whose binary signature matches `window`.
pub fn match_binary(window: &[u8]) -> Option<&'static FormatDescriptor> {
    SIGNATURES
        .iter()
        .find(|descriptor| descriptor.matches_binary(window))
}

/// Find the first descriptor whose text detector accepts `text`.
pub fn match_text(text: &str) -> Option<&'static FormatDescriptor> {
    SIGNATURES
        .iter()
        .find(|descriptor| descriptor.matches_text(text))
}

/// Identify `buffer`: binary magic first, then text detectors.
///
/// Binary signatures always outrank text detection. The text pass decodes
/// the leading bytes lossily, so invalid UTF-8 never fails the lookup.
pub fn identify(buffer: &[u8]) -> Option<&'static FormatDescriptor> {
    if let Some(descriptor) = match_binary(header_window(buffer)) {
        trace!(format = %descriptor.format, "binary signature matched");
        return Some(descriptor);
    }

    let leading = &buffer[..buffer.len().min(TEXT_WINDOW)];
    let text = String::from_utf8_lossy(leading);
    let found = match_text(text.trim());
    if let Some(descriptor) = found {
        trace!(format = %descriptor.format, "text detector matched");
    }
    found
}
