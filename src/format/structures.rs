use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Number of leading bytes compared against binary signatures
pub const HEADER_WINDOW: usize = 64;

/// Number of leading bytes decoded for text-based detection
pub const TEXT_WINDOW: usize = 100;

/// A metadata value: a count/size, some other number, or free text.
///
/// Extractors only produce `Number` and `Text`; `Decimal` keeps manifests
/// edited by other tools readable when they hold negative or fractional
/// numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Number(u64),
    Decimal(serde_json::Number),
    Text(String),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Number(n) => write!(f, "{n}"),
            MetaValue::Decimal(n) => write!(f, "{n}"),
            MetaValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for MetaValue {
    fn from(value: u64) -> Self {
        MetaValue::Number(value)
    }
}

impl From<usize> for MetaValue {
    fn from(value: usize) -> Self {
        MetaValue::Number(value as u64)
    }
}

impl From<u32> for MetaValue {
    fn from(value: u32) -> Self {
        MetaValue::Number(value as u64)
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

/// Key/value metadata attached to classifications and segments
pub type Metadata = BTreeMap<String, MetaValue>;

/// One byte-pattern condition of a signature group
#[derive(Debug, Clone, Copy)]
pub struct Condition {
    pub pattern: &'static [u8],
    pub offset: usize,
}

impl Condition {
    pub const fn at(offset: usize, pattern: &'static [u8]) -> Self {
        Self { pattern, offset }
    }

    /// True if `pattern` appears at `offset` in `window`.
    ///
    /// A window too short to hold the pattern is a plain mismatch.
    pub fn matches(&self, window: &[u8]) -> bool {
        window
            .get(self.offset..self.offset + self.pattern.len())
            .is_some_and(|bytes| bytes == self.pattern)
    }
}

/// Registry entry describing how a format is recognised
#[derive(Debug, Clone, Copy)]
pub struct FormatDescriptor {
    pub format: FileFormat,
    /// Alternative groups; every condition in a group must match
    pub groups: &'static [&'static [Condition]],
    /// Detector for markup formats without binary magic
    pub text_check: Option<fn(&str) -> bool>,
}

impl FormatDescriptor {
    pub fn matches_binary(&self, window: &[u8]) -> bool {
        self.groups
            .iter()
            .any(|group| group.iter().all(|condition| condition.matches(window)))
    }

    pub fn matches_text(&self, text: &str) -> bool {
        self.text_check.is_some_and(|check| check(text))
    }
}

/// Every format the registry knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    WebP,
    Mov,
    Mp4,
    Avi,
    Mkv,
    Pdf,
    Svg,
    Mp3,
    Wav,
    Flac,
    Ogg,
    Docx,
    Xlsx,
    Pptx,
    Doc,
    Xls,
    Ppt,
    Zip,
    Rar,
    SevenZip,
    Tar,
    Gzip,
    Ico,
    Heic,
    Exe,
    Ttf,
    Otf,
    Sqlite,
    Psd,
    Midi,
    Wmv,
    Flv,
}

impl FileFormat {
    /// Type label as written to manifests
    pub fn name(&self) -> &'static str {
        match self {
            FileFormat::Jpeg => "JPEG",
            FileFormat::Png => "PNG",
            FileFormat::Gif => "GIF",
            FileFormat::Bmp => "BMP",
            FileFormat::Tiff => "TIFF",
            FileFormat::WebP => "WebP",
            FileFormat::Mov => "MOV",
            FileFormat::Mp4 => "MP4",
            FileFormat::Avi => "AVI",
            FileFormat::Mkv => "MKV",
            FileFormat::Pdf => "PDF",
            FileFormat::Svg => "SVG",
            FileFormat::Mp3 => "MP3",
            FileFormat::Wav => "WAV",
            FileFormat::Flac => "FLAC",
            FileFormat::Ogg => "OGG",
            FileFormat::Docx => "DOCX",
            FileFormat::Xlsx => "XLSX",
            FileFormat::Pptx => "PPTX",
            FileFormat::Doc => "DOC",
            FileFormat::Xls => "XLS",
            FileFormat::Ppt => "PPT",
            FileFormat::Zip => "ZIP",
            FileFormat::Rar => "RAR",
            FileFormat::SevenZip => "7Z",
            FileFormat::Tar => "TAR",
            FileFormat::Gzip => "GZIP",
            FileFormat::Ico => "ICO",
            FileFormat::Heic => "HEIC",
            FileFormat::Exe => "EXE",
            FileFormat::Ttf => "TTF",
            FileFormat::Otf => "OTF",
            FileFormat::Sqlite => "SQLite",
            FileFormat::Psd => "PSD",
            FileFormat::Midi => "MIDI",
            FileFormat::Wmv => "WMV",
            FileFormat::Flv => "FLV",
        }
    }

    /// Default extension, including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Jpeg => ".jpg",
            FileFormat::Png => ".png",
            FileFormat::Gif => ".gif",
            FileFormat::Bmp => ".bmp",
            FileFormat::Tiff => ".tiff",
            FileFormat::WebP => ".webp",
            FileFormat::Mov => ".mov",
            FileFormat::Mp4 => ".mp4",
            FileFormat::Avi => ".avi",
            FileFormat::Mkv => ".mkv",
            FileFormat::Pdf => ".pdf",
            FileFormat::Svg => ".svg",
            FileFormat::Mp3 => ".mp3",
            FileFormat::Wav => ".wav",
            FileFormat::Flac => ".flac",
            FileFormat::Ogg => ".ogg",
            FileFormat::Docx => ".docx",
            FileFormat::Xlsx => ".xlsx",
            FileFormat::Pptx => ".pptx",
            FileFormat::Doc => ".doc",
            FileFormat::Xls => ".xls",
            FileFormat::Ppt => ".ppt",
            FileFormat::Zip => ".zip",
            FileFormat::Rar => ".rar",
            FileFormat::SevenZip => ".7z",
            FileFormat::Tar => ".tar",
            FileFormat::Gzip => ".gz",
            FileFormat::Ico => ".ico",
            FileFormat::Heic => ".heic",
            FileFormat::Exe => ".exe",
            FileFormat::Ttf => ".ttf",
            FileFormat::Otf => ".otf",
            FileFormat::Sqlite => ".db",
            FileFormat::Psd => ".psd",
            FileFormat::Midi => ".mid",
            FileFormat::Wmv => ".wmv",
            FileFormat::Flv => ".flv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            FileFormat::Jpeg => "image/jpeg",
            FileFormat::Png => "image/png",
            FileFormat::Gif => "image/gif",
            FileFormat::Bmp => "image/bmp",
            FileFormat::Tiff => "image/tiff",
            FileFormat::WebP => "image/webp",
            FileFormat::Mov => "video/quicktime",
            FileFormat::Mp4 => "video/mp4",
            FileFormat::Avi => "video/x-msvideo",
            FileFormat::Mkv => "video/x-matroska",
            FileFormat::Pdf => "application/pdf",
            FileFormat::Svg => "image/svg+xml",
            FileFormat::Mp3 => "audio/mpeg",
            FileFormat::Wav => "audio/wav",
            FileFormat::Flac => "audio/flac",
            FileFormat::Ogg => "audio/ogg",
            FileFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            FileFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            FileFormat::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            FileFormat::Doc => "application/msword",
            FileFormat::Xls => "application/vnd.ms-excel",
            FileFormat::Ppt => "application/vnd.ms-powerpoint",
            FileFormat::Zip => "application/zip",
            FileFormat::Rar => "application/x-rar-compressed",
            FileFormat::SevenZip => "application/x-7z-compressed",
            FileFormat::Tar => "application/x-tar",
            FileFormat::Gzip => "application/gzip",
            FileFormat::Ico => "image/x-icon",
            FileFormat::Heic => "image/heic",
            FileFormat::Exe => "application/x-msdownload",
            FileFormat::Ttf => "font/ttf",
            FileFormat::Otf => "font/otf",
            FileFormat::Sqlite => "application/x-sqlite3",
            FileFormat::Psd => "image/vnd.adobe.photoshop",
            FileFormat::Midi => "audio/midi",
            FileFormat::Wmv => "video/x-ms-wmv",
            FileFormat::Flv => "video/x-flv",
        }
    }

    /// Look a format up by its type label.
    pub fn from_name(name: &str) -> Option<Self> {
        super::signatures::SIGNATURES
            .iter()
            .map(|descriptor| descriptor.format)
            .find(|format| format.name() == name)
    }

    /// Enrich `base` with format-specific keys derived from the header window.
    ///
    /// Keys written here replace base keys of the same name.
    pub fn describe(&self, header: &[u8], mut base: Metadata) -> Metadata {
        let byte = |i: usize| header.get(i).copied().unwrap_or(0);

        base.insert("mimeType".into(), self.mime_type().into());
        match self {
            FileFormat::Jpeg => {
                let details = if byte(3) == 0xE0 {
                    "JFIF format"
                } else {
                    "EXIF format"
                };
                base.insert("details".into(), details.into());
            }
            FileFormat::Gif => {
                let version = if byte(4) == b'7' { "GIF87a" } else { "GIF89a" };
                base.insert("version".into(), version.into());
            }
            FileFormat::Bmp => {
                if let Some(size) = base.get("size").cloned() {
                    base.insert("fileSize".into(), size);
                }
            }
            FileFormat::Tiff => {
                let endianness = if byte(0) == 0x49 {
                    "Little-endian"
                } else {
                    "Big-endian"
                };
                base.insert("endianness".into(), endianness.into());
            }
            FileFormat::Pdf => {
                let version = format!("{}.{}", byte(5) as char, byte(7) as char);
                base.insert("version".into(), version.into());
                base.insert(
                    "note".into(),
                    "May also be an Adobe Illustrator (.ai) file".into(),
                );
            }
            other => {
                if let Some(details) = other.details() {
                    base.insert("details".into(), details.into());
                }
            }
        }
        base
    }

    fn details(&self) -> Option<&'static str> {
        let details = match self {
            FileFormat::Png => "PNG image",
            FileFormat::WebP => "WebP image",
            FileFormat::Mov => "QuickTime MOV",
            FileFormat::Mp4 => "MPEG-4 video",
            FileFormat::Avi => "AVI video",
            FileFormat::Mkv => "Matroska video",
            FileFormat::Svg => "Scalable Vector Graphics",
            FileFormat::Mp3 => "MP3 audio",
            FileFormat::Wav => "WAV audio",
            FileFormat::Flac => "FLAC audio",
            FileFormat::Ogg => "Ogg Vorbis audio",
            FileFormat::Docx | FileFormat::Doc => "Microsoft Word document",
            FileFormat::Xlsx | FileFormat::Xls => "Microsoft Excel spreadsheet",
            FileFormat::Pptx | FileFormat::Ppt => "Microsoft PowerPoint presentation",
            FileFormat::Zip => "ZIP archive",
            FileFormat::Rar => "RAR archive",
            FileFormat::SevenZip => "7-Zip archive",
            FileFormat::Tar => "TAR archive",
            FileFormat::Gzip => "GZIP compressed file",
            FileFormat::Ico => "Icon file",
            FileFormat::Heic => "High Efficiency Image File Format",
            FileFormat::Exe => "Windows executable",
            FileFormat::Ttf => "TrueType Font",
            FileFormat::Otf => "OpenType Font",
            FileFormat::Sqlite => "SQLite database",
            FileFormat::Psd => "Adobe Photoshop document",
            FileFormat::Midi => "MIDI file",
            FileFormat::Wmv => "Windows Media Video",
            FileFormat::Flv => "Flash Video",
            FileFormat::Jpeg
            | FileFormat::Gif
            | FileFormat::Bmp
            | FileFormat::Tiff
            | FileFormat::Pdf => return None,
        };
        Some(details)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
