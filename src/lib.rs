//! # h3x
//!
//! Split binary files into format-aware hex segments and put them back
//! together byte-for-byte.
//!
//! The engine identifies a buffer's container format from its magic bytes,
//! then walks the container's own framing to cut it into named,
//! offset-addressed segments (header, metadata block, payload, trailer...).
//! Each segment is stored as hex text and indexed by a JSON manifest, which
//! is all that is needed to rebuild the original file.
//!
//! ## Features
//!
//! - Signature registry covering images, audio, video, documents, archives,
//!   fonts and executables, with a text fallback for SVG/XML
//! - Structural segmentation for JPEG/EXIF, PNG chunks, MP4/MOV boxes,
//!   MP3/ID3 tags and PDF regions, plus a generic fallback
//! - Lossless reassembly ordered purely by segment offset
//! - Best-effort hidden-data report on metadata and header segments
//!
//! ## Example
//!
//! ```no_run
//! use h3x::{Classifier, DirStore, pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let bytes = tokio::fs::read("photo.jpg").await?;
//!     let store = DirStore::new("photo_parts");
//!
//!     let conversion = pipeline::convert(&Classifier::new(), &bytes, "photo.jpg", &store).await?;
//!     for part in &conversion.manifest.parts {
//!         println!("{} @ {} ({} bytes)", part.name, part.offset, part.size);
//!     }
//!
//!     let restored = pipeline::restore(&Classifier::new(), &store, "photo.jpg").await?;
//!     assert_eq!(restored.bytes, bytes);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod codec;
pub mod error;
pub mod format;
pub mod io;
pub mod manifest;
pub mod pipeline;
pub mod scan;
pub mod segment;

pub use cli::Cli;
pub use error::{Error, Result};
pub use format::{Classification, Classifier, Clock, FileFormat, FixedClock, SystemClock};
pub use io::{DirStore, PartStore};
pub use manifest::{Integrity, Manifest, ManifestEntry, reassemble};
pub use segment::{Layout, Segment, extract};
