//! Error types for the h3x engine.

/// Errors that can cross the engine boundary.
///
/// Malformed container framing is never reported here: extractors absorb it
/// and return the segments they could derive. Storage I/O belongs to the
/// [`PartStore`](crate::io::PartStore) implementations and is reported
/// through `anyhow` there.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A token in a hex payload was not a two-digit hex byte
    #[error("Invalid hex token {token:?} at position {position}")]
    InvalidHex { position: usize, token: String },

    /// The manifest could not be encoded or decoded
    #[error("Invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    /// A manifest entry had no payload available to the loader
    #[error("Missing segment payload: {0}")]
    MissingSegment(String),
}

pub type Result<T> = std::result::Result<T, Error>;
