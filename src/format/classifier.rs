use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::debug;

use super::signatures::{header_window, identify};
use super::structures::{FileFormat, Metadata};

/// Type label used when no signature matches
pub const UNKNOWN_NAME: &str = "Unknown";

/// Extension used when no signature matches
pub const UNKNOWN_EXTENSION: &str = ".bin";

/// Source of the timestamp stamped onto classifications
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant, for reproducible output
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Outcome of classifying a buffer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Matched format, `None` for unknown input
    #[serde(skip)]
    pub format: Option<FileFormat>,
    pub file_type: String,
    pub extension: String,
    #[serde(skip)]
    pub timestamp: DateTime<Utc>,
    pub metadata: Metadata,
}

impl Classification {
    pub fn is_unknown(&self) -> bool {
        self.format.is_none()
    }
}

/// Classifies buffers against the signature registry.
#[derive(Debug, Clone, Default)]
pub struct Classifier<C: Clock = SystemClock> {
    clock: C,
}

impl Classifier<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> Classifier<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Classify `buffer`, identified by `source_id` in the metadata.
    ///
    /// The result always carries `filePath`, `size` and `timestamp`; a match
    /// adds the format's own keys on top, replacing base keys on collision.
    pub fn classify(&self, buffer: &[u8], source_id: &str) -> Classification {
        let timestamp = self.clock.now();

        let mut base = Metadata::new();
        base.insert("filePath".into(), source_id.into());
        base.insert("size".into(), buffer.len().into());
        base.insert(
            "timestamp".into(),
            timestamp
                .to_rfc3339_opts(SecondsFormat::Millis, true)
                .into(),
        );

        match identify(buffer) {
            Some(descriptor) => {
                let format = descriptor.format;
                debug!(%format, source = source_id, size = buffer.len(), "classified");
                Classification {
                    format: Some(format),
                    file_type: format.name().to_string(),
                    extension: format.extension().to_string(),
                    timestamp,
                    metadata: format.describe(header_window(buffer), base),
                }
            }
            None => {
                debug!(source = source_id, size = buffer.len(), "no signature matched");
                Classification {
                    format: None,
                    file_type: UNKNOWN_NAME.to_string(),
                    extension: UNKNOWN_EXTENSION.to_string(),
                    timestamp,
                    metadata: base,
                }
            }
        }
    }
}
