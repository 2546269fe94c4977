//! Format identification from magic bytes.
//!
//! ## Architecture
//!
//! - [`structures`]: the format enum, signature conditions and metadata values
//! - [`signatures`]: the priority-ordered registry and the two-pass matcher
//! - [`classifier`]: builds a [`Classification`] for a whole buffer
//!
//! ## Matching
//!
//! Only the first 64 bytes are compared against binary signatures. A group
//! of conditions matches when every pattern is found at its offset; the first
//! matching entry in registry order wins. If nothing binary matches, the first
//! 100 bytes are decoded as lossy UTF-8 and handed to the text detectors
//! (currently SVG/XML only).

mod classifier;
mod signatures;
mod structures;

pub use classifier::{
    Classification, Classifier, Clock, FixedClock, SystemClock, UNKNOWN_EXTENSION, UNKNOWN_NAME,
};
pub use signatures::{SIGNATURES, header_window, identify, match_binary, match_text};
pub use structures::*;
