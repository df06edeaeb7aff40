//! Lectern Media - Normalization of lecture uploads via FFmpeg.
//!
//! Video lectures are split into a compressed Opus audio track and a
//! fast-forward visual track; audio is re-encoded; images, text, and PDFs
//! are copied into the library unchanged. Relies on an `ffmpeg` binary
//! being installed on the system.

mod error;
mod normalizer;

pub use error::{MediaError, MediaResult};
pub use normalizer::{MediaNormalizer, Normalized};
