//! Lectern Gemini - Generative Language API integration.
//!
//! This crate provides an async client for the Generative Language API:
//! resumable file uploads, free-text generation, and schema-constrained
//! JSON output, all under a uniform fixed-delay retry policy.

mod client;
mod error;
mod model;
mod retry;
mod types;

pub use client::{mime_for_path, GeminiClient};
pub use error::{GeminiError, GeminiResult};
pub use model::GenerativeModel;
pub use retry::RetryPolicy;
pub use types::{FileData, FileHandle, Part};
