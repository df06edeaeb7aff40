//! Lectern Core - Core types and domain models for the Lectern lecture archive.

mod types;

pub use types::*;
