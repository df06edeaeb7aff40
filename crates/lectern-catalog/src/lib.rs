//! Lectern Catalog - Single-file JSON persistence for lecture records.

mod catalog;
mod error;

pub use catalog::Catalog;
pub use error::{CatalogError, CatalogResult};
