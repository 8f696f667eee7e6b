//! Filesystem-backed preference store and script catalog.

pub mod catalog_dir;
pub mod json_prefs;

pub use catalog_dir::{CatalogError, DirCatalog};
pub use json_prefs::{JsonFileStore, StoreError};
