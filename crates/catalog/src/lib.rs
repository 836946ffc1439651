//! Online add-on catalog: HTTP client plus background sync that never blocks
//! or fails the caller.

pub mod client;
pub mod error;
pub mod sync;
pub mod types;

pub use {
    client::CatalogClient,
    error::{CatalogError, Result},
    sync::{CatalogSync, CatalogUpdate},
    types::{CatalogEntry, parse_entries},
};
