//! Catalog Client
//!
//! Data access for the catalog HTTP API and the state behind a searchable,
//! paginated, virtualized item list. Nothing here depends on a UI toolkit;
//! a front end feeds key presses in and renders [`ListingState`] out.

pub mod client;
pub mod error;
pub mod listing;

pub use client::{CatalogClient, ItemsData, ListParams, DEFAULT_BASE_URL};
pub use error::ClientError;
pub use listing::{FetchOutcome, FetchRequest, ListView, ListingState, VirtualWindow, PAGE_LIMIT};
