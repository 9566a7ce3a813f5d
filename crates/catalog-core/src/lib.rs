//! Catalog Core
//!
//! Item model, flat JSON file storage, listing queries and statistics for the
//! catalog service. The HTTP layer lives in `catalog-server`; this crate has no
//! knowledge of requests or responses.

pub mod error;
pub mod id;
pub mod item;
pub mod query;
pub mod stats;
pub mod store;

pub use error::{CatalogError, Result};
pub use id::IdGenerator;
pub use item::{Item, NewItem};
pub use query::{find_item, paginate, parse_lenient_int, ItemQuery, Page};
pub use stats::{compute_stats, StatsCache, StatsLookup, StatsSnapshot};
pub use store::{ItemStore, JsonFileStore, MemoryStore};
