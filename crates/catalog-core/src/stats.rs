//! Collection statistics and their in-memory cache
//!
//! The snapshot is computed from the full collection and then held until
//! something calls [`StatsCache::invalidate`]. Writes to the store do not
//! touch the cache on their own, so a cached snapshot can lag behind the file.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::item::Item;
use crate::store::ItemStore;

/// Aggregate over the collection at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total: usize,
    pub average_price: f64,
    pub cached_at: DateTime<Utc>,
}

/// A snapshot plus whether it came from the cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsLookup {
    #[serde(flatten)]
    pub snapshot: StatsSnapshot,
    pub cached: bool,
}

/// Count and mean price. The mean of an empty collection is 0.
pub fn compute_stats(items: &[Item]) -> StatsSnapshot {
    let total = items.len();
    let average_price = if total == 0 {
        0.0
    } else {
        items.iter().map(Item::price_or_zero).sum::<f64>() / total as f64
    };

    StatsSnapshot {
        total,
        average_price,
        cached_at: Utc::now(),
    }
}

/// Memoized statistics snapshot
#[derive(Debug, Default)]
pub struct StatsCache {
    value: Mutex<Option<StatsSnapshot>>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve the cached snapshot, loading it from `store` on a miss.
    ///
    /// A failed load leaves the cache empty.
    pub fn get_or_load(&self, store: &dyn ItemStore) -> Result<StatsLookup> {
        let mut slot = self.slot();
        if let Some(snapshot) = slot.as_ref() {
            return Ok(StatsLookup {
                snapshot: snapshot.clone(),
                cached: true,
            });
        }

        let snapshot = load_into(&mut slot, store)?;
        Ok(StatsLookup {
            snapshot,
            cached: false,
        })
    }

    /// Recompute unconditionally, replacing whatever is cached.
    ///
    /// A failed load clears the cache.
    pub fn refresh(&self, store: &dyn ItemStore) -> Result<StatsSnapshot> {
        let mut slot = self.slot();
        load_into(&mut slot, store)
    }

    /// Drop the cached snapshot so the next lookup reloads it
    pub fn invalidate(&self) {
        *self.slot() = None;
        tracing::debug!("Stats cache invalidated");
    }

    /// Current cached snapshot, if any
    pub fn peek(&self) -> Option<StatsSnapshot> {
        self.slot().clone()
    }

    fn slot(&self) -> MutexGuard<'_, Option<StatsSnapshot>> {
        // The slot is only ever replaced whole, so a poisoned lock is still usable.
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_into(
    slot: &mut MutexGuard<'_, Option<StatsSnapshot>>,
    store: &dyn ItemStore,
) -> Result<StatsSnapshot> {
    match store.read_all() {
        Ok(items) => {
            let snapshot = compute_stats(&items);
            tracing::debug!(
                total = snapshot.total,
                average_price = snapshot.average_price,
                "Stats recomputed"
            );
            **slot = Some(snapshot.clone());
            Ok(snapshot)
        }
        Err(e) => {
            tracing::error!("Error reading or parsing items: {}", e);
            **slot = None;
            Err(e)
        }
    }
}
