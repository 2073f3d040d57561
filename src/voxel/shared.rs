//! Brick store shared across chunk generation workers.
//!
//! Planning a brick only samples the height source, so it runs outside the
//! lock. Applying the planned writes takes the lock, which serializes chunk
//! generation calls against each other and against every other access.

use std::sync::{Mutex, MutexGuard};

use glam::{IVec3, UVec3};

use crate::terrain::{plan_brick, HeightSource};
use super::brick_store::BrickStore;
use super::coord::brick_in_bounds;

#[derive(Debug)]
pub struct SharedBrickStore {
    dimensions: UVec3,
    store: Mutex<BrickStore>,
}

impl SharedBrickStore {
    pub fn new(store: BrickStore) -> Self {
        Self {
            dimensions: store.dimensions(),
            store: Mutex::new(store),
        }
    }

    /// Lock the store for direct access. Poisoned locks are recovered.
    pub fn lock(&self) -> MutexGuard<'_, BrickStore> {
        self.store.lock().unwrap_or_else(|poisoned| {
            log::warn!("Brick store lock was poisoned by a panicked writer");
            poisoned.into_inner()
        })
    }

    /// Whether a writer panicked while holding the lock
    pub fn is_poisoned(&self) -> bool {
        self.store.is_poisoned()
    }

    /// Generate terrain for one brick. Safe to call from many threads.
    pub fn generate_chunk<S: HeightSource + ?Sized>(&self, coord: IVec3, source: &S) -> bool {
        if !brick_in_bounds(coord, self.dimensions) {
            return false;
        }
        let writes = plan_brick(coord, source);
        self.lock().apply_chunk(coord, &writes)
    }

    pub fn into_inner(self) -> BrickStore {
        self.store.into_inner().unwrap_or_else(|poisoned| {
            log::warn!("Recovered brick store from a poisoned lock");
            poisoned.into_inner()
        })
    }
}
