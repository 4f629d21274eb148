//! Process-local store

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::domain::{Garden, GardenId, NewGarden, Tree, TreeRecord};
use crate::infrastructure::store::{GardenDocument, StoreError, StoreResult};
use crate::infrastructure::traits::GardenStore;

/// Store keeping everything in memory; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryGardenStore {
    doc: Mutex<GardenDocument>,
}

impl MemoryGardenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn doc(&self) -> StoreResult<MutexGuard<'_, GardenDocument>> {
        self.doc.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl GardenStore for MemoryGardenStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn insert_garden(&self, garden: &NewGarden, created_at: DateTime<Utc>) -> StoreResult<Garden> {
        self.doc()?.insert_garden(garden, created_at)
    }

    fn garden_id(&self, name: &str) -> StoreResult<Option<GardenId>> {
        Ok(self.doc()?.garden_id(name))
    }

    fn list_gardens(&self) -> StoreResult<Vec<Garden>> {
        Ok(self.doc()?.list_gardens())
    }

    fn count_gardens(&self) -> StoreResult<usize> {
        Ok(self.doc()?.count_gardens())
    }

    fn trees(&self, garden_id: GardenId) -> StoreResult<Vec<Tree>> {
        self.doc()?.trees(garden_id)
    }

    fn upsert_tree(
        &self,
        garden_id: GardenId,
        record: &TreeRecord,
        now: DateTime<Utc>,
    ) -> StoreResult<Tree> {
        self.doc()?.upsert_tree(garden_id, record, now)
    }

    fn delete_garden(&self, garden_id: GardenId) -> StoreResult<bool> {
        Ok(self.doc()?.delete_garden(garden_id))
    }
}
