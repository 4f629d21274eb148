//! Store adapters behind the `GardenStore` port
//!
//! - `sqlite`: embedded relational database (default)
//! - `json_file`: single JSON document on disk
//! - `memory`: process-local, for tests and throwaway runs

mod error;
mod json_file;
mod memory;
mod sqlite;

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{Settings, StorageBackend};
use crate::domain::{Garden, GardenId, NewGarden, Tree, TreeRecord};
use crate::infrastructure::traits::{FileSystem, GardenStore};

pub use error::{StoreError, StoreResult};
pub use json_file::JsonFileGardenStore;
pub use memory::MemoryGardenStore;
pub use sqlite::SqliteGardenStore;

/// Open the store selected in settings, running schema setup where needed.
pub fn open_store(
    settings: &Settings,
    fs: Arc<dyn FileSystem>,
) -> StoreResult<Arc<dyn GardenStore>> {
    let store: Arc<dyn GardenStore> = match settings.backend {
        StorageBackend::Sqlite => Arc::new(SqliteGardenStore::open(settings.sqlite_path())?),
        StorageBackend::Json => Arc::new(JsonFileGardenStore::open(fs, settings.json_path())?),
        StorageBackend::Memory => Arc::new(MemoryGardenStore::new()),
    };
    Ok(store)
}

/// Whole-state document used by the memory and JSON-file adapters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GardenDocument {
    #[serde(default)]
    next_id: GardenId,
    #[serde(default)]
    gardens: Vec<Garden>,
}

impl GardenDocument {
    pub(crate) fn insert_garden(
        &mut self,
        garden: &NewGarden,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Garden> {
        if self.gardens.iter().any(|g| g.name == garden.name) {
            return Err(StoreError::DuplicateGarden(garden.name.clone()));
        }
        let max_id = self.gardens.iter().map(|g| g.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id) + 1;

        let created = Garden {
            id: self.next_id,
            name: garden.name.clone(),
            rows: garden.rows,
            cols: garden.cols,
            created_at,
            trees: Vec::new(),
        };
        self.gardens.push(created.clone());
        Ok(created)
    }

    pub(crate) fn garden_id(&self, name: &str) -> Option<GardenId> {
        self.gardens.iter().find(|g| g.name == name).map(|g| g.id)
    }

    pub(crate) fn list_gardens(&self) -> Vec<Garden> {
        let mut gardens = self.gardens.clone();
        gardens.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        gardens
    }

    pub(crate) fn count_gardens(&self) -> usize {
        self.gardens.len()
    }

    pub(crate) fn trees(&self, garden_id: GardenId) -> StoreResult<Vec<Tree>> {
        self.gardens
            .iter()
            .find(|g| g.id == garden_id)
            .map(|g| g.trees.clone())
            .ok_or(StoreError::MissingGarden(garden_id))
    }

    pub(crate) fn upsert_tree(
        &mut self,
        garden_id: GardenId,
        record: &TreeRecord,
        now: DateTime<Utc>,
    ) -> StoreResult<Tree> {
        let garden = self
            .gardens
            .iter_mut()
            .find(|g| g.id == garden_id)
            .ok_or(StoreError::MissingGarden(garden_id))?;

        let position = garden.trees.iter().position(|t| t.cell() == record.cell);
        let created_at = position
            .map(|i| garden.trees[i].created_at)
            .unwrap_or(now);
        let tree = Tree {
            row: record.cell.row,
            col: record.cell.col,
            variety: record.variety.clone(),
            status: record.status.clone(),
            notes: record.notes.clone(),
            images: record.images.clone(),
            harvest_info: record.harvest_info.clone(),
            created_at,
            updated_at: now,
        };

        match position {
            Some(i) => garden.trees[i] = tree.clone(),
            None => garden.trees.push(tree.clone()),
        }
        Ok(tree)
    }

    pub(crate) fn delete_garden(&mut self, garden_id: GardenId) -> bool {
        let before = self.gardens.len();
        self.gardens.retain(|g| g.id != garden_id);
        self.gardens.len() != before
    }
}

/// Path of a sibling file used for write-then-rename persistence.
pub(crate) fn staging_path(path: &Path) -> std::path::PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
