//! Flat JSON document store
//!
//! The whole state lives in one file. Every mutation loads the document,
//! applies the change and persists it via write-to-staging + rename, all
//! under one lock, so readers never observe a half-applied change.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{Garden, GardenId, NewGarden, Tree, TreeRecord};
use crate::infrastructure::store::{staging_path, GardenDocument, StoreError, StoreResult};
use crate::infrastructure::traits::{FileSystem, GardenStore};

pub struct JsonFileGardenStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileGardenStore {
    /// Open (or initialize) the document at `path`.
    ///
    /// A missing file is created empty; an unreadable one is an error.
    pub fn open(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = Self {
            fs,
            path: path.into(),
            lock: Mutex::new(()),
        };
        {
            let _guard = store.lock()?;
            if store.fs.exists(&store.path) {
                store.load()?;
            } else {
                debug!("initializing json store at {}", store.path.display());
                store.persist(&GardenDocument::default())?;
            }
        }
        Ok(store)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|_| StoreError::Poisoned)
    }

    fn load(&self) -> StoreResult<GardenDocument> {
        if !self.fs.exists(&self.path) {
            return Ok(GardenDocument::default());
        }
        let content = self
            .fs
            .read_to_string(&self.path)
            .map_err(|e| StoreError::io(format!("read {}", self.path.display()), e))?;
        if content.trim().is_empty() {
            return Ok(GardenDocument::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn persist(&self, doc: &GardenDocument) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(doc)?;
        let staging = staging_path(&self.path);
        self.fs
            .ensure_parent(&self.path)
            .map_err(|e| StoreError::io(format!("create parent of {}", self.path.display()), e))?;
        self.fs
            .write(&staging, &content)
            .map_err(|e| StoreError::io(format!("write {}", staging.display()), e))?;
        self.fs
            .rename(&staging, &self.path)
            .map_err(|e| StoreError::io(format!("replace {}", self.path.display()), e))
    }

    fn read<R>(&self, f: impl FnOnce(&GardenDocument) -> StoreResult<R>) -> StoreResult<R> {
        let _guard = self.lock()?;
        f(&self.load()?)
    }

    fn update<R>(&self, f: impl FnOnce(&mut GardenDocument) -> StoreResult<R>) -> StoreResult<R> {
        let _guard = self.lock()?;
        let mut doc = self.load()?;
        let result = f(&mut doc)?;
        self.persist(&doc)?;
        Ok(result)
    }
}

impl GardenStore for JsonFileGardenStore {
    fn backend(&self) -> &'static str {
        "json"
    }

    fn insert_garden(&self, garden: &NewGarden, created_at: DateTime<Utc>) -> StoreResult<Garden> {
        self.update(|doc| doc.insert_garden(garden, created_at))
    }

    fn garden_id(&self, name: &str) -> StoreResult<Option<GardenId>> {
        self.read(|doc| Ok(doc.garden_id(name)))
    }

    fn list_gardens(&self) -> StoreResult<Vec<Garden>> {
        self.read(|doc| Ok(doc.list_gardens()))
    }

    fn count_gardens(&self) -> StoreResult<usize> {
        self.read(|doc| Ok(doc.count_gardens()))
    }

    fn trees(&self, garden_id: GardenId) -> StoreResult<Vec<Tree>> {
        self.read(|doc| doc.trees(garden_id))
    }

    fn upsert_tree(
        &self,
        garden_id: GardenId,
        record: &TreeRecord,
        now: DateTime<Utc>,
    ) -> StoreResult<Tree> {
        self.update(|doc| doc.upsert_tree(garden_id, record, now))
    }

    fn delete_garden(&self, garden_id: GardenId) -> StoreResult<bool> {
        let _guard = self.lock()?;
        let mut doc = self.load()?;
        if !doc.delete_garden(garden_id) {
            return Ok(false);
        }
        self.persist(&doc)?;
        Ok(true)
    }
}
