//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested against temp directories or in-memory stores.

use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::domain::{Garden, GardenId, NewGarden, Tree, TreeRecord};
use crate::infrastructure::store::StoreResult;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Write raw bytes to file.
    fn write_bytes(&self, path: &Path, content: &[u8]) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Rename/move a file.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Persistence port for gardens and their trees.
///
/// Adapters must make each method a single atomic unit as seen by
/// concurrent callers.
pub trait GardenStore: Send + Sync {
    /// Short backend name, for diagnostics.
    fn backend(&self) -> &'static str;

    /// Insert a garden; a taken name fails with `StoreError::DuplicateGarden`.
    fn insert_garden(&self, garden: &NewGarden, created_at: DateTime<Utc>) -> StoreResult<Garden>;

    /// Resolve a garden name to its id.
    fn garden_id(&self, name: &str) -> StoreResult<Option<GardenId>>;

    /// All gardens with their trees, most recently created first.
    fn list_gardens(&self) -> StoreResult<Vec<Garden>>;

    fn count_gardens(&self) -> StoreResult<usize>;

    /// Trees of one garden in retrieval order.
    fn trees(&self, garden_id: GardenId) -> StoreResult<Vec<Tree>>;

    /// Create or replace the tree at `record.cell`.
    ///
    /// `created_at` of an existing tree is kept; `updated_at` becomes `now`.
    fn upsert_tree(
        &self,
        garden_id: GardenId,
        record: &TreeRecord,
        now: DateTime<Utc>,
    ) -> StoreResult<Tree>;

    /// Remove a garden and all of its trees. Returns false if it did not exist.
    fn delete_garden(&self, garden_id: GardenId) -> StoreResult<bool>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn write_bytes(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
