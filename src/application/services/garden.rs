//! Garden and tree use cases
//!
//! Resolves garden names, applies the upsert-merge rules and maps store
//! failures onto the application error taxonomy.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::seed::{sample_garden, SAMPLE_TREES};
use crate::domain::{group_by_status, Cell, Garden, GardenId, NewGarden, StatusGroups, Tree, TreeFields};
use crate::infrastructure::store::StoreError;
use crate::infrastructure::traits::GardenStore;

/// Counts reported by the debug endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GardenStats {
    pub gardens: usize,
    pub trees: usize,
}

/// Garden/tree service over an injected store.
#[derive(Clone)]
pub struct GardenService {
    store: Arc<dyn GardenStore>,
}

impl GardenService {
    /// Create a new garden service.
    pub fn new(store: Arc<dyn GardenStore>) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Create a garden.
    ///
    /// Fails with `Conflict` if the name is taken; the existing garden is untouched.
    #[instrument(skip(self))]
    pub fn create_garden(&self, name: &str, rows: i64, cols: i64) -> ApplicationResult<Garden> {
        let garden = NewGarden::try_new(name, rows, cols)?;
        self.insert(&garden)
    }

    fn insert(&self, garden: &NewGarden) -> ApplicationResult<Garden> {
        match self.store.insert_garden(garden, Utc::now()) {
            Ok(created) => {
                info!("created garden {:?} ({}x{})", created.name, created.rows, created.cols);
                Ok(created)
            }
            Err(StoreError::DuplicateGarden(name)) => Err(ApplicationError::Conflict(name)),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a garden together with all of its trees.
    #[instrument(skip(self))]
    pub fn delete_garden(&self, name: &str) -> ApplicationResult<()> {
        let id = self.resolve(name)?;
        if !self.store.delete_garden(id)? {
            return Err(ApplicationError::NotFound(name.to_string()));
        }
        info!("deleted garden {:?}", name);
        Ok(())
    }

    /// All gardens with their planted cells, newest first.
    pub fn list_gardens(&self) -> ApplicationResult<Vec<Garden>> {
        let gardens = self.store.list_gardens()?;
        debug!("list_gardens: {} gardens", gardens.len());
        Ok(gardens)
    }

    /// Create or fully replace the tree at `cell`.
    ///
    /// Scalars and harvest records are replaced as given (missing → empty);
    /// images become the kept list followed by the new uploads.
    #[instrument(skip(self, fields))]
    pub fn upsert_tree(
        &self,
        garden_name: &str,
        cell: Cell,
        fields: TreeFields,
    ) -> ApplicationResult<Tree> {
        let id = self.resolve(garden_name)?;
        let record = fields.into_record(cell);
        match self.store.upsert_tree(id, &record, Utc::now()) {
            Ok(tree) => {
                debug!("upserted tree at {} in {:?}", cell, garden_name);
                Ok(tree)
            }
            Err(StoreError::MissingGarden(_)) => {
                Err(ApplicationError::NotFound(garden_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Trees of a garden partitioned by status label.
    pub fn group_by_status(&self, garden_name: &str) -> ApplicationResult<StatusGroups> {
        let id = self.resolve(garden_name)?;
        let trees = match self.store.trees(id) {
            Ok(trees) => trees,
            Err(StoreError::MissingGarden(_)) => {
                return Err(ApplicationError::NotFound(garden_name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(group_by_status(trees))
    }

    /// Create the sample garden when the store holds no garden at all.
    ///
    /// Returns whether anything was created.
    #[instrument(skip(self))]
    pub fn seed_if_empty(&self) -> ApplicationResult<bool> {
        if self.store.count_gardens()? > 0 {
            debug!("seed skipped: store not empty");
            return Ok(false);
        }

        let garden = match self.insert(&sample_garden()) {
            Ok(garden) => garden,
            Err(ApplicationError::Conflict(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        for sample in SAMPLE_TREES {
            self.upsert_tree(&garden.name, sample.cell(), sample.fields())?;
        }
        info!("seeded sample garden {:?}", garden.name);
        Ok(true)
    }

    pub fn stats(&self) -> ApplicationResult<GardenStats> {
        let gardens = self.store.list_gardens()?;
        Ok(GardenStats {
            gardens: gardens.len(),
            trees: gardens.iter().map(|g| g.trees.len()).sum(),
        })
    }

    fn resolve(&self, name: &str) -> ApplicationResult<GardenId> {
        self.store
            .garden_id(name)?
            .ok_or_else(|| ApplicationError::NotFound(name.to_string()))
    }
}
