//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{BackupService, GardenService, UploadService};
use crate::config::Settings;
use crate::infrastructure::store::open_store;
use crate::infrastructure::traits::{FileSystem, GardenStore, RealFileSystem};
use crate::infrastructure::InfraResult;

/// Container holding all application services.
///
/// Built once at startup; the store handle it opens is shared by every
/// service and closed when the last clone of the container is dropped.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Persistence port
    pub store: Arc<dyn GardenStore>,

    pub gardens: GardenService,
    pub uploads: UploadService,
    pub backup: BackupService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let store = open_store(&settings, fs.clone())?;
        debug!("store opened: backend={}", store.backend());
        Ok(Self::with_deps(settings, fs, store))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        store: Arc<dyn GardenStore>,
    ) -> Self {
        let settings = Arc::new(settings);
        let gardens = GardenService::new(store.clone());
        let uploads = UploadService::new(fs.clone(), settings.clone());
        let backup = BackupService::new(gardens.clone(), settings.clone());

        Self {
            settings,
            fs,
            store,
            gardens,
            uploads,
            backup,
        }
    }
}
