//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (GardenStore, FileSystem)
//! but are themselves concrete structs, not traits.

mod backup;
mod garden;
mod uploads;

pub use backup::{BackupService, BackupSummary, BACKUP_FILE_NAME, SNAPSHOT_ENTRY};
pub use garden::{GardenService, GardenStats};
pub use uploads::{sanitize_file_name, UploadService, UPLOADS_ROUTE};
