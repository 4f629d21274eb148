//! Zip backup of the current state and uploaded photos
//!
//! Point-in-time export, not a transactional backup: writes that land while
//! the archive is being built may or may not be included.

use std::fs::File;
use std::io::{self, Cursor, Seek, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::application::services::GardenService;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;

/// File name offered for download.
pub const BACKUP_FILE_NAME: &str = "saurieng_backup.zip";

/// Archive entry holding the gardens snapshot.
pub const SNAPSHOT_ENTRY: &str = "gardens.json";

/// What went into an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupSummary {
    pub gardens: usize,
    pub images: usize,
}

#[derive(Clone)]
pub struct BackupService {
    gardens: GardenService,
    settings: Arc<Settings>,
}

impl BackupService {
    pub fn new(gardens: GardenService, settings: Arc<Settings>) -> Self {
        Self { gardens, settings }
    }

    /// Write the archive: `gardens.json` plus every file under `uploads/`.
    #[instrument(skip(self, writer))]
    pub fn export<W: Write + Seek>(&self, writer: W) -> ApplicationResult<BackupSummary> {
        let gardens = self.gardens.list_gardens()?;
        let snapshot = serde_json::to_vec_pretty(&gardens).map_err(|e| {
            ApplicationError::OperationFailed {
                context: "serialize gardens snapshot".to_string(),
                source: Box::new(e),
            }
        })?;

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(writer);
        zip.start_file(SNAPSHOT_ENTRY, options).map_err(zip_err)?;
        zip.write_all(&snapshot)
            .map_err(|e| zip_err(zip::result::ZipError::Io(e)))?;

        let images = self.add_uploads(&mut zip, options)?;
        zip.finish().map_err(zip_err)?;

        let summary = BackupSummary {
            gardens: gardens.len(),
            images,
        };
        info!(
            "backup written: {} gardens, {} images",
            summary.gardens, summary.images
        );
        Ok(summary)
    }

    /// Build the archive in memory.
    pub fn export_to_vec(&self) -> ApplicationResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.export(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Write the archive to a file, replacing any existing one.
    pub fn export_to_path(&self, path: &Path) -> ApplicationResult<BackupSummary> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_path_context("create backup dir", parent)?;
        }
        let file = File::create(path).with_path_context("create backup", path)?;
        self.export(file)
    }

    fn add_uploads<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> ApplicationResult<usize> {
        let root = &self.settings.uploads_dir;
        if !root.is_dir() {
            debug!("no uploads dir at {}", root.display());
            return Ok(0);
        }

        let mut count = 0;
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| ApplicationError::OperationFailed {
                context: format!("walk {}", root.display()),
                source: Box::new(e),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(root) else {
                continue;
            };
            let name = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            zip.start_file(format!("uploads/{name}"), options)
                .map_err(zip_err)?;
            let mut file = File::open(entry.path()).with_path_context("open upload", entry.path())?;
            io::copy(&mut file, zip).with_path_context("archive upload", entry.path())?;
            count += 1;
        }
        Ok(count)
    }
}

fn zip_err(e: zip::result::ZipError) -> ApplicationError {
    ApplicationError::OperationFailed {
        context: "write backup archive".to_string(),
        source: Box::new(e),
    }
}
