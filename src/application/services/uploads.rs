//! Uploaded photo storage
//!
//! Files are written once under the uploads directory; the model only ever
//! sees the returned public path.

use std::sync::{Arc, LazyLock};

use chrono::Utc;
use regex::Regex;
use tracing::debug;

use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::DomainError;
use crate::infrastructure::traits::FileSystem;

/// URL prefix under which uploaded files are served.
pub const UPLOADS_ROUTE: &str = "/uploads";

static UNSAFE_FILE_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9._-]").expect("fail to create the file name filter")
});

#[derive(Clone)]
pub struct UploadService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl UploadService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Store an uploaded file and return its public path.
    ///
    /// The stored name is `<unix-millis>-<sanitized original name>`.
    pub fn store(&self, original_name: &str, bytes: &[u8]) -> ApplicationResult<String> {
        let name = sanitize_file_name(original_name)?;
        let stored = format!("{}-{}", Utc::now().timestamp_millis(), name);

        let dir = &self.settings.uploads_dir;
        self.fs
            .create_dir_all(dir)
            .with_path_context("create uploads dir", dir)?;
        let target = dir.join(&stored);
        self.fs
            .write_bytes(&target, bytes)
            .with_path_context("write upload", &target)?;

        debug!("stored upload {} ({} bytes)", target.display(), bytes.len());
        Ok(format!("{UPLOADS_ROUTE}/{stored}"))
    }
}

/// Reduce a client-supplied file name to a safe single path component.
///
/// Directory parts are dropped and characters outside `[A-Za-z0-9._-]`
/// become `_`. Names that end up empty or all dots are rejected.
pub fn sanitize_file_name(raw: &str) -> ApplicationResult<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();

    let cleaned = UNSAFE_FILE_CHARS.replace_all(base, "_").into_owned();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        return Err(DomainError::InvalidFileName(raw.to_string()).into());
    }
    Ok(cleaned)
}
