//! Shared test setup: logging and throwaway settings

use std::env;
use std::path::Path;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::config::{Settings, StorageBackend};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "debug");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Settings rooted in `root`: data under `root/data`, uploads under
/// `root/uploads`, no seeding, ephemeral port.
pub fn settings_in(root: &Path, backend: StorageBackend) -> Settings {
    Settings {
        data_dir: root.join("data"),
        uploads_dir: root.join("uploads"),
        public_dir: None,
        backend,
        host: "127.0.0.1".into(),
        port: 0,
        seed_on_start: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_root_when_building_settings_then_paths_live_under_it() {
        init_test_setup();
        let settings = settings_in(Path::new("/tmp/x"), StorageBackend::Json);
        assert_eq!(settings.json_path(), Path::new("/tmp/x/data/gardens.json"));
        assert_eq!(settings.uploads_dir, Path::new("/tmp/x/uploads"));
    }
}
