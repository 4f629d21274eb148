//! HTTP surface (actix-web)
//!
//! JSON API under `/api`, uploaded photos under `/uploads`, and an optional
//! static front-end at `/`.

pub mod error;
pub mod handlers;

use actix_files::Files;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use tracing::{info, warn};

use crate::application::services::UPLOADS_ROUTE;
use crate::config::Settings;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::{InfraError, InfraResult};

pub use error::{ApiError, ApiResult};

/// Largest accepted body for raw uploads and form upserts.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Register API routes, the JSON error handler and static file services.
pub fn configure(cfg: &mut web::ServiceConfig, settings: &Settings) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .service(handlers::list_gardens)
    .service(handlers::create_garden)
    .service(handlers::delete_garden)
    .service(handlers::upsert_tree)
    .service(handlers::grouped)
    .service(handlers::upload)
    .service(handlers::backup)
    .service(handlers::debug_info);

    // A missing directory would make actix-files fall back to the cwd.
    if settings.uploads_dir.is_dir() {
        cfg.service(Files::new(UPLOADS_ROUTE, &settings.uploads_dir));
    } else {
        warn!("uploads dir {} missing, not serving it", settings.uploads_dir.display());
    }

    // Catch-all, so it goes last.
    match &settings.public_dir {
        Some(public) if public.is_dir() => {
            cfg.service(Files::new("/", public).index_file("index.html"));
        }
        Some(public) => warn!("public dir {} missing, not serving it", public.display()),
        None => {}
    }
}

/// Run the HTTP server until interrupted.
pub fn run(container: ServiceContainer) -> InfraResult<()> {
    let host = container.settings.host.clone();
    let port = container.settings.port;
    let state = web::Data::new(container);

    actix_web::rt::System::new().block_on(async move {
        let server = HttpServer::new(move || {
            let settings = state.settings.clone();
            App::new()
                .wrap(Logger::default())
                .app_data(state.clone())
                .configure(|cfg| configure(cfg, &settings))
        })
        .bind((host.as_str(), port))
        .map_err(|e| InfraError::Server {
            message: format!("cannot bind {host}:{port}: {e}"),
        })?;

        info!("listening on http://{host}:{port}");
        server
            .run()
            .await
            .map_err(|e| InfraError::io("http server", e))
    })
}
