//! BreedMatch HTTP Server
//!
//! Actix-web based HTML pages and JSON API

pub mod analytics;
pub mod charts;
pub mod error;
pub mod routes;
pub mod state;
pub mod templates;
pub mod types;

use actix_web::{web, App, HttpServer};
use breedmatch_common::{AppConfig, Result};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub use routes::configure;
pub use state::AppState;

/// Load every artifact, then serve until the process is stopped
///
/// Startup fails before binding when the dataset or the model bundle cannot
/// be loaded.
pub async fn start_server(config: AppConfig) -> Result<()> {
    let bind_addr = config.server_bind_address();
    let state = Arc::new(AppState::new(config)?);

    info!("Starting HTTP server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(Arc::clone(&state)))
            .configure(configure)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    info!("HTTP server stopped");
    Ok(())
}
