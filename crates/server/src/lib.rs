#![forbid(unsafe_code)]

mod config;
mod error;
mod handlers;
mod logging;
mod render;
mod state;
mod timefmt;
mod views;

pub use config::{LogFormat, ServerArgs};
pub use error::ApiError;
pub use logging::init_tracing;
pub use state::{AppState, UploadSettings};

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};

/// Room for multipart boundaries and the small text fields sent next to the
/// file; the file itself is held to `UploadSettings::max_bytes`.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_body_limit = state
        .uploads()
        .max_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/", get(handlers::pages::dashboard))
        .route("/cliente/nuevo", post(handlers::pages::new_client))
        .route("/cliente/:slug", get(handlers::pages::client_form))
        .route("/api/save", post(handlers::forms::save_step))
        .route(
            "/api/upload",
            post(handlers::uploads::upload).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route("/api/test-email", post(handlers::email::test_email))
        .route(
            "/api/clientes",
            get(handlers::clients::list).post(handlers::clients::create),
        )
        .route("/api/cliente/:id", delete(handlers::clients::soft_delete))
        .route("/api/cliente/:id/archivos", get(handlers::uploads::list_files))
        .route("/api/cliente/:id/formulario", get(handlers::forms::snapshot))
        .route("/api/cliente/:id/completar", post(handlers::forms::complete))
        .with_state(state)
}
