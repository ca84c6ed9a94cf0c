#![forbid(unsafe_code)]

use clap::Parser;
use ob_core::StepSchema;
use ob_server::{AppState, ServerArgs, UploadSettings, build_router, init_tracing};
use ob_storage::SqliteStore;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ServerArgs::parse();
    init_tracing(args.log_format);

    let store = SqliteStore::open(&args.storage_dir, StepSchema::onboarding())?;
    let upload_dir = args.upload_dir();
    std::fs::create_dir_all(&upload_dir)?;
    info!(
        db = %store.db_path().display(),
        uploads = %upload_dir.display(),
        max_upload_bytes = args.max_upload_bytes,
        "storage ready"
    );

    let state = AppState::new(
        store,
        UploadSettings {
            dir: upload_dir,
            max_bytes: args.max_upload_bytes,
        },
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!(addr = %args.bind, "ob_server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("ob_server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
}
