use anyhow::Context;
use axum::routing::get;
use axum::Router;
use std::future::Future;

use super::handlers;
use super::AppState;

/// All dashboard routes, mounted under the configured root.
pub fn router(state: AppState) -> Router {
    let root = state.root().to_string();

    let pages = Router::new()
        .route("/", get(handlers::dashboard))
        .route("/status", get(handlers::status_index))
        .route("/status/", get(handlers::status_index))
        .route("/status/:pool", get(handlers::status_pool))
        .route("/usage/", get(handlers::usage_index))
        .route("/usage/:pool", get(handlers::usage_pool))
        .route("/statistics", get(handlers::statistics))
        .route("/logs", get(handlers::logs))
        .route("/about", get(handlers::about))
        .route("/locate", get(handlers::locate).post(handlers::locate))
        .route("/enclosure", get(handlers::enclosure));

    if root.is_empty() {
        return pages.with_state(state);
    }

    // nesting maps "/" to "<root>" only, the dashboard answers "<root>/" too
    Router::new()
        .route(&format!("{}/", root), get(handlers::dashboard))
        .nest(&root, pages)
        .with_state(state)
}

/// Serve the dashboard until `shutdown` completes.
pub async fn serve<F>(state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = state.config.www.bind;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Dashboard listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Dashboard server failed")?;

    log::info!("Dashboard stopped");
    Ok(())
}
