pub mod handlers;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub use handlers::ApiState;

/// Build the full application router. Exposed so tests can serve it on
/// an ephemeral listener.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/status", get(handlers::handle_status))
        .route("/uploads", post(handlers::handle_upload_open))
        .route("/uploads", get(handlers::handle_upload_list))
        .route("/uploads/{id}", get(handlers::handle_upload_inspect))
        .route("/uploads/{id}", delete(handlers::handle_upload_abort))
        .route("/uploads/{id}/chunks", post(handlers::handle_upload_chunk))
        .route("/uploads/{id}/finalize", post(handlers::handle_upload_finalize))
        .route("/records", get(handlers::handle_records))
        .route("/daemon/shutdown", post(handlers::handle_shutdown))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(cors)
}

pub async fn serve(state: ApiState, port: u16) -> anyhow::Result<()> {
    let mut shutdown_rx = state.shutdown_tx.subscribe();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!(port, "API listening on 127.0.0.1");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await?;
    Ok(())
}
