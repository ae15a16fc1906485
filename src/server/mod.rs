//! HTTP backend: company registration and login.
//!
//! Two JSON routes on top of the credential store, open to any origin.
//!
//! | Route | Success | Errors |
//! |---|---|---|
//! | `POST /api/register` | 201 `{message, id, nombre_empresa}` | 400, 409, 500 |
//! | `POST /api/login` | 200 `{message, nombre_empresa}` | 400, 401, 500 |
//!
//! Every error body is `{"error": "..."}`. Internal failures are logged here
//! and reported to the caller with a generic message.
use std::{future::Future, sync::Arc};

use anyhow::Result;
use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::post,
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

pub mod error;
pub mod routes;
pub mod state;

use crate::config::Config;
use routes::{login_handler, register_handler};
pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/api/register", post(register_handler))
        .route("/api/login", post(login_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server(config: Config) -> Result<()> {
    info!("Initializing state...");
    let state = AppState::new(config).await?;

    let address = state.config.bind_address();
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");
    info!("Routes: /api/register (POST) and /api/login (POST)");

    serve(listener, state, shutdown_signal()).await
}

/// Serve until `shutdown` resolves, then close the database handle
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state.clone()))
        .with_graceful_shutdown(shutdown)
        .await?;

    state.auth.database().close().await;
    info!("Database connection closed, server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => error!("Failed to listen for Ctrl+C: {e}"),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
