//! Axum-based sponsor server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::RpcError;
use crate::handlers;
use crate::sponsor::SponsorService;

/// State shared by all handlers.
pub struct AppState {
    pub service: SponsorService,
}

/// Build the service router. Exposed so tests can drive it without a socket.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/eos/sign", post(handlers::sign))
        .route("/api/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct RpcServer {
    pub addr: SocketAddr,
    state: Arc<AppState>,
}

impl RpcServer {
    pub fn new(addr: SocketAddr, service: SponsorService) -> Self {
        Self {
            addr,
            state: Arc::new(AppState { service }),
        }
    }

    /// Serve until the process exits.
    pub async fn start(self) -> Result<(), RpcError> {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn start_with_shutdown<F>(self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {}: {e}", self.addr)))?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener
            .local_addr()
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!(
            addr = %local,
            sponsor = ?self.state.service.sponsor().map(ToString::to_string),
            "sponsor service listening"
        );
        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
