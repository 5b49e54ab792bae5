//! Web layer module
//!
//! This module provides the HTTP interface for the VIN cache. Handlers are
//! thin: they extract path parameters, call a service and let
//! [`responses`] map errors to status codes.
//!
//! # Routes
//!
//! - `GET /lookup/:vin` - cache-aside VIN lookup
//! - `DELETE /remove/:vin` - evict a VIN from the cache
//! - `GET /export` - download every cached record
//! - `GET /health` - store connectivity check

use anyhow::Result;
use axum::{
    routing::{delete, get},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::WebConfig,
    repositories::VinCacheStore,
    services::{ExportService, LookupService},
};

pub mod handlers;
pub mod responses;

pub use responses::ErrorResponse;

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: &WebConfig, state: AppState) -> Result<Self> {
        let app = Self::create_router(state);
        let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

        Ok(Self { app, addr })
    }

    /// Create the router with all routes and middleware
    pub fn create_router(state: AppState) -> Router {
        Router::new()
            .route("/lookup/:vin", get(handlers::lookup::lookup_vin))
            .route("/remove/:vin", delete(handlers::lookup::remove_vin))
            .route("/export", get(handlers::export::export_cache))
            .route("/health", get(handlers::health::health_check))
            // Middleware (applied in reverse order)
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Serve until `shutdown_signal` resolves, then drain in-flight requests
    pub async fn serve_with_shutdown<F>(self, shutdown_signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.addr, e))?;

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal)
            .await?;
        Ok(())
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn VinCacheStore>,
    pub lookup_service: LookupService,
    pub export_service: ExportService,
}
