use std::sync::Arc;
use std::error::Error;
use tokio::net::TcpListener;
use axum::{Router, routing::{get, post}};
use tracing::info;

use crate::config::ServerConfig;
use crate::labels::LabelTable;
use super::routes;
use super::types::AppState;

/// HTTP server exposing the classification skeleton
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    /// # Arguments
    ///
    /// * `config` - Bind address and the classifier name to announce
    /// * `labels` - Label table shared by all requests
    /// * `default_k` - k used when a request does not specify one
    pub fn new(config: ServerConfig, labels: Arc<LabelTable>, default_k: usize) -> Self {
        info!("Creating new API server on {}:{}", config.host, config.port);
        Self {
            state: AppState {
                config: Arc::new(config),
                labels,
                default_k,
            },
        }
    }

    /// Builds the router without binding a socket.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(routes::index))
            .route("/classify", post(routes::classify))
            .with_state(self.state.clone())
    }

    pub async fn start(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let config = &self.state.config;
        let app = self.router();

        info!("Starting server on {}:{}", config.host, config.port);
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;

        info!("{}", config.welcome_message());
        axum::serve(listener, app).await?;
        Ok(())
    }
}
