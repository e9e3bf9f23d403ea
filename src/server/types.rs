use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::labels::LabelTable;

/// Plain text returned when `/classify` receives something that is not JSON
pub const MIMETYPE_ERROR: &str = "Error: mimetype must be application/json !";

/// State shared by every request. Read-only after start up.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub labels: Arc<LabelTable>,
    /// k used when a request does not ask for one
    pub default_k: usize,
}

/// Request to rank a probability vector against the server's label table
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ClassifyRequest {
    pub probabilities: Vec<f32>,
    pub k: Option<usize>,
}

/// Generic API response wrapper
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub status: String,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            message: Some(message.into()),
        }
    }
}
