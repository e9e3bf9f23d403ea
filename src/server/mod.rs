mod server;
pub mod routes;
pub mod types;

pub use server::ApiServer;
pub use types::{ApiResponse, AppState, ClassifyRequest, MIMETYPE_ERROR};
