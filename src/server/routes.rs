use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{info, warn, error};

use crate::report::{report, Prediction};
use super::types::{ApiResponse, AppState, ClassifyRequest, MIMETYPE_ERROR};

/// Returns the welcome message
pub async fn index(State(state): State<AppState>) -> String {
    info!("Index endpoint called");
    state.config.welcome_message()
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Accepts a JSON document.
///
/// Anything that is not JSON gets the plain text mimetype error. A body with
/// `probabilities` is ranked against the label table and answered with a
/// JSON report; any other JSON body is logged and acknowledged with `ok`.
pub async fn classify(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !is_json(&headers) {
        warn!("Classify called without a JSON content type");
        return MIMETYPE_ERROR.into_response();
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            warn!("Classify called with malformed JSON: {}", e);
            return MIMETYPE_ERROR.into_response();
        }
    };

    info!("Classify endpoint called with {}", payload);
    if let Some(hello) = payload.get("hello") {
        info!("hello: {}", hello);
    }

    if payload.get("probabilities").is_none() {
        return "ok".into_response();
    }

    let request: ClassifyRequest = match serde_json::from_value(payload) {
        Ok(request) => request,
        Err(e) => {
            error!("Invalid classify request: {}", e);
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::<Vec<Prediction>>::error(format!("Invalid classify request: {}", e))),
            )
                .into_response();
        }
    };

    let k = request.k.unwrap_or(state.default_k);
    match report(&request.probabilities, &state.labels, k) {
        Ok(predictions) => {
            info!("Reported {} predictions", predictions.len());
            (StatusCode::OK, Json(ApiResponse::success(predictions))).into_response()
        }
        Err(e) => {
            error!("Failed to report predictions: {}", e);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::<Vec<Prediction>>::error(e.to_string())),
            )
                .into_response()
        }
    }
}
