//! API route handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::config::{AppConfig, PaceConfig};
use crate::error::PaceError;
use crate::pace::analyze;
use crate::types::{ErrorResponse, HealthResponse, PaceRequest, PaceResponse};

/// Application state shared across handlers.
pub struct AppState {
    pub config: AppConfig,
}

/// Error type for API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    field: Option<String>,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
            field: None,
        }
    }
}

impl From<PaceError> for ApiError {
    fn from(err: PaceError) -> Self {
        Self {
            field: Some(err.field().to_string()),
            ..Self::bad_request(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.status.to_string(),
            message: self.message,
            field: self.field,
        });
        (self.status, body).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Active engine configuration.
pub async fn pace_config(State(state): State<Arc<AppState>>) -> Json<PaceConfig> {
    Json(state.config.pace.clone())
}

/// Pace analysis endpoint.
pub async fn pace(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PaceRequest>,
) -> Result<Json<PaceResponse>, ApiError> {
    let context = req.context();
    let analysis = analyze(&context, &req.horses, &state.config.pace)?;

    tracing::debug!(
        "Analysed {} runners: {}",
        analysis.horses.len(),
        analysis.formation_text
    );

    Ok(Json(PaceResponse::new(req.race_id, analysis)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            config: AppConfig::default(),
        })
    }

    fn request(json: &str) -> PaceRequest {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_pace_endpoint() {
        let req = request(
            r#"{"race_id": "2605010711", "race": {"distance": 1600, "venue": "東京"}, "horses": [
                {"horse_number": 1, "past_races": [{"finish_position": 1, "popularity": 4, "first_corner_position": 1, "distance": 1600}]},
                {"horse_number": 2, "past_races": [{"finish_position": 8, "popularity": 5, "first_corner_position": 12, "distance": 1600}]}
            ]}"#,
        );
        let Json(resp) = pace(State(state()), Json(req)).await.unwrap();
        assert_eq!(resp.horses.len(), 2);
        assert_eq!(resp.horses[0].horse_number, 1);
        assert_eq!(resp.race.field_size, 2);
        assert_eq!(resp.formation_text.chars().next(), Some('('));
    }

    #[tokio::test]
    async fn test_pace_endpoint_rejects_bad_context() {
        let req = request(r#"{"race": {"distance": 0}, "horses": [{"horse_number": 1}]}"#);
        let err = pace(State(state()), Json(req)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.field.as_deref(), Some("distance"));
    }

    #[tokio::test]
    async fn test_health() {
        let Json(resp) = health().await;
        assert_eq!(resp.status, "ok");
    }
}
