use axum::{
    extract::State,
    response::Json,
};
use serde_json::{json, Value};
use crate::models::App;

/// Health check endpoint
pub async fn health_check(State(app): State<App>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "model": app.settings.model,
        "credential_configured": app.settings.has_credential()
    }))
}
