//! Custom recognizer routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use scrubber_analyze::PatternRecognizer;
use scrubber_store::PatternRecord;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recognizers", get(list_recognizers).post(insert_recognizer))
        .route("/recognizers/timestamp", get(last_update))
        .route(
            "/recognizers/{name}",
            get(get_recognizer)
                .put(update_recognizer)
                .delete(delete_recognizer),
        )
}

async fn list_recognizers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PatternRecord>>, ApiError> {
    Ok(Json(state.recognizers.get_all()?))
}

async fn get_recognizer(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<PatternRecord>, ApiError> {
    Ok(Json(state.recognizers.get(&name)?))
}

async fn insert_recognizer(
    State(state): State<Arc<AppState>>,
    Json(record): Json<PatternRecord>,
) -> Result<StatusCode, ApiError> {
    validate(&record)?;
    state.recognizers.insert(record)?;
    Ok(StatusCode::CREATED)
}

async fn update_recognizer(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(record): Json<PatternRecord>,
) -> Result<StatusCode, ApiError> {
    if record.name != name {
        return Err(ApiError::bad_request(format!(
            "recognizer name '{}' does not match path '{}'",
            record.name, name
        )));
    }
    validate(&record)?;
    state.recognizers.update(record)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_recognizer(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.recognizers.delete(&name)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn last_update(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let timestamp = state.recognizers.last_update_timestamp()?;
    Ok(Json(json!({ "timestamp": timestamp })))
}

fn validate(record: &PatternRecord) -> Result<(), ApiError> {
    if record.name.trim().is_empty() || record.entity.trim().is_empty() {
        return Err(ApiError::bad_request("recognizer name and entity are required"));
    }
    PatternRecognizer::from_record(record)?;
    Ok(())
}
