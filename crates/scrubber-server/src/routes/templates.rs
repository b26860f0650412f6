//! Stored analyze/anonymize template routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use scrubber_analyze::{AnalyzeTemplate, AnonymizeTemplate};
use scrubber_store::TemplateAction;
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/templates/{project}/{action}/{id}",
        get(get_template)
            .post(insert_template)
            .put(update_template)
            .delete(delete_template),
    )
}

type TemplatePath = Path<(String, String, String)>;

async fn get_template(
    State(state): State<Arc<AppState>>,
    Path((project, action, id)): TemplatePath,
) -> Result<Json<Value>, ApiError> {
    let action: TemplateAction = action.parse()?;
    Ok(Json(state.templates.get(&project, action, &id)?))
}

async fn insert_template(
    State(state): State<Arc<AppState>>,
    Path((project, action, id)): TemplatePath,
    Json(template): Json<Value>,
) -> Result<StatusCode, ApiError> {
    let action: TemplateAction = action.parse()?;
    validate(action, &template)?;
    state.templates.insert(&project, action, &id, &template)?;
    Ok(StatusCode::CREATED)
}

async fn update_template(
    State(state): State<Arc<AppState>>,
    Path((project, action, id)): TemplatePath,
    Json(template): Json<Value>,
) -> Result<StatusCode, ApiError> {
    let action: TemplateAction = action.parse()?;
    validate(action, &template)?;
    state.templates.update(&project, action, &id, &template)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_template(
    State(state): State<Arc<AppState>>,
    Path((project, action, id)): TemplatePath,
) -> Result<StatusCode, ApiError> {
    let action: TemplateAction = action.parse()?;
    state.templates.delete(&project, action, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reject templates that would fail to load when referenced by id.
fn validate(action: TemplateAction, template: &Value) -> Result<(), ApiError> {
    let parsed = match action {
        TemplateAction::Analyze => {
            serde_json::from_value::<AnalyzeTemplate>(template.clone()).map(|_| ())
        }
        TemplateAction::Anonymize => {
            serde_json::from_value::<AnonymizeTemplate>(template.clone()).map(|_| ())
        }
    };
    parsed.map_err(|e| ApiError::bad_request(format!("invalid {} template: {}", action.as_str(), e)))
}
