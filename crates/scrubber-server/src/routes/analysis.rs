//! Analyze, anonymize and JSON document redaction routes.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use scrubber_analyze::{AnalyzeTemplate, AnonymizeTemplate, FieldType};
use scrubber_engine::{CancellationToken, Engine};
use scrubber_store::TemplateAction;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/fieldTypes", get(field_types))
        .route("/projects/{project}/analyze", post(analyze))
        .route("/projects/{project}/anonymize", post(anonymize))
        .route("/projects/{project}/anonymize-json", post(anonymize_json))
}

// ---------------------------------------------------------------
// Request types
// ---------------------------------------------------------------

/// Templates given inline or by id. Inline wins when both are present.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct TemplateRefs {
    analyze_template: Option<AnalyzeTemplate>,
    analyze_template_id: Option<String>,
    anonymize_template: Option<AnonymizeTemplate>,
    anonymize_template_id: Option<String>,
}

#[derive(Deserialize)]
struct TextRequest {
    text: String,
    #[serde(flatten)]
    templates: TemplateRefs,
}

#[derive(Deserialize)]
struct DocumentRequest {
    json: Value,
    #[serde(flatten)]
    templates: TemplateRefs,
}

// ---------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------

/// Built-in entities plus those of stored custom recognizers.
async fn field_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FieldType>>, ApiError> {
    let entities = state.analyzer.registry().entities()?;
    Ok(Json(entities.into_iter().map(FieldType::new).collect()))
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Path(project): Path<String>,
    Json(req): Json<TextRequest>,
) -> Result<Json<Value>, ApiError> {
    let template = analyze_template(&state, &project, &req.templates)?;
    let findings = state.analyzer.analyze(&req.text, &template)?;
    Ok(Json(json!({
        "findings": findings,
        "count": findings.len(),
    })))
}

async fn anonymize(
    State(state): State<Arc<AppState>>,
    Path(project): Path<String>,
    Json(req): Json<TextRequest>,
) -> Result<Json<Value>, ApiError> {
    let analyze = analyze_template(&state, &project, &req.templates)?;
    let anonymize = anonymize_template(&state, &project, &req.templates)?;

    let findings = state.analyzer.analyze(&req.text, &analyze)?;
    let text = state.anonymizer.anonymize(&req.text, &findings, &anonymize)?;
    Ok(Json(json!({ "text": text })))
}

async fn anonymize_json(
    State(state): State<Arc<AppState>>,
    Path(project): Path<String>,
    Json(req): Json<DocumentRequest>,
) -> Result<Json<Value>, ApiError> {
    let Value::Object(mut document) = req.json else {
        return Err(ApiError::bad_request("json must be an object"));
    };

    let analyze = analyze_template(&state, &project, &req.templates)?;
    let anonymize = anonymize_template(&state, &project, &req.templates)?;

    let token = CancellationToken::new();
    let engine = Engine::new(state.analyzer.clone(), state.anonymizer, analyze, anonymize)
        .with_cancellation(token.clone());

    let deadline = state.config.scan_timeout.and_then(|t| cancel_after(token, t));
    let result = engine.scan(&mut document).await;
    if let Some(handle) = deadline {
        handle.abort();
    }

    let report = result?;
    info!(
        "Project {}: redacted {} scalars in {} containers",
        project, report.redacted, report.containers
    );

    Ok(Json(json!({
        "json": Value::Object(document),
        "report": report,
    })))
}

// ---------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------

/// Cancel `token` once `timeout` elapses. A zero timeout cancels at once.
fn cancel_after(token: CancellationToken, timeout: Duration) -> Option<JoinHandle<()>> {
    if timeout.is_zero() {
        token.cancel();
        return None;
    }
    Some(tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        token.cancel();
    }))
}

fn analyze_template(
    state: &AppState,
    project: &str,
    refs: &TemplateRefs,
) -> Result<AnalyzeTemplate, ApiError> {
    let template = match (&refs.analyze_template, &refs.analyze_template_id) {
        (Some(t), _) => t.clone(),
        (None, Some(id)) => stored(state, project, TemplateAction::Analyze, id)?,
        (None, None) => {
            return Err(ApiError::bad_request(
                "analyzeTemplate or analyzeTemplateId is required",
            ))
        }
    };

    if !template.all_fields && template.fields.is_empty() {
        return Err(ApiError::bad_request("analyze template selects no fields"));
    }
    Ok(template)
}

/// Missing anonymize templates fall back to labelling every finding.
fn anonymize_template(
    state: &AppState,
    project: &str,
    refs: &TemplateRefs,
) -> Result<AnonymizeTemplate, ApiError> {
    match (&refs.anonymize_template, &refs.anonymize_template_id) {
        (Some(t), _) => Ok(t.clone()),
        (None, Some(id)) => stored(state, project, TemplateAction::Anonymize, id),
        (None, None) => Ok(AnonymizeTemplate::default()),
    }
}

fn stored<T: DeserializeOwned>(
    state: &AppState,
    project: &str,
    action: TemplateAction,
    id: &str,
) -> Result<T, ApiError> {
    let raw = state.templates.get(project, action, id)?;
    serde_json::from_value(raw).map_err(|e| {
        ApiError::bad_request(format!(
            "stored {} template '{}' is invalid: {}",
            action.as_str(),
            id,
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use scrubber_core::{DataPaths, ScrubberConfig, StoreBackend};
    use scrubber_store::MemoryCache;
    use tower::ServiceExt;

    fn state() -> Arc<AppState> {
        let config = ScrubberConfig {
            port: 0,
            data_paths: DataPaths {
                root: "unused".into(),
                store: "unused/store".into(),
            },
            store_backend: StoreBackend::Memory,
            min_score: 0.0,
            scan_timeout: None,
        };
        Arc::new(AppState::new(config, Arc::new(MemoryCache::new())))
    }

    async fn post(body: Value, uri: &str) -> (StatusCode, Value) {
        let app = routes().with_state(state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_analyze_inline_template() {
        let (status, body) = post(
            json!({"text": "My SSN is 123-45-6789", "analyzeTemplate": {"fields": [{"name": "US_SSN"}]}}),
            "/projects/p1/analyze",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["findings"][0]["entityType"], "US_SSN");
    }

    #[tokio::test]
    async fn test_analyze_requires_template() {
        let (status, body) = post(json!({"text": "hi"}), "/projects/p1/analyze").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("analyzeTemplate"));
    }

    #[tokio::test]
    async fn test_zero_deadline_cancels_before_scanning() {
        let token = CancellationToken::new();
        assert!(cancel_after(token.clone(), Duration::ZERO).is_none());
        assert!(token.is_cancelled());

        let token = CancellationToken::new();
        let handle = cancel_after(token.clone(), Duration::from_secs(60)).unwrap();
        assert!(!token.is_cancelled());
        handle.abort();
    }

    #[tokio::test]
    async fn test_anonymize_json_rejects_non_object() {
        let (status, _) = post(
            json!({"json": [1, 2], "analyzeTemplate": {"allFields": true}}),
            "/projects/p1/anonymize-json",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
