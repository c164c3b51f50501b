use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::generator;
use crate::loadtest::model::{Script, TestConfig, TestResult};

/// VUs written into generated k6 scripts.
const K6_VUS: u32 = 10;
/// Duration (seconds) written into generated k6 scripts.
const K6_DURATION_SECS: u64 = 30;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Deserialize)]
pub struct CreateScriptRequest {
    pub url: String,
}

pub async fn list_scripts(State(state): State<AppState>) -> Json<Vec<Script>> {
    Json(state.scripts.get_all())
}

pub async fn create_script(
    State(state): State<AppState>,
    Json(req): Json<CreateScriptRequest>,
) -> Result<Json<Script>, ApiError> {
    let script = state.scripts.create_from_url(&req.url)?;
    Ok(Json(script))
}

pub async fn get_script(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Script>, ApiError> {
    state
        .scripts
        .get_by_id(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("script not found: {id}")))
}

#[derive(Debug, Deserialize)]
pub struct K6Query {
    pub id: Option<String>,
}

pub async fn k6_script(
    State(state): State<AppState>,
    Query(query): Query<K6Query>,
) -> Result<String, ApiError> {
    let id = query
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing query parameter: id".to_string()))?;
    let script = state
        .scripts
        .get_by_id(&id)
        .ok_or_else(|| ApiError::NotFound(format!("script not found: {id}")))?;

    let config = TestConfig::new(id, K6_VUS, K6_DURATION_SECS);
    Ok(generator::k6::render(&script, &config))
}

pub async fn run_test(
    State(state): State<AppState>,
    Json(config): Json<TestConfig>,
) -> Result<Json<TestResult>, ApiError> {
    let result = state.tests.run_test(&config).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub script_id: Option<String>,
}

pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<TestResult>>, ApiError> {
    let results = match query.script_id.as_deref() {
        Some(id) if !id.is_empty() => state.tests.script_history(id)?,
        _ => state.tests.history()?,
    };
    Ok(Json(results))
}
