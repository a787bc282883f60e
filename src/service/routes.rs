//! Route handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::extract::ApiJson;
use super::AppState;
use crate::skills::store;
use crate::skills::types::{NewSkillVersion, Skill, SkillVersion};
use crate::skills::SkillError;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: &'static str,
    pub mode: &'static str,
    pub environment: String,
}

pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "open-skills Service".into(),
        version: env!("CARGO_PKG_VERSION"),
        mode: "service",
        environment: state.config.server.environment.clone(),
    })
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let ping = state
        .db
        .session(|tx| -> Result<i64, crate::db::DbError> {
            Ok(tx.query_row("SELECT 1", [], |row| row.get(0))?)
        })
        .await;

    match ping {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({"status": "ok", "database": true})),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"status": "degraded", "database": false})),
            )
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub provider: String,
    pub endpoint: String,
    pub default_model: String,
    pub default_dimensions: usize,
}

pub async fn providers(State(state): State<AppState>) -> Json<Vec<ProviderInfo>> {
    let list = state
        .embeddings
        .registry()
        .iter()
        .map(|(id, profile)| ProviderInfo {
            provider: id.to_string(),
            endpoint: profile.endpoint.clone(),
            default_model: profile.default_model.clone(),
            default_dimensions: profile.default_dimensions,
        })
        .collect();
    Json(list)
}

#[derive(Debug, Deserialize)]
pub struct EmbedRequest {
    pub text: String,
    pub provider: String,
    pub model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
    pub embedding: Vec<f32>,
}

pub async fn create_embedding(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EmbedRequest>,
) -> ApiResult<Json<EmbedResponse>> {
    embed(&state, req)
        .await
        .map(Json)
        .map_err(|e| e.redact(state.config.server.debug))
}

async fn embed(state: &AppState, req: EmbedRequest) -> ApiResult<EmbedResponse> {
    let profile = state.embeddings.registry().lookup(&req.provider)?;
    let model = req
        .model
        .clone()
        .unwrap_or_else(|| profile.default_model.clone());

    let credential = state.config.credential(&req.provider).ok_or_else(|| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("no credential configured for provider: {}", req.provider),
        )
    })?;

    let embedding = state
        .embeddings
        .generate(&req.text, &req.provider, credential, req.model.as_deref())
        .await?;

    tracing::info!(
        provider = %req.provider,
        model = %model,
        dimensions = embedding.len(),
        "embedding generated"
    );

    Ok(EmbedResponse {
        provider: req.provider,
        model,
        dimensions: embedding.len(),
        embedding,
    })
}

#[derive(Debug, Deserialize)]
pub struct CreateSkillRequest {
    pub name: String,
    pub description: Option<String>,
}

pub async fn create_skill(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateSkillRequest>,
) -> ApiResult<(StatusCode, Json<Skill>)> {
    if req.name.trim().is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "skill name must not be empty"));
    }

    state
        .db
        .session(move |tx| store::create_skill(tx, &req.name, req.description.as_deref()))
        .await
        .map(|skill| (StatusCode::CREATED, Json(skill)))
        .map_err(|e: SkillError| ApiError::from(e).redact(state.config.server.debug))
}

pub async fn list_skills(State(state): State<AppState>) -> ApiResult<Json<Vec<Skill>>> {
    state
        .db
        .session(|tx| store::list_skills(tx))
        .await
        .map(Json)
        .map_err(|e: SkillError| ApiError::from(e).redact(state.config.server.debug))
}

pub async fn get_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Skill>> {
    state
        .db
        .session(move |tx| store::get_skill(tx, &id))
        .await
        .map(Json)
        .map_err(|e: SkillError| ApiError::from(e).redact(state.config.server.debug))
}

pub async fn publish_version(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<NewSkillVersion>,
) -> ApiResult<(StatusCode, Json<SkillVersion>)> {
    if req.version.trim().is_empty() || req.entrypoint.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "version and entrypoint must not be empty",
        ));
    }

    state
        .db
        .session(move |tx| store::publish_version(tx, &id, &req))
        .await
        .map(|version| (StatusCode::CREATED, Json(version)))
        .map_err(|e: SkillError| ApiError::from(e).redact(state.config.server.debug))
}

pub async fn list_versions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<SkillVersion>>> {
    state
        .db
        .session(move |tx| store::list_versions(tx, &id))
        .await
        .map(Json)
        .map_err(|e: SkillError| ApiError::from(e).redact(state.config.server.debug))
}
