//! Axum route handlers for the Roadmap API.

use anyhow::anyhow;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::roadmap::pipeline::{generate_roadmap, RoadmapEnvelope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRoadmapRequest {
    pub user_id: Uuid,
}

/// POST /api/v1/roadmaps/generate
///
/// Runs the full pipeline and persists the resulting envelope as the user's
/// current roadmap. Each call produces a fresh node/edge set — regeneration
/// replaces the stored roadmap wholesale.
pub async fn handle_generate_roadmap(
    State(state): State<AppState>,
    Json(request): Json<GenerateRoadmapRequest>,
) -> Result<Json<RoadmapEnvelope>, AppError> {
    let envelope = generate_roadmap(
        state.profiles.as_ref(),
        state.llm.as_ref(),
        &state.layout,
        request.user_id,
    )
    .await?;

    persist_roadmap(&state.db, request.user_id, &envelope).await?;
    info!("Stored roadmap for user {}", request.user_id);

    Ok(Json(envelope))
}

/// GET /api/v1/users/:user_id/roadmap
///
/// Returns the user's latest persisted roadmap envelope.
pub async fn handle_get_roadmap(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let content = sqlx::query_scalar::<_, serde_json::Value>(
        "SELECT content FROM roadmaps WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("No roadmap found for user {user_id}")))?;

    Ok(Json(content))
}

/// Upserts the envelope as the user's single current roadmap.
async fn persist_roadmap(
    pool: &PgPool,
    user_id: Uuid,
    envelope: &RoadmapEnvelope,
) -> Result<(), AppError> {
    let content = serde_json::to_value(envelope)
        .map_err(|e| AppError::Internal(anyhow!("Failed to serialize roadmap: {e}")))?;

    sqlx::query(
        r#"
        INSERT INTO roadmaps (user_id, content)
        VALUES ($1, $2)
        ON CONFLICT (user_id)
        DO UPDATE SET content = EXCLUDED.content, updated_at = now()
        "#,
    )
    .bind(user_id)
    .bind(&content)
    .execute(pool)
    .await?;

    Ok(())
}
