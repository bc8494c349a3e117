//! Progress tracker — per-step completion status, keyed by user and step id.
//!
//! Deliberately independent of the generation pipeline: generation always
//! emits `not_started` and never reads or writes these records. The client
//! joins them onto the graph by matching step id strings at render time.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::roadmap::graph::StepStatus;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProgressRow {
    pub step_id: String,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProgressRequest {
    pub step_id: String,
    pub status: StepStatus,
}

/// GET /api/v1/users/:user_id/progress
///
/// All progress records for the user, ordered by step id.
pub async fn handle_get_progress(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<ProgressRow>>, AppError> {
    let rows = sqlx::query_as::<_, ProgressRow>(
        "SELECT step_id, status, updated_at FROM roadmap_progress \
         WHERE user_id = $1 ORDER BY step_id",
    )
    .bind(user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}

/// PUT /api/v1/users/:user_id/progress
///
/// Upserts one `{ step_id, status }` record. Step ids are opaque strings;
/// no check is made against the stored roadmap, matching the join-by-id
/// contract with the client.
pub async fn handle_update_progress(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateProgressRequest>,
) -> Result<Json<ProgressRow>, AppError> {
    if request.step_id.trim().is_empty() {
        return Err(AppError::Validation("step_id cannot be empty".to_string()));
    }

    let row = sqlx::query_as::<_, ProgressRow>(
        r#"
        INSERT INTO roadmap_progress (user_id, step_id, status)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, step_id)
        DO UPDATE SET status = EXCLUDED.status, updated_at = now()
        RETURNING step_id, status, updated_at
        "#,
    )
    .bind(user_id)
    .bind(&request.step_id)
    .bind(request.status.as_str())
    .fetch_one(&state.db)
    .await?;

    Ok(Json(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_rejects_unknown_status() {
        let json = serde_json::json!({ "step_id": "2a", "status": "finished" });
        let result: Result<UpdateProgressRequest, _> = serde_json::from_value(json);
        assert!(result.is_err(), "unknown status strings must not parse");
    }

    #[test]
    fn test_update_request_accepts_wire_statuses() {
        for status in ["not_started", "ongoing", "done"] {
            let json = serde_json::json!({ "step_id": "2a", "status": status });
            let request: UpdateProgressRequest = serde_json::from_value(json).unwrap();
            assert_eq!(request.status.as_str(), status);
        }
    }
}
