//! Task generation endpoint.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::generation::{GenerateError, GeneratedTask, ProjectContext, Rejection};

use super::routes::AppState;

/// Response for a successful generation.
#[derive(Debug, Serialize)]
pub struct GenerateTasksResponse {
    pub tasks: Vec<GeneratedTask>,
    /// Records dropped during normalization, with their position in the
    /// model's output and the reason.
    pub rejected: Vec<Rejection>,
    pub generated_at: DateTime<Utc>,
}

/// Uniform error body for all failure kinds.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// POST /api/tasks/generate
/// Generate tasks for a project context.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(ctx): Json<ProjectContext>,
) -> Result<Json<GenerateTasksResponse>, (StatusCode, Json<ErrorBody>)> {
    let request_id = Uuid::new_v4();
    tracing::info!(
        %request_id,
        project = %ctx.name,
        members = ctx.team_members.len(),
        "task generation requested"
    );

    match state.generator.generate(&ctx).await {
        Ok(batch) => {
            tracing::info!(
                %request_id,
                accepted = batch.tasks.len(),
                rejected = batch.rejected.len(),
                "task generation succeeded"
            );
            Ok(Json(GenerateTasksResponse {
                tasks: batch.tasks,
                rejected: batch.rejected,
                generated_at: Utc::now(),
            }))
        }
        Err(err) => {
            log_failure(request_id, &err);
            Err((
                status_for(&err),
                Json(ErrorBody {
                    error: err.to_string(),
                }),
            ))
        }
    }
}

/// Map a pipeline failure to an HTTP status.
///
/// Provider-side failures are gateway errors; structurally unusable model
/// output is an unprocessable entity. Operators can tell the two apart
/// from the status alone, without reading logs.
fn status_for(err: &GenerateError) -> StatusCode {
    match err {
        GenerateError::Upstream(_) | GenerateError::MalformedUpstreamResponse(_) => {
            StatusCode::BAD_GATEWAY
        }
        GenerateError::TaskParse { .. } | GenerateError::NoValidTasks => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn log_failure(request_id: Uuid, err: &GenerateError) {
    match err {
        // The raw model text goes to the log only, never to the caller.
        GenerateError::TaskParse { message, raw } => {
            tracing::error!(%request_id, %message, raw_output = %raw, "model output was not a task array");
        }
        other => {
            tracing::error!(%request_id, error = %other, "task generation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;

    #[test]
    fn upstream_failures_map_to_bad_gateway() {
        let upstream = GenerateError::Upstream(LlmError::server_error(503, "down"));
        assert_eq!(status_for(&upstream), StatusCode::BAD_GATEWAY);

        let malformed = GenerateError::MalformedUpstreamResponse("no content".to_string());
        assert_eq!(status_for(&malformed), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unusable_model_output_maps_to_unprocessable() {
        let parse = GenerateError::TaskParse {
            message: "expected value".to_string(),
            raw: "garbage".to_string(),
        };
        assert_eq!(status_for(&parse), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            status_for(&GenerateError::NoValidTasks),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn error_body_shape_is_stable() {
        let body = ErrorBody {
            error: "no valid tasks generated".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"error": "no valid tasks generated"}));
    }
}
