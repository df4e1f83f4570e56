//! Per-record validation and defaulting of model output.
//!
//! Each raw record either becomes a well-formed [`GeneratedTask`] or is
//! rejected with a recorded reason. Rejections are partial failures; only
//! a batch with zero survivors is a pipeline error.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::context::{GeneratedTask, ProjectContext};
use super::error::GenerateError;

pub const DEFAULT_TITLE: &str = "Untitled Task";
pub const DEFAULT_PRIORITY: &str = "medium";

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"))
}

/// A record dropped during normalization, with its position in the
/// model's output and the reason it was unusable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub index: usize,
    pub reason: String,
}

/// The surviving tasks plus everything that was dropped along the way.
///
/// Order of `tasks` matches the model's emission order, minus rejections.
#[derive(Debug, Clone)]
pub struct NormalizedBatch {
    pub tasks: Vec<GeneratedTask>,
    pub rejected: Vec<Rejection>,
}

/// Normalize a batch of raw records against the project context.
///
/// Partial success is allowed; an empty surviving batch fails with
/// [`GenerateError::NoValidTasks`].
pub fn normalize_records(
    records: &[Value],
    ctx: &ProjectContext,
) -> Result<NormalizedBatch, GenerateError> {
    let mut tasks = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for (index, record) in records.iter().enumerate() {
        match normalize_record(record, ctx) {
            Ok(task) => tasks.push(task),
            Err(reason) => {
                tracing::warn!(index, %reason, "dropping malformed task record");
                rejected.push(Rejection { index, reason });
            }
        }
    }

    if tasks.is_empty() {
        return Err(GenerateError::NoValidTasks);
    }

    Ok(NormalizedBatch { tasks, rejected })
}

/// Normalize a single raw record.
///
/// Defaulting rules:
/// - `title` defaults to "Untitled Task", `description` and
///   `required_service` to ""
/// - `due_date` must match `YYYY-MM-DD` or is replaced by the project
///   deadline
/// - `priority` is lower-cased, defaulting to "medium" (no enum check)
/// - an `assignee_id` containing `@` is resolved against team member
///   emails case-insensitively, unresolved references become `None`;
///   any other string passes through as an id
fn normalize_record(record: &Value, ctx: &ProjectContext) -> Result<GeneratedTask, String> {
    let obj = record
        .as_object()
        .ok_or_else(|| format!("record is not a JSON object: {record}"))?;

    let due_date = match obj.get("due_date").and_then(Value::as_str) {
        Some(date) if date_pattern().is_match(date) => date.to_string(),
        _ => ctx.deadline.clone(),
    };

    Ok(GeneratedTask {
        title: obj
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_TITLE)
            .to_string(),
        description: obj
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        due_date,
        priority: obj
            .get("priority")
            .and_then(Value::as_str)
            .map(str::to_lowercase)
            .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
        assignee_id: resolve_assignee(obj.get("assignee_id"), ctx),
        required_service: obj
            .get("required_service")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Resolve the model's assignee reference to a team member id.
fn resolve_assignee(value: Option<&Value>, ctx: &ProjectContext) -> Option<String> {
    match value {
        Some(Value::String(s)) if s.contains('@') => {
            ctx.member_id_for_email(s).map(str::to_string)
        }
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}
