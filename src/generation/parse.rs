//! Parsing of raw model output into loosely-typed task records.

use serde_json::Value;

use super::error::GenerateError;

/// Strip a surrounding markdown code fence, if present.
///
/// Models frequently wrap the array in ```` ```json ... ``` ```` despite
/// being told not to; the fenced and unfenced forms must parse
/// identically.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}

/// Parse the model's text content as a JSON array of records.
///
/// The records are not yet shape-validated; that is the normalizer's job.
/// Failures keep the original raw text for diagnostics.
pub fn parse_task_records(raw: &str) -> Result<Vec<Value>, GenerateError> {
    let body = strip_code_fence(raw);

    let value: Value = serde_json::from_str(body).map_err(|e| GenerateError::TaskParse {
        message: e.to_string(),
        raw: raw.to_string(),
    })?;

    match value {
        Value::Array(records) => Ok(records),
        other => Err(GenerateError::TaskParse {
            message: format!("expected a JSON array, got {}", json_type_name(&other)),
            raw: raw.to_string(),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_and_unfenced_parse_identically() {
        let plain = r#"[{"title":"Design mockups"}]"#;
        let fenced = format!("```json\n{plain}\n```");
        let bare_fence = format!("```\n{plain}\n```");

        let expected = parse_task_records(plain).unwrap();
        assert_eq!(parse_task_records(&fenced).unwrap(), expected);
        assert_eq!(parse_task_records(&bare_fence).unwrap(), expected);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let records = parse_task_records("  \n[1, 2]\n  ").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn non_json_fails_with_raw_text_captured() {
        let err = parse_task_records("not json at all").unwrap_err();
        match err {
            GenerateError::TaskParse { raw, .. } => assert_eq!(raw, "not json at all"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_array_json_is_rejected() {
        let err = parse_task_records(r#"{"tasks": []}"#).unwrap_err();
        match err {
            GenerateError::TaskParse { message, .. } => {
                assert!(message.contains("expected a JSON array"));
                assert!(message.contains("an object"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_array_parses_to_empty_records() {
        assert!(parse_task_records("[]").unwrap().is_empty());
    }
}
