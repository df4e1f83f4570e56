//! Error taxonomy for the task generation pipeline.

use thiserror::Error;

use crate::llm::{LlmError, LlmErrorKind};

/// A terminal pipeline failure. None of these are retried above the
/// transport layer; each short-circuits the remaining stages.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The completion provider returned a failure status or the request
    /// could not be completed.
    #[error("completion provider error: {0}")]
    Upstream(LlmError),

    /// The provider answered with a success status but the response did
    /// not carry the expected message content.
    #[error("malformed completion response: {0}")]
    MalformedUpstreamResponse(String),

    /// The model's text output could not be parsed as a JSON array.
    ///
    /// `raw` keeps the original model text for operator diagnostics; it
    /// is logged, never returned to the caller.
    #[error("failed to parse model output as a task array: {message}")]
    TaskParse { message: String, raw: String },

    /// Parsing succeeded structurally but no record survived
    /// normalization (including the empty-array case).
    #[error("no valid tasks generated")]
    NoValidTasks,
}

impl GenerateError {
    /// Map a transport-level failure into the pipeline taxonomy.
    ///
    /// A success status with an unusable body is a malformed response;
    /// everything else is an upstream failure.
    pub fn from_llm(err: LlmError) -> Self {
        match err.kind {
            LlmErrorKind::ParseError => GenerateError::MalformedUpstreamResponse(err.message),
            _ => GenerateError::Upstream(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_parse_errors_map_to_malformed_response() {
        let err = GenerateError::from_llm(LlmError::parse_error("no choices"));
        assert!(matches!(err, GenerateError::MalformedUpstreamResponse(_)));
    }

    #[test]
    fn llm_http_errors_map_to_upstream() {
        let err = GenerateError::from_llm(LlmError::server_error(503, "unavailable"));
        assert!(matches!(err, GenerateError::Upstream(_)));
    }

    #[test]
    fn parse_error_display_does_not_leak_raw_text() {
        let err = GenerateError::TaskParse {
            message: "expected value at line 1".to_string(),
            raw: "super secret model rambling".to_string(),
        };
        assert!(!err.to_string().contains("rambling"));
    }
}
