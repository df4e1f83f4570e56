//! Task generation pipeline.
//!
//! One linear pass: build the prompt, call the completion provider, parse
//! the returned text as a JSON array, normalize each record. Each stage
//! short-circuits the rest on failure; there is no retry here (the
//! transport layer owns transient retries) and no partial result on a
//! terminal error.

mod context;
mod error;
mod normalize;
mod parse;
mod prompt;

pub use context::{CompanyContext, GeneratedTask, Priority, ProjectContext, Service, TeamMember};
pub use error::GenerateError;
pub use normalize::{normalize_records, NormalizedBatch, Rejection};
pub use parse::parse_task_records;
pub use prompt::{build_prompt, SYSTEM_PROMPT};

use std::sync::Arc;

use crate::llm::{ChatMessage, ChatOptions, LlmClient};

/// Sampling parameters fixed for this code path.
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u64 = 1000;

/// The task generation pipeline.
///
/// Holds its completion client as an injected dependency; there is no
/// shared mutable state, so concurrent generations are fully independent.
pub struct TaskGenerator {
    llm: Arc<dyn LlmClient>,
    model: String,
}

impl TaskGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Generate tasks for one project.
    ///
    /// On success the batch carries the accepted tasks in the model's
    /// emission order plus any per-record rejections.
    pub async fn generate(&self, ctx: &ProjectContext) -> Result<NormalizedBatch, GenerateError> {
        let user_prompt = prompt::build_prompt(ctx);
        let messages = [
            ChatMessage::system(prompt::SYSTEM_PROMPT),
            ChatMessage::user(user_prompt),
        ];
        let options = ChatOptions {
            temperature: Some(TEMPERATURE),
            top_p: None,
            max_tokens: Some(MAX_TOKENS),
        };

        tracing::debug!(model = %self.model, project = %ctx.name, "requesting task generation");

        let response = self
            .llm
            .chat_completion(&self.model, &messages, options)
            .await
            .map_err(GenerateError::from_llm)?;

        let content = response.content.ok_or_else(|| {
            GenerateError::MalformedUpstreamResponse(
                "response carried no message content".to_string(),
            )
        })?;

        let records = parse::parse_task_records(&content)?;
        let batch = normalize::normalize_records(&records, ctx)?;

        tracing::debug!(
            accepted = batch.tasks.len(),
            rejected = batch.rejected.len(),
            "task generation complete"
        );

        Ok(batch)
    }
}
