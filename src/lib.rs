//! # Taskforge
//!
//! AI-assisted task generation for agency project planning.
//!
//! This library provides:
//! - An HTTP API that accepts a project/company context and returns tasks
//! - A completion client for OpenAI-compatible chat endpoints
//! - A normalization layer that turns loose model output into well-formed
//!   task records
//!
//! ## Pipeline
//!
//! ```text
//!   ProjectContext
//!        │
//!        ▼
//!   ┌───────────────┐    ┌───────────────────┐
//!   │ Prompt Builder│───▶│ Completion Client │
//!   └───────────────┘    └─────────┬─────────┘
//!                                  │ raw text
//!                                  ▼
//!   ┌───────────────┐    ┌───────────────────┐
//!   │  Normalizer   │◀───│  Response Parser  │
//!   └───────┬───────┘    └───────────────────┘
//!           │
//!           ▼
//!   Vec<GeneratedTask> (+ recorded rejections)
//! ```
//!
//! Each stage short-circuits the rest on failure; there is no retry above
//! the transport layer and no partial result on a terminal error.
//!
//! ## Modules
//! - `generation`: the task generation pipeline and its data types
//! - `llm`: completion client abstraction and HTTP implementation
//! - `api`: HTTP surface (axum)

pub mod api;
pub mod config;
pub mod generation;
pub mod llm;

pub use config::Config;
