//! Gemini AI integration.
//!
//! This crate provides the [`AiProvider`] seam used by the summary
//! pipeline, a Gemini REST client with ordered model fallback, and the
//! Korean prompt builders for video, audio and briefing summaries.

pub mod error;
pub mod gemini;
pub mod prompts;

pub use error::{AiError, AiResult};
pub use gemini::{model_priority, AiProvider, GeminiClient, GeminiConfig, DEFAULT_MODELS};
pub use prompts::{is_invalid_summary, INVALID_SUMMARY_MARKERS};
