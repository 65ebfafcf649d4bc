//! Gemini `generateContent` client with quota-aware retry, plus JSON reply parsing.

pub mod client;
mod json;
pub mod types;

pub use client::{GeminiClient, GeminiError, Generator};
pub use json::parse_json_payload;
pub use types::GenerateRequest;
