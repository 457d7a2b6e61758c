//! # llamarpg-llm: inference client for llamarpg
//!
//! Talks to a locally hosted inference service and turns its free-text
//! answers into structured values:
//!   - **Ollama** `/api/generate`, single non-streamed response
//!   - **None**, every call fails so callers fall back to rule-based play
//!
//! This crate knows nothing about NPCs. Callers render a prompt with
//! [`prompt::PromptTemplate`], send it through [`LlmClient::generate`] and
//! recover a JSON object from the reply with [`extract::parse_structured`].
//!
//! ```text
//! PromptTemplate ──render──► LlmRequest ──► LlmClient ──► LlmResponse
//!                                                              │
//!                                      extract_json_object ◄───┘
//!                                              │
//!                                              ▼
//!                                        serde_json::from_str::<T>
//! ```

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod extract;
pub mod prompt;
pub mod types;

pub use client::{LlmClient, LlmProvider};
pub use error::LlmError;
pub use types::{LlmRequest, LlmResponse};
