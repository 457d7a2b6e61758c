//! # llamarpg Simulation
//!
//! Runtime pieces around the core world: an LLM-backed [`DecisionSource`]
//! implementation, the real-time tick driver and the operator console.
//!
//! ```text
//!  stdin ──► Console ──► World (read-only views)
//!                          ▲
//!  Runner ──tick──────────┘──► LlmDecisionSource ──► Ollama
//! ```
//!
//! [`DecisionSource`]: llamarpg_core::DecisionSource

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod console;
pub mod decision;
pub mod runner;

pub use console::{Command, Console};
pub use decision::LlmDecisionSource;
pub use runner::Runner;
