//! # llamarpg Core Library
//!
//! World model for a small resource-gathering simulation in which every
//! NPC decides what to do next once per tick.
//!
//! An NPC ([`Npc`]) carries an inventory, per-activity specialisation,
//! affinity scores towards other NPCs and a short memory log. The
//! [`World`] registry owns the roster, applies validated actions and keeps
//! a bounded event log.
//!
//! ## Decision loop
//!
//! ```text
//! tick ──► decision gate ──► breaker ──► DecisionSource ──► validate
//!                                              │                │
//!                                              ▼ (fail)         ▼ (ok)
//!                                         heuristic ──────► executor ──► event log
//! ```
//!
//! Decisions arrive as loosely typed [`RawDecision`] payloads. Only a
//! payload that passes [`RawDecision::validate`] becomes an [`Action`];
//! everything else is replaced by the deterministic fallback in
//! [`heuristic`].

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod config;
pub mod decision;
pub mod error;
pub mod executor;
pub mod heuristic;
pub mod inventory;
pub mod log;
pub mod npc;
pub mod roster;
pub mod social;
pub mod tick;
pub mod types;
pub mod world;

pub use action::{Action, ActionKind, Decision, InvalidDecision, RawDecision};
pub use config::SimConfig;
pub use decision::{DecisionRequest, DecisionSource};
pub use error::SimError;
pub use npc::Npc;
pub use types::*;
pub use world::World;
