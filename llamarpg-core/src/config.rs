//! Configuration for the simulation.
//!
//! Maps directly to `llamarpg.toml`. Every field has a default, so an empty
//! file (or no file at all) yields the stock simulation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::roster::{self, NpcDefinition};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Tick cadence, ranges and log capacities.
    #[serde(default)]
    pub world: WorldConfig,
    /// Per-entity decision failure breaker.
    #[serde(default)]
    pub breaker: BreakerConfig,
    /// Relationship scoring.
    #[serde(default)]
    pub social: SocialConfig,
    /// Inference service settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Optional roster override. Empty means the built-in roster.
    #[serde(default)]
    pub npcs: Vec<NpcDefinition>,
}

impl SimConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `SimError::Config` if the TOML is invalid or a value is out of range.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// The roster to spawn: the configured one, or the built-in five.
    #[must_use]
    pub fn roster(&self) -> Vec<NpcDefinition> {
        if self.npcs.is_empty() {
            roster::default_roster()
        } else {
            self.npcs.clone()
        }
    }

    /// Reject values that would stall or break the simulation.
    ///
    /// # Errors
    /// Returns `SimError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let w = &self.world;
        if w.tick_interval_ms == 0 {
            return Err(SimError::Config("world.tick_interval_ms must be > 0".into()));
        }
        if w.event_log_capacity == 0 || w.memory_capacity == 0 {
            return Err(SimError::Config("log capacities must be > 0".into()));
        }
        for (name, value) in [
            ("world.perception_radius", w.perception_radius),
            ("world.interaction_range", w.interaction_range),
            ("world.move_speed", w.move_speed),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::Config(format!("{name} must be a positive number")));
            }
        }
        if !(w.edge_margin.is_finite() && (0.0..50.0).contains(&w.edge_margin)) {
            return Err(SimError::Config("world.edge_margin must be in [0, 50)".into()));
        }
        if self.breaker.failure_threshold == 0 {
            return Err(SimError::Config("breaker.failure_threshold must be > 0".into()));
        }
        if self.social.default_affinity > 100 {
            return Err(SimError::Config("social.default_affinity must be <= 100".into()));
        }
        if self.llm.request_timeout_ms == 0 {
            return Err(SimError::Config("llm.request_timeout_ms must be > 0".into()));
        }
        for def in &self.npcs {
            if def.id.as_str().is_empty() || def.name.is_empty() {
                return Err(SimError::Config("roster entries need an id and a name".into()));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level used when `RUST_LOG` is unset: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Tick cadence, ranges and capacities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Real-time interval between world ticks.
    #[serde(default = "default_1000")]
    pub tick_interval_ms: u64,
    /// Minimum time since an entity's last action before it decides again.
    #[serde(default = "default_3000")]
    pub decision_interval_ms: u64,
    /// Minimum time between two applied actions of one entity.
    #[serde(default = "default_2000")]
    pub action_cooldown_ms: u64,
    /// Radius within which other NPCs appear in a decision prompt.
    #[serde(default = "default_20_0")]
    pub perception_radius: f64,
    /// Maximum distance for trade and chat.
    #[serde(default = "default_10_0")]
    pub interaction_range: f64,
    /// Distance covered by one move action.
    #[serde(default = "default_5_0")]
    pub move_speed: f64,
    /// Edge band the fallback heuristic pushes entities out of.
    #[serde(default = "default_10_0")]
    pub edge_margin: f64,
    /// Maximum lines kept in the world event log.
    #[serde(default = "default_100")]
    pub event_log_capacity: usize,
    /// Maximum memories kept per entity.
    #[serde(default = "default_10")]
    pub memory_capacity: usize,
}

impl WorldConfig {
    /// Tick interval as a [`Duration`].
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Decision gate as a [`Duration`].
    #[must_use]
    pub fn decision_interval(&self) -> Duration {
        Duration::from_millis(self.decision_interval_ms)
    }

    /// Action cooldown as a [`Duration`].
    #[must_use]
    pub fn action_cooldown(&self) -> Duration {
        Duration::from_millis(self.action_cooldown_ms)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            decision_interval_ms: 3000,
            action_cooldown_ms: 2000,
            perception_radius: 20.0,
            interaction_range: 10.0,
            move_speed: 5.0,
            edge_margin: 10.0,
            event_log_capacity: 100,
            memory_capacity: 10,
        }
    }
}

/// Per-entity circuit breaker for failed decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Consecutive failures that trip the breaker.
    #[serde(default = "default_3")]
    pub failure_threshold: u32,
    /// How long a tripped entity sits out before its counter resets.
    #[serde(default = "default_5000")]
    pub pause_ms: u64,
}

impl BreakerConfig {
    /// Pause as a [`Duration`].
    #[must_use]
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            pause_ms: 5000,
        }
    }
}

/// Relationship scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConfig {
    /// Score assumed on first interaction.
    #[serde(default = "default_50")]
    pub default_affinity: u8,
    /// Affinity gained by both sides of a completed trade.
    #[serde(default = "default_5")]
    pub trade_bonus: i32,
    /// Affinity gained by both sides of a chat.
    #[serde(default = "default_2")]
    pub chat_bonus: i32,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            default_affinity: 50,
            trade_bonus: 5,
            chat_bonus: 2,
        }
    }
}

/// Inference service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider: "ollama" or "none".
    #[serde(default = "default_ollama")]
    pub provider: String,
    /// Base URL for the inference API.
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Hard timeout for one decision call in milliseconds.
    #[serde(default = "default_10000")]
    pub request_timeout_ms: u64,
    /// Ask the service to constrain output to JSON.
    #[serde(default = "default_true")]
    pub json_mode: bool,
    /// Optional TOML file overriding the built-in decision prompt.
    #[serde(default)]
    pub prompt_file: Option<std::path::PathBuf>,
}

impl LlmConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_ollama(),
            base_url: default_ollama_url(),
            model: default_model(),
            temperature: default_temperature(),
            request_timeout_ms: 10_000,
            json_mode: true,
            prompt_file: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_ollama() -> String { "ollama".to_string() }
fn default_ollama_url() -> String { "http://localhost:11434".to_string() }
fn default_model() -> String { "llama3.2:latest".to_string() }
fn default_temperature() -> f32 { 0.7 }
fn default_5_0() -> f64 { 5.0 }
fn default_10_0() -> f64 { 10.0 }
fn default_20_0() -> f64 { 20.0 }
fn default_2() -> i32 { 2 }
fn default_3() -> u32 { 3 }
fn default_5() -> i32 { 5 }
fn default_10() -> usize { 10 }
fn default_50() -> u8 { 50 }
fn default_100() -> usize { 100 }
fn default_1000() -> u64 { 1000 }
fn default_2000() -> u64 { 2000 }
fn default_3000() -> u64 { 3000 }
fn default_5000() -> u64 { 5000 }
fn default_10000() -> u64 { 10_000 }
