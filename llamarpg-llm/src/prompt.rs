//! Prompt templates for NPC decisions.
//!
//! The built-in template is compiled in. A TOML file with the same shape
//! can replace it at startup:
//!
//! ```toml
//! [prompt]
//! version = "2"
//! system = "..."
//! user = "..."
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::LlmError;

/// System prompt sent with every decision request.
pub const DECISION_SYSTEM: &str =
    "You are a logic engine that only responds with valid JSON objects. Never include explanations or additional text.";

/// Decision prompt body.
///
/// `{hints}` is zero or more pre-rendered `- ...` lines; `{actions}` is the
/// numbered list of valid actions and targets.
pub const DECISION_USER: &str = r#"You are {name}, a {role} NPC in a game. Respond ONLY with a JSON object in this exact format:
{
    "action": "mine OR woodcut OR move OR trade OR chat",
    "target": "specific resource name OR coordinates OR NPC id",
    "reason": "brief explanation"
}

Current situation:
- Your personality: {personality}
- Location: {location}
- Current task: {current_task}
- Recent memories: {memories}
- Nearby NPCs: {nearby}
- Inventory: {inventory}
- Time of day: {time_of_day}
{hints}
Available actions and targets:
{actions}

Respond with ONLY a valid JSON object matching the format above. No additional text."#;

/// Placeholders every decision template is expected to use.
pub const DECISION_VARS: [&str; 11] = [
    "name",
    "role",
    "personality",
    "location",
    "current_task",
    "memories",
    "nearby",
    "inventory",
    "time_of_day",
    "hints",
    "actions",
];

/// Simple template interpolation for prompts.
///
/// Replaces `{key}` with the corresponding value. Unknown placeholders and
/// other braces are left alone.
#[must_use]
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{key}}}"), value);
    }
    result
}

// ---------------------------------------------------------------------------
// PromptTemplate: built-in or TOML-loaded
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct TomlPromptFile {
    prompt: TomlPromptData,
}

#[derive(Debug, Clone, Deserialize)]
struct TomlPromptData {
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    system: Option<String>,
    user: String,
}

fn default_version() -> String { "custom".into() }

/// A loaded, ready-to-render decision prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// Version label, `"builtin"` for the compiled-in template.
    pub version: String,
    /// System prompt template.
    pub system: String,
    /// User prompt template (contains `{key}` placeholders).
    pub user: String,
}

impl PromptTemplate {
    /// The compiled-in decision template.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            version: "builtin".into(),
            system: DECISION_SYSTEM.into(),
            user: DECISION_USER.into(),
        }
    }

    /// Parse a template from TOML text. A missing `system` keeps the built-in one.
    ///
    /// # Errors
    /// Returns `LlmError::ConfigError` if the TOML does not parse.
    pub fn from_toml(text: &str) -> Result<Self, LlmError> {
        let parsed: TomlPromptFile =
            toml::from_str(text).map_err(|e| LlmError::ConfigError(format!("invalid prompt file: {e}")))?;
        let d = parsed.prompt;
        Ok(Self {
            version: d.version,
            system: d.system.unwrap_or_else(|| DECISION_SYSTEM.into()),
            user: d.user,
        })
    }

    /// Load a template from a TOML file.
    ///
    /// # Errors
    /// Returns `LlmError::ConfigError` if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LlmError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LlmError::ConfigError(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Placeholders from [`DECISION_VARS`] that the user template never mentions.
    #[must_use]
    pub fn missing_vars(&self) -> Vec<&'static str> {
        DECISION_VARS
            .iter()
            .copied()
            .filter(|key| !self.user.contains(&format!("{{{key}}}")))
            .collect()
    }

    /// Render `(system, user)` with every `{key}` replaced.
    #[must_use]
    pub fn render(&self, vars: &[(&str, &str)]) -> (String, String) {
        (render_template(&self.system, vars), render_template(&self.user, vars))
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}
