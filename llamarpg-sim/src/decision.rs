//! LLM-backed decision source.
//!
//! Renders the decision prompt from an NPC snapshot, sends it to the
//! inference service and pulls the `{action, target, reason}` object out of
//! the reply. Validation is left to the world.

use llamarpg_core::action::ActionKind;
use llamarpg_core::config::LlmConfig;
use llamarpg_core::decision::{DecisionRequest, DecisionSource};
use llamarpg_core::roster;
use llamarpg_core::{Activity, RawDecision};
use llamarpg_llm::extract::parse_structured;
use llamarpg_llm::prompt::PromptTemplate;
use llamarpg_llm::{LlmClient, LlmError, LlmProvider, LlmRequest};
use tracing::debug;

/// An inventory with fewer distinct items than this is "low on resources".
pub const LOW_RESOURCE_KINDS: usize = 3;

/// Any single count above this is "excess resources to trade".
pub const EXCESS_RESOURCE_COUNT: u32 = 10;

/// Asks the inference service what each NPC should do next.
#[derive(Debug, Clone)]
pub struct LlmDecisionSource {
    client: LlmClient,
    template: PromptTemplate,
    temperature: f32,
    json_mode: bool,
    timeout_ms: u64,
}

impl LlmDecisionSource {
    /// Wrap an existing client and template.
    #[must_use]
    pub fn new(client: LlmClient, template: PromptTemplate, config: &LlmConfig) -> Self {
        Self {
            client,
            template,
            temperature: config.temperature,
            json_mode: config.json_mode,
            timeout_ms: config.request_timeout_ms,
        }
    }

    /// Build the client and template described by `config`.
    ///
    /// # Errors
    /// Returns `LlmError::ConfigError` for an unknown provider or an
    /// unreadable prompt file.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let provider = LlmProvider::from_name(&config.provider, &config.base_url)?;
        let client = LlmClient::new(provider, config.model.clone());
        let template = match &config.prompt_file {
            Some(path) => PromptTemplate::from_file(path)?,
            None => PromptTemplate::builtin(),
        };
        let missing = template.missing_vars();
        if !missing.is_empty() {
            tracing::warn!(version = %template.version, ?missing, "prompt template ignores some placeholders");
        }
        Ok(Self::new(client, template, config))
    }

    /// Whether a backend is configured at all.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.client.is_available()
    }

    /// The `(system, user)` prompt pair for one request.
    #[must_use]
    pub fn render(&self, request: &DecisionRequest) -> (String, String) {
        let vars = prompt_vars(request);
        let borrowed: Vec<(&str, &str)> = vars.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.template.render(&borrowed)
    }
}

impl DecisionSource for LlmDecisionSource {
    type Error = LlmError;

    async fn decide(&self, request: DecisionRequest) -> Result<RawDecision, LlmError> {
        let (system, prompt) = self.render(&request);
        let llm_request = LlmRequest::new(system, prompt)
            .with_temperature(self.temperature)
            .with_json_mode(self.json_mode)
            .with_timeout(self.timeout_ms);
        let response = self.client.generate(&llm_request).await?;
        debug!(npc = %request.id, latency_ms = response.latency_ms, "decision received");
        parse_structured(&response)
    }
}

// ---------------------------------------------------------------------------
// Prompt variables
// ---------------------------------------------------------------------------

/// Every placeholder value for the decision template.
#[must_use]
pub fn prompt_vars(request: &DecisionRequest) -> Vec<(&'static str, String)> {
    let memories = if request.recent_memories.is_empty() {
        "No recent memories".to_string()
    } else {
        request.recent_memories.join(", ")
    };
    let nearby = if request.nearby.is_empty() {
        "None".to_string()
    } else {
        request
            .nearby
            .iter()
            .map(|n| format!("{} ({})", n.name, n.role))
            .collect::<Vec<_>>()
            .join(", ")
    };

    vec![
        ("name", request.name.clone()),
        ("role", request.role.clone()),
        ("personality", request.personality.clone()),
        ("location", request.location.to_string()),
        ("current_task", request.current_task.clone().unwrap_or_else(|| "None".into())),
        ("memories", memories),
        ("nearby", nearby),
        ("inventory", request.inventory.to_json()),
        ("time_of_day", request.context.time_of_day.to_string()),
        ("hints", resource_hints(request)),
        ("actions", action_menu()),
    ]
}

fn resource_hints(request: &DecisionRequest) -> String {
    let mut hints = String::new();
    if request.inventory.len() < LOW_RESOURCE_KINDS {
        hints.push_str("- You're low on resources\n");
    }
    if request.inventory.has_more_than(EXCESS_RESOURCE_COUNT) {
        hints.push_str("- You have excess resources to trade\n");
    }
    hints
}

/// Numbered list of the actions and their valid targets.
#[must_use]
pub fn action_menu() -> String {
    let names = |activity| {
        roster::resources_for(activity)
            .iter()
            .map(|r| r.name)
            .collect::<Vec<_>>()
            .join(", ")
    };
    ActionKind::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            let targets = match kind {
                ActionKind::Mine => names(Activity::Mining),
                ActionKind::Woodcut => names(Activity::Woodcutting),
                ActionKind::Move => "\"x,y\" coordinates (0-99 range)".to_string(),
                ActionKind::Trade | ActionKind::Chat => "nearby NPC id".to_string(),
            };
            format!("{}. {kind}: {targets}", i + 1)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use llamarpg_core::decision::NearbyNpc;
    use llamarpg_core::inventory::Inventory;
    use llamarpg_core::{EntityId, Location, TimeOfDay, WorldContext};

    fn request() -> DecisionRequest {
        DecisionRequest {
            id: EntityId::new("woodie"),
            name: "Woodie".into(),
            role: "Lumberjack".into(),
            personality: "A strong and quiet lumberjack.".into(),
            location: Location::new(33.7, 8.2),
            current_task: None,
            recent_memories: Vec::new(),
            inventory: Inventory::new(),
            nearby: Vec::new(),
            context: WorldContext::default(),
        }
    }

    #[test]
    fn empty_snapshot_uses_placeholders() {
        let source = LlmDecisionSource::new(LlmClient::none(), PromptTemplate::builtin(), &LlmConfig::default());
        let (_, user) = source.render(&request());
        assert!(user.contains("- Location: (33, 8)"));
        assert!(user.contains("- Current task: None"));
        assert!(user.contains("- Recent memories: No recent memories"));
        assert!(user.contains("- Nearby NPCs: None"));
        assert!(user.contains("- Inventory: {}"));
        assert!(user.contains("- Time of day: day"));
        assert!(user.contains("- You're low on resources"));
        assert!(!user.contains("excess resources"));
    }

    #[test]
    fn busy_snapshot_lists_neighbours_and_hints() {
        let mut req = request();
        req.current_task = Some("woodcut oak_wood".into());
        req.recent_memories = vec!["[09:00:00] Acquired 1x oak_wood".into(), "[09:00:03] Acquired 2x oak_wood".into()];
        for (item, n) in [("oak_wood", 14), ("maple_wood", 2), ("yew_wood", 1)] {
            req.inventory.add(item, n);
        }
        req.nearby.push(NearbyNpc {
            id: EntityId::new("smith_sara"),
            name: "Smith Sara".into(),
            role: "Blacksmith".into(),
            location: Location::new(30.0, 10.0),
            distance: 4.2,
        });
        req.context.time_of_day = TimeOfDay::Night;

        let vars = prompt_vars(&req);
        let get = |k: &str| vars.iter().find(|(key, _)| *key == k).map(|(_, v)| v.clone()).unwrap_or_default();
        assert_eq!(get("nearby"), "Smith Sara (Blacksmith)");
        assert_eq!(get("hints"), "- You have excess resources to trade\n");
        assert_eq!(get("current_task"), "woodcut oak_wood");
        assert_eq!(get("time_of_day"), "night");
        assert!(get("memories").contains("Acquired 1x oak_wood, [09:00:03]"));
    }

    #[test]
    fn action_menu_matches_resource_table() {
        let menu = action_menu();
        let lines: Vec<_> = menu.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "1. mine: copper_ore, iron_ore, gold_ore");
        assert_eq!(lines[1], "2. woodcut: oak_wood, maple_wood, yew_wood");
        assert_eq!(lines[2], "3. move: \"x,y\" coordinates (0-99 range)");
        assert_eq!(lines[4], "5. chat: nearby NPC id");
    }

    #[tokio::test]
    async fn no_provider_fails_the_decision() {
        let mut config = LlmConfig::default();
        config.provider = "none".into();
        let source = LlmDecisionSource::from_config(&config).expect("builds");
        assert!(!source.is_available());
        let err = source.decide(request()).await.expect_err("no backend");
        assert!(matches!(err, LlmError::Unavailable(_)));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let mut config = LlmConfig::default();
        config.provider = "mystery".into();
        assert!(LlmDecisionSource::from_config(&config).is_err());
    }
}
