//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use llamarpg_core::SimConfig;

/// LlamaRPG: watch LLM-driven NPCs gather, trade and chat.
#[derive(Parser, Debug, Default)]
#[command(name = "llamarpg")]
#[command(version, about = "LlamaRPG NPC simulation", long_about = None)]
pub struct Args {
    /// TOML configuration file
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Inference provider (ollama, none)
    #[arg(short = 'p', long = "provider")]
    pub provider: Option<String>,

    /// Model name sent to the provider
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// Provider base URL
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// RNG seed for spawn positions and outcomes
    #[arg(short = 's', long = "seed")]
    pub seed: Option<u64>,

    /// Log filter, e.g. `info` or `llamarpg_core=debug`
    #[arg(long = "log-level")]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long = "log-json")]
    pub log_json: bool,

    /// Disable coloured console output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Args {
    /// Overlay command-line values on a loaded configuration.
    pub fn apply(&self, config: &mut SimConfig) {
        if let Some(provider) = &self.provider {
            config.llm.provider.clone_from(provider);
        }
        if let Some(model) = &self.model {
            config.llm.model.clone_from(model);
        }
        if let Some(url) = &self.base_url {
            config.llm.base_url.clone_from(url);
        }
        if let Some(level) = &self.log_level {
            config.general.log_level.clone_from(level);
        }
    }
}
