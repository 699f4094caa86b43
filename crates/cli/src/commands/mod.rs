//! CLI commands and the context they share.

pub mod list;
pub mod run;

use anyhow::{Context as _, bail};
use shopbot_config::AppConfig;
use shopbot_core::task::SessionMeta;
use shopbot_store::HttpBenchmark;
use std::sync::Arc;
use crate::Cli;

/// Resolved configuration plus the harness client.
pub struct Context {
    pub config: AppConfig,
    pub provider: String,
    pub model: String,
    pub strategy: String,
    pub benchmark: Arc<HttpBenchmark>,
}

impl Context {
    /// Load configuration and apply command-line overrides.
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let config = AppConfig::load(cli.config.as_deref()).context("Failed to load config")?;
        Self::resolve(config, cli)
    }

    fn resolve(mut config: AppConfig, cli: &Cli) -> anyhow::Result<Self> {
        let provider = cli
            .provider
            .clone()
            .unwrap_or_else(|| config.default_provider.clone());
        let model = cli
            .model
            .clone()
            .unwrap_or_else(|| config.model_for(&provider));
        if let Some(strategy) = &cli.strategy {
            config.agent.strategy = strategy.clone();
        }
        let strategy = config.agent.strategy.clone();

        if config.benchmark.api_key.is_none() {
            bail!(
                "No ERC3 API key configured. Set ERC3_API_KEY or benchmark.api_key in {}",
                AppConfig::config_dir().join("config.toml").display()
            );
        }

        let benchmark = Arc::new(HttpBenchmark::new(
            config.benchmark.api_url.clone(),
            config.benchmark.api_key.clone(),
        ));

        Ok(Self {
            config,
            provider,
            model,
            strategy,
            benchmark,
        })
    }

    /// Metadata sent when the session starts.
    pub fn session_meta(&self) -> SessionMeta {
        SessionMeta {
            benchmark: self.config.benchmark.benchmark.clone(),
            workspace: self.config.benchmark.workspace.clone(),
            name: format!("Shopbot ({})", self.model),
            architecture: format!("{} strategy with {}", self.strategy, self.provider),
            flags: self.config.benchmark.flags.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config_with_key() -> AppConfig {
        let mut config = AppConfig::default();
        config.benchmark.api_key = Some("erc3-key".into());
        config
    }

    #[test]
    fn defaults_follow_config() {
        let cli = Cli::try_parse_from(["shopbot"]).unwrap();
        let ctx = Context::resolve(config_with_key(), &cli).unwrap();
        assert_eq!(ctx.provider, "openrouter");
        assert_eq!(ctx.model, "openai/gpt-4o");
        assert_eq!(ctx.strategy, "agent");

        let meta = ctx.session_meta();
        assert_eq!(meta.benchmark, "store");
        assert_eq!(meta.workspace, "my");
        assert_eq!(meta.name, "Shopbot (openai/gpt-4o)");
        assert_eq!(meta.architecture, "agent strategy with openrouter");
        assert_eq!(meta.flags, vec!["compete_accuracy"]);
    }

    #[test]
    fn gigachat_gets_its_own_default_model() {
        let cli = Cli::try_parse_from(["shopbot", "-p", "gigachat", "--strategy", "search"]).unwrap();
        let ctx = Context::resolve(config_with_key(), &cli).unwrap();
        assert_eq!(ctx.model, "GigaChat-2-Max");
        assert_eq!(ctx.strategy, "search");
        assert_eq!(ctx.config.agent.strategy, "search");
    }

    #[test]
    fn explicit_model_wins() {
        let cli = Cli::try_parse_from(["shopbot", "-m", "anthropic/claude-sonnet-4"]).unwrap();
        let ctx = Context::resolve(config_with_key(), &cli).unwrap();
        assert_eq!(ctx.model, "anthropic/claude-sonnet-4");
    }

    #[test]
    fn missing_erc3_key_is_fatal() {
        let cli = Cli::try_parse_from(["shopbot"]).unwrap();
        let err = Context::resolve(AppConfig::default(), &cli).err().unwrap();
        assert!(err.to_string().contains("ERC3_API_KEY"));
    }
}
