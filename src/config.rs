//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! The optional feed API key is referenced by env-var name in the config
//! and resolved at runtime.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::time::Duration;

use crate::engine::controller::ControllerSettings;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub feed: FeedConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    pub tick_interval_secs: u64,
    #[serde(default = "default_trade_latency_ms")]
    pub trade_latency_ms: u64,
    #[serde(default = "default_activity_latency_ms")]
    pub activity_latency_ms: u64,
    /// Centre of the synthetic price band.
    pub base_price: f64,
    /// Start the simulation as soon as the process is up.
    #[serde(default)]
    pub autostart: bool,
    /// Fixed RNG seed for reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub enabled: bool,
    pub base_url: String,
    pub symbol: String,
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub enabled: bool,
    pub port: u16,
}

fn default_trade_latency_ms() -> u64 {
    1200
}

fn default_activity_latency_ms() -> u64 {
    600
}

fn default_timeout_secs() -> u64 {
    10
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        if config.simulation.tick_interval_secs == 0 {
            anyhow::bail!("simulation.tick_interval_secs must be positive");
        }
        if !(config.simulation.base_price.is_finite() && config.simulation.base_price > 0.0) {
            anyhow::bail!("simulation.base_price must be a positive price");
        }
        Ok(config)
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            tick_interval: Duration::from_secs(self.simulation.tick_interval_secs),
            trade_latency: Duration::from_millis(self.simulation.trade_latency_ms),
            activity_latency: Duration::from_millis(self.simulation.activity_latency_ms),
        }
    }

    /// Feed API key, if one is configured and present in the environment.
    pub fn feed_api_key(&self) -> Option<SecretString> {
        self.feed
            .api_key_env
            .as_deref()
            .and_then(|name| Self::resolve_env(name).ok())
            .filter(|key| !key.is_empty())
            .map(SecretString::new)
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
