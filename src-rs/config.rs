use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Agent runtime target configuration from Config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub agent_runtime_arn: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_qualifier")]
    pub qualifier: String,
    /// Overrides the regional AgentCore endpoint, e.g. for an agent running
    /// on localhost:8080.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_chunk_timeout_secs")]
    pub chunk_timeout_secs: u64,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_qualifier() -> String {
    "DEFAULT".to_string()
}

fn default_chunk_timeout_secs() -> u64 {
    60
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            agent_runtime_arn: String::new(),
            region: default_region(),
            qualifier: default_qualifier(),
            endpoint: None,
            chunk_timeout_secs: default_chunk_timeout_secs(),
        }
    }
}

impl RuntimeConfig {
    /// Base URL of the runtime service, without a trailing slash.
    pub fn endpoint_url(&self) -> String {
        match self.endpoint.as_deref() {
            Some(e) if !e.trim().is_empty() => e.trim().trim_end_matches('/').to_string(),
            _ => format!("https://bedrock-agentcore.{}.amazonaws.com", self.region),
        }
    }
}

/// Session persistence configuration from Config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_ttl_days")]
    pub ttl_days: i64,
    /// Directory holding persisted session state. Defaults to
    /// ~/.taxagent/state when absent.
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
}

fn default_ttl_days() -> i64 {
    7
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_days: default_ttl_days(),
            state_dir: None,
        }
    }
}

/// User override configuration (restricted fields)
#[derive(Deserialize)]
pub struct UserOverrideConfig {
    pub agent_runtime_arn: Option<String>,
    pub region: Option<String>,
    pub qualifier: Option<String>,
    pub endpoint: Option<String>,
    pub ttl_days: Option<i64>,
    pub state_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load order (later layers win):
    /// 1. Defaults (embedded Config.toml)
    /// 2. User config (~/.taxagent/taxagent.json)
    /// 3. Environment (TAXAGENT_RUNTIME_ARN, TAXAGENT_REGION,
    ///    TAXAGENT_QUALIFIER, TAXAGENT_ENDPOINT)
    pub fn load() -> Result<Self> {
        let default_str = include_str!("../Config.toml");
        let mut config: AppConfig =
            toml::from_str(default_str).context("Failed to parse embedded Config.toml")?;

        if let Some(home) = dirs::home_dir() {
            let user_path = home.join(".taxagent").join("taxagent.json");
            if user_path.exists() {
                match fs::read_to_string(&user_path) {
                    Ok(content) => match serde_json::from_str::<UserOverrideConfig>(&content) {
                        Ok(overrides) => config.apply_user_overrides(overrides),
                        Err(e) => {
                            log::warn!("Ignoring malformed {}: {}", user_path.display(), e)
                        }
                    },
                    Err(e) => log::warn!("Failed to read {}: {}", user_path.display(), e),
                }
            }
        }

        config.apply_env_overrides();
        Ok(config)
    }

    pub(crate) fn apply_user_overrides(&mut self, overrides: UserOverrideConfig) {
        if let Some(arn) = non_empty(overrides.agent_runtime_arn) {
            self.runtime.agent_runtime_arn = arn;
        }
        if let Some(region) = non_empty(overrides.region) {
            self.runtime.region = region;
        }
        if let Some(qualifier) = non_empty(overrides.qualifier) {
            self.runtime.qualifier = qualifier;
        }
        if let Some(endpoint) = non_empty(overrides.endpoint) {
            self.runtime.endpoint = Some(endpoint);
        }
        if let Some(ttl_days) = overrides.ttl_days {
            if ttl_days > 0 {
                self.session.ttl_days = ttl_days;
            }
        }
        if let Some(dir) = overrides.state_dir {
            self.session.state_dir = Some(dir);
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Some(arn) = non_empty(std::env::var("TAXAGENT_RUNTIME_ARN").ok()) {
            self.runtime.agent_runtime_arn = arn;
        }
        if let Some(region) = non_empty(std::env::var("TAXAGENT_REGION").ok()) {
            self.runtime.region = region;
        }
        if let Some(qualifier) = non_empty(std::env::var("TAXAGENT_QUALIFIER").ok()) {
            self.runtime.qualifier = qualifier;
        }
        if let Some(endpoint) = non_empty(std::env::var("TAXAGENT_ENDPOINT").ok()) {
            self.runtime.endpoint = Some(endpoint);
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
