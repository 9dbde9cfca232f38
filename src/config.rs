//! ScamBait configuration management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main ScamBait configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScamBaitConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// External model client configuration
    pub model: ModelConfig,

    /// Scam detection thresholds
    pub detection: DetectionConfig,

    /// Engagement loop configuration
    pub engagement: EngagementConfig,

    /// Intelligence callback configuration
    pub callback: CallbackConfig,
}

impl ScamBaitConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// API key expected in the `x-api-key` header (empty disables the check)
    pub api_key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18940,
            api_key: String::new(),
        }
    }
}

/// External model client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of the OpenAI-compatible chat completions API
    pub base_url: String,

    /// API key for the model provider
    pub api_key: String,

    /// Model name
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: String::new(),
            model: "llama-3.3-70b-versatile".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Scam detection thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Confidence at or above which a verdict counts as scam
    pub confidence_threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
        }
    }
}

/// Engagement loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    /// Hard ceiling on inbound messages per session
    pub max_turns: u32,

    /// Distinct artifact kinds to capture before disengaging
    pub target_artifact_kinds: usize,

    /// Number of recent messages passed to the model as context
    pub history_window: usize,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            max_turns: 50,
            target_artifact_kinds: 2,
            history_window: 8,
        }
    }
}

/// Intelligence callback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackConfig {
    /// Endpoint that receives the final intelligence payload
    pub url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Transport retry attempts after the initial send
    pub max_retries: u32,

    /// Delay between retry attempts in milliseconds
    pub retry_backoff_ms: u64,
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9/unset-callback".to_string(),
            timeout_secs: 10,
            max_retries: 3,
            retry_backoff_ms: 500,
        }
    }
}
