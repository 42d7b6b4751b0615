use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CACHE_TTL_SECS, DEFAULT_MIN_TOPIC_SAMPLES};

/// The pipeline always reads a student's full history; only the per-subject
/// windows in `aggregate` are bounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsConfig {
    pub cache_ttl_secs: i64,
    /// 1 keeps the historical behaviour of flagging a topic after one low score.
    pub min_topic_samples: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            min_topic_samples: DEFAULT_MIN_TOPIC_SAMPLES,
        }
    }
}

impl InsightsConfig {
    pub fn from_env(env_config: &crate::config::InsightsEnvConfig) -> Self {
        let config = Self {
            cache_ttl_secs: env_config.cache_ttl_secs,
            min_topic_samples: env_config.min_topic_samples,
        };
        if let Err(reason) = config.validate() {
            tracing::warn!(reason = %reason, "Invalid insights config, using defaults");
            return Self::default();
        }
        config
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.cache_ttl_secs <= 0 {
            return Err("cache_ttl_secs must be positive".to_string());
        }
        if self.min_topic_samples == 0 {
            return Err("min_topic_samples must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::seconds(self.cache_ttl_secs)
    }
}
