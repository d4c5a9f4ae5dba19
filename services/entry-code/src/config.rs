use buzzer_core::config::{ConfigError, env_lookup, optional_parsed, required};

/// Entry-code function configuration loaded from environment variables.
///
/// Variable names match the deployment template of the function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryCodeConfig {
    /// SSM parameter name holding the shared device secret. Env var: `mqttSecretSsmName`.
    pub secret_parameter_name: String,
    /// MQTT topic the buzzer device subscribes to. Env var: `mqttTopic`.
    pub mqtt_topic: String,
    /// IoT data endpoint URL. Env var: `mqttEndpoint`; a bare host gets `https://`.
    pub mqtt_endpoint: String,
    /// DynamoDB table holding entry codes. Env var: `dDBTableName`.
    pub table_name: String,
    /// Per-operation timeout for every SDK call, in milliseconds. Env var: `sdkCallTimeoutMs`.
    pub call_timeout_ms: Option<u64>,
    /// Attempts per SDK call (default 1, i.e. no retries). Env var: `sdkMaxAttempts`.
    pub max_attempts: u32,
}

impl EntryCodeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_attempts = optional_parsed::<u32, _>(&lookup, "sdkMaxAttempts")?.unwrap_or(1);
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "sdkMaxAttempts",
                value: "0".to_owned(),
            });
        }
        Ok(Self {
            secret_parameter_name: required(&lookup, "mqttSecretSsmName")?,
            mqtt_topic: required(&lookup, "mqttTopic")?,
            mqtt_endpoint: endpoint_url(&required(&lookup, "mqttEndpoint")?),
            table_name: required(&lookup, "dDBTableName")?,
            call_timeout_ms: optional_parsed(&lookup, "sdkCallTimeoutMs")?,
            max_attempts,
        })
    }
}

fn endpoint_url(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_owned()
    } else {
        format!("https://{endpoint}")
    }
}
