use anyhow::Context;
use serde::Deserialize;
use std::fs;
use validator::PerformanceThresholds;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub run: RunConfig,
    pub thresholds: PerformanceThresholds,
    pub targets: Vec<TargetConfig>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub log_dir: String,
    pub report_dir: String,
    pub history_file: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_dir: "./logs".to_string(),
            report_dir: "./reports".to_string(),
            history_file: "./reports/history.jsonl".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RunConfig {
    pub iterations_per_scenario: usize,
    pub warmup_iterations: usize,
    pub request_timeout_secs: u64,
    pub max_tokens: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations_per_scenario: 1,
            warmup_iterations: 0,
            request_timeout_secs: 10,
            max_tokens: 500,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TargetConfig {
    pub name: String,
    pub kind: TargetKind,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Name of the environment variable holding the API key. Key material
    /// never lives in the config file.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Replay fixture path; without one a synthesized fixture is used.
    #[serde(default)]
    pub fixture: Option<String>,
    #[serde(default)]
    pub latency_ms: Option<u64>,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_sec: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Replay,
    Http,
}

fn default_rate_limit() -> u32 {
    10
}

pub fn load(path: &str) -> Result<AppConfig, anyhow::Error> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path))?;

    let config: AppConfig =
        toml::from_str(&content).with_context(|| "Failed to parse config.toml")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_parses_with_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [[targets]]
            name = "replay"
            kind = "replay"
            "#,
        )
        .expect("Failed to parse");

        assert_eq!(config.run.iterations_per_scenario, 1);
        assert_eq!(config.targets.len(), 1);
        assert_eq!(config.targets[0].kind, TargetKind::Replay);
        assert_eq!(config.targets[0].rate_limit_per_sec, 10);
    }

    #[test]
    fn test_http_target_config_parses() {
        let config: AppConfig = toml::from_str(
            r#"
            [thresholds]
            max_response_time_ms = 3000.0

            [[targets]]
            name = "gpt-4o"
            kind = "http"
            url = "https://api.openai.com/v1/chat/completions"
            model = "gpt-4o"
            api_key_env = "OPENAI_API_KEY"
            "#,
        )
        .expect("Failed to parse");

        assert_eq!(config.thresholds.max_response_time_ms, 3000.0);
        // Unset threshold fields keep their defaults.
        assert_eq!(config.thresholds.avg_response_time_ms, 2000.0);
        assert_eq!(config.targets[0].kind, TargetKind::Http);
        assert_eq!(
            config.targets[0].api_key_env.as_deref(),
            Some("OPENAI_API_KEY")
        );
    }
}
