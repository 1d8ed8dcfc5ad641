use crate::error::ScreeningError;
use config::{Config, Environment};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;

const ENV_PREFIX: &str = "SCREENING";

const DEFAULT_QUESTIONS_CSV: &str = "data/questions.csv";
const DEFAULT_SCENARIOS_CSV: &str = "data/scenarios.csv";
const DEFAULT_PASSAGES_CSV: &str = "data/passages.csv";
const DEFAULT_API_URL: &str = "http://localhost:5002";
const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TICK_SECS: u64 = 5;

/// Runtime settings, read from `SCREENING_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(rename = "questions_csv")]
    pub questions_path: PathBuf,
    #[serde(rename = "scenarios_csv")]
    pub scenarios_path: PathBuf,
    #[serde(rename = "passages_csv")]
    pub passages_path: PathBuf,
    #[serde(rename = "api_url")]
    pub api_base_url: String,
    #[serde(rename = "api_timeout_secs", deserialize_with = "from_secs")]
    pub request_timeout: Duration,
    #[serde(rename = "tick_secs", deserialize_with = "from_secs")]
    pub tick_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            questions_path: PathBuf::from(DEFAULT_QUESTIONS_CSV),
            scenarios_path: PathBuf::from(DEFAULT_SCENARIOS_CSV),
            passages_path: PathBuf::from(DEFAULT_PASSAGES_CSV),
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            tick_interval: Duration::from_secs(DEFAULT_TICK_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ScreeningError> {
        Self::load(None)
    }

    /// Like `from_env`, but reads the `SCREENING_*` keys from `vars` instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ScreeningError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source: config::Map<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self::load(Some(source))
    }

    fn load(source: Option<config::Map<String, String>>) -> Result<Self, ScreeningError> {
        let settings = Config::builder()
            .set_default("questions_csv", DEFAULT_QUESTIONS_CSV)?
            .set_default("scenarios_csv", DEFAULT_SCENARIOS_CSV)?
            .set_default("passages_csv", DEFAULT_PASSAGES_CSV)?
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("api_timeout_secs", DEFAULT_API_TIMEOUT_SECS)?
            .set_default("tick_secs", DEFAULT_TICK_SECS)?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(source),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        if config.tick_interval.is_zero() {
            return Err(ScreeningError::Config(
                "SCREENING_TICK_SECS must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }
}

fn from_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}
