use serde::{Deserialize, Serialize};

use crate::error::StartupError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub log: LogConfig,
    pub model: ModelConfig,
    pub http: HttpConfig,
}

/// `APP_*` variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// 0 keeps the actix-web default (one worker per core)
    #[serde(default)]
    pub workers: usize,
}

/// `LOG_*` variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `json` or `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// `MODEL_*` variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub path: String,
}

/// `HTTP_*` variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_vars(std::env::vars())
    }

    /// Build the configuration from an explicit variable set.
    pub fn from_vars<I>(vars: I) -> Result<Self, StartupError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();

        Ok(Config {
            app: envy::prefixed("APP_").from_iter(vars.clone())?,
            log: envy::prefixed("LOG_").from_iter(vars.clone())?,
            model: envy::prefixed("MODEL_").from_iter(vars.clone())?,
            http: envy::prefixed("HTTP_").from_iter(vars)?,
        })
    }
}

impl LogConfig {
    pub fn is_json(&self) -> bool {
        !self.format.eq_ignore_ascii_case("pretty")
    }
}

fn default_env() -> String {
    "development".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_model_path() -> String {
    "./models/churn_model.json".to_string()
}

fn default_max_body_bytes() -> usize {
    16 * 1024
}
