use crate::model::ConfigurationError;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub api_base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub max_output_tokens: u32,
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "chatgpt-4o-latest".to_string(),
            api_base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_output_tokens: 16_000,
            timeout_seconds: 180,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub urls: Vec<String>,
    pub output_path: String,
    pub model: ModelConfig,
    pub fetch_timeout_seconds: u64,
    pub concurrency: usize,
    /// Page text beyond this many characters is dropped before summarizing.
    pub max_content_chars: usize,
    pub affiliate_link_template: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            urls: vec![
                "https://www.hostinger.com/wordpress-hosting".to_string(),
                "https://world.siteground.com/wordpress-hosting.htm".to_string(),
                "https://www.bluehost.com/wordpress/wordpress-hosting".to_string(),
                "https://www.greengeeks.com/wordpress-hosting".to_string(),
            ],
            output_path: "wordpress_hosting_services.json".to_string(),
            model: ModelConfig::default(),
            fetch_timeout_seconds: 30,
            concurrency: 1,
            max_content_chars: 120_000,
            affiliate_link_template: "https://affiliate.link/{slug}".to_string(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.urls.is_empty() {
            return Err(ConfigurationError::Invalid("no URLs to process".into()));
        }
        if self.concurrency == 0 {
            return Err(ConfigurationError::Invalid(
                "concurrency must be at least 1".into(),
            ));
        }
        if self.fetch_timeout_seconds == 0 || self.model.timeout_seconds == 0 {
            return Err(ConfigurationError::Invalid(
                "timeouts must be greater than zero".into(),
            ));
        }
        if self.model.max_output_tokens == 0 {
            return Err(ConfigurationError::Invalid(
                "max_output_tokens must be greater than zero".into(),
            ));
        }
        if !self.affiliate_link_template.contains("{slug}") {
            return Err(ConfigurationError::Invalid(
                "affiliate_link_template must contain {slug}".into(),
            ));
        }
        Ok(())
    }
}

/// Loads and validates the config. A missing file means built-in defaults.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigurationError> {
    let config = match fs::read_to_string(path) {
        Ok(content) => parse_config(path, &content)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No {} found, using built-in defaults", path);
            AppConfig::default()
        }
        Err(source) => {
            return Err(ConfigurationError::Read {
                path: path.to_string(),
                source,
            });
        }
    };
    config.validate()?;
    Ok(config)
}

fn parse_config(path: &str, content: &str) -> Result<AppConfig, ConfigurationError> {
    serde_json::from_str(content).map_err(|source| ConfigurationError::Parse {
        path: path.to_string(),
        source,
    })
}
