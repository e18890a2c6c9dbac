// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration management for the Garmin MCP server
//!
//! A TOML file is used when present, otherwise `.env` plus environment
//! variables. Missing keys fall back to defaults in both cases.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants::garmin::{
    DEFAULT_API_BASE_URL, DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_BASE_DELAY_MS,
    DEFAULT_TOKEN_DIR,
};
use crate::constants::limits::DEFAULT_WORKOUT_MAX_STEPS;
use crate::units::Pace;
use crate::workout::compiler::DEFAULT_REFERENCE_PACE;
use crate::workout::CompilerOptions;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub garmin: GarminConfig,
    pub workout: WorkoutConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GarminConfig {
    /// Garmin Connect API base URL
    pub api_base_url: String,
    /// Directory holding `oauth2_token.json`
    pub token_dir: PathBuf,
    /// Fixed bearer token; takes precedence over the token directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Requests made for one call before a 429 is reported
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for GarminConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_dir: default_token_dir(),
            access_token: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkoutConfig {
    /// Pace assumed for distance steps when estimating duration (`m:ss`)
    pub reference_pace: String,
    /// Upper bound on flattened steps per workout
    pub max_steps: usize,
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            reference_pace: DEFAULT_REFERENCE_PACE.to_string(),
            max_steps: DEFAULT_WORKOUT_MAX_STEPS,
        }
    }
}

impl WorkoutConfig {
    pub fn compiler_options(&self) -> Result<CompilerOptions> {
        let reference_pace: Pace = self
            .reference_pace
            .parse()
            .with_context(|| format!("Invalid reference pace '{}'", self.reference_pace))?;
        Ok(CompilerOptions {
            reference_pace,
            max_steps: self.max_steps,
        })
    }
}

impl Config {
    pub fn load(path: Option<String>) -> Result<Self> {
        let config_path = path.unwrap_or_else(|| default_config_path().to_string_lossy().to_string());

        let config = if Path::new(&config_path).exists() {
            info!("Loading configuration from {config_path}");
            let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
            let mut config: Config = toml::from_str(&content).context("Failed to parse config file")?;
            config.garmin.token_dir = expand_home(&config.garmin.token_dir);
            config
        } else {
            Self::from_env()?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `.env` and environment variables
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenv::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        let defaults = GarminConfig::default();
        let garmin = GarminConfig {
            api_base_url: env_var_or("GARMIN_API_BASE_URL", DEFAULT_API_BASE_URL),
            token_dir: env::var("GARMIN_TOKEN_DIR")
                .map(|dir| expand_home(Path::new(&dir)))
                .unwrap_or(defaults.token_dir),
            access_token: env::var("GARMIN_ACCESS_TOKEN").ok().filter(|token| !token.is_empty()),
            max_attempts: env_var_or("GARMIN_MAX_ATTEMPTS", &DEFAULT_MAX_ATTEMPTS.to_string())
                .parse()
                .context("Invalid GARMIN_MAX_ATTEMPTS value")?,
            retry_base_delay_ms: env_var_or("GARMIN_RETRY_BASE_DELAY_MS", &DEFAULT_RETRY_BASE_DELAY_MS.to_string())
                .parse()
                .context("Invalid GARMIN_RETRY_BASE_DELAY_MS value")?,
            request_timeout_secs: env_var_or(
                "GARMIN_REQUEST_TIMEOUT_SECS",
                &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
            )
            .parse()
            .context("Invalid GARMIN_REQUEST_TIMEOUT_SECS value")?,
        };

        let workout = WorkoutConfig {
            reference_pace: env_var_or("WORKOUT_REFERENCE_PACE", &DEFAULT_REFERENCE_PACE.to_string()),
            max_steps: env_var_or("WORKOUT_MAX_STEPS", &DEFAULT_WORKOUT_MAX_STEPS.to_string())
                .parse()
                .context("Invalid WORKOUT_MAX_STEPS value")?,
        };

        Ok(Self { garmin, workout })
    }

    pub fn save(&self, path: Option<String>) -> Result<()> {
        let config_path = path.unwrap_or_else(|| default_config_path().to_string_lossy().to_string());

        let parent = Path::new(&config_path).parent().context("Invalid config path")?;
        fs::create_dir_all(parent)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.garmin.api_base_url)
            .with_context(|| format!("Invalid Garmin API base URL '{}'", self.garmin.api_base_url))?;

        if self.garmin.max_attempts == 0 {
            return Err(anyhow::anyhow!("GARMIN_MAX_ATTEMPTS must be at least 1"));
        }
        if self.garmin.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("GARMIN_REQUEST_TIMEOUT_SECS must be at least 1"));
        }
        if self.workout.max_steps == 0 {
            return Err(anyhow::anyhow!("WORKOUT_MAX_STEPS must be at least 1"));
        }
        self.workout.compiler_options()?;

        if self.garmin.access_token.is_none() && !self.garmin.token_dir.exists() {
            warn!(
                "No GARMIN_ACCESS_TOKEN set and token directory {} does not exist; tool calls will fail until you log in",
                self.garmin.token_dir.display()
            );
        }

        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    pub fn summary(&self) -> String {
        format!(
            "Garmin MCP Server Configuration:\n\
             - API: {}\n\
             - Credentials: {}\n\
             - Retries: {} attempts, {}ms base delay\n\
             - Reference pace: {}/km\n\
             - Max workout steps: {}",
            self.garmin.api_base_url,
            if self.garmin.access_token.is_some() {
                "static token".to_string()
            } else {
                format!("token directory {}", self.garmin.token_dir.display())
            },
            self.garmin.max_attempts,
            self.garmin.retry_base_delay_ms,
            self.workout.reference_pace,
            self.workout.max_steps,
        )
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join("garmin-mcp-server/config.toml"))
        .unwrap_or_else(|| "config.toml".into())
}

fn default_token_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_TOKEN_DIR))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_DIR))
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
