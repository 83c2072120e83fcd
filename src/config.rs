use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::search::DEFAULT_MAX_TRIALS;
use crate::core::SearchConfig;
use crate::error::InputError;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// Search defaults applied when a request leaves an option out
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default = "default_scorer")]
    pub scorer: String,
    #[serde(default = "default_warper")]
    pub warper: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub boost: f64,
    #[serde(default = "default_trials")]
    pub trials: usize,
    #[serde(default = "default_max_trials")]
    pub max_trials: usize,
    /// Largest side accepted per request
    #[serde(default = "default_max_people")]
    pub max_people: usize,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default = "default_proposing_side")]
    pub proposing_side: String,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            method: default_method(),
            scorer: default_scorer(),
            warper: default_warper(),
            weight: default_weight(),
            boost: 0.0,
            trials: default_trials(),
            max_trials: default_max_trials(),
            max_people: default_max_people(),
            parallel: false,
            proposing_side: default_proposing_side(),
        }
    }
}

impl MatchingSettings {
    /// Parse and validate into the search defaults
    pub fn search_config(&self) -> Result<SearchConfig, InputError> {
        let config = SearchConfig {
            method: self.method.parse()?,
            scorer: self.scorer.parse()?,
            warper: self.warper.parse()?,
            weight: self.weight,
            boost: self.boost,
            trials: self.trials,
            max_trials: self.max_trials,
            seed: None,
            parallel: self.parallel,
            proposing_side: self.proposing_side.parse()?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn default_method() -> String { "smp".to_string() }
fn default_scorer() -> String { "real-match-count".to_string() }
fn default_warper() -> String { "identity".to_string() }
fn default_weight() -> f64 { 0.5 }
fn default_trials() -> usize { 1000 }
fn default_max_trials() -> usize { DEFAULT_MAX_TRIALS }
fn default_max_people() -> usize { 2000 }
fn default_proposing_side() -> String { "women".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_size")]
    pub l1_cache_size: u64,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            l1_cache_size: default_cache_size(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_cache_size() -> u64 { 1000 }
fn default_ttl_secs() -> u64 { 300 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with LUME_)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., LUME__MATCHING__TRIALS -> matching.trials
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("LUME")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
