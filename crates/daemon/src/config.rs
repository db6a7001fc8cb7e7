// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration file.
//!
//! Every key is optional. Environment overrides from [`crate::env`] are
//! applied after the file is read.

use nt_adapters::HubConfig;
use nt_engine::EngineConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Daily-rolled log files go here when set
    pub log_dir: Option<PathBuf>,
    pub hub: HubSection,
    pub upgrade: PipelineSection,
    pub prepull: PipelineSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
            hub: HubSection::default(),
            upgrade: PipelineSection::default(),
            prepull: PipelineSection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HubSection {
    pub url: String,
    pub reconnect_ms: u64,
    pub buffer: usize,
}

impl Default for HubSection {
    fn default() -> Self {
        Self { url: "ws://127.0.0.1:10350/tasks".to_string(), reconnect_ms: 1000, buffer: 1024 }
    }
}

impl HubSection {
    pub fn hub_config(&self) -> HubConfig {
        HubConfig {
            url: self.url.clone(),
            reconnect: Duration::from_millis(self.reconnect_ms),
            buffer: self.buffer,
        }
    }
}

/// Tuning for one job kind's pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSection {
    pub inbox_buffer: usize,
    pub workers: usize,
    pub default_timeout_secs: u64,
    pub poll_interval_secs: u64,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self { inbox_buffer: 1024, workers: 1, default_timeout_secs: 360, poll_interval_secs: 10 }
    }
}

impl PipelineSection {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            inbox_buffer: self.inbox_buffer,
            workers: self.workers,
            default_timeout: Duration::from_secs(self.default_timeout_secs),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
        }
    }

    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        let zero = [
            ("inbox_buffer", self.inbox_buffer as u64),
            ("workers", self.workers as u64),
            ("default_timeout_secs", self.default_timeout_secs),
            ("poll_interval_secs", self.poll_interval_secs),
        ]
        .into_iter()
        .find(|(_, v)| *v == 0);
        match zero {
            Some((key, _)) => Err(ConfigError::Invalid(format!("{section}.{key} must be positive"))),
            None => Ok(()),
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when there is no file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(path)
                    .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
                Self::parse(&text)?
            }
            _ => Self::default(),
        };
        let config = config.with_env();
        config.validate()?;
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    fn with_env(mut self) -> Self {
        if let Some(url) = crate::env::hub_url() {
            self.hub.url = url;
        }
        if let Some(dir) = crate::env::log_dir() {
            self.log_dir = Some(dir);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hub.url.is_empty() {
            return Err(ConfigError::Invalid("hub.url must not be empty".into()));
        }
        if self.hub.buffer == 0 {
            return Err(ConfigError::Invalid("hub.buffer must be positive".into()));
        }
        self.upgrade.validate("upgrade")?;
        self.prepull.validate("prepull")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
