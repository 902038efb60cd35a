// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use airq_app::{LocationId, Section};
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "airq";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT: &str = "30s";
const DEFAULT_LOCATION: &str = "new-york";
const DEFAULT_LOG_LEVEL: &str = "info";
const CONFIG_PATH_ENV: &str = "AIRQ_CONFIG_PATH";
const PREDICT_URL_ENV: &str = "AIRQ_PREDICT_URL";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub service: Service,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            service: Service::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Service {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub default_section: Option<String>,
    pub default_location: Option<String>,
    pub confirm_discard: Option<bool>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            default_section: Some(Section::Enterprise.as_str().to_owned()),
            default_location: Some(DEFAULT_LOCATION.to_owned()),
            confirm_discard: Some(false),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [service], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.service.base_url {
            airq_client::validate_base_url(base_url.trim_end_matches('/'))
                .with_context(|| format!("invalid [service] in {}", path.display()))?;
        }

        if let Some(timeout) = &self.service.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "service.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(section) = &self.ui.default_section
            && Section::parse(section).is_none()
        {
            bail!(
                "ui.default_section in {} must be \"enterprise\" or \"individual\", got {:?}",
                path.display(),
                section
            );
        }

        if let Some(location) = &self.ui.default_location
            && location.trim().is_empty()
        {
            bail!(
                "ui.default_location in {} must not be empty",
                path.display()
            );
        }

        if let Some(level) = &self.log.level
            && level.trim().is_empty()
        {
            bail!("log.level in {} must not be empty", path.display());
        }

        Ok(())
    }

    /// `AIRQ_PREDICT_URL` wins over the file.
    pub fn base_url(&self) -> String {
        if let Ok(url) = env::var(PREDICT_URL_ENV)
            && !url.trim().is_empty()
        {
            return url.trim().trim_end_matches('/').to_owned();
        }
        self.service
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_owned()
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.service.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn default_section(&self) -> Section {
        self.ui
            .default_section
            .as_deref()
            .and_then(Section::parse)
            .unwrap_or_default()
    }

    pub fn default_location(&self) -> LocationId {
        LocationId::new(
            self.ui
                .default_location
                .as_deref()
                .unwrap_or(DEFAULT_LOCATION)
                .trim(),
        )
    }

    pub fn confirm_discard(&self) -> bool {
        self.ui.confirm_discard.unwrap_or(false)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.log.file {
            Some(path) => Ok(PathBuf::from(path)),
            None => {
                let data_root = dirs::data_dir().ok_or_else(|| {
                    anyhow!("cannot resolve data directory; set [log].file in the config")
                })?;
                Ok(data_root.join(APP_NAME).join("airq.log"))
            }
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# airq config\n# Place this file at: {}\n\nversion = 1\n\n[service]\n# {PREDICT_URL_ENV} overrides base_url\nbase_url = \"{DEFAULT_BASE_URL}\"\ntimeout = \"{DEFAULT_TIMEOUT}\"\n\n[ui]\n# \"enterprise\" or \"individual\"\ndefault_section = \"enterprise\"\ndefault_location = \"{DEFAULT_LOCATION}\"\n# Ask before switching location drops table edits\nconfirm_discard = false\n\n[log]\n# RUST_LOG overrides level\nlevel = \"{DEFAULT_LOG_LEVEL}\"\n# Optional. Default is platform data dir (for example ~/.local/share/airq/airq.log)\n# file = \"/absolute/path/to/airq.log\"\n",
            path.display(),
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("timeout {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 30s)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration};
    use airq_app::{LocationId, Section};
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.default_section(), Section::Enterprise);
        assert_eq!(config.default_location(), LocationId::from("new-york"));
        assert!(!config.confirm_discard());
        assert_eq!(config.timeout()?, Duration::from_secs(30));
        assert_eq!(config.log_level(), "info");
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[service]\nbase_url = \"http://localhost:5000\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[service], [ui], and [log]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[service]\nbase_url = \"http://forecast.internal:8080/\"\ntimeout = \"2s\"\n[ui]\ndefault_section = \"individual\"\ndefault_location = \"paris\"\nconfirm_discard = true\n[log]\nlevel = \"debug\"\nfile = \"/tmp/airq-test.log\"\n",
        )?;

        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("AIRQ_PREDICT_URL");
        }
        let config = Config::load(&path)?;
        assert_eq!(config.base_url(), "http://forecast.internal:8080");
        assert_eq!(config.timeout()?, Duration::from_secs(2));
        assert_eq!(config.default_section(), Section::Individual);
        assert_eq!(config.default_location(), LocationId::from("paris"));
        assert!(config.confirm_discard());
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.log_path()?, PathBuf::from("/tmp/airq-test.log"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn base_url_must_be_http() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[service]\nbase_url = \"ftp://example.com\"\n")?;
        let error = Config::load(&path).expect_err("ftp base_url should fail");
        assert!(format!("{error:#}").contains("http or https"));
        Ok(())
    }

    #[test]
    fn unknown_section_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[ui]\ndefault_section = \"both\"\n")?;
        let error = Config::load(&path).expect_err("unknown section should fail");
        assert!(error.to_string().contains("ui.default_section"));
        Ok(())
    }

    #[test]
    fn non_positive_timeout_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[service]\ntimeout = \"0s\"\n")?;
        let error = Config::load(&path).expect_err("zero timeout should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn timeout_parses_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("5s")?, Duration::from_secs(5));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        Ok(())
    }

    #[test]
    fn timeout_rejects_invalid_duration() {
        let error = parse_duration("soon").expect_err("invalid duration should fail");
        assert!(error.to_string().contains("invalid"));
    }

    #[test]
    fn oversized_minute_timeout_is_a_config_error() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[service]\ntimeout = \"307445734561825861m\"\n")?;
        let error = Config::load(&path).expect_err("overflowing timeout should fail");
        assert!(format!("{error:#}").contains("too large"), "{error:#}");
        Ok(())
    }

    #[test]
    fn predict_url_env_overrides_file() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) =
            write_config("version = 1\n[service]\nbase_url = \"http://from-config:5000\"\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("AIRQ_PREDICT_URL", "http://from-env:9000/");
        }
        let config = Config::load(&path)?;
        let resolved = config.base_url();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("AIRQ_PREDICT_URL");
        }
        assert_eq!(resolved, "http://from-env:9000");
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("AIRQ_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("AIRQ_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn default_path_uses_config_toml_suffix_when_no_env_override() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("AIRQ_CONFIG_PATH");
        }
        let path = Config::default_path()?;
        assert!(path.ends_with("airq/config.toml"));
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, Config::example_config(&path))?;

        let config = Config::load(&path)?;
        assert_eq!(config.version, 1);
        assert_eq!(config.default_section(), Section::Enterprise);
        assert!(!config.confirm_discard());
        Ok(())
    }
}
