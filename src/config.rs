use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,
    #[serde(default = "default_catalog_load_delay_ms")]
    pub catalog_load_delay_ms: u64,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
    #[serde(default = "default_detail_max_chars")]
    pub detail_max_chars: usize,
    #[serde(default = "default_trace_file")]
    pub trace_file: PathBuf,
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SerialConfig {
    #[serde(default = "default_serial_program")]
    pub program: String,
    #[serde(default = "default_serial_args")]
    pub args: Vec<String>,
    #[serde(default = "default_serial_placeholder")]
    pub placeholder: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_directory: default_log_directory(),
            refresh_interval: default_refresh_interval(),
            catalog_load_delay_ms: default_catalog_load_delay_ms(),
            tick_rate_ms: default_tick_rate_ms(),
            suggestion_limit: default_suggestion_limit(),
            detail_max_chars: default_detail_max_chars(),
            trace_file: default_trace_file(),
            serial: SerialConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            program: default_serial_program(),
            args: default_serial_args(),
            placeholder: default_serial_placeholder(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen: default_listen(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("не удалось прочитать файл конфигурации {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("не удалось разобрать YAML в {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("ошибка валидации конфигурации: {0}")]
    Validation(String),
}

impl Config {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let path_display = path_ref.display().to_string();
        let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
            path: path_display.clone(),
            source,
        })?;

        let cfg: Config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path_display,
            source,
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_directory.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "поле log_directory обязательно".to_string(),
            ));
        }
        let interval = self.refresh_interval()?;
        if interval < Duration::from_secs(1) {
            return Err(ConfigError::Validation(
                "refresh_interval должно быть >= 1s".to_string(),
            ));
        }
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::Validation(
                "tick_rate_ms должно быть > 0".to_string(),
            ));
        }
        if self.suggestion_limit < 1 {
            return Err(ConfigError::Validation(
                "suggestion_limit должно быть >= 1".to_string(),
            ));
        }
        if self.detail_max_chars < 1 {
            return Err(ConfigError::Validation(
                "detail_max_chars должно быть >= 1".to_string(),
            ));
        }

        validate_serial(&self.serial)?;
        validate_http(&self.http)?;

        Ok(())
    }

    pub fn refresh_interval(&self) -> Result<Duration, ConfigError> {
        humantime::parse_duration(self.refresh_interval.trim()).map_err(|err| {
            ConfigError::Validation(format!(
                "refresh_interval '{}' не является длительностью: {err}",
                self.refresh_interval
            ))
        })
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../config.yaml.example")
    }
}

fn validate_serial(cfg: &SerialConfig) -> Result<(), ConfigError> {
    if cfg.program.trim().is_empty() {
        return Err(ConfigError::Validation(
            "serial.program не должен быть пустым".to_string(),
        ));
    }
    if cfg.placeholder.trim().is_empty() {
        return Err(ConfigError::Validation(
            "serial.placeholder не должен быть пустым".to_string(),
        ));
    }
    Ok(())
}

fn validate_http(cfg: &HttpConfig) -> Result<(), ConfigError> {
    if SocketAddr::from_str(&cfg.listen).is_err() {
        return Err(ConfigError::Validation(
            "поле http.listen должно быть корректным адресом host:port".to_string(),
        ));
    }
    Ok(())
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("./enrollment-logs")
}

fn default_refresh_interval() -> String {
    "5m".to_string()
}

const fn default_catalog_load_delay_ms() -> u64 {
    200
}

const fn default_tick_rate_ms() -> u64 {
    250
}

const fn default_suggestion_limit() -> usize {
    8
}

const fn default_detail_max_chars() -> usize {
    80
}

fn default_trace_file() -> PathBuf {
    PathBuf::from("./enrolldash.log")
}

#[cfg(target_os = "windows")]
fn default_serial_program() -> String {
    "powershell".to_string()
}

#[cfg(not(target_os = "windows"))]
fn default_serial_program() -> String {
    "sh".to_string()
}

#[cfg(target_os = "windows")]
fn default_serial_args() -> Vec<String> {
    vec![
        "-NoProfile".to_string(),
        "-Command".to_string(),
        "# serial lookup not available".to_string(),
    ]
}

#[cfg(not(target_os = "windows"))]
fn default_serial_args() -> Vec<String> {
    vec!["-c".to_string(), ":".to_string()]
}

fn default_serial_placeholder() -> String {
    "Unknown".to_string()
}

fn default_listen() -> String {
    "127.0.0.1:9120".to_string()
}
