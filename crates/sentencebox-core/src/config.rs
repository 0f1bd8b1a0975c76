// Configuration loading and parsing (config/sentencebox.toml).
//
// Lookup order: `config/sentencebox.toml` under the working directory (seeded
// from `defaults/` when missing), then the per-user config directory, then the
// built-in defaults. `SENTENCEBOX_SERVER` overrides the backend URL.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// File name of the configuration file, in both `config/` and `defaults/`.
pub const CONFIG_FILE_NAME: &str = "sentencebox.toml";

/// Environment variable that overrides `server.base_url`.
pub const SERVER_ENV_VAR: &str = "SENTENCEBOX_SERVER";

/// Upper bound on the decorative particle count.
pub const MAX_PARTICLES: usize = 500;

/// Polling faster than this would hammer the backend for no visible gain.
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub sync: SyncConfig,
    pub groups: GroupConfig,
    pub clipboard: ClipboardConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Backend root, e.g. `http://localhost:8080`. The `/api/sentences`
    /// paths are appended to it.
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            base_url: "http://localhost:8080".to_string(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub poll_interval_ms: u64,
    /// Stop polling while the terminal window does not have focus.
    pub pause_when_hidden: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            poll_interval_ms: 5_000,
            pause_when_hidden: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Group the backend assigns when none is given. Deleting a group moves
    /// its sentences here.
    pub default_group: String,
}

impl Default for GroupConfig {
    fn default() -> Self {
        GroupConfig {
            default_group: "默认".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Command (program followed by arguments) that reads the text to copy
    /// from stdin. Tried before the platform fallbacks.
    pub command: Option<Vec<String>>,
    /// Report copies to the backend so its `copy_count` stays current.
    pub report_copies: bool,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        ClipboardConfig {
            command: None,
            report_copies: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub toast_ms: u64,
    pub merit_ms: u64,
    pub flash_ms: u64,
    pub merit_text: String,
    pub particles: ParticleConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            toast_ms: 1_500,
            merit_ms: 1_000,
            flash_ms: 200,
            merit_text: "merit +1".to_string(),
            particles: ParticleConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub enabled: bool,
    pub count: usize,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        ParticleConfig {
            enabled: true,
            count: 20,
        }
    }
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.sync.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.server.timeout_ms)
    }

    /// Replace the backend URL when an override is present and non-blank.
    pub fn with_server_override(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            let url = url.trim();
            if !url.is_empty() {
                self.server.base_url = url.to_string();
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/sentencebox.toml` relative to `base_dir`.
///
/// Does not copy defaults; see [`ensure_config_files`].
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    load_config_file(&base_dir.join("config").join(CONFIG_FILE_NAME))
}

/// Load and validate a single config file. Missing sections and keys fall
/// back to their defaults.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let text = read_file(path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
///
/// A missing `defaults/` directory is not an error: the built-in defaults
/// cover that case.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Per-user config file, e.g. `~/.config/sentencebox/sentencebox.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "sentencebox")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Resolve the configuration for `base_dir` without consulting the
/// environment. `user_path` is the per-user fallback file, if any.
pub fn resolve_config(base_dir: &Path, user_path: Option<&Path>) -> Result<Config, ConfigError> {
    ensure_config_files(base_dir)?;

    let local = base_dir.join("config").join(CONFIG_FILE_NAME);
    if local.is_file() {
        return load_config_file(&local);
    }
    if let Some(path) = user_path.filter(|p| p.is_file()) {
        return load_config_file(path);
    }

    let config = Config::default();
    validate(&config)?;
    Ok(config)
}

/// Convenience wrapper: loads config relative to the current working
/// directory, falls back to the user config dir, then applies the
/// `SENTENCEBOX_SERVER` override.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    let user_path = user_config_path();
    let config = resolve_config(&cwd, user_path.as_deref())?
        .with_server_override(std::env::var(SERVER_ENV_VAR).ok());
    validate(&config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let url = config.server.base_url.trim();
    if url.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "server.base_url".into(),
            message: "must not be empty".into(),
        });
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::ValidationError {
            field: "server.base_url".into(),
            message: format!("must start with http:// or https://, got {url}"),
        });
    }

    if config.server.timeout_ms == 0 {
        return Err(ConfigError::ValidationError {
            field: "server.timeout_ms".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.sync.poll_interval_ms < MIN_POLL_INTERVAL_MS {
        return Err(ConfigError::ValidationError {
            field: "sync.poll_interval_ms".into(),
            message: format!(
                "must be at least {MIN_POLL_INTERVAL_MS}, got {}",
                config.sync.poll_interval_ms
            ),
        });
    }

    if config.groups.default_group.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "groups.default_group".into(),
            message: "must not be empty".into(),
        });
    }

    if let Some(command) = &config.clipboard.command {
        if command.first().map_or(true, |program| program.trim().is_empty()) {
            return Err(ConfigError::ValidationError {
                field: "clipboard.command".into(),
                message: "must name a program".into(),
            });
        }
    }

    if config.ui.particles.count > MAX_PARTICLES {
        return Err(ConfigError::ValidationError {
            field: "ui.particles.count".into(),
            message: format!(
                "must be at most {MAX_PARTICLES}, got {}",
                config.ui.particles.count
            ),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
