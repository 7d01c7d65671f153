// Configuration loading and parsing (server.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

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
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub fallback: FallbackConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// server.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire server.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ServerFile {
    server: ServerConfig,
    llm: LlmConfig,
    fallback: FallbackConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub db_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub trip_max_tokens: u32,
    pub chat_max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FallbackConfig {
    /// How many records service wrappers return when operating without a
    /// credential (hotels, flights, cars, events).
    pub result_count: usize,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

/// Per-provider API credentials. Every field is optional: a missing key
/// puts the corresponding service wrapper into fallback mode.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
    pub hotels_api_key: Option<String>,
    pub flights_api_key: Option<String>,
    pub cars_api_key: Option<String>,
    pub weather_api_key: Option<String>,
    pub translation_api_key: Option<String>,
    pub events_api_key: Option<String>,
    pub esim_api_key: Option<String>,
    pub payments_api_key: Option<String>,
    pub music_client_id: Option<String>,
    pub music_client_secret: Option<String>,
}

impl CredentialsConfig {
    /// Fill any key missing from credentials.toml from its conventional
    /// environment variable. The TOML value wins when both are present.
    fn apply_env_fallbacks(&mut self) {
        fn env_or(slot: &mut Option<String>, var: &str) {
            if slot.is_none() {
                if let Ok(v) = std::env::var(var) {
                    if !v.is_empty() {
                        *slot = Some(v);
                    }
                }
            }
        }
        env_or(&mut self.anthropic_api_key, "ANTHROPIC_API_KEY");
        env_or(&mut self.hotels_api_key, "HOTELS_API_KEY");
        env_or(&mut self.flights_api_key, "FLIGHTS_API_KEY");
        env_or(&mut self.cars_api_key, "CARS_API_KEY");
        env_or(&mut self.weather_api_key, "WEATHER_API_KEY");
        env_or(&mut self.translation_api_key, "TRANSLATION_API_KEY");
        env_or(&mut self.events_api_key, "TICKETMASTER_API_KEY");
        env_or(&mut self.esim_api_key, "ESIM_API_KEY");
        env_or(&mut self.payments_api_key, "PAYMENTS_API_KEY");
        env_or(&mut self.music_client_id, "SPOTIFY_CLIENT_ID");
        env_or(&mut self.music_client_secret, "SPOTIFY_CLIENT_SECRET");
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/server.toml` and
/// (optionally) `config/credentials.toml`, relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy
/// defaults. Prefer `load_config()` which handles default initialization
/// automatically.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- server.toml (required) ---
    let server_path = config_dir.join("server.toml");
    let server_text = read_file(&server_path)?;
    let server_file: ServerFile =
        toml::from_str(&server_text).map_err(|e| ConfigError::ParseError {
            path: server_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let mut credentials: CredentialsConfig = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };
    credentials.apply_env_fallbacks();

    let config = Config {
        server: server_file.server,
        llm: server_file.llm,
        fallback: server_file.fallback,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
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

        // Skip .example template files
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
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // File already exists in config/, skip it
            }
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working
/// directory. Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
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

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError {
            field: "server.port".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.server.db_path.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "server.db_path".into(),
            message: "must not be empty".into(),
        });
    }

    if config.llm.trip_max_tokens == 0 {
        return Err(ConfigError::ValidationError {
            field: "llm.trip_max_tokens".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.llm.chat_max_tokens == 0 {
        return Err(ConfigError::ValidationError {
            field: "llm.chat_max_tokens".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.fallback.result_count == 0 {
        return Err(ConfigError::ValidationError {
            field: "fallback.result_count".into(),
            message: "must be greater than 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
