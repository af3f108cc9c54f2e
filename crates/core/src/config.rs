use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::scoring::ProcessingPolarity;
use crate::engine::DEFAULT_MAX_ALTERNATIVES;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub matching: MatchingConfig,
    pub scoring: ScoringConfig,
    pub cache: CacheConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub page_size: u32,
    pub user_agent: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct MatchingConfig {
    pub max_distance: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct ScoringConfig {
    pub processing_polarity: ProcessingPolarity,
    pub max_alternatives: usize,
}

#[derive(Clone, Debug, Default)]
pub struct CacheConfig {
    pub max_entries: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub catalog_base_url: Option<String>,
    pub catalog_timeout_secs: Option<u64>,
    pub max_distance: Option<usize>,
    pub processing_polarity: Option<ProcessingPolarity>,
    pub server_port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig {
                base_url: "https://world.openfoodfacts.org".to_string(),
                timeout_secs: 10,
                page_size: 20,
                user_agent: None,
            },
            matching: MatchingConfig::default(),
            scoring: ScoringConfig {
                processing_polarity: ProcessingPolarity::AsReported,
                max_alternatives: DEFAULT_MAX_ALTERNATIVES,
            },
            cache: CacheConfig::default(),
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 5000,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("leafscore.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(catalog) = patch.catalog {
            if let Some(base_url) = catalog.base_url {
                self.catalog.base_url = base_url;
            }
            if let Some(timeout_secs) = catalog.timeout_secs {
                self.catalog.timeout_secs = timeout_secs;
            }
            if let Some(page_size) = catalog.page_size {
                self.catalog.page_size = page_size;
            }
            if let Some(user_agent) = catalog.user_agent {
                self.catalog.user_agent = Some(user_agent);
            }
        }

        if let Some(matching) = patch.matching {
            if let Some(max_distance) = matching.max_distance {
                self.matching.max_distance = Some(max_distance);
            }
        }

        if let Some(scoring) = patch.scoring {
            if let Some(processing_polarity) = scoring.processing_polarity {
                self.scoring.processing_polarity = processing_polarity;
            }
            if let Some(max_alternatives) = scoring.max_alternatives {
                self.scoring.max_alternatives = max_alternatives;
            }
        }

        if let Some(cache) = patch.cache {
            if let Some(max_entries) = cache.max_entries {
                self.cache.max_entries = Some(max_entries);
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("LEAFSCORE_CATALOG_BASE_URL") {
            self.catalog.base_url = value;
        }
        if let Some(value) = read_env("LEAFSCORE_CATALOG_TIMEOUT_SECS") {
            self.catalog.timeout_secs = parse_u64("LEAFSCORE_CATALOG_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("LEAFSCORE_CATALOG_PAGE_SIZE") {
            self.catalog.page_size = parse_u32("LEAFSCORE_CATALOG_PAGE_SIZE", &value)?;
        }
        if let Some(value) = read_env("LEAFSCORE_CATALOG_USER_AGENT") {
            self.catalog.user_agent = Some(value);
        }

        if let Some(value) = read_env("LEAFSCORE_MATCHING_MAX_DISTANCE") {
            self.matching.max_distance =
                Some(parse_usize("LEAFSCORE_MATCHING_MAX_DISTANCE", &value)?);
        }

        if let Some(value) = read_env("LEAFSCORE_SCORING_PROCESSING_POLARITY") {
            self.scoring.processing_polarity =
                value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: "LEAFSCORE_SCORING_PROCESSING_POLARITY".to_string(),
                    value: value.clone(),
                })?;
        }
        if let Some(value) = read_env("LEAFSCORE_SCORING_MAX_ALTERNATIVES") {
            self.scoring.max_alternatives =
                parse_usize("LEAFSCORE_SCORING_MAX_ALTERNATIVES", &value)?;
        }

        if let Some(value) = read_env("LEAFSCORE_CACHE_MAX_ENTRIES") {
            self.cache.max_entries = Some(parse_usize("LEAFSCORE_CACHE_MAX_ENTRIES", &value)?);
        }

        if let Some(value) = read_env("LEAFSCORE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("LEAFSCORE_SERVER_PORT") {
            self.server.port = parse_u16("LEAFSCORE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("LEAFSCORE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("LEAFSCORE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("LEAFSCORE_LOGGING_LEVEL").or_else(|| read_env("LEAFSCORE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("LEAFSCORE_LOGGING_FORMAT").or_else(|| read_env("LEAFSCORE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.catalog_base_url {
            self.catalog.base_url = base_url;
        }
        if let Some(timeout_secs) = overrides.catalog_timeout_secs {
            self.catalog.timeout_secs = timeout_secs;
        }
        if let Some(max_distance) = overrides.max_distance {
            self.matching.max_distance = Some(max_distance);
        }
        if let Some(processing_polarity) = overrides.processing_polarity {
            self.scoring.processing_polarity = processing_polarity;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_catalog(&self.catalog)?;
        validate_cache(&self.cache)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("leafscore.toml"), PathBuf::from("config/leafscore.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    let base_url = catalog.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "catalog.base_url must start with http:// or https://".to_string(),
        ));
    }

    if catalog.timeout_secs == 0 || catalog.timeout_secs > 120 {
        return Err(ConfigError::Validation(
            "catalog.timeout_secs must be in range 1..=120".to_string(),
        ));
    }

    if catalog.page_size == 0 || catalog.page_size > 100 {
        return Err(ConfigError::Validation(
            "catalog.page_size must be in range 1..=100".to_string(),
        ));
    }

    if catalog.user_agent.as_ref().is_some_and(|agent| agent.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "catalog.user_agent must not be blank when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_cache(cache: &CacheConfig) -> Result<(), ConfigError> {
    if cache.max_entries == Some(0) {
        return Err(ConfigError::Validation(
            "cache.max_entries must be greater than zero when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address is required".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    catalog: Option<CatalogPatch>,
    matching: Option<MatchingPatch>,
    scoring: Option<ScoringPatch>,
    cache: Option<CachePatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    page_size: Option<u32>,
    user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MatchingPatch {
    max_distance: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ScoringPatch {
    processing_polarity: Option<ProcessingPolarity>,
    max_alternatives: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct CachePatch {
    max_entries: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
