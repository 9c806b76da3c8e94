//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::io::{BoundFormat, OutputFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Merge engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

fn default_parallel() -> bool {
    true
}

fn default_parallel_threshold() -> usize {
    16
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

impl From<&EngineConfig> for crate::merge::EngineConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            parallel: config.parallel,
            parallel_threshold: config.parallel_threshold,
        }
    }
}

/// CSV input configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_key_column")]
    pub key_column: String,

    #[serde(default = "default_start_column")]
    pub start_column: String,

    #[serde(default = "default_end_column")]
    pub end_column: String,

    #[serde(default = "default_has_header")]
    pub has_header: bool,

    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    #[serde(default)]
    pub timestamp_format: Option<String>,

    #[serde(default)]
    pub strict: bool,
}

fn default_key_column() -> String {
    "key".to_string()
}

fn default_start_column() -> String {
    "start".to_string()
}

fn default_end_column() -> String {
    "end".to_string()
}

fn default_has_header() -> bool {
    true
}

fn default_delimiter() -> char {
    ','
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            key_column: default_key_column(),
            start_column: default_start_column(),
            end_column: default_end_column(),
            has_header: default_has_header(),
            delimiter: default_delimiter(),
            timestamp_format: None,
            strict: false,
        }
    }
}

/// Output rendering configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub bound_format: BoundFormat,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("archipelago").join("config.toml")),
            Some(PathBuf::from("/etc/archipelago/config.toml")),
            Some(PathBuf::from("./archipelago.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Engine overrides
        if let Ok(parallel) = std::env::var("ARCHIPELAGO_PARALLEL") {
            if let Some(p) = parse_bool(&parallel) {
                self.engine.parallel = p;
            }
        }
        if let Ok(threshold) = std::env::var("ARCHIPELAGO_PARALLEL_THRESHOLD") {
            if let Ok(t) = threshold.parse() {
                self.engine.parallel_threshold = t;
            }
        }

        // Output overrides
        if let Ok(format) = std::env::var("ARCHIPELAGO_OUTPUT_FORMAT") {
            match format.parse() {
                Ok(f) => self.output.format = f,
                Err(e) => tracing::warn!("Ignoring ARCHIPELAGO_OUTPUT_FORMAT: {}", e),
            }
        }
        if let Ok(bounds) = std::env::var("ARCHIPELAGO_BOUND_FORMAT") {
            match bounds.parse() {
                Ok(b) => self.output.bound_format = b,
                Err(e) => tracing::warn!("Ignoring ARCHIPELAGO_BOUND_FORMAT: {}", e),
            }
        }

        // Logging overrides
        if let Ok(level) = std::env::var("ARCHIPELAGO_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("ARCHIPELAGO_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Archipelago Configuration
#
# Environment variables override these settings:
# - ARCHIPELAGO_PARALLEL
# - ARCHIPELAGO_PARALLEL_THRESHOLD
# - ARCHIPELAGO_OUTPUT_FORMAT
# - ARCHIPELAGO_BOUND_FORMAT
# - ARCHIPELAGO_LOG_LEVEL
# - ARCHIPELAGO_LOG_FORMAT

[engine]
# Merge partitions (keys) on a thread pool
parallel = true

# Minimum number of partitions before merging in parallel
parallel_threshold = 16

[input]
# Header names of the key, start and end columns
# (a column index such as "0" also works; without a header row the
# default names map to columns 0, 1 and 2)
key_column = "key"
start_column = "start"
end_column = "end"

# Whether the CSV has a header row
has_header = true

# Field delimiter
delimiter = ","

# strftime format for timestamp bounds, tried before the integer reading
# so all-digit formats such as "%Y%m%d" work; values it does not match fall
# back to integers, then common date formats
# timestamp_format = "%Y-%m-%d %H:%M:%S"

# Abort on the first unreadable row instead of skipping it
strict = false

[output]
# Output format: table, csv or json
format = "table"

# Bound rendering: raw, date or datetime (bounds as Unix milliseconds)
bound_format = "raw"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert!(config.engine.parallel);
        assert_eq!(config.engine.parallel_threshold, 16);
        assert_eq!(config.input.key_column, "key");
        assert_eq!(config.input.delimiter, ',');
        assert_eq!(config.output.format, OutputFormat::Table);
        assert_eq!(config.output.bound_format, BoundFormat::Raw);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();

        assert!(config.engine.parallel);
        assert_eq!(config.input.end_column, "end");
        assert!(!config.input.strict);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
[engine]
parallel = false

[input]
key_column = "host"
timestamp_format = "%Y-%m-%d"

[output]
format = "json"
bound_format = "date"
"#,
        )
        .unwrap();

        assert!(!config.engine.parallel);
        assert_eq!(config.engine.parallel_threshold, 16);
        assert_eq!(config.input.key_column, "host");
        assert_eq!(config.input.start_column, "start");
        assert_eq!(config.input.timestamp_format.as_deref(), Some("%Y-%m-%d"));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.bound_format, BoundFormat::Date);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[engine]\nparallel_threshold = 4").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.engine.parallel_threshold, 4);

        let engine_config = crate::merge::EngineConfig::from(&config.engine);
        assert_eq!(engine_config.parallel_threshold, 4);
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/nonexistent/archipelago.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nformat = \"xml\"").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_bound_format_env_override() {
        std::env::set_var("ARCHIPELAGO_BOUND_FORMAT", "datetime");
        let config = Config::from_env();
        std::env::remove_var("ARCHIPELAGO_BOUND_FORMAT");

        assert_eq!(config.output.bound_format, BoundFormat::DateTime);
        assert!(generate_default_config().contains("ARCHIPELAGO_BOUND_FORMAT"));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
