//! Configuration management for tocx.
//!
//! Parses `tocx.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.base_url`
//! - `server.token` (an empty result means no token)

use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Jupyter server base URL.
    pub base_url: Option<String>,
    /// Override API token.
    pub token: Option<String>,
    /// Override download directory.
    pub output_dir: Option<PathBuf>,
    /// Override download filename.
    pub filename: Option<String>,
    /// Read the ToC stylesheet from this local file.
    pub stylesheet_file: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "tocx.toml";

/// Default download filename.
const DEFAULT_FILENAME: &str = "document.html";

/// Default resource path of the ToC stylesheet, relative to the server base URL.
const DEFAULT_STYLESHEET_PATH: &str = "html-toc-export/toc-css";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Jupyter server configuration.
    pub server: ServerConfig,
    /// Export configuration (paths are relative strings from TOML).
    export: ExportConfigRaw,

    /// Resolved export configuration (set after loading).
    #[serde(skip)]
    pub export_resolved: ExportConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Jupyter server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server base URL, including any base path (e.g. `http://host:8888/user/me`).
    pub base_url: String,
    /// API token sent as `Authorization: token <token>`.
    pub token: Option<String>,
    /// Timeout for each HTTP request, in seconds.
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8888".to_owned(),
            token: None,
            timeout_secs: 30,
        }
    }
}

/// Raw export configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ExportConfigRaw {
    filename: Option<String>,
    output_dir: Option<String>,
    stylesheet_path: Option<String>,
    stylesheet_file: Option<String>,
}

/// Resolved export configuration with absolute paths.
#[derive(Debug)]
pub struct ExportConfig {
    /// Filename the exported document is saved under.
    pub filename: String,
    /// Directory receiving exported documents.
    pub output_dir: PathBuf,
    /// Stylesheet resource path, relative to the server base URL.
    pub stylesheet_path: String,
    /// Local stylesheet used instead of the server resource.
    pub stylesheet_file: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_owned(),
            output_dir: PathBuf::from("."),
            stylesheet_path: DEFAULT_STYLESHEET_PATH.to_owned(),
            stylesheet_file: None,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.token`").
        field: String,
        /// Error message (e.g., "${`JUPYTER_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `tocx.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The result is
    /// validated again so overrides cannot bypass validation.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(base_url) = &settings.base_url {
            self.server.base_url.clone_from(base_url);
        }
        if let Some(token) = &settings.token {
            self.server.token = non_empty(token.clone());
        }
        if let Some(output_dir) = &settings.output_dir {
            self.export_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(filename) = &settings.filename {
            self.export_resolved.filename.clone_from(filename);
        }
        if let Some(stylesheet_file) = &settings.stylesheet_file {
            self.export_resolved.stylesheet_file = Some(stylesheet_file.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            export: ExportConfigRaw::default(),
            export_resolved: ExportConfig {
                output_dir: base.to_path_buf(),
                ..ExportConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_export()?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        const MAX_TIMEOUT_SECS: u64 = 600;

        require_non_empty(&self.server.base_url, "server.base_url")?;
        require_http_url(&self.server.base_url, "server.base_url")?;

        if self.server.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "server.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if self.server.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "server.timeout_secs cannot exceed {MAX_TIMEOUT_SECS}"
            )));
        }

        Ok(())
    }

    /// Validate export configuration.
    fn validate_export(&self) -> Result<(), ConfigError> {
        let export = &self.export_resolved;
        require_non_empty(&export.filename, "export.filename")?;
        if export.filename.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "export.filename must not contain path separators".to_owned(),
            ));
        }
        require_non_empty(&export.stylesheet_path, "export.stylesheet_path")?;
        if self.export.stylesheet_path.is_some() && self.export.stylesheet_file.is_some() {
            return Err(ConfigError::Validation(
                "export.stylesheet_path and export.stylesheet_file cannot both be set".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    ///
    /// An unset `${VAR}` is an error; a token that expands to nothing is
    /// treated as absent.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.base_url = expand_field(&self.server.base_url, "server.base_url")?;
        self.server.token = self
            .server
            .token
            .take()
            .map(|token| expand_field(&token, "server.token"))
            .transpose()?
            .and_then(non_empty);
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let export = &self.export;
        self.export_resolved = ExportConfig {
            filename: export
                .filename
                .clone()
                .unwrap_or_else(|| DEFAULT_FILENAME.to_owned()),
            output_dir: config_dir.join(export.output_dir.as_deref().unwrap_or(".")),
            stylesheet_path: export
                .stylesheet_path
                .as_deref()
                .unwrap_or(DEFAULT_STYLESHEET_PATH)
                .trim_matches('/')
                .to_owned(),
            stylesheet_file: export
                .stylesheet_file
                .as_deref()
                .map(|file| config_dir.join(file)),
        };
    }
}

/// Expand `${VAR}` references in one config field.
///
/// Values without `${` are returned as-is, so a literal `$` in a token or URL
/// survives.
fn expand_field(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }
    shellexpand::env_with_context(value, |name| std::env::var(name).map(Some))
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

/// Treat an empty string as "not configured".
fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
