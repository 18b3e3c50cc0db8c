//! Configuration management for RW.
//!
//! Parses `rw.toml` configuration files with serde and provides
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
//! - `openapi.url`
//! - `site.url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override remote OpenAPI document URL.
    pub openapi_url: Option<String>,
    /// Override local fallback document path.
    pub fallback: Option<PathBuf>,
    /// Override public site URL.
    pub site_url: Option<String>,
    /// Override build output directory.
    pub output_dir: Option<PathBuf>,
    /// Ignore the remote URL and use the local document only.
    pub offline: bool,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "rw.toml";

/// Default version prefix stripped from API paths.
const DEFAULT_PATH_PREFIX: &str = "/api/v1/";

/// Default HTTP timeout for fetching the document.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenAPI document configuration (paths are relative strings from TOML).
    openapi: OpenApiConfigRaw,
    /// Public site configuration.
    pub site: SiteConfig,
    /// Build output configuration (paths are relative strings from TOML).
    build: BuildConfigRaw,

    /// Resolved OpenAPI configuration (set after loading).
    #[serde(skip)]
    pub openapi_resolved: OpenApiConfig,
    /// Resolved build configuration (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw OpenAPI configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OpenApiConfigRaw {
    url: Option<String>,
    fallback: Option<String>,
    refresh_fallback: Option<bool>,
    timeout_secs: Option<u64>,
    max_bytes: Option<u64>,
    path_prefix: Option<String>,
    base_dir: Option<String>,
    extension: Option<String>,
    schema_id: Option<String>,
    on_collision: Option<OnCollision>,
}

/// Handling of operations that resolve to the same page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnCollision {
    /// Fail the build.
    #[default]
    Error,
    /// Suffix the later page with its HTTP method.
    AppendMethod,
}

/// Resolved OpenAPI configuration with absolute paths.
#[derive(Debug)]
pub struct OpenApiConfig {
    /// Remote document URL.
    pub url: Option<String>,
    /// Local document used when the remote fetch fails.
    pub fallback: Option<PathBuf>,
    /// Write successfully fetched documents to `fallback`.
    pub refresh_fallback: bool,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum size of a fetched document. `None` for unlimited.
    pub max_bytes: Option<u64>,
    /// Version prefix stripped from API paths.
    pub path_prefix: String,
    /// URL directory the API pages live under.
    pub base_dir: String,
    /// Extension of generated documents (without dot).
    pub extension: String,
    /// Identifier of the source document.
    pub schema_id: String,
    /// Collision handling.
    pub on_collision: OnCollision,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            url: None,
            fallback: None,
            refresh_fallback: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_bytes: None,
            path_prefix: DEFAULT_PATH_PREFIX.to_owned(),
            base_dir: "api".to_owned(),
            extension: "mdx".to_owned(),
            schema_id: "api".to_owned(),
            on_collision: OnCollision::Error,
        }
    }
}

/// Public site configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// Public site URL used in canonical page references.
    ///
    /// Empty for site-relative references.
    pub url: String,
}

/// Raw build configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    output_dir: Option<String>,
}

/// Resolved build configuration with absolute paths.
#[derive(Debug, Default)]
pub struct BuildConfig {
    /// Output directory for generated pages and exports.
    pub output_dir: PathBuf,
    /// Project directory for rw data (.rw/).
    pub project_dir: PathBuf,
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
        /// Config field path (e.g., "`openapi.url`").
        field: String,
        /// Error message (e.g., "${`API_URL`} not set").
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
    /// Otherwise, searches for `rw.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
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
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(url) = &settings.openapi_url {
            self.openapi_resolved.url = Some(url.clone());
        }
        if let Some(fallback) = &settings.fallback {
            self.openapi_resolved.fallback = Some(fallback.clone());
        }
        if let Some(site_url) = &settings.site_url {
            self.site.url.clone_from(site_url);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.build_resolved.output_dir.clone_from(output_dir);
        }
        if settings.offline {
            self.openapi_resolved.url = None;
        }
    }

    /// Check that a document source is configured.
    ///
    /// Building needs `openapi.url`, `openapi.fallback`, or both. Use this
    /// before constructing document sources.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if neither is set.
    pub fn require_source(&self) -> Result<&OpenApiConfig, ConfigError> {
        let openapi = &self.openapi_resolved;
        if openapi.url.is_none() && openapi.fallback.is_none() {
            return Err(ConfigError::Validation(
                "[openapi] section requires url or fallback to be set".to_owned(),
            ));
        }
        Ok(openapi)
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
        let project_dir = base.join(".rw");
        Self {
            openapi: OpenApiConfigRaw::default(),
            site: SiteConfig::default(),
            build: BuildConfigRaw::default(),
            openapi_resolved: OpenApiConfig::default(),
            build_resolved: BuildConfig {
                output_dir: project_dir.join("build"),
                project_dir,
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
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_openapi()?;
        self.validate_site()?;
        Ok(())
    }

    /// Validate OpenAPI configuration.
    fn validate_openapi(&self) -> Result<(), ConfigError> {
        let openapi = &self.openapi_resolved;

        if let Some(ref url) = openapi.url {
            require_non_empty(url, "openapi.url")?;
            require_http_url(url, "openapi.url")?;
        }

        if openapi.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "openapi.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        if openapi.max_bytes == Some(0) {
            return Err(ConfigError::Validation(
                "openapi.max_bytes must be greater than 0".to_owned(),
            ));
        }

        require_non_empty(&openapi.extension, "openapi.extension")?;
        if openapi.extension.starts_with('.') {
            return Err(ConfigError::Validation(
                "openapi.extension must not start with a dot".to_owned(),
            ));
        }

        if openapi.refresh_fallback && openapi.fallback.is_none() {
            return Err(ConfigError::Validation(
                "openapi.refresh_fallback requires openapi.fallback to be set".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate site configuration.
    fn validate_site(&self) -> Result<(), ConfigError> {
        // Empty means site-relative references
        if !self.site.url.is_empty() {
            require_http_url(&self.site.url, "site.url")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.openapi.url {
            self.openapi.url = Some(expand::expand_env(url, "openapi.url")?);
        }
        self.site.url = expand::expand_env(&self.site.url, "site.url")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let raw = &self.openapi;
        let defaults = OpenApiConfig::default();

        self.openapi_resolved = OpenApiConfig {
            url: raw.url.clone(),
            fallback: raw.fallback.as_deref().map(|f| config_dir.join(f)),
            refresh_fallback: raw.refresh_fallback.unwrap_or(defaults.refresh_fallback),
            timeout_secs: raw.timeout_secs.unwrap_or(defaults.timeout_secs),
            max_bytes: raw.max_bytes,
            path_prefix: raw.path_prefix.clone().unwrap_or(defaults.path_prefix),
            base_dir: raw.base_dir.clone().unwrap_or(defaults.base_dir),
            extension: raw.extension.clone().unwrap_or(defaults.extension),
            schema_id: raw.schema_id.clone().unwrap_or(defaults.schema_id),
            on_collision: raw.on_collision.unwrap_or(defaults.on_collision),
        };

        let project_dir = config_dir.join(".rw");
        self.build_resolved = BuildConfig {
            output_dir: self
                .build
                .output_dir
                .as_deref()
                .map_or_else(|| project_dir.join("build"), |d| config_dir.join(d)),
            project_dir,
        };
    }
}
