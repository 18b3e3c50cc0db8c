//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod llms;
pub(crate) mod nav;

pub(crate) use build::BuildArgs;
pub(crate) use llms::LlmsArgs;
pub(crate) use nav::NavArgs;

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use rw_config::{CliSettings, Config, OnCollision, OpenApiConfig};
use rw_openapi::{CollisionPolicy, FallbackSource, FileSource, HttpSource, PlanOptions};
use rw_site::{ApiSite, SiteConfig};

use crate::error::CliError;

/// Arguments shared by every command that loads the document.
#[derive(Args)]
pub(crate) struct SourceArgs {
    /// Path to configuration file (default: auto-discover rw.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Remote OpenAPI document URL (overrides config).
    #[arg(long, env = "RW_OPENAPI_URL")]
    url: Option<String>,

    /// Local fallback document (overrides config).
    #[arg(long)]
    fallback: Option<PathBuf>,

    /// Public site URL for page references (overrides config).
    #[arg(long)]
    site_url: Option<String>,

    /// Skip the remote URL and read the fallback document only.
    #[arg(long)]
    offline: bool,
}

impl SourceArgs {
    /// Load configuration with these arguments applied.
    pub(crate) fn load_config(&self, output_dir: Option<PathBuf>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            openapi_url: self.url.clone(),
            fallback: self.fallback.clone(),
            site_url: self.site_url.clone(),
            output_dir,
            offline: self.offline,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        config.validate()?;
        Ok(config)
    }
}

/// Site build settings derived from `[openapi]` and `[site]`.
fn site_config(config: &Config) -> SiteConfig {
    let openapi = &config.openapi_resolved;
    SiteConfig {
        base_dir: openapi.base_dir.clone(),
        site_url: config.site.url.clone(),
        plan: PlanOptions {
            path_prefix: openapi.path_prefix.clone(),
            extension: openapi.extension.clone(),
            schema_id: openapi.schema_id.clone(),
            on_collision: match openapi.on_collision {
                OnCollision::Error => CollisionPolicy::Error,
                OnCollision::AppendMethod => CollisionPolicy::AppendMethod,
            },
        },
    }
}

/// Remote source with the configured timeout and size limit.
fn http_source(url: &str, openapi: &OpenApiConfig) -> HttpSource {
    let source = HttpSource::new(url, Duration::from_secs(openapi.timeout_secs));
    match openapi.max_bytes {
        Some(max_bytes) => source.with_max_bytes(max_bytes),
        None => source,
    }
}

/// Load the document from the configured sources and build the site.
///
/// With both a URL and a fallback file, the remote document is tried first.
pub(crate) fn load_site(config: &Config) -> Result<ApiSite, CliError> {
    let openapi = config.require_source()?;
    let site_config = site_config(config);

    let site = match (&openapi.url, &openapi.fallback) {
        (Some(url), Some(fallback)) => {
            let mut remote = http_source(url, openapi);
            if openapi.refresh_fallback {
                remote = remote.with_snapshot(fallback);
            }
            let source = FallbackSource::new(remote, FileSource::new(fallback));
            ApiSite::load(&source, &site_config)?
        }
        (Some(url), None) => ApiSite::load(&http_source(url, openapi), &site_config)?,
        (None, Some(fallback)) => ApiSite::load(&FileSource::new(fallback), &site_config)?,
        (None, None) => {
            return Err(CliError::Validation(
                "No OpenAPI document source configured".to_owned(),
            ));
        }
    };

    Ok(site)
}
