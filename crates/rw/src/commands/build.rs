//! `rw build` command implementation.

use std::path::{Component, Path, PathBuf};

use clap::Args;
use rw_site::ApiSite;

use super::{SourceArgs, load_site};
use crate::error::CliError;
use crate::output::Output;

/// Name of the combined plain-text export.
const FULL_TEXT_FILENAME: &str = "llms-full.txt";

/// Name of the navigation tree export.
const NAVIGATION_FILENAME: &str = "navigation.json";

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output directory (default: .rw/build/).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.source.load_config(self.output_dir)?;
        let output_dir = config.build_resolved.output_dir.clone();

        output.highlight("Building API reference");
        if let Some(url) = &config.openapi_resolved.url {
            output.info(&format!("Source: {url}"));
        }
        if let Some(fallback) = &config.openapi_resolved.fallback {
            output.info(&format!("Fallback: {}", fallback.display()));
        }
        output.info(&format!("Output: {}", output_dir.display()));

        let site = load_site(&config)?;
        if site.tree().is_empty() {
            output.warning("Document has no operations");
        }

        let written = write_site(&site, &output_dir)?;

        output.success(&format!(
            "Built {written} pages to {}",
            output_dir.display()
        ));
        Ok(())
    }
}

/// Write every page, the full text export, and the navigation tree.
///
/// Returns the number of pages written.
fn write_site(site: &ApiSite, output_dir: &Path) -> Result<usize, CliError> {
    let pages = site.tree().ordered_pages();
    // Resolve every target before writing so a bad URL leaves no partial output.
    let targets = pages
        .iter()
        .map(|page| page_file(output_dir, &page.url))
        .collect::<Result<Vec<_>, _>>()?;

    std::fs::create_dir_all(output_dir)?;

    for (page, path) in pages.iter().zip(&targets) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, site.page_text(page))?;
        tracing::debug!(path = %path.display(), "Wrote page");
    }

    std::fs::write(output_dir.join(FULL_TEXT_FILENAME), site.full_text())?;

    let navigation = serde_json::to_string_pretty(&site.navigation())?;
    std::fs::write(output_dir.join(NAVIGATION_FILENAME), navigation)?;

    Ok(pages.len())
}

/// Markdown file for a page URL, confined to `output_dir`.
fn page_file(output_dir: &Path, url: &str) -> Result<PathBuf, CliError> {
    let relative = Path::new(url.trim_start_matches('/'));
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(CliError::Validation(format!(
            "Page URL '{url}' points outside the output directory"
        )));
    }
    Ok(output_dir.join(format!("{}.md", relative.display())))
}
