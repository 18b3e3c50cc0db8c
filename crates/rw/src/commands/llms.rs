//! `rw llms` command implementation.

use clap::Args;

use super::{SourceArgs, load_site};
use crate::error::CliError;
use crate::output::print_result;

/// Arguments for the llms command.
#[derive(Args)]
pub(crate) struct LlmsArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Page slug below the API base directory (e.g. `business/queues/queues`).
    ///
    /// Prints the whole API when omitted.
    slug: Option<String>,
}

impl LlmsArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = self.source.load_config(None)?;
        let site = load_site(&config)?;

        let text = match self.slug.as_deref() {
            None => site.full_text(),
            Some(slug) => {
                let segments: Vec<&str> = slug.split('/').filter(|s| !s.is_empty()).collect();
                site.page_text_by_slug(&segments)
                    .ok_or_else(|| CliError::Validation(format!("No API page at '{slug}'")))?
            }
        };

        print_result(&text)?;
        Ok(())
    }
}
