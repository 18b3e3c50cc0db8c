//! `rw nav` command implementation.

use clap::Args;

use super::{SourceArgs, load_site};
use crate::error::CliError;
use crate::output::print_result;

/// Arguments for the nav command.
#[derive(Args)]
pub(crate) struct NavArgs {
    #[command(flatten)]
    source: SourceArgs,
}

impl NavArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = self.source.load_config(None)?;
        let site = load_site(&config)?;

        print_result(&serde_json::to_string_pretty(&site.navigation())?)?;
        Ok(())
    }
}
