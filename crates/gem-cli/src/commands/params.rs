//! gem params command - print the analysis parameters in effect.

use anyhow::Result;

use super::load_params;
use crate::{Cli, OutputFormat, output};

pub fn run(cli: &Cli) -> Result<()> {
    let params = load_params(cli)?;

    match cli.format {
        OutputFormat::Json => output::print(&params, cli.format, cli.quiet),
        OutputFormat::Text => {
            if !cli.quiet {
                print!("{}", params.to_toml()?);
            }
        }
    }

    Ok(())
}
