//! gem analyze command - report gem presence and cuts.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use super::{load_analyzer, load_stl};
use crate::{Cli, OutputFormat, output};

pub fn run(input: &Path, cli: &Cli) -> Result<()> {
    let mesh = load_stl(input)?;
    let analyzer = load_analyzer(cli)?;
    let report = analyzer.analyze_detailed(&mesh)?;

    match cli.format {
        OutputFormat::Json => {
            output::print(&report.result, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                let result = &report.result;
                println!("{}", "Gem Analysis".bold().underline());
                println!("  {}: {}", "File".cyan(), input.display());
                println!("  {}: {}", "Triangles".cyan(), mesh.triangle_count());
                println!("  {}: {}", "Islands".cyan(), report.islands.len());
                println!(
                    "  {}: {}",
                    "Gems present".cyan(),
                    output::yes_no(result.is_gem_present())
                );
                if result.is_gem_present() {
                    println!(
                        "  {}: {}",
                        "Shapes".cyan(),
                        result.shape_labels().join(", ").green()
                    );
                }
                for warning in &report.warnings {
                    println!("  {}: {}", "Warning".yellow(), warning);
                }
            }
        }
    }

    Ok(())
}
