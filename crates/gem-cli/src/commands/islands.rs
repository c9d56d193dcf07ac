//! gem islands command - per-island descriptors and classifications.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use gem_analysis::Role;

use super::{load_analyzer, load_stl};
use crate::{Cli, OutputFormat, output};

pub fn run(input: &Path, cli: &Cli) -> Result<()> {
    let mesh = load_stl(input)?;
    let analyzer = load_analyzer(cli)?;
    let report = analyzer.analyze_detailed(&mesh)?;

    match cli.format {
        OutputFormat::Json => {
            output::print(&report, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if cli.quiet {
                return Ok(());
            }
            println!("{}", "Islands".bold().underline());
            println!("  {}: {}", "File".cyan(), input.display());
            println!("  {}: {:.3e}", "Vertex step".cyan(), report.vertex_step);

            for island in &report.islands {
                let d = &island.descriptor;
                let class = &island.classification;
                let label = match (class.role, class.shape) {
                    (Role::Body, _) => "body".bold().to_string(),
                    (Role::Gem, Some(shape)) => format!("gem ({})", shape).green().to_string(),
                    (Role::Gem, None) => "gem".green().to_string(),
                };
                let dims = d.bounds.dimensions();
                let angles = &d.facet_angles;

                println!();
                println!("  {} {}", format!("#{}", island.index).cyan(), label);
                println!("    {}: {}", "Triangles".cyan(), d.triangle_count);
                println!(
                    "    {}: {:.3} x {:.3} x {:.3}",
                    "Dimensions".cyan(),
                    dims.x,
                    dims.y,
                    dims.z
                );
                println!("    {}: {:.4}", "Volume".cyan(), d.volume());
                println!(
                    "    {}: {} flat / {} moderate / {} sharp",
                    "Facet angles".cyan(),
                    angles.flat,
                    angles.moderate,
                    angles.sharp
                );
                println!(
                    "    {}: {:.3} / {:.3}",
                    "Elongation / cross-section".cyan(),
                    d.principal.elongation(),
                    d.principal.cross_section_aspect()
                );
                println!("    {}: {}", "Closed".cyan(), output::yes_no(angles.is_closed()));
                if let Some(reason) = class.degenerate {
                    println!("    {}: {}", "Degenerate".yellow(), reason);
                }
            }

            for warning in &report.warnings {
                println!("  {}: {}", "Warning".yellow(), warning);
            }
        }
    }

    Ok(())
}
