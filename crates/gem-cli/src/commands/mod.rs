//! Subcommands and the input handling they share.

pub mod analyze;
pub mod islands;
pub mod params;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use gem_analysis::{AnalysisParams, GemAnalyzer, Triangle, TriangleMesh};
use nalgebra::Point3;
use tracing::debug;

use crate::Cli;

/// Decode an STL file (ASCII or binary) into a triangle soup.
///
/// `stl_io` deduplicates vertices while reading; the faces are expanded back
/// into independent triangles in file order, degenerate ones included.
pub fn load_stl(path: &Path) -> Result<TriangleMesh> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let mut reader = BufReader::new(file);
    let stl = stl_io::read_stl(&mut reader)
        .with_context(|| format!("Failed to parse STL from {:?}", path))?;

    debug!(
        "STL contains {} vertices, {} triangles",
        stl.vertices.len(),
        stl.faces.len()
    );

    let corner = |index: usize| -> Result<Point3<f64>> {
        let v = stl
            .vertices
            .get(index)
            .with_context(|| format!("Face references missing vertex {}", index))?;
        Ok(Point3::new(
            f64::from(v.0[0]),
            f64::from(v.0[1]),
            f64::from(v.0[2]),
        ))
    };

    let triangles = stl
        .faces
        .iter()
        .map(|face| {
            let [a, b, c] = face.vertices;
            Ok(Triangle::new(corner(a)?, corner(b)?, corner(c)?))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TriangleMesh::from_triangles(triangles))
}

/// Parameters from `--config`, or the defaults.
pub fn load_params(cli: &Cli) -> Result<AnalysisParams> {
    match &cli.config {
        Some(path) => {
            let params = AnalysisParams::from_file(path)?;
            debug!("Loaded analysis parameters from {:?}", path);
            Ok(params)
        }
        None => Ok(AnalysisParams::default()),
    }
}

/// Analyzer configured from the command line.
pub fn load_analyzer(cli: &Cli) -> Result<GemAnalyzer> {
    Ok(GemAnalyzer::with_params(load_params(cli)?)?)
}
