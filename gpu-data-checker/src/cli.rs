//! Définition et implémentation des commandes CLI
//!
//! - `check` : contrôle d'une couche GeoJSON, écrit la couche `<couche>_error`
//! - `reproject` : reprojette une couche en EPSG:4326 (`<couche>_4326`)

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use gpu_check::{Checker, FeatureSource, MemoryErrorLayer};
use tracing::{info, warn};

use crate::config::Config;
use crate::export::{export_error_layer, export_layer};
use crate::layer::GeoJsonLayer;
use crate::progress::CheckProgress;
use crate::report::CheckSummary;
use crate::reproject_lite::Reprojector;

pub const EXIT_SUCCESS: u8 = 0;
/// Code de sortie d'une précondition non remplie
pub const EXIT_PRECONDITION: u8 = 1;
/// Code de sortie avec `--fail-on-error` lorsqu'une ERROR est trouvée
pub const EXIT_FINDINGS: u8 = 2;

#[derive(Subcommand)]
pub enum Commands {
    /// Check a layer for invalid, complex and duplicated geometries
    Check(CheckArgs),

    /// Reproject a layer to EPSG:4326 (required before checking)
    Reproject(ReprojectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Path to the GeoJSON layer
    pub path: PathBuf,

    /// Zoning or sector layer: also run the duplicate and boundary checks
    #[arg(long)]
    pub zoning: bool,

    /// Config preset name (gpu/strict) or path to a JSON config
    #[arg(long, default_value = "gpu")]
    pub config: String,

    /// Attribute holding the feature id (overrides the config)
    #[arg(long)]
    pub fid_field: Option<String>,

    /// Output file for the error layer (default: <layer>_error.geojson next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Save the JSON report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Exit with code 2 when at least one ERROR is found
    #[arg(long)]
    pub fail_on_error: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReprojectArgs {
    /// Path to the GeoJSON layer
    pub path: PathBuf,

    /// Output file (default: <layer>_4326.geojson next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Source EPSG code when the layer does not declare one
    #[arg(long)]
    pub srid: Option<u32>,
}

/// Exécute la commande check
pub fn cmd_check(args: &CheckArgs, quiet: bool) -> Result<u8> {
    let config = Config::resolve(&args.config)?;
    let fid_field = args.fid_field.as_deref().unwrap_or(&config.fid_field);

    let layer = GeoJsonLayer::open(&args.path, fid_field)?;
    let checker = Checker::new(config.check.clone())?;

    info!(
        layer = layer.name(),
        crs = %layer.crs(),
        features = layer.feature_count(),
        zoning = args.zoning,
        "Checking layer"
    );

    let start = Instant::now();
    let mut sink = MemoryErrorLayer::new();
    let mut progress = CheckProgress::new(quiet);
    let result = checker.run_check(Some(&layer), args.zoning, &mut sink, &mut progress);
    progress.finish();

    let report = match result {
        Ok(report) => report,
        Err(e) if e.is_precondition() => {
            eprintln!("{}", e);
            return Ok(EXIT_PRECONDITION);
        }
        Err(e) => return Err(e.into()),
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| sibling(&args.path, report.layer.name()));
    export_error_layer(&report.layer, &output)?;

    let summary = CheckSummary::new(
        &report,
        layer.name(),
        layer.feature_count(),
        args.zoning,
        start.elapsed(),
    );
    if !quiet {
        summary.display();
    }
    if let Some(path) = &args.report {
        summary.save_to_file(path)?;
        info!(path = %path.display(), "Report saved");
    }
    for outcome in report.rolled_back() {
        warn!(rule = %outcome.rule, "Rule findings were discarded");
    }

    println!("{}", summary.summary());
    println!("Error layer written to {}", output.display());

    if args.fail_on_error && report.layer.has_errors() {
        return Ok(EXIT_FINDINGS);
    }
    Ok(EXIT_SUCCESS)
}

/// Exécute la commande reproject
pub fn cmd_reproject(args: &ReprojectArgs) -> Result<u8> {
    let mut layer = GeoJsonLayer::open(&args.path, "gid")?;
    if let Some(srid) = args.srid {
        layer = layer.with_crs(gpu_check::Crs::from_epsg(srid));
    }

    let reprojector = Reprojector::to_wgs84(layer.crs())?;
    info!(
        layer = layer.name(),
        source = %layer.crs(),
        engine = reprojector.description(),
        "Reprojecting layer"
    );

    let reprojected = layer
        .reprojected(&reprojector)
        .with_context(|| format!("Failed to reproject {}", args.path.display()))?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| sibling(&args.path, reprojected.name()));
    export_layer(&reprojected, &output)?;

    println!(
        "Reprojection complete: {} features {} -> EPSG:4326 ({})",
        reprojected.len(),
        layer.crs(),
        output.display()
    );

    Ok(EXIT_SUCCESS)
}

/// `<dossier de l'entrée>/<nom>.geojson`
fn sibling(input: &Path, name: &str) -> PathBuf {
    input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{}.geojson", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling() {
        assert_eq!(
            sibling(Path::new("/data/zone_urba.geojson"), "zone_urba_error"),
            PathBuf::from("/data/zone_urba_error.geojson")
        );
        assert_eq!(
            sibling(Path::new("zone_urba.geojson"), "zone_urba_4326"),
            PathBuf::from("zone_urba_4326.geojson")
        );
    }
}
