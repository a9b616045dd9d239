//! # gpu-data-checker
//!
//! Contrôle des couches GPU (GeoJSON) avec le moteur `gpu-check`.
//!
//! ## Features
//!
//! - Lecture de couches GeoJSON (projection, identifiant `gid`)
//! - Couche d'erreurs `<couche>_error` en GeoJSON
//! - Reprojection vers EPSG:4326 (Lambert 93, UTM outre-mer ; PROJ en option)
//! - Rapport console et JSON
//!
//! ## Usage CLI
//!
//! ```bash
//! # Contrôle d'une couche de zonage
//! gpu-data-checker check ./zone_urba.geojson --zoning
//!
//! # Reprojection préalable d'une couche en Lambert 93
//! gpu-data-checker reproject ./zone_urba.geojson
//! ```

pub mod cli;
pub mod config;
pub mod export;
pub mod layer;
pub mod progress;
pub mod report;
pub mod reproject_lite;

pub use config::Config;
pub use layer::GeoJsonLayer;
pub use report::{CheckStatus, CheckSummary};
