//! # gpu-check
//!
//! Moteur de contrôle qualité des couches GPU (Géoportail de l'Urbanisme).
//!
//! ## Contrôles
//!
//! - Validité OGC, avec localisation du défaut
//! - Complexité : sommets, trous, parts, densité des anneaux volumineux
//! - Doublons géométriques (couches de zonage ou de secteur)
//! - Cohérence des limites (réservé, sans anomalie)
//!
//! Les anomalies sont écrites dans une couche d'erreurs ponctuelle en EPSG:4326,
//! une transaction par règle.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gpu_check::{run_check, Crs, Feature, MemoryLayer, NoProgress};
//!
//! let layer = MemoryLayer::new("zonage", Crs::WGS84, features);
//! let result = run_check(Some(&layer), true, &mut NoProgress)?;
//! for finding in &result {
//!     println!("{} {} {}", finding.fid, finding.level, finding.message);
//! }
//! ```

pub mod checker;
pub mod config;
pub mod error;
pub mod measure;
pub mod metrics;
pub mod ops;
pub mod ring;
pub mod rules;
pub mod sink;
pub mod types;
pub mod validity;

pub use checker::{
    run_check, CheckReport, Checker, FeatureSource, MemoryLayer, NoProgress, Progress,
    RuleOutcome, RuleStatus,
};
pub use config::CheckConfig;
pub use error::CheckError;
pub use measure::{Ellipsoid, EllipsoidalMeasure, LengthMeasure};
pub use ops::{GeoOps, GeometryOps};
pub use ring::Ring;
pub use rules::RuleKind;
pub use sink::{EditSession, ErrorSink, MemoryErrorLayer, ResultSet, Schema};
pub use types::{Category, Crs, Feature, Fid, Finding, Level};
pub use validity::Defect;
