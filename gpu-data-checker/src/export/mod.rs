//! Écriture des couches produites (GeoJSON)

pub mod geojson;
#[cfg(feature = "reproject")]
pub mod reproject;

pub use self::geojson::{export_error_layer, export_layer};
