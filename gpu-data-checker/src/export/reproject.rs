//! Reprojection vers WGS84 avec PROJ
//!
//! Ce module n'est compilé qu'avec le feature `reproject`.

use anyhow::{anyhow, Context, Result};
use geo::{Coord, Geometry, MapCoords};
use gpu_check::Crs;
use proj::Proj;

/// Reprojection d'un EPSG quelconque vers EPSG:4326 (ordre longitude, latitude)
pub struct ProjReprojector {
    proj: Proj,
}

impl ProjReprojector {
    pub fn to_wgs84(source: Crs) -> Result<Self> {
        let proj = Proj::new_known_crs(&source.authid(), &Crs::WGS84.authid(), None)
            .context(format!("Failed to create projection from {} to EPSG:4326", source))?;
        Ok(Self { proj })
    }

    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry> {
        geom.try_map_coords(|c| {
            self.proj
                .convert((c.x, c.y))
                .map(|(x, y)| Coord { x, y })
                .map_err(|e| anyhow!("Coordinate transformation failed: {}", e))
        })
    }
}
