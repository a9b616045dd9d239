//! Choix du moteur de reprojection : reproject_lite en priorité, PROJ sinon

use anyhow::Result;
use geo::Geometry;
use gpu_check::Crs;

use super::Projection;

/// Reprojection d'une couche vers EPSG:4326
pub enum Reprojector {
    /// Couche déjà en WGS84
    Identity,
    /// Reprojection légère (pure Rust)
    Lite(Projection),
    /// Reprojection via PROJ (si feature activée)
    #[cfg(feature = "reproject")]
    Proj(crate::export::reproject::ProjReprojector),
}

impl Reprojector {
    /// Sélectionne le moteur pour une couche source
    pub fn to_wgs84(source: Crs) -> Result<Self> {
        if source == Crs::WGS84 {
            return Ok(Self::Identity);
        }

        if let Some(projection) = Projection::from_epsg(source.epsg()) {
            return Ok(Self::Lite(projection));
        }

        #[cfg(feature = "reproject")]
        {
            let proj = crate::export::reproject::ProjReprojector::to_wgs84(source)?;
            Ok(Self::Proj(proj))
        }

        #[cfg(not(feature = "reproject"))]
        {
            let supported: Vec<String> = super::SUPPORTED_EPSG.iter().map(|e| e.to_string()).collect();
            anyhow::bail!(
                "Reprojection {} → EPSG:4326 non supportée.\n\
                 Sources supportées (reproject_lite) : {}\n\
                 Pour d'autres projections, compilez avec: cargo build --features reproject",
                source,
                supported.join(", ")
            )
        }
    }

    /// Transforme une géométrie
    pub fn transform_geometry(&self, geom: &Geometry) -> Result<Geometry> {
        match self {
            Self::Identity => Ok(geom.clone()),
            Self::Lite(projection) => projection.transform_geometry(geom),
            #[cfg(feature = "reproject")]
            Self::Proj(proj) => proj.transform_geometry(geom),
        }
    }

    /// Moteur utilisé
    pub fn description(&self) -> &'static str {
        match self {
            Self::Identity => "identity (pas de reprojection)",
            Self::Lite(_) => "reproject_lite (pure Rust)",
            #[cfg(feature = "reproject")]
            Self::Proj(_) => "proj (PROJ library)",
        }
    }
}
