//! Reprojection légère vers WGS84 en Rust pur
//!
//! Projections sources supportées :
//! - Lambert 93 (EPSG:2154), métropole
//! - UTM 20N (EPSG:32620), Martinique et Guadeloupe
//! - UTM 22N (EPSG:32622), Guyane
//! - UTM 38S (EPSG:32738), Mayotte
//! - UTM 40S (EPSG:32740), Réunion

mod ellipsoid;
mod lambert;
mod smart;
mod utm;

pub use ellipsoid::Ellipsoid;
pub use lambert::ConformalConic;
pub use smart::Reprojector;
pub use utm::TransverseMercator;

use anyhow::{anyhow, Result};
use geo::{Coord, Geometry, MapCoords};

/// EPSG des projections prises en charge sans PROJ
pub const SUPPORTED_EPSG: [u32; 5] = [2154, 32620, 32622, 32738, 32740];

/// Projection source connue
#[derive(Debug, Clone, Copy)]
pub enum Projection {
    Lambert93(ConformalConic),
    Utm(TransverseMercator),
}

impl Projection {
    pub fn from_epsg(epsg: u32) -> Option<Self> {
        let projection = match epsg {
            2154 => Self::Lambert93(ConformalConic::lambert93()),
            32620 => Self::Utm(TransverseMercator::utm(20, false)),
            32622 => Self::Utm(TransverseMercator::utm(22, false)),
            32738 => Self::Utm(TransverseMercator::utm(38, true)),
            32740 => Self::Utm(TransverseMercator::utm(40, true)),
            _ => return None,
        };
        Some(projection)
    }

    /// Coordonnée projetée vers longitude/latitude WGS84 en degrés
    pub fn to_wgs84(&self, c: Coord) -> Coord {
        match self {
            Self::Lambert93(lcc) => lcc.inverse(c),
            Self::Utm(tm) => tm.inverse(c),
        }
    }

    /// Reprojette toutes les coordonnées d'une géométrie
    pub fn transform_geometry(&self, geometry: &Geometry) -> Result<Geometry> {
        geometry.try_map_coords(|c| {
            let out = self.to_wgs84(c);
            if out.x.is_finite() && out.y.is_finite() {
                Ok(out)
            } else {
                Err(anyhow!("Coordinate ({}, {}) outside of projection domain", c.x, c.y))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, polygon};

    #[test]
    fn test_supported_epsg() {
        for epsg in SUPPORTED_EPSG {
            assert!(Projection::from_epsg(epsg).is_some(), "EPSG:{}", epsg);
        }
        assert!(Projection::from_epsg(4326).is_none());
        assert!(Projection::from_epsg(3857).is_none());
    }

    #[test]
    fn test_lambert93_polygon() {
        let projection = Projection::from_epsg(2154).unwrap();
        let geom = Geometry::Polygon(polygon![
            (x: 652_000.0, y: 6_862_000.0),
            (x: 653_000.0, y: 6_862_000.0),
            (x: 653_000.0, y: 6_863_000.0),
        ]);
        let Geometry::Polygon(out) = projection.transform_geometry(&geom).unwrap() else {
            panic!("polygon expected");
        };
        assert_eq!(out.exterior().0.len(), 4);
        for c in out.exterior().coords() {
            assert!((c.x - 2.35).abs() < 0.1 && (c.y - 48.85).abs() < 0.1, "{:?}", c);
        }
    }

    #[test]
    fn test_non_finite_rejected() {
        let projection = Projection::from_epsg(2154).unwrap();
        let geom = Geometry::Point(point!(x: f64::NAN, y: 0.0));
        assert!(projection.transform_geometry(&geom).is_err());
    }
}
