//! Mesure de longueur sur l'ellipsoïde

use std::fmt;
use std::str::FromStr;

use geo::{GeodesicLength, Geometry};

use crate::CheckError;

/// Mesure de longueur (en mètres) d'une géométrie linéaire
pub trait LengthMeasure {
    /// Longueur de la géométrie ; 0 pour les géométries non linéaires
    fn measure_length(&self, geometry: &Geometry) -> f64;
}

/// Modèle d'ellipsoïde nommé
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ellipsoid {
    Wgs84,
}

impl Ellipsoid {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Wgs84 => "WGS84",
        }
    }
}

impl FromStr for Ellipsoid {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WGS84" | "WGS 84" | "EPSG:7030" => Ok(Self::Wgs84),
            _ => Err(CheckError::UnsupportedEllipsoid(s.to_string())),
        }
    }
}

impl fmt::Display for Ellipsoid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Longueur géodésique (Karney) sur l'ellipsoïde, coordonnées en degrés lon/lat
#[derive(Debug, Clone, Copy)]
pub struct EllipsoidalMeasure {
    ellipsoid: Ellipsoid,
}

impl EllipsoidalMeasure {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self { ellipsoid }
    }

    pub fn wgs84() -> Self {
        Self::new(Ellipsoid::Wgs84)
    }
}

impl LengthMeasure for EllipsoidalMeasure {
    fn measure_length(&self, geometry: &Geometry) -> f64 {
        match (self.ellipsoid, geometry) {
            (Ellipsoid::Wgs84, Geometry::Line(line)) => line.geodesic_length(),
            (Ellipsoid::Wgs84, Geometry::LineString(ls)) => ls.geodesic_length(),
            (Ellipsoid::Wgs84, Geometry::MultiLineString(mls)) => mls.geodesic_length(),
            (Ellipsoid::Wgs84, Geometry::GeometryCollection(gc)) => {
                gc.iter().map(|g| self.measure_length(g)).sum()
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, polygon};

    #[test]
    fn test_parse_ellipsoid() {
        assert_eq!("WGS84".parse::<Ellipsoid>().unwrap(), Ellipsoid::Wgs84);
        assert_eq!("wgs84".parse::<Ellipsoid>().unwrap(), Ellipsoid::Wgs84);
        assert!(matches!(
            "Clarke1880".parse::<Ellipsoid>(),
            Err(CheckError::UnsupportedEllipsoid(_))
        ));
    }

    #[test]
    fn test_meridian_degree() {
        let measure = EllipsoidalMeasure::wgs84();
        let ls = Geometry::LineString(line_string![(x: 2.0, y: 45.0), (x: 2.0, y: 46.0)]);
        let length = measure.measure_length(&ls);
        // 1° de méridien vers 45.5°N ≈ 111.14 km
        assert!((length - 111_141.0).abs() < 20.0, "length={}", length);
    }

    #[test]
    fn test_non_linear_geometries() {
        let measure = EllipsoidalMeasure::wgs84();
        assert_eq!(measure.measure_length(&Geometry::Point(point!(x: 1.0, y: 1.0))), 0.0);
        let poly = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];
        assert_eq!(measure.measure_length(&Geometry::Polygon(poly)), 0.0);
    }
}
