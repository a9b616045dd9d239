//! Capacités géométriques consommées par les règles

use geo::{Centroid, CoordsIter, Geometry, Point, Relate};

use crate::validity::{self, Defect};

/// Opérations géométriques utilisées par les règles de contrôle.
///
/// L'implémentation par défaut [`GeoOps`] s'appuie sur le crate `geo` ; un hôte peut
/// fournir la sienne (GEOS, moteur SIG, ...).
pub trait GeometryOps {
    /// Défauts de validité, localisés
    fn validate(&self, geometry: &Geometry) -> Vec<Defect>;

    fn is_valid(&self, geometry: &Geometry) -> bool {
        self.validate(geometry).is_empty()
    }

    /// Égalité topologique (même ensemble de points)
    fn equals_topo(&self, a: &Geometry, b: &Geometry) -> bool;

    /// Égalité exacte des coordonnées
    fn equals_exact(&self, a: &Geometry, b: &Geometry) -> bool {
        a == b
    }

    /// Point représentatif ; None si la géométrie n'a aucune coordonnée
    fn centroid(&self, geometry: &Geometry) -> Option<Point>;
}

/// Opérations géométriques basées sur `geo`
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoOps;

impl GeometryOps for GeoOps {
    fn validate(&self, geometry: &Geometry) -> Vec<Defect> {
        validity::validate(geometry)
    }

    fn equals_topo(&self, a: &Geometry, b: &Geometry) -> bool {
        let a_empty = a.coords_count() == 0;
        let b_empty = b.coords_count() == 0;
        if a_empty || b_empty {
            return a_empty && b_empty;
        }

        // T*F**FFF* : A dans B et B dans A
        let matrix = a.relate(b);
        matrix.is_within() && matrix.is_contains()
    }

    fn centroid(&self, geometry: &Geometry) -> Option<Point> {
        geometry
            .centroid()
            .or_else(|| geometry.coords_iter().next().map(Point::from))
    }
}
