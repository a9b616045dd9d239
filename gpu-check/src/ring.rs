//! Extraction des anneaux volumineux pour le contrôle de densité

use geo::{Centroid, Coord, Geometry, LineString, Point};
use tracing::debug;

use crate::metrics::{self, Part};

/// Anneau isolé sous forme de géométrie autonome
#[derive(Debug, Clone, PartialEq)]
pub enum Ring {
    /// Anneau dégénéré réduit à un point
    Point(Point),
    /// Anneau sous forme de ligne
    Line(LineString),
}

impl Ring {
    pub fn vertex_count(&self) -> usize {
        match self {
            Ring::Point(_) => 1,
            Ring::Line(ls) => ls.0.len(),
        }
    }

    pub fn to_geometry(&self) -> Geometry {
        match self {
            Ring::Point(p) => Geometry::Point(*p),
            Ring::Line(ls) => Geometry::LineString(ls.clone()),
        }
    }

    /// Centroïde de l'anneau vu comme une ligne
    pub fn centroid(&self) -> Option<Point> {
        match self {
            Ring::Point(p) => Some(*p),
            Ring::Line(ls) => ls.centroid().or_else(|| ls.0.first().copied().map(Point::from)),
        }
    }
}

/// Forme d'un anneau source
enum RingShape<'a> {
    Point(Coord),
    Line(&'a LineString),
    Unsupported,
}

impl RingShape<'_> {
    fn into_ring(self) -> Option<Ring> {
        match self {
            RingShape::Point(c) => Some(Ring::Point(Point::from(c))),
            RingShape::Line(ls) => Some(Ring::Line(ls.clone())),
            RingShape::Unsupported => None,
        }
    }
}

fn classify(ring: &LineString) -> RingShape<'_> {
    match ring.0.len() {
        0 => RingShape::Unsupported,
        1 => RingShape::Point(ring.0[0]),
        _ => RingShape::Line(ring),
    }
}

/// Anneau extérieur d'une part : seul un polygone ou un point en a un
fn exterior_shape<'a>(part: &'a Part<'_>) -> RingShape<'a> {
    match part {
        Part::Polygon(poly) => classify(poly.exterior()),
        Part::Point(p) => RingShape::Point(p.0),
        Part::Line(_) => RingShape::Unsupported,
    }
}

/// Retourne les anneaux (extérieurs puis intérieurs, parts dans l'ordre source)
/// ayant strictement plus de `max_vertices` sommets.
///
/// Un anneau de forme non supportée arrête le parcours de la géométrie : les anneaux
/// déjà retenus sont conservés, les suivants ne sont pas examinés.
pub fn huge_rings(geometry: Option<&Geometry>, max_vertices: usize) -> Vec<Ring> {
    let Some(geometry) = geometry else {
        return Vec::new();
    };

    let mut rings = Vec::new();

    for part in metrics::parts(geometry) {
        let Some(exterior) = exterior_shape(&part).into_ring() else {
            debug!(retained = rings.len(), "Unsupported exterior ring shape, ring scan stopped");
            return rings;
        };
        if exterior.vertex_count() > max_vertices {
            rings.push(exterior);
        }

        if let Part::Polygon(poly) = &part {
            for interior in poly.interiors() {
                let Some(ring) = classify(interior).into_ring() else {
                    debug!(retained = rings.len(), "Unsupported interior ring shape, ring scan stopped");
                    return rings;
                };
                if ring.vertex_count() > max_vertices {
                    rings.push(ring);
                }
            }
        }
    }

    rings
}
