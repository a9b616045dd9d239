//! Mesures de complexité d'une géométrie (sommets, trous, parts, densité)

use std::borrow::Cow;

use geo::{Geometry, LineString, Point, Polygon};

use crate::measure::LengthMeasure;
use crate::ring::Ring;

/// Part élémentaire d'une géométrie (éventuellement multi-part)
#[derive(Debug, Clone)]
pub enum Part<'a> {
    Point(Point),
    Line(Cow<'a, LineString>),
    Polygon(Cow<'a, Polygon>),
}

impl Part<'_> {
    /// Nombre de sommets, anneaux fermés compris (point de fermeture inclus)
    pub fn vertex_count(&self) -> usize {
        match self {
            Part::Point(_) => 1,
            Part::Line(ls) => ls.0.len(),
            Part::Polygon(poly) => {
                poly.exterior().0.len() + poly.interiors().iter().map(|r| r.0.len()).sum::<usize>()
            }
        }
    }

    /// Nombre d'anneaux intérieurs (trous)
    pub fn inner_ring_count(&self) -> usize {
        match self {
            Part::Polygon(poly) => poly.interiors().len(),
            _ => 0,
        }
    }
}

/// Décompose une géométrie en parts élémentaires, dans l'ordre source.
///
/// Les collections sont aplaties récursivement.
pub fn parts(geometry: &Geometry) -> Vec<Part<'_>> {
    let mut parts = Vec::new();
    collect_parts(geometry, &mut parts);
    parts
}

fn collect_parts<'a>(geometry: &'a Geometry, parts: &mut Vec<Part<'a>>) {
    match geometry {
        Geometry::Point(p) => parts.push(Part::Point(*p)),
        Geometry::Line(line) => parts.push(Part::Line(Cow::Owned(LineString::new(vec![
            line.start, line.end,
        ])))),
        Geometry::LineString(ls) => parts.push(Part::Line(Cow::Borrowed(ls))),
        Geometry::Polygon(poly) => parts.push(Part::Polygon(Cow::Borrowed(poly))),
        Geometry::MultiPoint(mp) => parts.extend(mp.iter().map(|p| Part::Point(*p))),
        Geometry::MultiLineString(mls) => {
            parts.extend(mls.iter().map(|ls| Part::Line(Cow::Borrowed(ls))))
        }
        Geometry::MultiPolygon(mp) => {
            parts.extend(mp.iter().map(|poly| Part::Polygon(Cow::Borrowed(poly))))
        }
        Geometry::Rect(rect) => parts.push(Part::Polygon(Cow::Owned(rect.to_polygon()))),
        Geometry::Triangle(tri) => parts.push(Part::Polygon(Cow::Owned(tri.to_polygon()))),
        Geometry::GeometryCollection(gc) => {
            for member in gc.iter() {
                collect_parts(member, parts);
            }
        }
    }
}

/// Somme des sommets de toutes les parts ; 0 pour une géométrie nulle
pub fn vertex_count(geometry: Option<&Geometry>) -> usize {
    geometry
        .map(|g| parts(g).iter().map(Part::vertex_count).sum())
        .unwrap_or(0)
}

/// Somme des trous de toutes les parts ; 0 pour une géométrie nulle
pub fn inner_ring_count(geometry: Option<&Geometry>) -> usize {
    geometry
        .map(|g| parts(g).iter().map(Part::inner_ring_count).sum())
        .unwrap_or(0)
}

/// Nombre de parts de premier niveau ; 0 pour une géométrie nulle ou vide
pub fn part_count(geometry: Option<&Geometry>) -> usize {
    let Some(geometry) = geometry else {
        return 0;
    };

    match geometry {
        Geometry::MultiPoint(mp) => mp.0.len(),
        Geometry::MultiLineString(mls) => mls.0.len(),
        Geometry::MultiPolygon(mp) => mp.0.len(),
        Geometry::GeometryCollection(gc) => gc.0.len(),
        Geometry::LineString(ls) if ls.0.is_empty() => 0,
        Geometry::Polygon(poly) if poly.exterior().0.is_empty() => 0,
        _ => 1,
    }
}

/// Densité de sommets d'un anneau, en points par mètre de longueur ellipsoïdale.
///
/// Retourne 0 pour un anneau nul ou de longueur nulle.
pub fn vertices_density(ring: Option<&Ring>, measure: &dyn LengthMeasure) -> f64 {
    let Some(ring) = ring else {
        return 0.0;
    };

    let length = measure.measure_length(&ring.to_geometry());
    if length > 0.0 {
        ring.vertex_count() as f64 / length
    } else {
        0.0
    }
}
