//! Validation OGC des géométries (équivalent GEOS `isValidDetail`)
//!
//! Comme GEOS, la validation s'arrête au premier défaut rencontré. Les contrôles sont faits
//! dans l'ordre suivant :
//!
//! 1. coordonnées non finies
//! 2. composants avec trop peu de points
//! 3. intersections de segments (auto-intersection, auto-contact d'un anneau)
//! 4. trous hors de l'enveloppe, trous imbriqués
//! 5. enveloppes imbriquées (multipolygone)
//!
//! La déconnexion de l'intérieur (trou touchant l'enveloppe en deux points) n'est pas détectée.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Contains, Coord, Geometry, Intersects, Line, LineString, Point, Polygon};

use crate::metrics::{self, Part};

pub const INVALID_COORDINATE: &str = "Invalid Coordinate";
pub const TOO_FEW_POINTS: &str = "Too few points in geometry component";
pub const SELF_INTERSECTION: &str = "Self-intersection";
pub const RING_SELF_INTERSECTION: &str = "Ring Self-intersection";
pub const HOLE_OUTSIDE_SHELL: &str = "Hole lies outside shell";
pub const NESTED_HOLES: &str = "Holes are nested";
pub const NESTED_SHELLS: &str = "Nested shells";

/// Défaut de validité localisé
#[derive(Debug, Clone, PartialEq)]
pub struct Defect {
    /// Point où le défaut est constaté
    pub location: Point,
    /// Explication (libellés GEOS)
    pub message: String,
}

impl Defect {
    fn new(location: Coord, message: &str) -> Self {
        Self {
            location: Point::from(location),
            message: message.to_string(),
        }
    }
}

/// Valide une géométrie et retourne ses défauts (au plus un, comme GEOS)
pub fn validate(geometry: &Geometry) -> Vec<Defect> {
    first_defect(geometry).into_iter().collect()
}

fn first_defect(geometry: &Geometry) -> Option<Defect> {
    if let Some(defect) = invalid_coordinate(geometry) {
        return Some(defect);
    }

    let parts = metrics::parts(geometry);
    let mut polygons: Vec<&Polygon> = Vec::new();

    for part in &parts {
        match part {
            Part::Point(_) => {}
            Part::Line(ls) => {
                if !ls.0.is_empty() && distinct_len(ls) < 2 {
                    return Some(Defect::new(ls.0[0], TOO_FEW_POINTS));
                }
            }
            Part::Polygon(poly) => {
                if let Some(defect) = validate_polygon(poly) {
                    return Some(defect);
                }
                if !poly.exterior().0.is_empty() {
                    polygons.push(&**poly);
                }
            }
        }
    }

    // Les parts d'une collection hétérogène ne sont pas confrontées entre elles
    if matches!(geometry, Geometry::MultiPolygon(_)) && polygons.len() > 1 {
        return validate_shells(&polygons);
    }

    None
}

fn invalid_coordinate(geometry: &Geometry) -> Option<Defect> {
    use geo::CoordsIter;

    geometry
        .coords_iter()
        .find(|c| !c.x.is_finite() || !c.y.is_finite())
        .map(|c| Defect::new(c, INVALID_COORDINATE))
}

fn validate_polygon(poly: &Polygon) -> Option<Defect> {
    let exterior = poly.exterior();
    if exterior.0.is_empty() {
        return None;
    }

    let rings: Vec<&LineString> = std::iter::once(exterior).chain(poly.interiors()).collect();

    for ring in &rings {
        if distinct_len(ring) < 4 {
            let at = ring.0.first().copied().unwrap_or(exterior.0[0]);
            return Some(Defect::new(at, TOO_FEW_POINTS));
        }
    }

    let segments: Vec<Segment> = rings
        .iter()
        .enumerate()
        .flat_map(|(i, ring)| ring_segments(ring, 0, i))
        .collect();

    if let Some(defect) = find_intersection(&segments, classify_polygon_intersection) {
        return Some(defect);
    }

    let shell = Polygon::new(exterior.clone(), vec![]);
    let holes: Vec<Polygon> = poly
        .interiors()
        .iter()
        .map(|r| Polygon::new(r.clone(), vec![]))
        .collect();

    for hole in &holes {
        if let Some(probe) = probe_vertex(hole.exterior(), exterior) {
            if !shell.contains(&Point::from(probe)) {
                return Some(Defect::new(probe, HOLE_OUTSIDE_SHELL));
            }
        }
    }

    for (i, inner) in holes.iter().enumerate() {
        for (j, outer) in holes.iter().enumerate() {
            if i == j {
                continue;
            }
            if let Some(probe) = probe_vertex(inner.exterior(), outer.exterior()) {
                if outer.contains(&Point::from(probe)) {
                    return Some(Defect::new(probe, NESTED_HOLES));
                }
            }
        }
    }

    None
}

/// Contrôle inter-polygones d'un multipolygone : croisements puis imbrication
fn validate_shells(polygons: &[&Polygon]) -> Option<Defect> {
    let segments: Vec<Segment> = polygons
        .iter()
        .enumerate()
        .flat_map(|(i, poly)| {
            std::iter::once(poly.exterior())
                .chain(poly.interiors())
                .map(move |ring| (i, ring))
        })
        .enumerate()
        .flat_map(|(ring_no, (owner, ring))| ring_segments(ring, owner, ring_no))
        .collect();

    if let Some(defect) = find_intersection(&segments, classify_shell_intersection) {
        return Some(defect);
    }

    for (i, inner) in polygons.iter().enumerate() {
        for (j, outer) in polygons.iter().enumerate() {
            if i == j {
                continue;
            }
            if let Some(probe) = probe_vertex(inner.exterior(), outer.exterior()) {
                if outer.contains(&Point::from(probe)) {
                    return Some(Defect::new(probe, NESTED_SHELLS));
                }
            }
        }
    }

    None
}

/// Premier sommet de `ring` qui n'est pas sur la frontière `other`
fn probe_vertex(ring: &LineString, other: &LineString) -> Option<Coord> {
    ring.0
        .iter()
        .copied()
        .find(|c| !other.intersects(c))
}

/// Nombre de sommets après suppression des doublons consécutifs
fn distinct_len(ls: &LineString) -> usize {
    let mut count = 0;
    let mut previous: Option<Coord> = None;
    for c in &ls.0 {
        if previous != Some(*c) {
            count += 1;
            previous = Some(*c);
        }
    }
    count
}

/// Segment non dégénéré d'un anneau
#[derive(Debug, Clone, Copy)]
struct Segment {
    line: Line,
    /// Polygone d'appartenance
    owner: usize,
    /// Anneau d'appartenance
    ring: usize,
    /// Position dans l'anneau
    index: usize,
    /// Nombre de segments de l'anneau
    ring_len: usize,
}

impl Segment {
    fn min_x(&self) -> f64 {
        self.line.start.x.min(self.line.end.x)
    }

    fn max_x(&self) -> f64 {
        self.line.start.x.max(self.line.end.x)
    }

    fn overlaps_y(&self, other: &Segment) -> bool {
        let (a0, a1) = min_max(self.line.start.y, self.line.end.y);
        let (b0, b1) = min_max(other.line.start.y, other.line.end.y);
        a0 <= b1 && b0 <= a1
    }

    fn same_ring(&self, other: &Segment) -> bool {
        self.owner == other.owner && self.ring == other.ring
    }

    fn adjacent(&self, other: &Segment) -> bool {
        if !self.same_ring(other) {
            return false;
        }
        let (lo, hi) = min_max_usize(self.index, other.index);
        hi - lo == 1 || (lo == 0 && hi == self.ring_len - 1)
    }
}

fn min_max(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn min_max_usize(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn ring_segments(ring: &LineString, owner: usize, ring_no: usize) -> Vec<Segment> {
    let lines: Vec<Line> = ring.lines().filter(|l| l.start != l.end).collect();
    let ring_len = lines.len();
    lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| Segment {
            line,
            owner,
            ring: ring_no,
            index,
            ring_len,
        })
        .collect()
}

/// Balayage en x : confronte chaque paire de segments dont les emprises se chevauchent
fn find_intersection<F>(segments: &[Segment], classify: F) -> Option<Defect>
where
    F: Fn(&Segment, &Segment, LineIntersection<f64>) -> Option<Defect>,
{
    let mut order: Vec<usize> = (0..segments.len()).collect();
    order.sort_by(|&a, &b| segments[a].min_x().total_cmp(&segments[b].min_x()));

    for (pos, &i) in order.iter().enumerate() {
        let a = &segments[i];
        for &j in &order[pos + 1..] {
            let b = &segments[j];
            if b.min_x() > a.max_x() {
                break;
            }
            if !a.overlaps_y(b) {
                continue;
            }
            if let Some(intersection) = line_intersection(a.line, b.line) {
                if let Some(defect) = classify(a, b, intersection) {
                    return Some(defect);
                }
            }
        }
    }

    None
}

fn classify_polygon_intersection(
    a: &Segment,
    b: &Segment,
    intersection: LineIntersection<f64>,
) -> Option<Defect> {
    match intersection {
        LineIntersection::Collinear { intersection } => {
            // Deux segments consécutifs ne partagent normalement qu'un sommet
            (intersection.start != intersection.end)
                .then(|| Defect::new(intersection.start, SELF_INTERSECTION))
        }
        LineIntersection::SinglePoint {
            intersection,
            is_proper,
        } => {
            if is_proper {
                Some(Defect::new(intersection, SELF_INTERSECTION))
            } else if a.same_ring(b) && !a.adjacent(b) {
                Some(Defect::new(intersection, RING_SELF_INTERSECTION))
            } else {
                None
            }
        }
    }
}

fn classify_shell_intersection(
    a: &Segment,
    b: &Segment,
    intersection: LineIntersection<f64>,
) -> Option<Defect> {
    if a.owner == b.owner {
        return None;
    }
    match intersection {
        LineIntersection::Collinear { intersection } => {
            (intersection.start != intersection.end)
                .then(|| Defect::new(intersection.start, SELF_INTERSECTION))
        }
        LineIntersection::SinglePoint {
            intersection,
            is_proper: true,
        } => Some(Defect::new(intersection, SELF_INTERSECTION)),
        LineIntersection::SinglePoint { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, polygon, MultiPolygon};

    fn bowtie() -> Geometry {
        Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 2.0, y: 0.0),
            (x: 0.0, y: 2.0),
        ])
    }

    fn square(x0: f64, y0: f64, size: f64) -> LineString {
        line_string![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0),
        ]
    }

    #[test]
    fn test_valid_polygon() {
        let geom = Geometry::Polygon(Polygon::new(square(0.0, 0.0, 10.0), vec![square(2.0, 2.0, 2.0)]));
        assert!(validate(&geom).is_empty());
    }

    #[test]
    fn test_bowtie_self_intersection() {
        let defects = validate(&bowtie());
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].message, SELF_INTERSECTION);
        assert!((defects[0].location.x() - 1.0).abs() < 1e-9);
        assert!((defects[0].location.y() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ring_self_touch() {
        // L'anneau repasse par (2, 0)
        let geom = Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 3.0, y: 1.0),
            (x: 4.0, y: 0.0),
            (x: 4.0, y: -2.0),
            (x: 2.0, y: 0.0),
            (x: 1.0, y: 2.0),
        ]);
        let defects = validate(&geom);
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].message, RING_SELF_INTERSECTION);
        assert_eq!(defects[0].location, point!(x: 2.0, y: 0.0));
    }

    #[test]
    fn test_too_few_points() {
        let geom = Geometry::Polygon(polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)]);
        let defects = validate(&geom);
        assert_eq!(defects[0].message, TOO_FEW_POINTS);

        let line = Geometry::LineString(line_string![(x: 1.0, y: 1.0), (x: 1.0, y: 1.0)]);
        assert_eq!(validate(&line)[0].message, TOO_FEW_POINTS);
    }

    #[test]
    fn test_invalid_coordinate() {
        let geom = Geometry::Point(point!(x: f64::NAN, y: 1.0));
        assert_eq!(validate(&geom)[0].message, INVALID_COORDINATE);
    }

    #[test]
    fn test_hole_outside_shell() {
        let geom = Geometry::Polygon(Polygon::new(square(0.0, 0.0, 10.0), vec![square(20.0, 20.0, 2.0)]));
        let defects = validate(&geom);
        assert_eq!(defects[0].message, HOLE_OUTSIDE_SHELL);
        assert_eq!(defects[0].location, point!(x: 20.0, y: 20.0));
    }

    #[test]
    fn test_hole_crossing_shell() {
        let geom = Geometry::Polygon(Polygon::new(square(0.0, 0.0, 10.0), vec![square(8.0, 2.0, 4.0)]));
        assert_eq!(validate(&geom)[0].message, SELF_INTERSECTION);
    }

    #[test]
    fn test_nested_holes() {
        let geom = Geometry::Polygon(Polygon::new(
            square(0.0, 0.0, 10.0),
            vec![square(1.0, 1.0, 6.0), square(2.0, 2.0, 1.0)],
        ));
        assert_eq!(validate(&geom)[0].message, NESTED_HOLES);
    }

    #[test]
    fn test_nested_shells() {
        let geom = Geometry::MultiPolygon(MultiPolygon::new(vec![
            Polygon::new(square(0.0, 0.0, 10.0), vec![]),
            Polygon::new(square(2.0, 2.0, 2.0), vec![]),
        ]));
        assert_eq!(validate(&geom)[0].message, NESTED_SHELLS);
    }

    #[test]
    fn test_island_in_hole_is_valid() {
        let geom = Geometry::MultiPolygon(MultiPolygon::new(vec![
            Polygon::new(square(0.0, 0.0, 10.0), vec![square(2.0, 2.0, 6.0)]),
            Polygon::new(square(4.0, 4.0, 1.0), vec![]),
        ]));
        assert!(validate(&geom).is_empty());
    }

    #[test]
    fn test_multipolygon_shared_edge() {
        let geom = Geometry::MultiPolygon(MultiPolygon::new(vec![
            Polygon::new(square(0.0, 0.0, 1.0), vec![]),
            Polygon::new(square(1.0, 0.0, 1.0), vec![]),
        ]));
        assert_eq!(validate(&geom)[0].message, SELF_INTERSECTION);
    }

    #[test]
    fn test_multipolygon_touching_corner_is_valid() {
        let geom = Geometry::MultiPolygon(MultiPolygon::new(vec![
            Polygon::new(square(0.0, 0.0, 1.0), vec![]),
            Polygon::new(square(1.0, 1.0, 1.0), vec![]),
        ]));
        assert!(validate(&geom).is_empty());
    }
}
