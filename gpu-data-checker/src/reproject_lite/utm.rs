//! Mercator transverse (UTM) sur WGS84
//!
//! Zones utilisées outre-mer : 20N (Antilles), 22N (Guyane), 38S (Mayotte), 40S (Réunion).

use geo::Coord;

use super::ellipsoid::Ellipsoid;

const K0: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const SOUTH_FALSE_NORTHING: f64 = 10_000_000.0;

/// Zone UTM
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseMercator {
    ellipsoid: Ellipsoid,
    /// Méridien central (radians)
    lon0: f64,
    false_northing: f64,
}

impl TransverseMercator {
    pub fn utm(zone: u8, south: bool) -> Self {
        Self {
            ellipsoid: Ellipsoid::WGS84,
            lon0: (f64::from(zone) * 6.0 - 183.0).to_radians(),
            false_northing: if south { SOUTH_FALSE_NORTHING } else { 0.0 },
        }
    }

    /// Coordonnées projetées vers longitude/latitude en degrés (séries de Snyder)
    pub fn inverse(&self, c: Coord) -> Coord {
        let a = self.ellipsoid.a;
        let e2 = self.ellipsoid.e2();
        let ep2 = self.ellipsoid.ep2();

        let x = c.x - FALSE_EASTING;
        let m = (c.y - self.false_northing) / K0;

        let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0));
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

        // Latitude du pied de la perpendiculaire
        let phi1 = mu
            + (1.5 * e1 - 27.0 / 32.0 * e1.powi(3)) * (2.0 * mu).sin()
            + (21.0 / 16.0 * e1.powi(2) - 55.0 / 32.0 * e1.powi(4)) * (4.0 * mu).sin()
            + (151.0 / 96.0 * e1.powi(3)) * (6.0 * mu).sin()
            + (1097.0 / 512.0 * e1.powi(4)) * (8.0 * mu).sin();

        let (sin1, cos1) = phi1.sin_cos();
        let tan1 = phi1.tan();
        let w = 1.0 - e2 * sin1 * sin1;

        let n1 = a / w.sqrt();
        let r1 = a * (1.0 - e2) / w.powf(1.5);
        let t1 = tan1 * tan1;
        let c1 = ep2 * cos1 * cos1;
        let d = x / (n1 * K0);

        let lat = phi1
            - n1 * tan1 / r1
                * (d.powi(2) / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);

        let lon = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                    * d.powi(5)
                    / 120.0)
                / cos1;

        Coord {
            x: lon.to_degrees(),
            y: lat.to_degrees(),
        }
    }
}
