//! Lambert conique conforme sécant (Lambert 93, EPSG:2154)

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use geo::Coord;

use super::ellipsoid::Ellipsoid;

/// Constantes de projection, calculées une fois à partir des paramètres de définition
#[derive(Debug, Clone, Copy)]
pub struct ConformalConic {
    e: f64,
    lon0: f64,
    /// Exposant de la projection
    n: f64,
    /// Constante de la projection
    c: f64,
    /// Coordonnées du pôle en projection
    xs: f64,
    ys: f64,
}

impl ConformalConic {
    /// Projection à deux parallèles automécoïques
    pub fn secant(
        ellipsoid: Ellipsoid,
        lon0_deg: f64,
        lat0_deg: f64,
        lat1_deg: f64,
        lat2_deg: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let e = ellipsoid.e();
        let (lat0, lat1, lat2) = (
            lat0_deg.to_radians(),
            lat1_deg.to_radians(),
            lat2_deg.to_radians(),
        );

        let m1 = ellipsoid.normal_radius(lat1) * lat1.cos();
        let m2 = ellipsoid.normal_radius(lat2) * lat2.cos();
        let l1 = isometric_latitude(lat1, e);
        let l2 = isometric_latitude(lat2, e);

        let n = (m1 / m2).ln() / (l2 - l1);
        let c = m1 / n * (n * l1).exp();
        let r0 = c * (-n * isometric_latitude(lat0, e)).exp();

        Self {
            e,
            lon0: lon0_deg.to_radians(),
            n,
            c,
            xs: false_easting,
            ys: false_northing + r0,
        }
    }

    /// Lambert 93 sur RGF93
    pub fn lambert93() -> Self {
        Self::secant(Ellipsoid::GRS80, 3.0, 46.5, 44.0, 49.0, 700_000.0, 6_600_000.0)
    }

    /// Coordonnées projetées vers longitude/latitude en degrés
    pub fn inverse(&self, c: Coord) -> Coord {
        let dx = c.x - self.xs;
        let dy = c.y - self.ys;

        let r = dx.hypot(dy);
        let gamma = dx.atan2(-dy);
        let iso = -(r / self.c).ln() / self.n;

        Coord {
            x: (self.lon0 + gamma / self.n).to_degrees(),
            y: latitude_from_isometric(iso, self.e).to_degrees(),
        }
    }
}

fn isometric_latitude(lat: f64, e: f64) -> f64 {
    let es = e * lat.sin();
    ((FRAC_PI_4 + lat / 2.0).tan() * ((1.0 - es) / (1.0 + es)).powf(e / 2.0)).ln()
}

fn latitude_from_isometric(iso: f64, e: f64) -> f64 {
    let exp_iso = iso.exp();
    let mut lat = 2.0 * exp_iso.atan() - FRAC_PI_2;

    for _ in 0..20 {
        let es = e * lat.sin();
        let next = 2.0 * (exp_iso * ((1.0 + es) / (1.0 - es)).powf(e / 2.0)).atan() - FRAC_PI_2;
        if (next - lat).abs() < 1e-12 {
            return next;
        }
        lat = next;
    }
    lat
}
