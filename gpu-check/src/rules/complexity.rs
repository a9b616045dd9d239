//! Complexité : sommets, trous, parts et densité des anneaux volumineux

use geo::Geometry;
use tracing::warn;

use super::{Rule, RuleContext, RuleKind};
use crate::metrics;
use crate::ring;
use crate::sink::EditSession;
use crate::types::{Category, Feature, Finding, Level};

/// Jusqu'à quatre anomalies `complex` par feature, une par sous-contrôle déclenché
pub struct ComplexityRule;

/// Niveau et seuil franchi ; None si le seuil WARNING n'est pas dépassé
fn graded<T: PartialOrd + Copy>(value: T, warning: T, error: T) -> Option<(Level, T)> {
    if value > error {
        Some((Level::Error, error))
    } else if value > warning {
        Some((Level::Warning, warning))
    } else {
        None
    }
}

impl ComplexityRule {
    fn add_at_centroid(
        feature: &Feature,
        geometry: &Geometry,
        level: Level,
        message: String,
        ctx: &RuleContext<'_>,
        session: &mut EditSession<'_>,
    ) {
        match ctx.centroid(geometry) {
            Some(location) => session.add(Finding::new(
                feature.fid,
                level,
                Category::Complex,
                message,
                location,
            )),
            None => warn!(fid = feature.fid, message = %message, "No location for finding, skipped"),
        }
    }
}

impl Rule for ComplexityRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Complexity
    }

    fn check_feature(&mut self, feature: &Feature, ctx: &RuleContext<'_>, session: &mut EditSession<'_>) {
        let Some(geometry) = &feature.geometry else {
            return;
        };
        let config = ctx.config;

        let vertices = metrics::vertex_count(Some(geometry));
        if vertices > config.max_vertices {
            let message = format!("Nombre de sommets supérieur à {}", config.max_vertices);
            Self::add_at_centroid(feature, geometry, Level::Error, message, ctx, session);
        }

        let inner_rings = metrics::inner_ring_count(Some(geometry));
        if let Some((level, threshold)) =
            graded(inner_rings, config.inner_rings_warning, config.inner_rings_error)
        {
            let message = format!("Nombre de trous supérieur à {}", threshold);
            Self::add_at_centroid(feature, geometry, level, message, ctx, session);
        }

        let parts = metrics::part_count(Some(geometry));
        if let Some((level, threshold)) = graded(parts, config.parts_warning, config.parts_error) {
            let message = format!("Nombre de parts supérieur à {}", threshold);
            Self::add_at_centroid(feature, geometry, level, message, ctx, session);
        }

        for huge_ring in ring::huge_rings(Some(geometry), config.ring_max_vertices) {
            let density = metrics::vertices_density(Some(&huge_ring), ctx.measure);
            let Some((level, threshold)) =
                graded(density, config.density_warning, config.density_error)
            else {
                continue;
            };
            let Some(location) = huge_ring.centroid() else {
                continue;
            };
            session.add(Finding::new(
                feature.fid,
                level,
                Category::Complex,
                format!(
                    "Anneau avec plus de {} points et plus de {} points/mètre",
                    config.ring_max_vertices, threshold
                ),
                location,
            ));
        }
    }
}
