//! Détection des géométries dupliquées

use geo::Geometry;
use tracing::trace;

use super::{Rule, RuleContext, RuleKind};
use crate::sink::EditSession;
use crate::types::{Category, Feature, Finding};

/// Compare chaque géométrie à toutes celles déjà vues (parcours quadratique).
///
/// Pour N géométries identiques, seules les N−1 dernières sont signalées.
/// L'égalité topologique n'est évaluée qu'entre deux géométries valides, sinon les
/// coordonnées sont comparées telles quelles.
#[derive(Debug, Default)]
pub struct DuplicatesRule {
    /// Géométries vues et leur validité
    seen: Vec<(Geometry, bool)>,
}

impl DuplicatesRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nombre de géométries déjà mémorisées
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

impl Rule for DuplicatesRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Duplicates
    }

    fn check_feature(&mut self, feature: &Feature, ctx: &RuleContext<'_>, session: &mut EditSession<'_>) {
        let Some(geometry) = &feature.geometry else {
            return;
        };

        let valid = ctx.ops.is_valid(geometry);
        let duplicated = self.seen.iter().any(|(previous, previous_valid)| {
            if valid && *previous_valid {
                ctx.ops.equals_topo(geometry, previous)
            } else {
                ctx.ops.equals_exact(geometry, previous)
            }
        });

        if duplicated {
            trace!(fid = feature.fid, "Duplicate geometry");
            if let Some(location) = ctx.centroid(geometry) {
                session.add(Finding::error(
                    feature.fid,
                    Category::Duplicate,
                    "Géométrie dupliquée",
                    location,
                ));
            }
        }

        self.seen.push((geometry.clone(), valid));
    }
}
