//! Validité OGC (GEOS)

use super::{Rule, RuleContext, RuleKind};
use crate::sink::EditSession;
use crate::types::{Category, Feature, Finding};

/// Une anomalie `invalid` par défaut de validité, localisée au point fautif
pub struct OgcValidityRule;

impl Rule for OgcValidityRule {
    fn kind(&self) -> RuleKind {
        RuleKind::OgcValidity
    }

    fn check_feature(&mut self, feature: &Feature, ctx: &RuleContext<'_>, session: &mut EditSession<'_>) {
        let Some(geometry) = &feature.geometry else {
            return;
        };

        for defect in ctx.ops.validate(geometry) {
            session.add(Finding::error(
                feature.fid,
                Category::Invalid,
                defect.message,
                defect.location,
            ));
        }
    }
}
