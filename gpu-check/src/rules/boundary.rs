//! Cohérence des limites
//!
//! La règle occupe sa place dans la chaîne (passe complète, transaction vide) sans
//! produire d'anomalie : aucun critère de cohérence des limites n'est défini.

use super::{Rule, RuleContext, RuleKind};
use crate::sink::EditSession;
use crate::types::Feature;

pub struct BoundaryRule;

impl Rule for BoundaryRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Boundary
    }

    fn check_feature(&mut self, _feature: &Feature, _ctx: &RuleContext<'_>, _session: &mut EditSession<'_>) {}
}
