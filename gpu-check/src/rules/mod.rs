//! Règles de contrôle
//!
//! Chaque règle est une passe sur le flux de features : pour chaque feature, elle écrit
//! ses anomalies dans la session d'édition ouverte par l'orchestrateur.

pub mod boundary;
pub mod complexity;
pub mod duplicates;
pub mod ogc;

use std::fmt;

use geo::{Geometry, Point};
use serde::Serialize;

use crate::config::CheckConfig;
use crate::measure::LengthMeasure;
use crate::ops::GeometryOps;
use crate::sink::EditSession;
use crate::types::Feature;

pub use boundary::BoundaryRule;
pub use complexity::ComplexityRule;
pub use duplicates::DuplicatesRule;
pub use ogc::OgcValidityRule;

/// Identifiant d'une règle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    OgcValidity,
    Complexity,
    Duplicates,
    Boundary,
}

impl RuleKind {
    const ALL: [RuleKind; 4] = [
        RuleKind::OgcValidity,
        RuleKind::Complexity,
        RuleKind::Duplicates,
        RuleKind::Boundary,
    ];

    /// Règles exécutées, dans l'ordre, selon le type de couche
    pub fn pipeline(is_zoning_or_sector: bool) -> &'static [RuleKind] {
        if is_zoning_or_sector {
            &Self::ALL
        } else {
            &Self::ALL[..2]
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OgcValidity => "ogc_validity",
            Self::Complexity => "complexity",
            Self::Duplicates => "duplicates",
            Self::Boundary => "boundary",
        }
    }

    /// Nouvelle instance de la règle, sans état hérité d'une passe précédente
    pub fn instantiate(&self) -> Box<dyn Rule> {
        match self {
            Self::OgcValidity => Box::new(OgcValidityRule),
            Self::Complexity => Box::new(ComplexityRule),
            Self::Duplicates => Box::new(DuplicatesRule::new()),
            Self::Boundary => Box::new(BoundaryRule),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capacités et seuils partagés par les règles
pub struct RuleContext<'a> {
    pub ops: &'a dyn GeometryOps,
    pub measure: &'a dyn LengthMeasure,
    pub config: &'a CheckConfig,
}

impl RuleContext<'_> {
    /// Centroïde utilisé comme localisation des anomalies
    pub fn centroid(&self, geometry: &Geometry) -> Option<Point> {
        self.ops.centroid(geometry)
    }
}

/// Une règle de contrôle
pub trait Rule {
    fn kind(&self) -> RuleKind;

    /// Examine une feature et écrit ses anomalies dans la session
    fn check_feature(&mut self, feature: &Feature, ctx: &RuleContext<'_>, session: &mut EditSession<'_>);
}
