//! Types de données pour le crate gpu-check

use std::fmt;

use geo::{Geometry, Point};
use serde::{Deserialize, Serialize};

/// Identifiant d'une feature, fourni par la source (pas forcément contigu)
pub type Fid = i64;

/// Une feature de la couche contrôlée
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Identifiant source
    pub fid: Fid,

    /// Géométrie (None pour une géométrie nulle)
    pub geometry: Option<Geometry>,
}

impl Feature {
    pub fn new(fid: Fid, geometry: impl Into<Geometry>) -> Self {
        Self {
            fid,
            geometry: Some(geometry.into()),
        }
    }

    /// Feature sans géométrie
    pub fn null(fid: Fid) -> Self {
        Self {
            fid,
            geometry: None,
        }
    }
}

/// Système de référence identifié par son code EPSG
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs {
    epsg: u32,
}

impl Crs {
    /// WGS84 géographique, seul système accepté par le contrôle
    pub const WGS84: Crs = Crs { epsg: 4326 };

    pub const fn from_epsg(epsg: u32) -> Self {
        Self { epsg }
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    /// Identifiant d'autorité, ex: `EPSG:4326`
    pub fn authid(&self) -> String {
        format!("EPSG:{}", self.epsg)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

/// Niveau de sévérité d'une anomalie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Error,
    Warning,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catégorie d'anomalie (colonne `type` de la couche d'erreurs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Invalid,
    Complex,
    Duplicate,
    Boundary,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Complex => "complex",
            Self::Duplicate => "duplicate",
            Self::Boundary => "boundary",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anomalie détectée sur une feature
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    /// Identifiant de la feature d'origine
    pub fid: Fid,

    pub level: Level,

    pub category: Category,

    /// Message lisible, paramétré par les seuils
    pub message: String,

    /// Point représentatif (sommet fautif ou centroïde)
    pub location: Point,
}

impl Finding {
    pub fn new(
        fid: Fid,
        level: Level,
        category: Category,
        message: impl Into<String>,
        location: Point,
    ) -> Self {
        Self {
            fid,
            level,
            category,
            message: message.into(),
            location,
        }
    }

    /// Anomalie de niveau ERROR
    pub fn error(fid: Fid, category: Category, message: impl Into<String>, location: Point) -> Self {
        Self::new(fid, Level::Error, category, message, location)
    }
}
