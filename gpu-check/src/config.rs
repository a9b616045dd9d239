//! Seuils de contrôle

use serde::{Deserialize, Serialize};

use crate::CheckError;

/// Seuils du contrôle de complexité et modèle d'ellipsoïde
///
/// Les valeurs par défaut sont celles attendues pour une couche GPU.
/// Tous les seuils sont exclusifs : une valeur égale au seuil ne déclenche rien.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Nombre maximal de sommets d'une géométrie
    pub max_vertices: usize,

    /// Nombre de trous au-delà duquel on émet un WARNING
    pub inner_rings_warning: usize,

    /// Nombre de trous au-delà duquel on émet une ERROR
    pub inner_rings_error: usize,

    /// Nombre de parts au-delà duquel on émet un WARNING
    pub parts_warning: usize,

    /// Nombre de parts au-delà duquel on émet une ERROR
    pub parts_error: usize,

    /// Nombre de sommets à partir duquel un anneau est soumis au contrôle de densité
    pub ring_max_vertices: usize,

    /// Densité (points/mètre) au-delà de laquelle on émet un WARNING
    pub density_warning: f64,

    /// Densité (points/mètre) au-delà de laquelle on émet une ERROR
    pub density_error: f64,

    /// Ellipsoïde utilisé pour les longueurs
    pub ellipsoid: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            max_vertices: 200_000,
            inner_rings_warning: 500,
            inner_rings_error: 1000,
            parts_warning: 500,
            parts_error: 1000,
            ring_max_vertices: 50_000,
            density_warning: 0.1,
            density_error: 10.0,
            ellipsoid: "WGS84".to_string(),
        }
    }
}

impl CheckConfig {
    /// Vérifie la cohérence des seuils WARNING/ERROR
    pub fn validate(&self) -> Result<(), CheckError> {
        if self.inner_rings_warning > self.inner_rings_error {
            return Err(CheckError::InvalidConfig(format!(
                "inner_rings_warning ({}) > inner_rings_error ({})",
                self.inner_rings_warning, self.inner_rings_error
            )));
        }
        if self.parts_warning > self.parts_error {
            return Err(CheckError::InvalidConfig(format!(
                "parts_warning ({}) > parts_error ({})",
                self.parts_warning, self.parts_error
            )));
        }
        if !(self.density_warning >= 0.0 && self.density_warning <= self.density_error) {
            return Err(CheckError::InvalidConfig(format!(
                "density thresholds must satisfy 0 <= {} <= {}",
                self.density_warning, self.density_error
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = CheckConfig::default();
        assert_eq!(config.max_vertices, 200_000);
        assert_eq!(config.inner_rings_error, 1000);
        assert_eq!(config.ring_max_vertices, 50_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let config = CheckConfig {
            parts_warning: 2000,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CheckError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_nan_density_rejected() {
        let config = CheckConfig {
            density_warning: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
