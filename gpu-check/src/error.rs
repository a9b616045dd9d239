//! Types d'erreurs pour le crate gpu-check

use thiserror::Error;

use crate::rules::RuleKind;
use crate::types::Crs;

/// Erreurs pouvant survenir lors d'un contrôle de couche
#[derive(Debug, Error)]
pub enum CheckError {
    /// Aucune couche sélectionnée
    #[error("Aucune couche active. Sélectionner une couche.")]
    NoLayerSelected,

    /// Couche dans une projection autre que WGS84
    #[error(
        "La projection de la couche doit être en WGS84, actuellement en {found}. \
         Reprojeter la couche au préalable."
    )]
    InvalidCrs { found: Crs },

    /// Échec de la transaction d'édition d'une règle
    #[error("Transaction failed for rule {rule}: {reason}")]
    TransactionFailed { rule: RuleKind, reason: String },

    /// Une session d'édition est déjà ouverte sur la couche d'erreurs
    #[error("An edit session is already open on the error layer")]
    EditSessionActive,

    /// Commit demandé sans session d'édition ouverte
    #[error("No edit session is open on the error layer")]
    NoEditSession,

    /// Ellipsoïde inconnu
    #[error("Unsupported ellipsoid: {0}")]
    UnsupportedEllipsoid(String),

    /// Configuration incohérente
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CheckError {
    /// Crée une erreur de transaction avec contexte
    pub fn transaction(rule: RuleKind, reason: impl Into<String>) -> Self {
        Self::TransactionFailed {
            rule,
            reason: reason.into(),
        }
    }

    /// Vrai pour les erreurs levées avant l'exécution de toute règle
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::NoLayerSelected | Self::InvalidCrs { .. })
    }
}
