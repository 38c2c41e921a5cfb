//! Types d'erreurs pour le crate floodmap

use thiserror::Error;

/// Erreurs pouvant survenir lors du chargement ou de l'interrogation des couches
#[derive(Debug, Error)]
pub enum FloodError {
    /// Erreur d'I/O lors de la lecture d'une source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document JSON illisible
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Géométrie GeoJSON non convertible
    #[error("Invalid geometry for feature {index} in {layer}: {reason}")]
    InvalidGeometry {
        layer: String,
        index: usize,
        reason: String,
    },

    /// Type de géométrie hors Point / Polygon / MultiPolygon
    #[error("Unsupported geometry {kind} for feature {index} in {layer}")]
    UnsupportedGeometry {
        layer: String,
        index: usize,
        kind: String,
    },

    /// Sources liées pas encore chargées
    #[error("Sources not ready: {}", missing.join(", "))]
    NotReady { missing: Vec<String> },

    /// Filtres liés pas encore initialisés
    #[error("Linked filters are not initialized")]
    FiltersNotInitialized,

    /// Clé de catégorie absente des options
    #[error("Unknown category key: {0}")]
    UnknownCategory(String),

    /// Groupe de cases à cocher inconnu
    #[error("Unknown checkbox group: {0}")]
    UnknownGroup(String),

    /// Couche inconnue
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),
}

impl FloodError {
    /// Crée une erreur de géométrie invalide avec contexte
    pub fn invalid_geometry(layer: impl Into<String>, index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            layer: layer.into(),
            index,
            reason: reason.into(),
        }
    }
}
