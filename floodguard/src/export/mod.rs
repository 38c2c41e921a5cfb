//! Modules d'export (JSON, CSV, GeoJSON)

pub mod csv;
pub mod geojson;
pub mod json;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::ValueEnum;
use floodmap::Session;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Format d'export
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Tableau JSON des points affichés
    Json,
    /// Lignes du tableau (recherche et tri appliqués)
    Csv,
    /// FeatureCollection des features affichées
    Geojson,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Geojson => "geojson",
        }
    }

    /// Ajoute l'extension du format si le chemin n'en a pas
    pub fn output_path(self, output: &Path) -> PathBuf {
        match output.extension() {
            Some(_) => output.to_path_buf(),
            None => output.with_extension(self.extension()),
        }
    }
}

/// Exporte l'état courant de la session; retourne le nombre d'éléments écrits
pub fn export(session: &Session, format: ExportFormat, output_path: &Path) -> Result<usize> {
    let written = match format {
        ExportFormat::Json => {
            let points: Vec<_> = session
                .visible_features()
                .into_iter()
                .filter(|f| f.category.is_point())
                .collect();
            json::export_to_json(&points, output_path)?;
            points.len()
        }
        ExportFormat::Csv => {
            let rows: Vec<_> = session.table().rows().collect();
            csv::export_to_csv(&rows, output_path)?;
            rows.len()
        }
        ExportFormat::Geojson => {
            let features = session.visible_features();
            geojson::export_to_geojson(&features, output_path)?;
            features.len()
        }
    };

    info!(format = ?format, output = %output_path.display(), written = written, "Export terminé");
    Ok(written)
}
