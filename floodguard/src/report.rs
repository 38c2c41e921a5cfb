//! Rapport de chargement avec dégradation gracieuse
//!
//! Chaque source est soit chargée, soit remplacée (données générées), soit
//! vide. Le rapport garde la trace des remplacements et des features ignorées
//! pour l'affichage console ou l'export JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

/// Statut global du chargement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadStatus {
    /// Toutes les sources chargées sans perte
    Complete,
    /// Sources optionnelles vides ou features ignorées
    Degraded,
    /// Sources obligatoires remplacées par des données générées
    Placeholder,
}

/// Issue du chargement d'une source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceStatus {
    /// Fichier lu et parsé
    Loaded,
    /// Remplacé par des données générées
    Placeholder,
    /// Remplacé par une collection vide
    Empty,
}

/// Avertissement de chargement
#[derive(Debug, Clone, Serialize)]
pub struct LoadWarning {
    /// Source concernée
    pub source: String,
    /// Message
    pub message: String,
    /// Détails supplémentaires (optionnel)
    pub details: Option<String>,
}

/// Bilan d'une source
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub path: String,
    pub status: SourceStatus,
    /// Features (ou articles) retenues
    pub features: usize,
    /// Features ignorées au chargement
    pub skipped: usize,
}

/// Rapport complet de chargement
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub status: LoadStatus,
    pub duration_secs: f64,
    pub sources: Vec<SourceReport>,
    pub warnings: Vec<LoadWarning>,
}

impl Default for LoadReport {
    fn default() -> Self {
        Self {
            status: LoadStatus::Complete,
            duration_secs: 0.0,
            sources: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre le statut d'une source
    pub fn record_source(&mut self, source: &str, path: &Path, status: SourceStatus) {
        match self.sources.iter_mut().find(|s| s.source == source) {
            Some(existing) => existing.status = status,
            None => self.sources.push(SourceReport {
                source: source.to_string(),
                path: path.display().to_string(),
                status,
                features: 0,
                skipped: 0,
            }),
        }
    }

    /// Enregistre le nombre de features retenues et ignorées d'une source
    pub fn record_counts(&mut self, source: &str, features: usize, skipped: usize) {
        if let Some(s) = self.sources.iter_mut().find(|s| s.source == source) {
            s.features = features;
            s.skipped = skipped;
        }
    }

    /// Enregistre un avertissement
    pub fn record_warning(&mut self, source: &str, message: &str, details: Option<String>) {
        self.warnings.push(LoadWarning {
            source: source.to_string(),
            message: message.to_string(),
            details,
        });
    }

    pub fn source(&self, source: &str) -> Option<&SourceReport> {
        self.sources.iter().find(|s| s.source == source)
    }

    /// Définit la durée du chargement
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        let placeholder = self.sources.iter().any(|s| s.status == SourceStatus::Placeholder);
        let degraded = self
            .sources
            .iter()
            .any(|s| s.status == SourceStatus::Empty || s.skipped > 0);

        self.status = if placeholder {
            LoadStatus::Placeholder
        } else if degraded {
            LoadStatus::Degraded
        } else {
            LoadStatus::Complete
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("LOAD REPORT");
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SOURCES ---");
        for s in &self.sources {
            println!(
                "  {:<12} {:?}: {} features, {} skipped ({})",
                s.source, s.status, s.features, s.skipped, s.path
            );
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                match &w.details {
                    Some(d) => println!("  [{}] {}: {}", w.source, w.message, d),
                    None => println!("  [{}] {}", w.source, w.message),
                }
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        let count = |status: SourceStatus| self.sources.iter().filter(|s| s.status == status).count();
        format!(
            "{:?}: {} loaded, {} placeholder, {} empty, {} warnings",
            self.status,
            count(SourceStatus::Loaded),
            count(SourceStatus::Placeholder),
            count(SourceStatus::Empty),
            self.warnings.len()
        )
    }
}
