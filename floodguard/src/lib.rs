//! # floodguard
//!
//! Tableau de bord de suivi des inondations de Pekanbaru (Riau).
//!
//! ## Features
//!
//! - Chargement asynchrone des sources avec repli (données générées ou vides)
//! - Filtres liés par kecamatan, initialisés une fois les couches liées chargées
//! - Cartes de métriques, données de graphiques, tableau paginé
//! - Export JSON, CSV et GeoJSON
//! - CLI simple
//!
//! ## Usage CLI
//!
//! ```bash
//! # Métriques et rapport de chargement
//! floodguard summary
//! floodguard --config dashboard summary --json
//!
//! # Filtre lié et export
//! floodguard filter --district Tampan --district Sukajadi
//! floodguard export --format geojson --output ./banjir.geojson --district Tampan
//! ```

pub mod cli;
pub mod config;
pub mod export;
pub mod fallback;
pub mod loader;
pub mod news;
pub mod report;

pub use config::Config;
pub use loader::{load_dashboard, Dashboard};
pub use report::{LoadReport, LoadStatus};
