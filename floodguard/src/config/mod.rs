//! Configuration du tableau de bord

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use floodmap::filter::{LinkedLayer, OptionDomain};
use floodmap::{MapSettings, Viewport};

/// Variable d'environnement qui remplace le répertoire de données
pub const DATA_DIR_ENV: &str = "FLOODGUARD_DATA_DIR";

/// Configuration principale
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Répertoire contenant les fichiers de données
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Noms des fichiers sources
    #[serde(default)]
    pub sources: SourceFiles,

    /// Réglages d'interaction (tolérances, tri, pagination, recherche)
    #[serde(default)]
    pub map: MapSettings,

    /// Vue initiale
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// Filtres liés
    #[serde(default)]
    pub filters: FilterConfig,

    /// Graine du générateur de données de remplacement (aléatoire si absente)
    #[serde(default)]
    pub placeholder_seed: Option<u64>,
}

/// Fichiers sources, relatifs à `data_dir`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceFiles {
    pub flood: String,
    pub waterlogging: String,
    pub province: String,
    pub city: String,
    pub news: String,
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            flood: "banjir.json".to_string(),
            waterlogging: "csvjson.json".to_string(),
            province: "polygon_riau.json".to_string(),
            city: "pekan.json".to_string(),
            news: "news.json".to_string(),
        }
    }
}

/// Vue initiale de la carte (centre en lon/lat)
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub center: [f64; 2],
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            center: [floodmap::viewport::DEFAULT_CENTER.0, floodmap::viewport::DEFAULT_CENTER.1],
            zoom: floodmap::viewport::DEFAULT_ZOOM,
            width: 1024.0,
            height: 768.0,
        }
    }
}

impl ViewportConfig {
    pub fn to_viewport(&self) -> Viewport {
        Viewport::from_lonlat(self.center[0], self.center[1], self.zoom, self.width, self.height)
    }
}

/// Définition des filtres liés
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Couches filtrées et propriété portant la clé
    pub linked: Vec<LinkedLayer>,
    /// Groupes de cases à cocher partageant la sélection
    pub groups: Vec<String>,
    pub domain: OptionDomain,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            linked: vec![
                LinkedLayer::new(floodmap::layers::WATERLOGGING, "kecamatan"),
                LinkedLayer::new(floodmap::layers::CITY, "WADMKC"),
            ],
            groups: vec!["sidebar".to_string(), "legend".to_string()],
            domain: OptionDomain::Union,
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            sources: SourceFiles::default(),
            map: MapSettings::default(),
            viewport: ViewportConfig::default(),
            filters: FilterConfig::default(),
            placeholder_seed: None,
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "dashboard" => Self::load_embedded(include_str!("presets/dashboard.json")),
            "map" => Self::load_embedded(include_str!("presets/map.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: dashboard, map", preset),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Nom de preset ou chemin vers un fichier JSON
    pub fn resolve(name: &str) -> Result<Self> {
        let path = Path::new(name);
        if path.extension().map_or(false, |ext| ext == "json") || path.exists() {
            Self::load(path)
        } else {
            Self::from_preset(name)
        }
    }

    /// Applique les surcharges de l'environnement (`FLOODGUARD_DATA_DIR`)
    pub fn with_env(mut self) -> Self {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
        self
    }

    /// Chemin complet d'un fichier source
    pub fn source_path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let dashboard = Config::from_preset("dashboard").unwrap();
        assert_eq!(dashboard.map.page_size, floodmap::table::DASHBOARD_PAGE_SIZE);
        assert_eq!(dashboard.viewport.zoom, 12.0);

        let map = Config::from_preset("map").unwrap();
        assert_eq!(map.map.page_size, floodmap::table::MAP_PAGE_SIZE);
        assert_eq!(map.filters.linked.len(), 2);
        assert_eq!(map.map.search_order[0], "genangan");

        assert!(Config::from_preset("full").is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{"data_dir": "/srv/flood", "map": {"tie_break": "first-hit"}}"#).unwrap();

        let config = Config::resolve(path.to_str().unwrap()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/flood"));
        assert_eq!(config.map.tie_break, floodmap::TieBreak::FirstHit);
        assert_eq!(config.map.hover_tolerance, floodmap::resolver::HOVER_TOLERANCE);
        assert_eq!(config.sources.flood, "banjir.json");
    }

    #[test]
    fn test_source_path() {
        let config = Config::default();
        assert_eq!(config.source_path("news.json"), PathBuf::from("data/news.json"));
    }
}
