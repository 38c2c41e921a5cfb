//! Chargement asynchrone des sources avec repli
//!
//! Les cinq sources sont lues en parallèle. Chaque fin de lecture, réussie ou
//! non, est signalée à la barrière des couches liées: les filtres ne sont
//! construits qu'une fois toutes leurs sources arrivées.
//!
//! - Source obligatoire (crue, stagnation) en échec: tout le jeu est remplacé
//!   par des données générées.
//! - Source optionnelle (polygones, actualités) en échec: collection vide.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use floodmap::store::{z_index, SourceCollection};
use floodmap::{layers, FeatureStore, LoadBarrier, Session};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::fallback::Placeholder;
use crate::news::{parse_news, NewsItem};
use crate::report::{LoadReport, SourceStatus};

/// Erreur de lecture d'une source
#[derive(Debug, Error)]
pub enum SourceError {
    /// Fichier absent (équivalent d'un 404)
    #[error("Source not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Erreur d'I/O
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Contenu illisible
    #[error("Invalid JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Les sources du tableau de bord
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Flood,
    Waterlogging,
    Province,
    City,
    News,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Flood,
        SourceKind::Waterlogging,
        SourceKind::Province,
        SourceKind::City,
        SourceKind::News,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SourceKind::Flood => "flood",
            SourceKind::Waterlogging => "waterlogging",
            SourceKind::Province => "province",
            SourceKind::City => "city",
            SourceKind::News => "news",
        }
    }

    /// Couche alimentée par la source
    pub fn layer(self) -> Option<&'static str> {
        match self {
            SourceKind::Flood => Some(layers::FLOOD),
            SourceKind::Waterlogging => Some(layers::WATERLOGGING),
            SourceKind::Province => Some(layers::PROVINCE),
            SourceKind::City => Some(layers::CITY),
            SourceKind::News => None,
        }
    }

    /// Un échec déclenche le jeu de remplacement complet
    pub fn is_required(self) -> bool {
        matches!(self, SourceKind::Flood | SourceKind::Waterlogging)
    }

    fn file(self, config: &Config) -> PathBuf {
        let sources = &config.sources;
        config.source_path(match self {
            SourceKind::Flood => &sources.flood,
            SourceKind::Waterlogging => &sources.waterlogging,
            SourceKind::Province => &sources.province,
            SourceKind::City => &sources.city,
            SourceKind::News => &sources.news,
        })
    }
}

/// Contenu lu d'une source
#[derive(Debug)]
enum Fetched {
    Collection(SourceCollection),
    News(Vec<NewsItem>),
}

/// Sources chargées (ou remplacées), prêtes à être indexées
#[derive(Debug)]
pub struct Dataset {
    pub flood: SourceCollection,
    pub waterlogging: SourceCollection,
    pub province: SourceCollection,
    pub city: SourceCollection,
    pub news: Vec<NewsItem>,
    pub barrier: LoadBarrier,
    pub report: LoadReport,
}

/// Lit les octets d'une source
pub async fn read_source(path: &Path) -> Result<Vec<u8>, SourceError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SourceError::NotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(SourceError::Read {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

async fn fetch(kind: SourceKind, path: &Path) -> Result<Fetched, SourceError> {
    let bytes = read_source(path).await?;
    let parse_error = |source| SourceError::Parse {
        path: path.to_path_buf(),
        source,
    };

    match kind {
        SourceKind::News => parse_news(&bytes).map(Fetched::News).map_err(parse_error),
        _ => serde_json::from_slice::<SourceCollection>(&bytes)
            .map(Fetched::Collection)
            .map_err(parse_error),
    }
}

/// Lit toutes les sources en parallèle et applique les replis
pub async fn load_sources(config: &Config) -> Dataset {
    let start = Instant::now();
    let mut report = LoadReport::new();
    let mut barrier = LoadBarrier::new(config.filters.linked.iter().map(|l| l.layer.clone()));

    let mut pending: FuturesUnordered<_> = SourceKind::ALL
        .iter()
        .map(|&kind| {
            let path = kind.file(config);
            async move {
                let result = fetch(kind, &path).await;
                (kind, path, result)
            }
        })
        .collect();

    let mut collections: Vec<(SourceKind, SourceCollection)> = Vec::new();
    let mut news: Vec<NewsItem> = Vec::new();
    let mut required_failed = false;

    while let Some((kind, path, result)) = pending.next().await {
        match result {
            Ok(Fetched::Collection(collection)) => {
                info!(source = kind.name(), features = collection.len(), "Source chargée");
                report.record_source(kind.name(), &path, SourceStatus::Loaded);
                collections.push((kind, collection));
            }
            Ok(Fetched::News(items)) => {
                info!(source = kind.name(), items = items.len(), "Actualités chargées");
                report.record_source(kind.name(), &path, SourceStatus::Loaded);
                report.record_counts(kind.name(), items.len(), 0);
                news = items;
            }
            Err(e) if kind.is_required() => {
                warn!(source = kind.name(), error = %e, "Source obligatoire indisponible, données de remplacement");
                report.record_warning(kind.name(), "Required source unavailable, using placeholder data", Some(e.to_string()));
                report.record_source(kind.name(), &path, SourceStatus::Placeholder);
                required_failed = true;
            }
            Err(e) => {
                warn!(source = kind.name(), error = %e, "Source optionnelle indisponible, collection vide");
                report.record_warning(kind.name(), "Optional source unavailable, using empty data", Some(e.to_string()));
                report.record_source(kind.name(), &path, SourceStatus::Empty);
                if kind != SourceKind::News {
                    collections.push((kind, SourceCollection::default()));
                }
            }
        }

        if let Some(layer) = kind.layer() {
            let state = barrier.arrive(layer);
            debug!(layer = layer, state = ?state, "Arrivée signalée");
        }
    }

    let take = |collections: &mut Vec<(SourceKind, SourceCollection)>, kind: SourceKind| {
        collections
            .iter()
            .position(|(k, _)| *k == kind)
            .map(|idx| collections.swap_remove(idx).1)
            .unwrap_or_default()
    };

    let mut flood = take(&mut collections, SourceKind::Flood);
    let mut waterlogging = take(&mut collections, SourceKind::Waterlogging);
    let mut province = take(&mut collections, SourceKind::Province);
    let city = take(&mut collections, SourceKind::City);

    if required_failed {
        let placeholder = Placeholder::generate(config.placeholder_seed);
        flood = placeholder.flood;
        waterlogging = placeholder.waterlogging;
        province = placeholder.province;
        news = placeholder.news;
        for kind in [SourceKind::Flood, SourceKind::Waterlogging, SourceKind::Province, SourceKind::News] {
            report.record_source(kind.name(), &kind.file(config), SourceStatus::Placeholder);
        }
        report.record_counts(SourceKind::News.name(), news.len(), 0);
    }

    report.set_duration(start.elapsed());

    Dataset {
        flood,
        waterlogging,
        province,
        city,
        news,
        barrier,
        report,
    }
}

/// Tableau de bord prêt à l'emploi
#[derive(Debug)]
pub struct Dashboard {
    pub session: Session,
    pub news: Vec<NewsItem>,
    pub report: LoadReport,
}

impl Dashboard {
    /// Indexe les sources et initialise les filtres liés
    pub fn build(config: &Config, dataset: Dataset) -> Result<Self> {
        let Dataset {
            flood,
            waterlogging,
            province,
            city,
            news,
            barrier,
            mut report,
        } = dataset;

        let mut store = FeatureStore::new();
        let layers = [
            (SourceKind::Province, z_index::PROVINCE, province),
            (SourceKind::City, z_index::CITY, city),
            (SourceKind::Flood, z_index::POINTS, flood),
            (SourceKind::Waterlogging, z_index::POINTS, waterlogging),
        ];
        for (kind, z, collection) in layers {
            let Some(layer) = kind.layer() else {
                continue;
            };
            let ingest = store.ingest(layer, z, collection);
            report.record_counts(kind.name(), ingest.accepted, ingest.errors.len());
            for error in ingest.errors.iter().take(5) {
                report.record_warning(kind.name(), "Feature skipped", Some(error.to_string()));
            }
        }

        let mut session = Session::new(store, config.viewport.to_viewport(), config.map.clone());
        let groups: Vec<&str> = config.filters.groups.iter().map(String::as_str).collect();
        session
            .init_filters(&barrier, config.filters.linked.clone(), &groups, config.filters.domain)
            .context("Failed to initialize linked filters")?;

        report.finalize();
        info!(
            features = session.store().len(),
            news = news.len(),
            report = %report.summary(),
            "Tableau de bord prêt"
        );

        Ok(Self {
            session,
            news,
            report,
        })
    }
}

/// Charge les sources puis construit le tableau de bord
pub async fn load_dashboard(config: &Config) -> Result<Dashboard> {
    let dataset = load_sources(config).await;
    Dashboard::build(config, dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn config(dir: &Path) -> Config {
        Config {
            data_dir: dir.to_path_buf(),
            placeholder_seed: Some(1),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_read_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source(&dir.path().join("missing.json")).await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_optional_sources_default_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "banjir.json",
            r#"{"features": [{"properties": {"Nama_Pemetaan": "Rumbai", "Jumlah_Korban": "4"}, "geometry": {"type": "Point", "coordinates": [101.45, 0.6]}}]}"#,
        );
        write(dir.path(), "csvjson.json", r#"{"features": []}"#);
        write(dir.path(), "news.json", "not json");

        let dataset = load_sources(&config(dir.path())).await;
        assert_eq!(dataset.flood.len(), 1);
        assert!(dataset.province.is_empty());
        assert!(dataset.news.is_empty());
        assert!(dataset.barrier.is_ready());
        assert_eq!(dataset.report.source("province").unwrap().status, SourceStatus::Empty);
        assert_eq!(dataset.report.source("news").unwrap().status, SourceStatus::Empty);
        assert_eq!(dataset.report.source("flood").unwrap().status, SourceStatus::Loaded);
    }

    #[tokio::test]
    async fn test_required_failure_uses_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "banjir.json", r#"{"features": []}"#);

        let dataset = load_sources(&config(dir.path())).await;
        assert_eq!(dataset.flood.len(), 10);
        assert_eq!(dataset.waterlogging.len(), 5);
        assert_eq!(dataset.province.len(), 4);
        assert_eq!(dataset.news.len(), 2);
        assert_eq!(dataset.report.source("flood").unwrap().status, SourceStatus::Placeholder);
        assert!(!dataset.report.warnings.is_empty());
    }
}
