//! Tests d'intégration du chargement complet
//!
//! Chaque test prépare un répertoire de données temporaire puis charge le
//! tableau de bord comme le fait la CLI.

use std::path::Path;

use anyhow::Result;
use floodguard::export::{export, ExportFormat};
use floodguard::report::SourceStatus;
use floodguard::{load_dashboard, Config, LoadStatus};
use floodmap::metrics::count_by_category;
use floodmap::{layers, Properties};
use serde_json::{json, Value};

fn write(dir: &Path, name: &str, value: &Value) {
    std::fs::write(dir.join(name), serde_json::to_vec(value).unwrap()).unwrap();
}

fn config(dir: &Path) -> Config {
    Config {
        data_dir: dir.to_path_buf(),
        placeholder_seed: Some(2024),
        ..Config::from_preset("map").unwrap()
    }
}

/// Jeu complet: 10 points de crue à Tampan, 5 points de stagnation à Sukajadi
fn write_full_dataset(dir: &Path) {
    let flood: Vec<Value> = (0..10)
        .map(|i| {
            json!({
                "type": "Feature",
                "properties": {"Nama_Pemetaan": format!("Lokasi {}", i), "kecamatan": "Tampan", "Jumlah_Korban": i * 2},
                "geometry": {"type": "Point", "coordinates": [101.40 + i as f64 * 0.001, 0.46]}
            })
        })
        .collect();
    let pools: Vec<Value> = (0..5)
        .map(|i| {
            json!({
                "type": "Feature",
                "properties": {"kecamatan": "Sukajadi", "jalan": format!("Jl. {}", i), "long": "101.44", "lat": "0.51"},
                "geometry": {"type": "Point", "coordinates": [101.44, 0.51 + i as f64 * 0.001]}
            })
        })
        .collect();

    write(dir, "banjir.json", &json!({"type": "FeatureCollection", "features": flood}));
    write(dir, "csvjson.json", &json!({"type": "FeatureCollection", "features": pools}));
    write(
        dir,
        "polygon_riau.json",
        &json!({"features": [
            {"properties": {"KECAMATAN": "Tampan", "STATUS_KOT": "Rawan Tinggi"},
             "geometry": {"type": "Polygon", "coordinates": [[[101.3, 0.3], [101.6, 0.3], [101.6, 0.7], [101.3, 0.7], [101.3, 0.3]]]}},
            {"properties": {"KECAMATAN": "Siak"},
             "geometry": {"type": "LineString", "coordinates": [[101.0, 0.0], [102.0, 1.0]]}}
        ]}),
    );
    write(
        dir,
        "pekan.json",
        &json!({"features": [
            {"properties": {"NAMOBJ": "Simpang Baru", "WADMKC": "Tampan"},
             "geometry": {"type": "Polygon", "coordinates": [[[101.39, 0.45], [101.42, 0.45], [101.42, 0.47], [101.39, 0.47], [101.39, 0.45]]]}},
            {"properties": {"NAMOBJ": "Harjosari", "WADMKC": "Sukajadi"},
             "geometry": {"type": "Polygon", "coordinates": [[[101.43, 0.50], [101.45, 0.50], [101.45, 0.52], [101.43, 0.52], [101.43, 0.50]]]}}
        ]}),
    );
    write(
        dir,
        "news.json",
        &json!([
            {"title": "Banjir Surut", "description": "Air mulai surut.", "url": "#", "publishedAt": "2024-11-02"},
            {"title": "Waspada Hujan", "description": "BMKG.", "url": "#", "publishedAt": "2024-11-04"}
        ]),
    );
}

#[tokio::test]
async fn test_full_dataset() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_full_dataset(dir.path());

    let dashboard = load_dashboard(&config(dir.path())).await?;
    let metrics = dashboard.session.metrics();
    assert_eq!(metrics.total_flood_points, 10);
    assert_eq!(metrics.total_waterlogging_points, 5);
    assert_eq!(metrics.total_victims, (0..10).map(|i| i * 2).sum::<i64>());
    assert_eq!(metrics.affected_districts, 2);

    // La LineString est ignorée et signalée
    let province = dashboard.report.source("province").unwrap();
    assert_eq!(province.features, 1);
    assert_eq!(province.skipped, 1);
    assert_eq!(dashboard.report.status, LoadStatus::Degraded);

    assert_eq!(dashboard.news.len(), 2);
    let filters = dashboard.session.filters().unwrap();
    let keys: Vec<&str> = filters.options().iter().map(|o| o.key.as_str()).collect();
    assert_eq!(keys, vec!["sukajadi", "tampan"]);
    Ok(())
}

#[tokio::test]
async fn test_missing_polygon_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_full_dataset(dir.path());
    std::fs::remove_file(dir.path().join("polygon_riau.json"))?;

    let dashboard = load_dashboard(&config(dir.path())).await?;
    assert_eq!(dashboard.report.source("province").unwrap().status, SourceStatus::Empty);

    let riau: Vec<&Properties> = dashboard
        .session
        .store()
        .layer_features(layers::PROVINCE)
        .map(|f| &f.properties)
        .collect();
    assert!(riau.is_empty());
    assert!(count_by_category(riau, "STATUS_KOT").is_empty());
    // Les polygones de la ville ne remplissent pas le graphique de classification
    assert!(dashboard.session.charts().classification.is_empty());

    // Les autres composants restent disponibles
    assert_eq!(dashboard.session.metrics().total_flood_points, 10);
    assert!(dashboard.session.filters().is_some());
    Ok(())
}

#[tokio::test]
async fn test_empty_directory_uses_placeholder() -> Result<()> {
    let dir = tempfile::tempdir()?;

    let dashboard = load_dashboard(&config(dir.path())).await?;
    assert_eq!(dashboard.report.status, LoadStatus::Placeholder);

    let metrics = dashboard.session.metrics();
    assert_eq!(metrics.total_flood_points, 10);
    assert_eq!(metrics.total_waterlogging_points, 5);
    // Tampan, Marpoyan Damai, Sukajadi
    assert_eq!(metrics.affected_districts, 3);
    assert!((100..=590).contains(&metrics.total_victims));

    let charts = dashboard.session.charts();
    assert_eq!(charts.classification.get("Rawan Tinggi"), Some(2));
    assert_eq!(dashboard.news.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_filter_then_export() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_full_dataset(dir.path());

    let mut dashboard = load_dashboard(&config(dir.path())).await?;
    dashboard.session.toggle_filter("Sukajadi", true, "sidebar")?;
    assert!(dashboard.session.filters().unwrap().group("legend").unwrap().is_checked("sukajadi"));

    let out = tempfile::tempdir()?;
    let geojson_path = out.path().join("filtered.geojson");
    let written = export(&dashboard.session, ExportFormat::Geojson, &geojson_path)?;
    // 10 crues (non liées) + 5 stagnations + 1 polygone de la ville + 1 polygone de la province
    assert_eq!(written, 17);

    let parsed: Value = serde_json::from_str(&std::fs::read_to_string(&geojson_path)?)?;
    assert_eq!(parsed["features"].as_array().unwrap().len(), 17);

    let csv_path = out.path().join("table.csv");
    let rows = export(&dashboard.session, ExportFormat::Csv, &csv_path)?;
    assert_eq!(rows, 15);
    assert_eq!(std::fs::read_to_string(&csv_path)?.lines().count(), 16);

    let json_path = out.path().join("points.json");
    assert_eq!(export(&dashboard.session, ExportFormat::Json, &json_path)?, 15);
    Ok(())
}
