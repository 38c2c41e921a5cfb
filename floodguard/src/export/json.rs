//! Export JSON des points affichés

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use floodmap::Feature;

/// Convertit une feature en feature GeoJSON (géométrie en WGS84)
pub fn to_geojson_feature(feature: &Feature) -> ::geojson::Feature {
    ::geojson::Feature {
        bbox: None,
        geometry: feature
            .geometry
            .as_ref()
            .map(|g| ::geojson::Geometry::new(::geojson::Value::from(g))),
        id: None,
        properties: Some(feature.properties.clone()),
        foreign_members: None,
    }
}

/// Écrit un tableau JSON de features
pub fn export_to_json(features: &[&Feature], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    let items: Vec<::geojson::Feature> = features.iter().map(|f| to_geojson_feature(f)).collect();
    serde_json::to_writer_pretty(&mut writer, &items).context("Failed to serialize features")?;
    writer.flush()?;

    Ok(())
}
