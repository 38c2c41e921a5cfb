//! Export vers GeoJSON avec geozero (streaming)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;

use floodmap::Feature;

/// Clés ajoutées aux propriétés de chaque feature exportée
const LAYER_KEY: &str = "_layer";
const CATEGORY_KEY: &str = "_category";

/// Exporte des features en FeatureCollection GeoJSON (WGS84)
pub fn export_to_geojson(features: &[&Feature], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    write_collection(&mut writer, features)?;
    writer.flush()?;
    Ok(())
}

fn write_collection<W: Write>(writer: &mut W, features: &[&Feature]) -> Result<()> {
    write!(
        writer,
        r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"urn:ogc:def:crs:EPSG::4326"}}}},"features":["#
    )?;

    for (i, feature) in features.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write_feature(writer, feature)?;
    }

    write!(writer, "]}}")?;
    Ok(())
}

/// Écrit une feature en GeoJSON
fn write_feature<W: Write>(writer: &mut W, feature: &Feature) -> Result<()> {
    write!(writer, r#"{{"type":"Feature","id":{},"#, feature.id)?;

    write!(writer, r#""geometry":"#)?;
    match &feature.geometry {
        Some(geometry) => {
            let mut geom_buf = Vec::new();
            let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
            geometry.process_geom(&mut geom_writer)?;
            writer.write_all(&geom_buf)?;
        }
        None => write!(writer, "null")?,
    }

    write!(
        writer,
        r#","properties":{{"{}":"{}","{}":"{}""#,
        LAYER_KEY,
        escape_json(&feature.layer),
        CATEGORY_KEY,
        feature.category.label()
    )?;
    // Les clés réservées d'une source sont écrasées par les nôtres
    for (key, value) in feature
        .properties
        .iter()
        .filter(|(key, _)| key.as_str() != LAYER_KEY && key.as_str() != CATEGORY_KEY)
    {
        write!(writer, r#","{}":{}"#, escape_json(key), value)?;
    }
    write!(writer, "}}}}")?;

    Ok(())
}

/// Échappe une chaîne pour JSON
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use floodmap::store::{z_index, SourceCollection};
    use floodmap::FeatureStore;
    use serde_json::{json, Value};

    fn store() -> FeatureStore {
        let mut store = FeatureStore::new();
        let collection: SourceCollection = serde_json::from_value(json!({"features": [
            {"properties": {"Nama_Pemetaan": "Rumbai \"Hilir\"", "Jumlah_Korban": 3}, "geometry": {"type": "Point", "coordinates": [101.45, 0.6]}},
            {"properties": {"STATUS_KOT": "Aman"}}
        ]}))
        .unwrap();
        store.ingest("banjir", z_index::POINTS, collection);
        store
    }

    #[test]
    fn test_write_collection_is_valid_json() {
        let store = store();
        let features: Vec<&Feature> = store.features().iter().collect();

        let mut buffer = Vec::new();
        write_collection(&mut buffer, &features).unwrap();

        let parsed: Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed["type"], "FeatureCollection");
        let items = parsed["features"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["properties"]["Nama_Pemetaan"], "Rumbai \"Hilir\"");
        assert_eq!(items[0]["properties"]["Jumlah_Korban"], 3);
        assert_eq!(items[0]["properties"]["_category"], "Banjir");
        assert_eq!(items[0]["geometry"]["type"], "Point");
        assert!(items[1]["geometry"].is_null());
    }

    #[test]
    fn test_reserved_keys_written_once() {
        let mut store = FeatureStore::new();
        let collection: SourceCollection = serde_json::from_value(json!({"features": [
            {"properties": {"_layer": "lama", "_category": "x", "STATUS_KOT": "Aman"}}
        ]}))
        .unwrap();
        store.ingest("riau", z_index::PROVINCE, collection);
        let features: Vec<&Feature> = store.features().iter().collect();

        let mut buffer = Vec::new();
        write_collection(&mut buffer, &features).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.matches(r#""_layer""#).count(), 1);
        assert_eq!(text.matches(r#""_category""#).count(), 1);

        let parsed: Value = serde_json::from_str(&text).unwrap();
        let props = &parsed["features"][0]["properties"];
        assert_eq!(props["_layer"], "riau");
        assert_eq!(props["_category"], "Wilayah");
        assert_eq!(props["STATUS_KOT"], "Aman");
    }

    #[test]
    fn test_escape_json() {
        assert_eq!(escape_json("hello"), "hello");
        assert_eq!(escape_json("hello\"world"), "hello\\\"world");
        assert_eq!(escape_json("line\nbreak"), "line\\nbreak");
    }

    #[test]
    fn test_export_to_geojson() {
        let store = store();
        let features: Vec<&Feature> = store.features().iter().collect();

        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("flood.geojson");
        export_to_geojson(&features, &output_path).unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(content.contains(r#""type":"FeatureCollection""#));
        assert!(content.contains("EPSG::4326"));
        assert!(content.contains(r#""id":0"#));
    }
}
