//! Export CSV des lignes du tableau

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use floodmap::Row;
use polars::frame::DataFrame;
use polars::io::SerWriter;
use polars::prelude::{CsvWriter, NamedFrom};
use polars::series::Series;

/// Écrit les lignes dans l'ordre donné (recherche et tri déjà appliqués)
pub fn export_to_csv(rows: &[&Row], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create file: {}", output_path.display()))?;
    write_rows(file, rows).with_context(|| format!("Failed to write CSV to {}", output_path.display()))
}

/// Colonnes type, location, district, victims
fn rows_frame(rows: &[&Row]) -> Result<DataFrame> {
    let kinds: Vec<&str> = rows.iter().map(|r| r.kind.as_str()).collect();
    let locations: Vec<&str> = rows.iter().map(|r| r.location.as_str()).collect();
    let districts: Vec<&str> = rows.iter().map(|r| r.district.as_str()).collect();
    let victims: Vec<i64> = rows.iter().map(|r| r.victims).collect();

    let df = DataFrame::new(vec![
        Series::new("type".into(), kinds).into(),
        Series::new("location".into(), locations).into(),
        Series::new("district".into(), districts).into(),
        Series::new("victims".into(), victims).into(),
    ])?;
    Ok(df)
}

fn write_rows<W: Write>(writer: W, rows: &[&Row]) -> Result<()> {
    let mut df = rows_frame(rows)?;
    CsvWriter::new(writer).finish(&mut df)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use floodmap::store::{z_index, SourceCollection};
    use floodmap::{FeatureStore, TableView};
    use serde_json::json;

    fn table() -> TableView {
        let mut store = FeatureStore::new();
        let collection: SourceCollection = serde_json::from_value(json!({"features": [
            {"properties": {"Nama_Pemetaan": "Rumbai, Pesisir", "kecamatan": "Rumbai", "Jumlah_Korban": "7"}, "geometry": {"type": "Point", "coordinates": [101.45, 0.6]}},
            {"properties": {"jalan": "Jl. \"Sudirman\"", "kecamatan": "Sukajadi"}, "geometry": {"type": "Point", "coordinates": [101.44, 0.5]}}
        ]}))
        .unwrap();
        store.ingest("banjir", z_index::POINTS, collection);
        TableView::new(&store, [0, 1], 10)
    }

    #[test]
    fn test_write_rows_quotes_fields() {
        let table = table();
        let rows: Vec<&Row> = table.rows().collect();

        let mut buffer = Vec::new();
        write_rows(&mut buffer, &rows).unwrap();
        let csv = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "type,location,district,victims");
        assert_eq!(lines[1], "Banjir,\"Rumbai, Pesisir\",Rumbai,7");
        assert_eq!(lines[2], "Genangan,\"Jl. \"\"Sudirman\"\"\",Sukajadi,0");
    }

    #[test]
    fn test_empty_table_writes_header() {
        let mut buffer = Vec::new();
        write_rows(&mut buffer, &[]).unwrap();
        let csv = String::from_utf8(buffer).unwrap();
        assert_eq!(csv.lines().next(), Some("type,location,district,victims"));
        assert_eq!(csv.lines().count(), 1);
    }
}
