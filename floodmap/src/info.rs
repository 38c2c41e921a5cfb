//! Contenu des popups et libellés de survol

use geo::Coord;
use serde::Serialize;

use crate::types::{keys, Category, Feature, GeometryKind};

/// Libellé affiché quand aucune propriété connue n'est renseignée
pub const DEFAULT_HOVER_LABEL: &str = "Fitur Terdeteksi";

/// Libellé affiché quand rien n'est sous le curseur
pub const EMPTY_HOVER_LABEL: &str = "Arahkan kursor ke area...";

/// Nom de la couche des polygones de la ville
pub const CITY_LAYER: &str = "pekanbaru";

/// Variante de popup selon la nature de la feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PopupKind {
    Flood,
    Waterlogging,
    City,
    Province,
}

/// Contenu d'une popup: titre et champs libellés
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureInfo {
    pub kind: PopupKind,
    pub title: String,
    pub fields: Vec<(String, String)>,
}

impl FeatureInfo {
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }
}

/// Libellé de survol: première propriété renseignée de la chaîne habituelle
pub fn hover_label(feature: Option<&Feature>) -> String {
    match feature {
        None => EMPTY_HOVER_LABEL.to_string(),
        Some(f) => f
            .first_text(&[
                keys::KABUPATEN_UPPER,
                keys::NAMA_PEMETAAN,
                keys::KECAMATAN,
                keys::KABUPATEN,
                keys::KECAMATAN_UPPER,
            ])
            .unwrap_or_else(|| DEFAULT_HOVER_LABEL.to_string()),
    }
}

/// Vrai pour un polygone de la ville (couche dédiée ou attributs de la ville)
fn is_city_feature(feature: &Feature) -> bool {
    feature.layer == CITY_LAYER
        || (feature.text(keys::NAMOBJ).is_some()
            && feature.text(keys::WADMKC).as_deref() == Some("PEKANBARU"))
}

/// Construit le contenu de popup d'une feature
pub fn describe(feature: &Feature) -> FeatureInfo {
    let or_dash = |key: &str| feature.text(key).unwrap_or_else(|| "-".to_string());

    match feature.category {
        Category::Flood => FeatureInfo {
            kind: PopupKind::Flood,
            title: "Lokasi Banjir".to_string(),
            fields: vec![
                ("Area".to_string(), or_dash(keys::NAMA_PEMETAAN)),
                ("Korban".to_string(), format!("{} Jiwa", or_dash(keys::JUMLAH_KORBAN))),
            ],
        },
        Category::Waterlogging => FeatureInfo {
            kind: PopupKind::Waterlogging,
            title: "Titik Genangan".to_string(),
            fields: vec![
                ("Kec.".to_string(), or_dash(keys::KECAMATAN)),
                ("Jl.".to_string(), or_dash(keys::JALAN)),
                ("long".to_string(), or_dash(keys::LONG)),
                ("lat".to_string(), or_dash(keys::LAT)),
            ],
        },
        Category::Administrative if is_city_feature(feature) => {
            let mut fields = vec![("Nama".to_string(), or_dash(keys::NAMOBJ))];
            if let Some(kec) = feature.text(keys::WADMKC) {
                fields.push(("Kecamatan".to_string(), kec));
            }
            if let Some(kab) = feature.text(keys::WADMKD) {
                fields.push(("Kabupaten".to_string(), kab));
            }
            FeatureInfo {
                kind: PopupKind::City,
                title: "Wilayah Pekanbaru".to_string(),
                fields,
            }
        }
        Category::Administrative => FeatureInfo {
            kind: PopupKind::Province,
            title: "Info Wilayah Riau".to_string(),
            fields: vec![(
                "Nama".to_string(),
                feature
                    .first_text(&[keys::KECAMATAN_UPPER, keys::DESA])
                    .unwrap_or_else(|| "Area Riau".to_string()),
            )],
        },
    }
}

/// Position d'ancrage d'une popup (lon, lat).
///
/// Un point ancre la popup sur lui-même, un polygone sur la position du clic.
pub fn popup_anchor(feature: &Feature, clicked: Coord) -> Coord {
    match (feature.kind(), feature.point_coord()) {
        (Some(GeometryKind::Point), Some(coord)) => coord,
        _ => clicked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{z_index, FeatureStore, SourceCollection};
    use serde_json::json;

    fn store() -> FeatureStore {
        let mut store = FeatureStore::new();
        let points: SourceCollection = serde_json::from_value(json!({"features": [
            {"properties": {"Nama_Pemetaan": "Rumbai", "Jumlah_Korban": 9}, "geometry": {"type": "Point", "coordinates": [101.45, 0.6]}},
            {"properties": {"kecamatan": "Sukajadi", "jalan": "Sudirman", "long": "101.44"}, "geometry": {"type": "Point", "coordinates": [101.44, 0.5]}}
        ]}))
        .unwrap();
        let city: SourceCollection = serde_json::from_value(json!({"features": [
            {"properties": {"NAMOBJ": "Kampung Melayu", "WADMKC": "Sukajadi"}}
        ]}))
        .unwrap();
        let province: SourceCollection = serde_json::from_value(json!({"features": [
            {"properties": {"DESA": "Teluk Kenidai"}},
            {"properties": {"NAMOBJ": "Labuh Baru", "WADMKC": "PEKANBARU", "WADMKD": "Kota Pekanbaru"}},
            {"properties": {}}
        ]}))
        .unwrap();
        store.ingest("banjir", z_index::POINTS, points);
        store.ingest(CITY_LAYER, z_index::CITY, city);
        store.ingest("riau", z_index::PROVINCE, province);
        store
    }

    #[test]
    fn test_describe_variants() {
        let store = store();

        let flood = describe(store.get(0).unwrap());
        assert_eq!(flood.kind, PopupKind::Flood);
        assert_eq!(flood.field("Korban"), Some("9 Jiwa"));

        let pool = describe(store.get(1).unwrap());
        assert_eq!(pool.kind, PopupKind::Waterlogging);
        assert_eq!(pool.field("Jl."), Some("Sudirman"));
        assert_eq!(pool.field("lat"), Some("-"));

        let city = describe(store.get(2).unwrap());
        assert_eq!(city.kind, PopupKind::City);
        assert_eq!(city.field("Kecamatan"), Some("Sukajadi"));
        assert_eq!(city.field("Kabupaten"), None);

        assert_eq!(describe(store.get(3).unwrap()).field("Nama"), Some("Teluk Kenidai"));
        // Attributs de la ville dans la couche province
        let labuh = describe(store.get(4).unwrap());
        assert_eq!(labuh.kind, PopupKind::City);
        assert_eq!(labuh.field("Kabupaten"), Some("Kota Pekanbaru"));
        assert_eq!(describe(store.get(5).unwrap()).field("Nama"), Some("Area Riau"));
    }

    #[test]
    fn test_hover_label_chain() {
        let store = store();
        assert_eq!(hover_label(store.get(0)), "Rumbai");
        assert_eq!(hover_label(store.get(1)), "Sukajadi");
        assert_eq!(hover_label(store.get(5)), DEFAULT_HOVER_LABEL);
        assert_eq!(hover_label(None), EMPTY_HOVER_LABEL);
    }

    #[test]
    fn test_popup_anchor() {
        let store = store();
        let clicked = Coord { x: 101.0, y: 0.1 };
        assert_eq!(popup_anchor(store.get(0).unwrap(), clicked), Coord { x: 101.45, y: 0.6 });
        assert_eq!(popup_anchor(store.get(2).unwrap(), clicked), clicked);
    }
}
