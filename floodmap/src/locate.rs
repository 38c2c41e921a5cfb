//! Recherche d'un lieu par mot-clé et cadrage de la carte

use geo::{BoundingRect, Coord, Geometry, Rect};
use serde::Serialize;

use crate::store::FeatureStore;
use crate::types::{keys, FeatureId};
use crate::viewport::{Viewport, FOCUS_ZOOM};

/// Marge (pixels) autour d'une étendue cadrée
pub const FIT_PADDING: f64 = 100.0;

/// Cadrage à appliquer pour montrer un résultat
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Focus {
    /// Centrer sur un point (Web Mercator) au zoom donné
    Center { center: Coord, zoom: f64 },
    /// Englober une étendue (Web Mercator)
    Extent { extent: Rect, max_zoom: f64 },
}

impl Focus {
    /// Vue résultante à partir de la vue courante
    pub fn apply(&self, viewport: &Viewport) -> Viewport {
        match *self {
            Focus::Center { center, zoom } => viewport.centered_on(center, zoom),
            Focus::Extent { extent, max_zoom } => viewport.fit(extent, FIT_PADDING, max_zoom),
        }
    }
}

/// Résultat d'une recherche de lieu
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Located {
    pub feature: FeatureId,
    pub focus: Focus,
}

/// Texte de recherche d'une feature
const SEARCH_KEYS: [&str; 5] = [
    keys::KECAMATAN,
    keys::JALAN,
    keys::NAMA_PEMETAAN,
    keys::KABUPATEN,
    keys::NAMOBJ,
];

/// Cherche la première feature dont le libellé contient `keyword`.
///
/// Les couches sont interrogées dans l'ordre `layer_order`, puis les features
/// dans leur ordre d'insertion. Les features sans géométrie sont ignorées.
pub fn locate(store: &FeatureStore, keyword: &str, layer_order: &[&str]) -> Option<Located> {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return None;
    }

    for layer in layer_order {
        for feature in store.layer_features(layer) {
            let Some(geometry) = feature.projected.as_ref() else {
                continue;
            };
            let text = feature.first_text(&SEARCH_KEYS).unwrap_or_default().to_lowercase();
            if !text.contains(&keyword) {
                continue;
            }

            let focus = match geometry {
                Geometry::Point(p) => Focus::Center {
                    center: p.0,
                    zoom: FOCUS_ZOOM,
                },
                other => match other.bounding_rect() {
                    Some(extent) => Focus::Extent {
                        extent,
                        max_zoom: FOCUS_ZOOM,
                    },
                    None => continue,
                },
            };

            return Some(Located {
                feature: feature.id,
                focus,
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{z_index, SourceCollection};
    use serde_json::json;

    fn store() -> FeatureStore {
        let mut store = FeatureStore::new();
        let flood: SourceCollection = serde_json::from_value(json!({"features": [
            {"properties": {"Nama_Pemetaan": "Sukajadi Hilir"}, "geometry": {"type": "Point", "coordinates": [101.45, 0.52]}}
        ]}))
        .unwrap();
        let pools: SourceCollection = serde_json::from_value(json!({"features": [
            {"properties": {"kecamatan": "Sukajadi", "jalan": "Jl. Ahmad Yani"}, "geometry": {"type": "Point", "coordinates": [101.44, 0.51]}}
        ]}))
        .unwrap();
        let city: SourceCollection = serde_json::from_value(json!({"features": [
            {"properties": {"NAMOBJ": "Rintis"},
             "geometry": {"type": "Polygon", "coordinates": [[[101.44, 0.52], [101.46, 0.52], [101.46, 0.54], [101.44, 0.52]]]}}
        ]}))
        .unwrap();
        store.ingest("banjir", z_index::POINTS, flood);
        store.ingest("genangan", z_index::POINTS, pools);
        store.ingest("pekanbaru", z_index::CITY, city);
        store
    }

    const ORDER: [&str; 4] = ["genangan", "banjir", "pekanbaru", "riau"];

    #[test]
    fn test_layer_order_wins() {
        let store = store();
        let found = locate(&store, "SUKAJADI", &ORDER).unwrap();
        assert_eq!(found.feature, 1);
        assert!(matches!(found.focus, Focus::Center { zoom, .. } if zoom == FOCUS_ZOOM));
    }

    #[test]
    fn test_polygon_fits_extent() {
        let store = store();
        let found = locate(&store, "rintis", &ORDER).unwrap();
        assert_eq!(found.feature, 2);
        let Focus::Extent { extent, .. } = found.focus else {
            panic!("expected extent focus");
        };
        let vp = found.focus.apply(&Viewport::default());
        assert!(vp.zoom <= FOCUS_ZOOM);
        assert!((vp.center.x - extent.center().x).abs() < 1e-6);
    }

    #[test]
    fn test_not_found() {
        let store = store();
        assert!(locate(&store, "Marpoyan", &ORDER).is_none());
        assert!(locate(&store, "   ", &ORDER).is_none());
    }
}
