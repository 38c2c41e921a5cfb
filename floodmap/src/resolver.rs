//! Résolution de la feature sous le curseur
//!
//! Un point l'emporte toujours sur un polygone au même pixel: les marqueurs
//! sont petits et dessinés par-dessus les zones administratives.

use geo::{Contains, Coord, EuclideanDistance, Geometry, Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::store::FeatureStore;
use crate::types::{FeatureId, GeometryKind};
use crate::viewport::Viewport;

/// Tolérance au survol, en pixels
pub const HOVER_TOLERANCE: f64 = 5.0;

/// Tolérance au clic, en pixels
pub const CLICK_TOLERANCE: f64 = 10.0;

/// Départage entre plusieurs points dans la tolérance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// Le point le plus proche du curseur, puis l'ordre de parcours
    #[default]
    Nearest,
    /// Le premier point rencontré dans l'ordre de parcours
    FirstHit,
}

/// Features candidates d'une couche, dans l'ordre d'insertion
#[derive(Debug, Clone, Copy)]
pub struct Candidates<'a> {
    pub layer: &'a str,
    pub features: &'a [FeatureId],
}

/// Feature retenue sous le curseur
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hit {
    pub feature: FeatureId,
    pub kind: GeometryKind,
    /// Distance au curseur en pixels (0 à l'intérieur d'un polygone)
    pub distance_px: f64,
}

/// Résolveur de features pour une vue donnée
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    store: &'a FeatureStore,
    viewport: &'a Viewport,
    tie_break: TieBreak,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a FeatureStore, viewport: &'a Viewport, tie_break: TieBreak) -> Self {
        Self {
            store,
            viewport,
            tie_break,
        }
    }

    /// Détermine LA feature ciblée au pixel `screen`.
    ///
    /// Les couches sont parcourues dans l'ordre donné (de la plus haute à la
    /// plus basse priorité), puis les features dans leur ordre d'insertion.
    /// Un point dans la tolérance est toujours préféré; à défaut, le premier
    /// polygone rencontré.
    pub fn resolve(&self, screen: Coord, layers: &[Candidates<'_>], tolerance: f64) -> Option<Hit> {
        let resolution = self.viewport.resolution();
        let target = Point::from(self.viewport.to_map(screen));
        let max_distance = self.viewport.pixels_to_map(tolerance.max(0.0));

        let mut point_hit: Option<Hit> = None;
        let mut polygon_hit: Option<Hit> = None;

        for candidates in layers {
            for &id in candidates.features {
                let Some(feature) = self.store.get(id) else {
                    continue;
                };
                let (Some(geometry), Some(kind)) = (feature.projected.as_ref(), feature.kind()) else {
                    continue;
                };
                let Some(distance) = distance_to(geometry, target) else {
                    continue;
                };
                if distance > max_distance {
                    continue;
                }

                let hit = Hit {
                    feature: id,
                    kind,
                    distance_px: distance / resolution,
                };

                if kind == GeometryKind::Point {
                    match self.tie_break {
                        TieBreak::FirstHit => return Some(hit),
                        TieBreak::Nearest => {
                            if distance == 0.0 {
                                return Some(hit);
                            }
                            if point_hit.map_or(true, |best| hit.distance_px < best.distance_px) {
                                point_hit = Some(hit);
                            }
                        }
                    }
                } else if polygon_hit.is_none() {
                    polygon_hit = Some(hit);
                }
            }
        }

        point_hit.or(polygon_hit)
    }
}

/// Distance (unités carte) entre une géométrie et un point, `None` si non supportée
fn distance_to(geometry: &Geometry, target: Point) -> Option<f64> {
    match geometry {
        Geometry::Point(p) => Some(p.euclidean_distance(&target)),
        Geometry::Polygon(poly) => Some(polygon_distance(poly, target)),
        Geometry::MultiPolygon(mp) => mp
            .0
            .iter()
            .map(|poly| polygon_distance(poly, target))
            .min_by(f64::total_cmp),
        _ => None,
    }
}

fn polygon_distance(polygon: &Polygon, target: Point) -> f64 {
    if polygon.contains(&target) {
        return 0.0;
    }

    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| target.euclidean_distance(ring))
        .fold(f64::INFINITY, f64::min)
}

/// Changement de surbrillance produit par [`Highlighter::highlight`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HighlightChange {
    pub evicted: Option<FeatureId>,
    pub inserted: Option<FeatureId>,
}

/// Emplacement unique de surbrillance (au plus une feature à la fois)
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    current: Option<FeatureId>,
    overlay: Vec<FeatureId>,
}

impl Highlighter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Met en surbrillance le résultat d'une résolution.
    ///
    /// Retourne `None` si la feature est déjà en surbrillance.
    pub fn highlight(&mut self, result: Option<FeatureId>) -> Option<HighlightChange> {
        if result == self.current {
            return None;
        }

        let evicted = self.current.take();
        if let Some(previous) = evicted {
            self.overlay.retain(|&id| id != previous);
        }
        if let Some(id) = result {
            self.overlay.push(id);
        }
        self.current = result;

        Some(HighlightChange {
            evicted,
            inserted: result,
        })
    }

    /// Vide la surbrillance
    pub fn clear(&mut self) -> Option<FeatureId> {
        self.overlay.clear();
        self.current.take()
    }

    pub fn current(&self) -> Option<FeatureId> {
        self.current
    }

    /// Contenu de la couche de surbrillance
    pub fn overlay(&self) -> &[FeatureId] {
        &self.overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{z_index, SourceCollection};
    use serde_json::json;

    /// Vue centrée sur (101.45, 0.5) au zoom 12
    fn viewport() -> Viewport {
        Viewport::from_lonlat(101.45, 0.5, 12.0, 800.0, 600.0)
    }

    fn store() -> FeatureStore {
        let mut store = FeatureStore::new();
        let polygons: SourceCollection = serde_json::from_value(json!({"features": [
            {"properties": {"NAMOBJ": "Sukajadi", "WADMKC": "PEKANBARU"},
             "geometry": {"type": "Polygon", "coordinates": [[[101.40, 0.45], [101.50, 0.45], [101.50, 0.55], [101.40, 0.55], [101.40, 0.45]]]}}
        ]}))
        .unwrap();
        let points: SourceCollection = serde_json::from_value(json!({"features": [
            {"properties": {"Nama_Pemetaan": "Far"}, "geometry": {"type": "Point", "coordinates": [101.4515, 0.5]}},
            {"properties": {"Nama_Pemetaan": "Center"}, "geometry": {"type": "Point", "coordinates": [101.45, 0.5]}}
        ]}))
        .unwrap();
        store.ingest("pekanbaru", z_index::CITY, polygons);
        store.ingest("banjir", z_index::POINTS, points);
        store
    }

    fn all<'a>(store: &'a FeatureStore) -> Vec<Candidates<'a>> {
        store
            .scan_order()
            .into_iter()
            .map(|l| Candidates {
                layer: &l.name,
                features: &l.members,
            })
            .collect()
    }

    #[test]
    fn test_point_wins_over_polygon() {
        let store = store();
        let vp = viewport();
        let resolver = Resolver::new(&store, &vp, TieBreak::FirstHit);
        let center = vp.to_pixel(vp.center);

        let hit = resolver.resolve(center, &all(&store), CLICK_TOLERANCE).unwrap();
        assert_eq!(hit.kind, GeometryKind::Point);
    }

    #[test]
    fn test_point_wins_even_when_polygon_scanned_first() {
        let store = store();
        let vp = viewport();
        let resolver = Resolver::new(&store, &vp, TieBreak::Nearest);
        let center = vp.to_pixel(vp.center);

        let mut layers = all(&store);
        layers.reverse();
        let hit = resolver.resolve(center, &layers, CLICK_TOLERANCE).unwrap();
        assert_eq!(hit.kind, GeometryKind::Point);
    }

    #[test]
    fn test_nearest_tie_break() {
        let store = store();
        let vp = viewport();
        let center = vp.to_pixel(vp.center);
        // Entre les deux points, plus proche de "Center"
        let cursor = Coord {
            x: center.x + 1.0,
            y: center.y,
        };

        let nearest = Resolver::new(&store, &vp, TieBreak::Nearest)
            .resolve(cursor, &all(&store), CLICK_TOLERANCE)
            .unwrap();
        assert_eq!(store.get(nearest.feature).unwrap().text("Nama_Pemetaan").as_deref(), Some("Center"));

        let first = Resolver::new(&store, &vp, TieBreak::FirstHit)
            .resolve(cursor, &all(&store), CLICK_TOLERANCE)
            .unwrap();
        assert_eq!(store.get(first.feature).unwrap().text("Nama_Pemetaan").as_deref(), Some("Far"));
    }

    #[test]
    fn test_polygon_when_no_point() {
        let store = store();
        let vp = viewport();
        let resolver = Resolver::new(&store, &vp, TieBreak::Nearest);
        // 100 px à gauche du centre: dans le polygone, loin des points
        let cursor = Coord {
            x: vp.width / 2.0 - 100.0,
            y: vp.height / 2.0,
        };

        let hit = resolver.resolve(cursor, &all(&store), HOVER_TOLERANCE).unwrap();
        assert_eq!(hit.kind, GeometryKind::Polygon);
        assert_eq!(hit.distance_px, 0.0);
    }

    #[test]
    fn test_nothing_in_tolerance() {
        let store = store();
        // Vue très loin de toute feature
        let vp = Viewport::from_lonlat(0.0, 0.0, 12.0, 800.0, 600.0);
        let resolver = Resolver::new(&store, &vp, TieBreak::Nearest);
        let hit = resolver.resolve(Coord { x: 400.0, y: 300.0 }, &all(&store), CLICK_TOLERANCE);
        assert!(hit.is_none());
        assert!(resolver.resolve(Coord { x: 400.0, y: 300.0 }, &[], CLICK_TOLERANCE).is_none());
    }

    #[test]
    fn test_highlight_single_slot() {
        let mut hl = Highlighter::new();

        assert_eq!(
            hl.highlight(Some(1)),
            Some(HighlightChange {
                evicted: None,
                inserted: Some(1)
            })
        );
        assert_eq!(hl.highlight(Some(1)), None);
        assert_eq!(
            hl.highlight(Some(2)),
            Some(HighlightChange {
                evicted: Some(1),
                inserted: Some(2)
            })
        );
        assert_eq!(hl.overlay(), &[2]);

        hl.highlight(None);
        assert!(hl.overlay().is_empty());
        assert_eq!(hl.current(), None);
    }
}
