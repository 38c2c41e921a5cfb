//! Projection Web Mercator (EPSG:3857)
//!
//! Les fichiers de données sont en WGS84 (EPSG:4326). La carte travaille en
//! Web Mercator, comme les fonds de plan OSM.

use geo::{Coord, Geometry, MapCoords};

/// Rayon équatorial WGS84 en mètres
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Latitude maximale représentable en Web Mercator
const MAX_LATITUDE: f64 = 85.0;

/// Convertit (lon, lat) en degrés vers Web Mercator (x, y) en mètres
pub fn to_web_mercator(lonlat: Coord) -> Coord {
    // Limiter la latitude pour éviter l'infini
    let lat = lonlat.y.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let lon = lonlat.x.to_radians();

    Coord {
        x: EARTH_RADIUS * lon,
        y: EARTH_RADIUS * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln(),
    }
}

/// Convertit Web Mercator vers (lon, lat) en degrés
pub fn from_web_mercator(xy: Coord) -> Coord {
    let lon = xy.x / EARTH_RADIUS;
    let lat = 2.0 * (xy.y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2;

    Coord {
        x: lon.to_degrees(),
        y: lat.to_degrees(),
    }
}

/// Projette une géométrie complète vers Web Mercator
pub fn project_geometry(geometry: &Geometry) -> Geometry {
    geometry.map_coords(to_web_mercator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pekanbaru_to_web_mercator() {
        // Pekanbaru: 101.45°E, 0.51°N
        let xy = to_web_mercator(Coord { x: 101.45, y: 0.51 });

        assert!((xy.x - 11_293_387.0).abs() < 1000.0, "x={}", xy.x);
        assert!((xy.y - 56_774.0).abs() < 1000.0, "y={}", xy.y);
    }

    #[test]
    fn test_roundtrip() {
        let xy = to_web_mercator(Coord { x: 101.438309, y: 0.510440 });
        let back = from_web_mercator(xy);

        assert!((back.x - 101.438309).abs() < 1e-9, "lon={}", back.x);
        assert!((back.y - 0.510440).abs() < 1e-9, "lat={}", back.y);
    }

    #[test]
    fn test_latitude_clamped() {
        let pole = to_web_mercator(Coord { x: 0.0, y: 90.0 });
        assert!(pole.y.is_finite());
    }
}
