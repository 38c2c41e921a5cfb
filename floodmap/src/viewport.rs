//! Vue cartographique: conversion pixels <-> coordonnées Web Mercator

use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};

use crate::projection::{from_web_mercator, to_web_mercator, EARTH_RADIUS};

/// Taille d'une tuile en pixels
const TILE_SIZE: f64 = 256.0;

/// Centre par défaut (Pekanbaru), en degrés
pub const DEFAULT_CENTER: (f64, f64) = (101.438309, 0.510440);

/// Zoom par défaut de la carte principale
pub const DEFAULT_ZOOM: f64 = 9.0;

/// Zoom maximal utilisé pour centrer sur un résultat de recherche
pub const FOCUS_ZOOM: f64 = 15.0;

/// Vue courante de la carte
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Centre en Web Mercator (mètres)
    pub center: Coord,
    /// Niveau de zoom (fractionnaire autorisé)
    pub zoom: f64,
    /// Largeur en pixels
    pub width: f64,
    /// Hauteur en pixels
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_lonlat(DEFAULT_CENTER.0, DEFAULT_CENTER.1, DEFAULT_ZOOM, 1024.0, 768.0)
    }
}

impl Viewport {
    /// Crée une vue centrée sur (lon, lat) en degrés
    pub fn from_lonlat(lon: f64, lat: f64, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center: to_web_mercator(Coord { x: lon, y: lat }),
            zoom,
            width,
            height,
        }
    }

    /// Mètres par pixel au zoom courant
    pub fn resolution(&self) -> f64 {
        2.0 * std::f64::consts::PI * EARTH_RADIUS / TILE_SIZE / 2f64.powf(self.zoom)
    }

    /// Coordonnée Web Mercator -> pixel écran (origine en haut à gauche)
    pub fn to_pixel(&self, map: Coord) -> Coord {
        let res = self.resolution();
        Coord {
            x: (map.x - self.center.x) / res + self.width / 2.0,
            y: self.height / 2.0 - (map.y - self.center.y) / res,
        }
    }

    /// Pixel écran -> coordonnée Web Mercator
    pub fn to_map(&self, pixel: Coord) -> Coord {
        let res = self.resolution();
        Coord {
            x: self.center.x + (pixel.x - self.width / 2.0) * res,
            y: self.center.y - (pixel.y - self.height / 2.0) * res,
        }
    }

    /// Pixel écran -> (lon, lat) en degrés
    pub fn to_lonlat(&self, pixel: Coord) -> Coord {
        from_web_mercator(self.to_map(pixel))
    }

    /// Distance écran (pixels) -> distance carte (mètres)
    pub fn pixels_to_map(&self, pixels: f64) -> f64 {
        pixels * self.resolution()
    }

    /// Nouvelle vue centrée sur un point Web Mercator
    pub fn centered_on(&self, center: Coord, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            ..*self
        }
    }

    /// Nouvelle vue englobant `extent` (Web Mercator) avec une marge en pixels,
    /// sans dépasser `max_zoom`
    pub fn fit(&self, extent: Rect, padding: f64, max_zoom: f64) -> Self {
        let usable_w = (self.width - 2.0 * padding).max(1.0);
        let usable_h = (self.height - 2.0 * padding).max(1.0);

        let span = (extent.width() / usable_w).max(extent.height() / usable_h);
        let world = 2.0 * std::f64::consts::PI * EARTH_RADIUS / TILE_SIZE;

        let zoom = if span > 0.0 {
            (world / span).log2().min(max_zoom)
        } else {
            max_zoom
        };

        self.centered_on(extent.center(), zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_maps_to_middle_pixel() {
        let vp = Viewport::default();
        let px = vp.to_pixel(vp.center);
        assert!((px.x - 512.0).abs() < 1e-9);
        assert!((px.y - 384.0).abs() < 1e-9);
    }

    #[test]
    fn test_pixel_roundtrip() {
        let vp = Viewport::default();
        let pixel = Coord { x: 100.0, y: 650.0 };
        let back = vp.to_pixel(vp.to_map(pixel));
        assert!((back.x - pixel.x).abs() < 1e-6);
        assert!((back.y - pixel.y).abs() < 1e-6);
    }

    #[test]
    fn test_north_is_up() {
        let vp = Viewport::default();
        let north = Coord {
            x: vp.center.x,
            y: vp.center.y + 1000.0,
        };
        assert!(vp.to_pixel(north).y < vp.height / 2.0);
    }

    #[test]
    fn test_fit_respects_max_zoom() {
        let vp = Viewport::default();
        let c = vp.center;
        let tiny = Rect::new(c, Coord { x: c.x + 1.0, y: c.y + 1.0 });
        assert_eq!(vp.fit(tiny, 100.0, FOCUS_ZOOM).zoom, FOCUS_ZOOM);

        let wide = Rect::new(
            Coord { x: c.x - 50_000.0, y: c.y - 50_000.0 },
            Coord { x: c.x + 50_000.0, y: c.y + 50_000.0 },
        );
        let fitted = vp.fit(wide, 100.0, FOCUS_ZOOM);
        assert!(fitted.zoom < FOCUS_ZOOM);
        // L'étendue tient dans la vue
        let corner = fitted.to_pixel(Coord { x: c.x + 50_000.0, y: c.y + 50_000.0 });
        assert!(corner.x <= fitted.width && corner.y >= 0.0);
    }
}
