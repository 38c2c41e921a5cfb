//! Jeu de données de remplacement
//!
//! Utilisé quand une source obligatoire est introuvable ou illisible: le
//! tableau de bord doit toujours afficher quelque chose. Les propriétés ont la
//! même forme que les vrais fichiers.

use floodmap::store::{SourceCollection, SourceFeature};
use floodmap::Properties;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use crate::news::NewsItem;

/// Centre des points générés (lon, lat)
const CENTER: (f64, f64) = (101.4478, 0.5071);

/// Écart maximal autour du centre, en degrés
const SPREAD: f64 = 0.1;

/// Données générées pour toutes les sources
#[derive(Debug, Clone)]
pub struct Placeholder {
    pub flood: SourceCollection,
    pub waterlogging: SourceCollection,
    pub province: SourceCollection,
    pub news: Vec<NewsItem>,
}

impl Placeholder {
    /// Génère avec une graine fixe (reproductible) ou aléatoire
    pub fn generate(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_rng(&mut StdRng::seed_from_u64(seed)),
            None => Self::with_rng(&mut rand::rng()),
        }
    }

    pub fn with_rng(rng: &mut impl Rng) -> Self {
        let flood = (0..10)
            .map(|i| {
                let district = if i % 2 == 0 { "Tampan" } else { "Marpoyan Damai" };
                point(
                    json!({
                        "Nama_Pemetaan": format!("Lokasi Banjir {}", i + 1),
                        "kecamatan": district,
                        "Jumlah_Korban": rng.random_range(10..60),
                    }),
                    CENTER.0 + rng.random_range(0.0..SPREAD),
                    CENTER.1 + rng.random_range(0.0..SPREAD),
                )
            })
            .collect();

        let waterlogging = (0..5)
            .map(|i| {
                point(
                    json!({
                        "jalan": format!("Jalan Genangan {}", i + 1),
                        "kecamatan": "Sukajadi",
                        "Jumlah_Korban": 0,
                    }),
                    CENTER.0 - rng.random_range(0.0..SPREAD),
                    CENTER.1 - rng.random_range(0.0..SPREAD),
                )
            })
            .collect();

        let province = ["Rawan Tinggi", "Rawan Sedang", "Rawan Tinggi", "Aman"]
            .iter()
            .map(|status| SourceFeature {
                properties: properties(json!({ "STATUS_KOT": status })),
                geometry: None,
            })
            .collect();

        let news = vec![
            NewsItem {
                title: "Banjir Surut di Pekanbaru".to_string(),
                description: "Air mulai surut setelah 3 hari.".to_string(),
                url: "#".to_string(),
                published_at: None,
                category: None,
            },
            NewsItem {
                title: "Waspada Curah Hujan Tinggi".to_string(),
                description: "BMKG memperingatkan potensi hujan.".to_string(),
                url: "#".to_string(),
                published_at: None,
                category: None,
            },
        ];

        Self {
            flood: SourceCollection { features: flood },
            waterlogging: SourceCollection { features: waterlogging },
            province: SourceCollection { features: province },
            news,
        }
    }
}

fn properties(value: Value) -> Option<Properties> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn point(props: Value, lon: f64, lat: f64) -> SourceFeature {
    SourceFeature {
        properties: properties(props),
        geometry: Some(json!({ "type": "Point", "coordinates": [lon, lat] })),
    }
}
