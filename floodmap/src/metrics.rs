//! Agrégats du tableau de bord (cartes de métriques, données de graphiques)
//!
//! Toutes les fonctions sont des réductions pures sur des propriétés. Les
//! valeurs absentes ou illisibles comptent pour 0: jamais de NaN, jamais d'erreur.
//! Les sommes saturent à `i64::MAX`.
//!
//! Les agrégats du tableau de bord portent sur des couches (fichiers sources),
//! pas sur les catégories: un enregistrement de `banjir` sans nom reste un
//! point de crue.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::store::FeatureStore;
use crate::layers;
use crate::types::{keys, property_int, property_text, Properties};

/// Catégorie par défaut des comptages
pub const UNCLASSIFIED: &str = "Unclassified";

/// Lieu par défaut des sommes par lieu
pub const UNKNOWN: &str = "Unknown";

/// Une entrée de comptage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TallyEntry {
    pub label: String,
    pub value: i64,
}

/// Comptage par catégorie, dans l'ordre de première apparition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tally {
    entries: Vec<TallyEntry>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute `amount` à `label` (créé en fin de liste si nouveau)
    pub fn add(&mut self, label: &str, amount: i64) {
        match self.index.get(label) {
            Some(&idx) => {
                let entry = &mut self.entries[idx];
                entry.value = entry.value.saturating_add(amount);
            }
            None => {
                self.index.insert(label.to_string(), self.entries.len());
                self.entries.push(TallyEntry {
                    label: label.to_string(),
                    value: amount,
                });
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<i64> {
        self.index.get(label).map(|&idx| self.entries[idx].value)
    }

    pub fn entries(&self) -> &[TallyEntry] {
        &self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.iter().map(|e| e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> i64 {
        self.values().fold(0, i64::saturating_add)
    }
}

/// Compte les features par valeur de `key`; les absents vont dans [`UNCLASSIFIED`]
pub fn count_by_category<'a, I>(features: I, key: &str) -> Tally
where
    I: IntoIterator<Item = &'a Properties>,
{
    count_by_category_or(features, key, UNCLASSIFIED)
}

/// Comme [`count_by_category`] avec une catégorie par défaut explicite
pub fn count_by_category_or<'a, I>(features: I, key: &str, default_bucket: &str) -> Tally
where
    I: IntoIterator<Item = &'a Properties>,
{
    let mut tally = Tally::new();
    for props in features {
        let label = property_text(props, key);
        tally.add(label.as_deref().unwrap_or(default_bucket), 1);
    }
    tally
}

/// Somme de `value_key` regroupée par `group_key`
pub fn sum_by_category<'a, I>(features: I, group_key: &str, value_key: &str, default_bucket: &str) -> Tally
where
    I: IntoIterator<Item = &'a Properties>,
{
    let mut tally = Tally::new();
    for props in features {
        let label = property_text(props, group_key);
        tally.add(
            label.as_deref().unwrap_or(default_bucket),
            property_int(props, value_key).unwrap_or(0),
        );
    }
    tally
}

/// Somme d'une propriété entière
pub fn sum_numeric_property<'a, I>(features: I, key: &str) -> i64
where
    I: IntoIterator<Item = &'a Properties>,
{
    features
        .into_iter()
        .map(|props| property_int(props, key).unwrap_or(0))
        .fold(0, i64::saturating_add)
}

/// Valeurs distinctes non vides d'une propriété
pub fn distinct_values<'a, I>(features: I, key: &str) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a Properties>,
{
    features
        .into_iter()
        .filter_map(|props| property_text(props, key))
        .collect()
}

/// Cartes de métriques du tableau de bord
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardMetrics {
    pub total_flood_points: usize,
    pub total_waterlogging_points: usize,
    /// Victimes des points de crue uniquement
    pub total_victims: i64,
    /// Kecamatan distincts sur les deux couches de points
    pub affected_districts: usize,
}

impl DashboardMetrics {
    pub fn compute(store: &FeatureStore) -> Self {
        let flood = || store.layer_features(layers::FLOOD).map(|f| &f.properties);
        let waterlogging = || store.layer_features(layers::WATERLOGGING).map(|f| &f.properties);
        let points = flood().chain(waterlogging());

        Self {
            total_flood_points: flood().count(),
            total_waterlogging_points: waterlogging().count(),
            total_victims: sum_numeric_property(flood(), keys::JUMLAH_KORBAN),
            affected_districts: distinct_values(points, keys::KECAMATAN).len(),
        }
    }
}

/// Données des deux graphiques du tableau de bord
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartData {
    /// Histogramme: victimes par lieu de crue
    pub victims_by_location: Tally,
    /// Anneau: polygones de la province par classification
    pub classification: Tally,
}

impl ChartData {
    pub fn compute(store: &FeatureStore) -> Self {
        Self {
            victims_by_location: sum_by_category(
                store.layer_features(layers::FLOOD).map(|f| &f.properties),
                keys::NAMA_PEMETAAN,
                keys::JUMLAH_KORBAN,
                UNKNOWN,
            ),
            classification: count_by_category(
                store.layer_features(layers::PROVINCE).map(|f| &f.properties),
                keys::STATUS_KOT,
            ),
        }
    }
}
