//! Filtres liés par kecamatan
//!
//! Plusieurs groupes de cases à cocher partagent le même domaine de clés
//! (noms de kecamatan). Une seule sélection fait foi; chaque changement est
//! recopié dans tous les groupes puis toutes les couches liées sont refiltrées.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::barrier::LoadBarrier;
use crate::store::FeatureStore;
use crate::types::FeatureId;
use crate::FloodError;

/// Couche filtrée par la sélection, et propriété portant sa clé
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedLayer {
    pub layer: String,
    pub key_property: String,
}

impl LinkedLayer {
    pub fn new(layer: impl Into<String>, key_property: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            key_property: key_property.into(),
        }
    }
}

/// Construction des options à partir des couches liées
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionDomain {
    /// Clés présentes dans au moins une couche
    #[default]
    Union,
    /// Clés présentes dans toutes les couches
    Intersection,
}

/// Normalise une clé de catégorie: espaces retirés, casse ignorée
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Option proposée dans les groupes de cases à cocher
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOption {
    /// Clé normalisée
    pub key: String,
    /// Libellé tel que rencontré la première fois
    pub label: String,
}

/// Un groupe de cases à cocher lié au domaine de clés
#[derive(Debug, Clone, Serialize)]
pub struct CheckboxGroup {
    pub id: String,
    checked: BTreeMap<String, bool>,
}

impl CheckboxGroup {
    fn new(id: &str, options: &[CategoryOption]) -> Self {
        Self {
            id: id.to_string(),
            checked: options.iter().map(|o| (o.key.clone(), false)).collect(),
        }
    }

    pub fn is_checked(&self, key: &str) -> bool {
        self.checked.get(&normalize_key(key)).copied().unwrap_or(false)
    }

    /// Clés cochées dans ce groupe
    pub fn checked_keys(&self) -> BTreeSet<String> {
        self.checked
            .iter()
            .filter(|(_, &on)| on)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Applique un état; retourne vrai si la case a changé
    fn set(&mut self, key: &str, checked: bool) -> bool {
        match self.checked.get_mut(key) {
            Some(state) if *state != checked => {
                *state = checked;
                true
            }
            _ => false,
        }
    }
}

/// Résultat d'un changement de case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub key: String,
    pub checked: bool,
    /// Groupes (hors origine) dont la case a été mise à jour
    pub propagated_to: Vec<String>,
    /// Nombre de features visibles par couche liée après filtrage
    pub visible: Vec<(String, usize)>,
}

/// Source unique de vérité pour la sélection partagée
#[derive(Debug, Clone)]
pub struct FilterSynchronizer {
    linked: Vec<LinkedLayer>,
    options: Vec<CategoryOption>,
    groups: Vec<CheckboxGroup>,
    selected: BTreeSet<String>,
    /// Sous-ensemble visible, parallèle à `linked`
    visible: Vec<Vec<FeatureId>>,
}

impl FilterSynchronizer {
    /// Construit les options et les groupes.
    ///
    /// Échoue tant que la barrière n'est pas franchie: des options construites
    /// trop tôt seraient vides ou incomplètes.
    pub fn initialize(
        store: &FeatureStore,
        barrier: &LoadBarrier,
        linked: Vec<LinkedLayer>,
        group_ids: &[&str],
        domain: OptionDomain,
    ) -> Result<Self, FloodError> {
        barrier.ensure_ready()?;

        let mut labels: BTreeMap<String, String> = BTreeMap::new();
        let mut per_layer: Vec<BTreeSet<String>> = Vec::with_capacity(linked.len());

        for link in &linked {
            if store.layer(&link.layer).is_none() {
                return Err(FloodError::UnknownLayer(link.layer.clone()));
            }

            let mut keys = BTreeSet::new();
            for feature in store.layer_features(&link.layer) {
                if let Some(raw) = feature.text(&link.key_property) {
                    let key = normalize_key(&raw);
                    labels.entry(key.clone()).or_insert(raw);
                    keys.insert(key);
                }
            }
            per_layer.push(keys);
        }

        let domain_keys: BTreeSet<String> = match domain {
            OptionDomain::Union => per_layer.iter().flatten().cloned().collect(),
            OptionDomain::Intersection => {
                let mut iter = per_layer.iter();
                match iter.next() {
                    Some(first) => iter.fold(first.clone(), |acc, keys| {
                        acc.intersection(keys).cloned().collect()
                    }),
                    None => BTreeSet::new(),
                }
            }
        };

        let options: Vec<CategoryOption> = domain_keys
            .into_iter()
            .map(|key| {
                let label = labels.get(&key).cloned().unwrap_or_else(|| key.clone());
                CategoryOption { key, label }
            })
            .collect();

        let groups = group_ids
            .iter()
            .map(|id| CheckboxGroup::new(id, &options))
            .collect();

        debug!(options = options.len(), groups = group_ids.len(), "Filtres liés initialisés");

        let mut sync = Self {
            visible: vec![Vec::new(); linked.len()],
            linked,
            options,
            groups,
            selected: BTreeSet::new(),
        };
        sync.apply_filters(store);
        Ok(sync)
    }

    /// Coche ou décoche `key` depuis le groupe `origin`.
    ///
    /// L'état est recopié dans tous les autres groupes, puis toutes les couches
    /// liées sont refiltrées.
    pub fn on_toggle(
        &mut self,
        store: &FeatureStore,
        key: &str,
        checked: bool,
        origin: &str,
    ) -> Result<ToggleOutcome, FloodError> {
        if !self.groups.iter().any(|g| g.id == origin) {
            return Err(FloodError::UnknownGroup(origin.to_string()));
        }
        let key = normalize_key(key);
        if !self.options.iter().any(|o| o.key == key) {
            return Err(FloodError::UnknownCategory(key));
        }

        if checked {
            self.selected.insert(key.clone());
        } else {
            self.selected.remove(&key);
        }

        let mut propagated_to = Vec::new();
        for group in &mut self.groups {
            let changed = group.set(&key, checked);
            if changed && group.id != origin {
                propagated_to.push(group.id.clone());
            }
        }

        self.apply_filters(store);

        Ok(ToggleOutcome {
            key,
            checked,
            propagated_to,
            visible: self.visible_counts(),
        })
    }

    /// Recalcule le sous-ensemble visible de CHAQUE couche liée.
    ///
    /// Sélection vide: tout est visible. Sinon seules les features dont la clé
    /// est sélectionnée restent visibles.
    pub fn apply_filters(&mut self, store: &FeatureStore) {
        for (link, visible) in self.linked.iter().zip(self.visible.iter_mut()) {
            visible.clear();
            visible.extend(
                store
                    .layer_features(&link.layer)
                    .filter(|f| {
                        self.selected.is_empty()
                            || f
                                .text(&link.key_property)
                                .map_or(false, |raw| self.selected.contains(&normalize_key(&raw)))
                    })
                    .map(|f| f.id),
            );
        }
    }

    /// Décoche tout et revient à l'état non filtré
    pub fn clear(&mut self, store: &FeatureStore) {
        self.selected.clear();
        for group in &mut self.groups {
            for state in group.checked.values_mut() {
                *state = false;
            }
        }
        self.apply_filters(store);
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn options(&self) -> &[CategoryOption] {
        &self.options
    }

    pub fn groups(&self) -> &[CheckboxGroup] {
        &self.groups
    }

    pub fn group(&self, id: &str) -> Option<&CheckboxGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn linked(&self) -> &[LinkedLayer] {
        &self.linked
    }

    /// Features visibles d'une couche liée
    pub fn visible(&self, layer: &str) -> Option<&[FeatureId]> {
        self.linked
            .iter()
            .position(|l| l.layer == layer)
            .map(|idx| self.visible[idx].as_slice())
    }

    pub fn visible_counts(&self) -> Vec<(String, usize)> {
        self.linked
            .iter()
            .zip(&self.visible)
            .map(|(l, v)| (l.layer.clone(), v.len()))
            .collect()
    }
}
