//! Contexte de session: état partagé de la carte et du tableau de bord
//!
//! Une session possède le store, la vue, la surbrillance, les filtres liés et
//! le tableau. Toutes les interactions passent par elle, pour garder les
//! composants cohérents entre eux (un changement de filtre reconstruit le
//! tableau, masquer une couche retire sa surbrillance, etc.).

use std::collections::BTreeSet;

use geo::Coord;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::barrier::LoadBarrier;
use crate::filter::{FilterSynchronizer, LinkedLayer, OptionDomain, ToggleOutcome};
use crate::info::{describe, hover_label, popup_anchor, FeatureInfo};
use crate::locate::{locate, Located};
use crate::metrics::{ChartData, DashboardMetrics};
use crate::projection::to_web_mercator;
use crate::resolver::{
    Candidates, HighlightChange, Highlighter, Hit, Resolver, TieBreak, CLICK_TOLERANCE, HOVER_TOLERANCE,
};
use crate::store::FeatureStore;
use crate::table::{Row, TableView, MAP_PAGE_SIZE};
use crate::types::{Feature, FeatureId};
use crate::viewport::{Viewport, FOCUS_ZOOM};
use crate::FloodError;

/// Réglages d'interaction d'une session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    /// Tolérance au survol (pixels)
    pub hover_tolerance: f64,
    /// Tolérance au clic (pixels)
    pub click_tolerance: f64,
    pub tie_break: TieBreak,
    /// Lignes par page du tableau
    pub page_size: usize,
    /// Ordre des couches pour la recherche de lieu
    pub search_order: Vec<String>,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            hover_tolerance: HOVER_TOLERANCE,
            click_tolerance: CLICK_TOLERANCE,
            tie_break: TieBreak::default(),
            page_size: MAP_PAGE_SIZE,
            search_order: ["genangan", "banjir", "pekanbaru", "riau"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Résultat d'un survol
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverOutcome {
    pub hit: Option<Hit>,
    /// Libellé de l'encart de survol
    pub label: String,
    /// Changement de surbrillance, `None` si inchangée
    pub change: Option<HighlightChange>,
}

/// Popup ouverte par un clic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub feature: FeatureId,
    pub info: FeatureInfo,
    /// Ancrage (lon, lat)
    pub anchor: Coord,
}

/// État d'une session carte + tableau de bord
#[derive(Debug)]
pub struct Session {
    store: FeatureStore,
    viewport: Viewport,
    home: Viewport,
    highlighter: Highlighter,
    filters: Option<FilterSynchronizer>,
    table: TableView,
    settings: MapSettings,
}

impl Session {
    pub fn new(store: FeatureStore, viewport: Viewport, settings: MapSettings) -> Self {
        let points: Vec<FeatureId> = point_ids(&store, None);
        let table = TableView::new(&store, points, settings.page_size);
        Self {
            store,
            home: viewport,
            viewport,
            highlighter: Highlighter::new(),
            filters: None,
            table,
            settings,
        }
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    pub fn highlighted(&self) -> Option<FeatureId> {
        self.highlighter.current()
    }

    pub fn filters(&self) -> Option<&FilterSynchronizer> {
        self.filters.as_ref()
    }

    pub fn table(&self) -> &TableView {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TableView {
        &mut self.table
    }

    /// Initialise les filtres liés une fois toutes les sources arrivées
    pub fn init_filters(
        &mut self,
        barrier: &LoadBarrier,
        linked: Vec<LinkedLayer>,
        group_ids: &[&str],
        domain: OptionDomain,
    ) -> Result<&FilterSynchronizer, FloodError> {
        let sync = FilterSynchronizer::initialize(&self.store, barrier, linked, group_ids, domain)?;
        info!(
            options = sync.options().len(),
            linked = sync.linked().len(),
            "Filtres liés prêts"
        );
        self.filters = Some(sync);
        self.refresh_table();
        self.filters.as_ref().ok_or(FloodError::FiltersNotInitialized)
    }

    /// Candidats interrogeables, de la couche la plus haute à la plus basse.
    ///
    /// Une couche liée n'expose que son sous-ensemble visible.
    fn candidates(&self) -> Vec<Candidates<'_>> {
        self.store
            .scan_order()
            .into_iter()
            .map(|layer| {
                let features = self
                    .filters
                    .as_ref()
                    .and_then(|f| f.visible(&layer.name))
                    .unwrap_or(layer.members.as_slice());
                Candidates {
                    layer: layer.name.as_str(),
                    features,
                }
            })
            .collect()
    }

    /// Features affichées (couches visibles, sous-ensembles filtrés), dans
    /// l'ordre du store
    pub fn visible_features(&self) -> Vec<&Feature> {
        let shown: BTreeSet<FeatureId> = self
            .candidates()
            .iter()
            .flat_map(|c| c.features.iter().copied())
            .collect();
        self.store
            .features()
            .iter()
            .filter(|f| shown.contains(&f.id))
            .collect()
    }

    /// Feature sous le pixel `screen`, sans effet de bord
    pub fn resolve(&self, screen: Coord, tolerance: f64) -> Option<Hit> {
        let candidates = self.candidates();
        Resolver::new(&self.store, &self.viewport, self.settings.tie_break).resolve(screen, &candidates, tolerance)
    }

    /// Survol: résout, met à jour la surbrillance et le libellé
    pub fn hover(&mut self, screen: Coord) -> HoverOutcome {
        let hit = self.resolve(screen, self.settings.hover_tolerance);
        let change = self.highlighter.highlight(hit.map(|h| h.feature));
        let label = hover_label(hit.and_then(|h| self.store.get(h.feature)));
        HoverOutcome { hit, label, change }
    }

    /// Clic: popup de la feature retenue, `None` si rien sous le curseur
    pub fn click(&self, screen: Coord) -> Option<Popup> {
        let hit = self.resolve(screen, self.settings.click_tolerance)?;
        let feature = self.store.get(hit.feature)?;
        let clicked = self.viewport.to_lonlat(screen);
        Some(Popup {
            feature: hit.feature,
            info: describe(feature),
            anchor: popup_anchor(feature, clicked),
        })
    }

    /// Change une case d'un groupe de filtres puis reconstruit le tableau
    pub fn toggle_filter(&mut self, key: &str, checked: bool, origin: &str) -> Result<ToggleOutcome, FloodError> {
        let sync = self
            .filters
            .as_mut()
            .ok_or(FloodError::FiltersNotInitialized)?;
        let outcome = sync.on_toggle(&self.store, key, checked, origin)?;
        self.drop_hidden_highlight();
        self.refresh_table();
        Ok(outcome)
    }

    /// Affiche ou masque une couche
    pub fn set_layer_visible(&mut self, layer: &str, visible: bool) -> Result<(), FloodError> {
        self.store.set_layer_visible(layer, visible)?;
        debug!(layer = layer, visible = visible, "Visibilité de couche modifiée");
        self.drop_hidden_highlight();
        Ok(())
    }

    /// Retire la surbrillance d'une feature qui n'est plus interrogeable
    fn drop_hidden_highlight(&mut self) {
        let Some(current) = self.highlighter.current() else {
            return;
        };
        let still_visible = self
            .candidates()
            .iter()
            .any(|c| c.features.contains(&current));
        if !still_visible {
            self.highlighter.clear();
        }
    }

    fn refresh_table(&mut self) {
        let points = point_ids(&self.store, self.filters.as_ref());
        self.table.rebuild(&self.store, points);
    }

    pub fn metrics(&self) -> DashboardMetrics {
        DashboardMetrics::compute(&self.store)
    }

    pub fn charts(&self) -> ChartData {
        ChartData::compute(&self.store)
    }

    /// Recherche un lieu et cadre la vue dessus
    pub fn locate(&mut self, keyword: &str) -> Option<Located> {
        let order: Vec<&str> = self.settings.search_order.iter().map(String::as_str).collect();
        let found = locate(&self.store, keyword, &order)?;
        self.viewport = found.focus.apply(&self.viewport);
        self.highlighter.highlight(Some(found.feature));
        Some(found)
    }

    /// Recentre la vue sur la feature d'une ligne du tableau
    pub fn locate_row(&mut self, row: &Row) -> Option<Coord> {
        let lonlat = self.table.locate(&self.store, row)?;
        self.viewport = self.viewport.centered_on(to_web_mercator(lonlat), FOCUS_ZOOM);
        Some(lonlat)
    }

    /// Retour à la vue initiale, surbrillance retirée
    pub fn home(&mut self) {
        self.viewport = self.home;
        self.highlighter.clear();
    }
}

/// Points (crue et stagnation) dans l'ordre du store, restreints aux
/// sous-ensembles visibles des couches liées
fn point_ids(store: &FeatureStore, filters: Option<&FilterSynchronizer>) -> Vec<FeatureId> {
    store
        .features()
        .iter()
        .filter(|f| f.category.is_point())
        .filter(|f| match filters.and_then(|s| s.visible(&f.layer)) {
            Some(visible) => visible.contains(&f.id),
            None => true,
        })
        .map(|f| f.id)
        .collect()
}
