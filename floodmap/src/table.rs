//! Vue tableau des points: recherche, tri et pagination côté client

use std::cmp::Ordering;
use std::str::FromStr;

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::store::FeatureStore;
use crate::types::{keys, Category, FeatureId};

/// Taille de page de la vue tableau de bord
pub const DASHBOARD_PAGE_SIZE: usize = 5;

/// Taille de page de la vue carte
pub const MAP_PAGE_SIZE: usize = 10;

/// Ligne du tableau (instantané en lecture seule d'une feature)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Position dans la liste maître non triée
    pub index: usize,
    pub feature: FeatureId,
    pub kind: String,
    pub location: String,
    pub district: String,
    pub victims: i64,
    #[serde(skip)]
    haystack: String,
}

/// Colonne de tri
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Type,
    Location,
    District,
    Victims,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "type" => Ok(SortField::Type),
            "location" | "lokasi" => Ok(SortField::Location),
            "district" | "kecamatan" => Ok(SortField::District),
            "victims" | "korban" => Ok(SortField::Victims),
            _ => Err(format!(
                "Invalid sort field: {}. Use: type, location, district, victims",
                s
            )),
        }
    }
}

/// Sens de tri
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// État de pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub total_rows: usize,
    pub total_pages: usize,
    /// Bouton "Précédent" actif
    pub has_previous: bool,
    /// Bouton "Suivant" actif
    pub has_next: bool,
}

/// Nombre de pages: `ceil(total / size)`
pub fn total_pages(total_rows: usize, page_size: usize) -> usize {
    total_rows.div_ceil(page_size.max(1))
}

/// Tranche `[(page-1)*size, page*size)`; les pages hors bornes sont ramenées dans l'intervalle
pub fn page<T>(data: &[T], page_number: usize, page_size: usize) -> &[T] {
    let size = page_size.max(1);
    let pages = total_pages(data.len(), size);
    if pages == 0 {
        return &data[..0];
    }

    let page_number = page_number.clamp(1, pages);
    let start = (page_number - 1) * size;
    let end = (start + size).min(data.len());
    &data[start..end]
}

/// Tableau des points de crue et de stagnation
#[derive(Debug, Clone)]
pub struct TableView {
    master: Vec<Row>,
    /// Indices dans `master` après recherche et tri
    active: Vec<usize>,
    term: String,
    sort: Option<(SortField, SortDirection)>,
    page_size: usize,
    current_page: usize,
}

impl TableView {
    pub fn new<I>(store: &FeatureStore, features: I, page_size: usize) -> Self
    where
        I: IntoIterator<Item = FeatureId>,
    {
        let mut view = Self {
            master: Vec::new(),
            active: Vec::new(),
            term: String::new(),
            sort: None,
            page_size: page_size.max(1),
            current_page: 1,
        };
        view.rebuild(store, features);
        view
    }

    /// Reconstruit la liste maître (par exemple après un changement de filtre).
    ///
    /// La recherche et le tri actifs sont conservés, la page revient à 1.
    pub fn rebuild<I>(&mut self, store: &FeatureStore, features: I)
    where
        I: IntoIterator<Item = FeatureId>,
    {
        self.master = features
            .into_iter()
            .filter_map(|id| store.get(id))
            .enumerate()
            .map(|(index, f)| {
                let name = f.first_text(&[keys::NAMA_PEMETAAN, keys::JALAN]);
                let district = f.text(keys::KECAMATAN);
                let haystack = format!(
                    "{} {}",
                    name.as_deref().unwrap_or(""),
                    district.as_deref().unwrap_or("")
                )
                .to_lowercase();

                Row {
                    index,
                    feature: f.id,
                    kind: match f.category {
                        Category::Flood => Category::Flood.label(),
                        _ => Category::Waterlogging.label(),
                    }
                    .to_string(),
                    location: name.unwrap_or_else(|| "-".to_string()),
                    district: district.unwrap_or_else(|| "-".to_string()),
                    victims: f.int(keys::JUMLAH_KORBAN),
                    haystack,
                }
            })
            .collect();
        self.refresh();
    }

    /// Recherche insensible à la casse sur lieu + kecamatan; terme vide = tout.
    /// Le terme est pris tel quel, espaces compris.
    pub fn search(&mut self, term: &str) -> Vec<Row> {
        self.term = term.to_lowercase();
        self.refresh();
        self.rows().cloned().collect()
    }

    /// Trie sur `field`.
    ///
    /// Reprendre la colonne active inverse son sens (quel que soit `direction`);
    /// une nouvelle colonne est triée dans le sens demandé.
    pub fn sort(&mut self, field: SortField, direction: SortDirection) -> Vec<Row> {
        self.sort = Some(match self.sort {
            Some((active, current)) if active == field => (field, current.flip()),
            _ => (field, direction),
        });
        self.refresh();
        self.rows().cloned().collect()
    }

    /// Clic sur un en-tête: inverse la colonne active, sinon tri croissant
    pub fn toggle_sort(&mut self, field: SortField) -> Vec<Row> {
        self.sort(field, SortDirection::Asc)
    }

    pub fn sort_state(&self) -> Option<(SortField, SortDirection)> {
        self.sort
    }

    fn refresh(&mut self) {
        let term = &self.term;
        let master = &self.master;
        self.active = master
            .iter()
            .filter(|row| term.is_empty() || row.haystack.contains(term.as_str()))
            .map(|row| row.index)
            .collect();

        if let Some((field, direction)) = self.sort {
            // sort_by est stable
            self.active.sort_by(|&a, &b| {
                let ord = compare(&master[a], &master[b], field);
                match direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }
        self.current_page = 1;
    }

    /// Lignes actives (après recherche et tri)
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.active.iter().map(|&idx| &self.master[idx])
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Lignes de la page courante
    pub fn current_rows(&self) -> Vec<Row> {
        page(&self.active, self.current_page, self.page_size)
            .iter()
            .map(|&idx| self.master[idx].clone())
            .collect()
    }

    /// Va à la page demandée (ramenée dans les bornes)
    pub fn go_to(&mut self, page_number: usize) -> PageInfo {
        let pages = total_pages(self.active.len(), self.page_size);
        self.current_page = page_number.clamp(1, pages.max(1));
        self.page_info()
    }

    pub fn next_page(&mut self) -> PageInfo {
        self.go_to(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> PageInfo {
        self.go_to(self.current_page.saturating_sub(1))
    }

    pub fn page_info(&self) -> PageInfo {
        let total_pages = total_pages(self.active.len(), self.page_size);
        PageInfo {
            page: self.current_page,
            page_size: self.page_size,
            total_rows: self.active.len(),
            total_pages,
            has_previous: self.current_page > 1,
            has_next: self.current_page < total_pages,
        }
    }

    /// Coordonnée (lon, lat) sur laquelle recentrer la carte pour une ligne
    pub fn locate(&self, store: &FeatureStore, row: &Row) -> Option<Coord> {
        store.get(row.feature)?.point_coord()
    }
}

fn compare(a: &Row, b: &Row, field: SortField) -> Ordering {
    match field {
        SortField::Type => compare_text(&a.kind, &b.kind),
        SortField::Location => compare_text(&a.location, &b.location),
        SortField::District => compare_text(&a.district, &b.district),
        SortField::Victims => a.victims.cmp(&b.victims),
    }
}

/// Comparaison de libellés: casse ignorée d'abord, puis ordre brut
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
