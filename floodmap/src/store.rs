//! Store de features: chargement, classification et couches
//!
//! Le store possède toutes les features de la session. Les autres composants
//! (résolution, filtres, tableau) ne manipulent que des [`FeatureId`].

use geo::Geometry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::projection::project_geometry;
use crate::types::{Category, Feature, FeatureId, GeometryKind, Properties};
use crate::FloodError;

/// Priorités d'affichage des couches (z-index)
pub mod z_index {
    /// Polygones de la province
    pub const PROVINCE: i32 = 10;
    /// Polygones de la ville, au-dessus de la province
    pub const CITY: i32 = 20;
    /// Points (crue, stagnation), toujours au-dessus des polygones
    pub const POINTS: i32 = 100;
    /// Surbrillance, au-dessus de tout
    pub const HIGHLIGHT: i32 = 200;
}

/// Collection telle que lue dans un fichier `{ "features": [...] }`
///
/// Volontairement plus permissive que GeoJSON: `type` est optionnel et une
/// feature peut ne pas avoir de géométrie.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SourceCollection {
    #[serde(default)]
    pub features: Vec<SourceFeature>,
}

/// Feature brute d'une collection source
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SourceFeature {
    #[serde(default)]
    pub properties: Option<Properties>,
    #[serde(default)]
    pub geometry: Option<Value>,
}

impl SourceCollection {
    /// Parse une collection depuis des octets JSON
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FloodError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Groupe nommé de features partageant une priorité d'affichage
#[derive(Debug, Clone, Serialize)]
pub struct Layer {
    pub name: String,
    pub z_index: i32,
    /// Features dans l'ordre d'insertion
    pub members: Vec<FeatureId>,
    /// Couche affichée (les couches masquées ne sont pas interrogeables)
    pub visible: bool,
    /// Ordre d'enregistrement, départage les couches de même z-index
    order: usize,
}

/// Résultat du chargement d'une couche
#[derive(Debug)]
pub struct IngestReport {
    pub layer: String,
    /// Nombre de features retenues
    pub accepted: usize,
    /// Erreurs non fatales (features ignorées)
    pub errors: Vec<FloodError>,
}

/// Store de toutes les features de la session
#[derive(Debug, Default)]
pub struct FeatureStore {
    features: Vec<Feature>,
    layers: Vec<Layer>,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Charge une collection dans la couche `layer` (créée si besoin).
    ///
    /// Chaque feature est classée une seule fois ici. Les géométries invalides
    /// ou non supportées sont ignorées et remontées dans le rapport.
    pub fn ingest(&mut self, layer: &str, z_index: i32, collection: SourceCollection) -> IngestReport {
        let layer_idx = self.ensure_layer(layer, z_index);
        let mut errors = Vec::new();
        let mut accepted = 0;

        for (index, raw) in collection.features.into_iter().enumerate() {
            let properties = raw.properties.unwrap_or_default();

            let geometry = match raw.geometry {
                None | Some(Value::Null) => None,
                Some(value) => match convert_geometry(layer, index, value) {
                    Ok(g) => Some(g),
                    Err(e) => {
                        warn!(layer = layer, index = index, "Feature ignorée: {}", e);
                        errors.push(e);
                        continue;
                    }
                },
            };

            let id = self.features.len();
            let projected = geometry.as_ref().map(project_geometry);
            self.features.push(Feature {
                id,
                layer: layer.to_string(),
                category: Category::classify(&properties),
                geometry,
                projected,
                properties,
            });
            self.layers[layer_idx].members.push(id);
            accepted += 1;
        }

        debug!(layer = layer, accepted = accepted, errors = errors.len(), "Couche chargée");

        IngestReport {
            layer: layer.to_string(),
            accepted,
            errors,
        }
    }

    /// Parse puis charge une collection JSON
    pub fn ingest_slice(
        &mut self,
        layer: &str,
        z_index: i32,
        bytes: &[u8],
    ) -> Result<IngestReport, FloodError> {
        let collection = SourceCollection::from_slice(bytes)?;
        Ok(self.ingest(layer, z_index, collection))
    }

    fn ensure_layer(&mut self, name: &str, z_index: i32) -> usize {
        if let Some(idx) = self.layers.iter().position(|l| l.name == name) {
            return idx;
        }
        let order = self.layers.len();
        self.layers.push(Layer {
            name: name.to_string(),
            z_index,
            members: Vec::new(),
            visible: true,
            order,
        });
        order
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(id)
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Couches dans l'ordre d'enregistrement
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Features d'une couche (vide si la couche n'existe pas)
    pub fn layer_features<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Feature> + 'a {
        let members: &'a [FeatureId] = self
            .layers
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.members.as_slice())
            .unwrap_or(&[]);
        members.iter().filter_map(move |&id| self.features.get(id))
    }

    /// Features d'une catégorie, dans l'ordre de chargement
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Feature> + '_ {
        self.features.iter().filter(move |f| f.category == category)
    }

    /// Affiche ou masque une couche
    pub fn set_layer_visible(&mut self, name: &str, visible: bool) -> Result<(), FloodError> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.name == name)
            .ok_or_else(|| FloodError::UnknownLayer(name.to_string()))?;
        layer.visible = visible;
        Ok(())
    }

    /// Couches visibles de la plus haute à la plus basse priorité.
    ///
    /// À z-index égal, la couche enregistrée en dernier est dessinée au-dessus
    /// et passe donc en premier.
    pub fn scan_order(&self) -> Vec<&Layer> {
        let mut layers: Vec<&Layer> = self.layers.iter().filter(|l| l.visible).collect();
        layers.sort_by(|a, b| b.z_index.cmp(&a.z_index).then(b.order.cmp(&a.order)));
        layers
    }
}

/// Convertit une géométrie GeoJSON en géométrie `geo` supportée
fn convert_geometry(layer: &str, index: usize, value: Value) -> Result<Geometry, FloodError> {
    let geojson: geojson::Geometry = serde_json::from_value(value)
        .map_err(|e| FloodError::invalid_geometry(layer, index, e.to_string()))?;

    let kind_name = geojson_type_name(&geojson.value).to_string();
    let geometry = Geometry::<f64>::try_from(geojson)
        .map_err(|e| FloodError::invalid_geometry(layer, index, e.to_string()))?;

    match GeometryKind::of(&geometry) {
        Some(_) => Ok(geometry),
        None => Err(FloodError::UnsupportedGeometry {
            layer: layer.to_string(),
            index,
            kind: kind_name,
        }),
    }
}

fn geojson_type_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}
