//! Types de données pour le crate floodmap

use geo::Geometry;
use serde::Serialize;
use serde_json::Value;

/// Attributs bruts d'une feature (clé -> valeur JSON)
pub type Properties = serde_json::Map<String, Value>;

/// Index d'une feature dans le store (stable pour toute la session)
pub type FeatureId = usize;

/// Noms des propriétés lues dans les fichiers de données
pub mod keys {
    /// Nom du lieu cartographié (présence => point de crue)
    pub const NAMA_PEMETAAN: &str = "Nama_Pemetaan";
    /// Kecamatan (district) des points
    pub const KECAMATAN: &str = "kecamatan";
    /// Rue d'un point de stagnation
    pub const JALAN: &str = "jalan";
    /// Coordonnées textuelles (présentes dans certains exports CSV->JSON)
    pub const COORDINATES: &str = "coordinates";
    /// Nombre de victimes
    pub const JUMLAH_KORBAN: &str = "Jumlah_Korban";
    /// Classification de vulnérabilité des polygones
    pub const STATUS_KOT: &str = "STATUS_KOT";
    /// Nom d'objet des polygones de la ville
    pub const NAMOBJ: &str = "NAMOBJ";
    /// Kecamatan des polygones de la ville
    pub const WADMKC: &str = "WADMKC";
    /// Kabupaten des polygones de la ville
    pub const WADMKD: &str = "WADMKD";
    pub const KABUPATEN_UPPER: &str = "KABUPATEN";
    pub const KABUPATEN: &str = "Kabupaten";
    pub const KECAMATAN_UPPER: &str = "KECAMATAN";
    pub const DESA: &str = "DESA";
    pub const LONG: &str = "long";
    pub const LAT: &str = "lat";
}

/// Catégorie sémantique d'une feature, fixée une fois pour toutes au chargement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    /// Point de crue (banjir)
    Flood,
    /// Point de stagnation d'eau (genangan)
    Waterlogging,
    /// Zone administrative (polygone)
    Administrative,
}

impl Category {
    /// Classe une feature d'après la présence de ses propriétés
    pub fn classify(properties: &Properties) -> Self {
        if is_truthy(properties.get(keys::NAMA_PEMETAAN)) {
            Category::Flood
        } else if is_truthy(properties.get(keys::KECAMATAN))
            || is_truthy(properties.get(keys::JALAN))
            || is_truthy(properties.get(keys::COORDINATES))
        {
            Category::Waterlogging
        } else {
            Category::Administrative
        }
    }

    /// Libellé affiché dans le tableau et les popups
    pub fn label(self) -> &'static str {
        match self {
            Category::Flood => "Banjir",
            Category::Waterlogging => "Genangan",
            Category::Administrative => "Wilayah",
        }
    }

    pub fn is_point(self) -> bool {
        matches!(self, Category::Flood | Category::Waterlogging)
    }
}

/// Type de géométrie supporté
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GeometryKind {
    Point,
    Polygon,
    MultiPolygon,
}

impl GeometryKind {
    /// Détermine le type d'une géométrie `geo`, `None` si non supporté
    pub fn of(geometry: &Geometry) -> Option<Self> {
        match geometry {
            Geometry::Point(_) => Some(GeometryKind::Point),
            Geometry::Polygon(_) => Some(GeometryKind::Polygon),
            Geometry::MultiPolygon(_) => Some(GeometryKind::MultiPolygon),
            _ => None,
        }
    }
}

/// Une feature chargée, avec sa catégorie déjà résolue
#[derive(Debug, Clone)]
pub struct Feature {
    /// Position dans le store
    pub id: FeatureId,

    /// Nom de la couche d'origine
    pub layer: String,

    /// Catégorie assignée au chargement
    pub category: Category,

    /// Géométrie en WGS84 (EPSG:4326), absente pour les enregistrements purement attributaires
    pub geometry: Option<Geometry>,

    /// Géométrie projetée en Web Mercator (EPSG:3857)
    pub projected: Option<Geometry>,

    /// Attributs bruts
    pub properties: Properties,
}

impl Feature {
    pub fn kind(&self) -> Option<GeometryKind> {
        self.geometry.as_ref().and_then(GeometryKind::of)
    }

    pub fn is_point(&self) -> bool {
        self.kind() == Some(GeometryKind::Point)
    }

    /// Valeur textuelle non vide d'une propriété (les nombres sont formatés)
    pub fn text(&self, key: &str) -> Option<String> {
        property_text(&self.properties, key)
    }

    /// Valeur entière d'une propriété, 0 si absente ou illisible
    pub fn int(&self, key: &str) -> i64 {
        property_int(&self.properties, key).unwrap_or(0)
    }

    /// Première propriété non vide parmi `keys`
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.text(key))
    }

    /// Coordonnée (lon, lat) d'un point
    pub fn point_coord(&self) -> Option<geo::Coord> {
        match &self.geometry {
            Some(Geometry::Point(p)) => Some(p.0),
            _ => None,
        }
    }
}

/// Vrai si la valeur serait considérée comme renseignée (chaîne non vide, nombre non nul...)
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Valeur textuelle d'une propriété: chaîne non vide (trimée) ou nombre formaté
pub fn property_text(properties: &Properties, key: &str) -> Option<String> {
    match properties.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Valeur entière d'une propriété, `None` si absente ou non numérique
pub fn property_int(properties: &Properties, key: &str) -> Option<i64> {
    match properties.get(key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_int(s),
        _ => None,
    }
}

/// Parse un entier en base 10 à la manière d'un `parseInt`:
/// espaces initiaux ignorés, signe optionnel, puis le plus long préfixe de chiffres.
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Properties {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            Category::classify(&props(json!({"Nama_Pemetaan": "Rumbai", "kecamatan": "Rumbai"}))),
            Category::Flood
        );
        assert_eq!(
            Category::classify(&props(json!({"jalan": "Jl. Sudirman"}))),
            Category::Waterlogging
        );
        assert_eq!(
            Category::classify(&props(json!({"Nama_Pemetaan": "", "kecamatan": "Sukajadi"}))),
            Category::Waterlogging
        );
        assert_eq!(
            Category::classify(&props(json!({"STATUS_KOT": "Aman"}))),
            Category::Administrative
        );
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("10"), Some(10));
        assert_eq!(parse_int("  42 jiwa"), Some(42));
        assert_eq!(parse_int("-3"), Some(-3));
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("-"), None);
    }

    #[test]
    fn test_property_int() {
        let p = props(json!({"a": 12.7, "b": "7", "c": null, "d": true}));
        assert_eq!(property_int(&p, "a"), Some(12));
        assert_eq!(property_int(&p, "b"), Some(7));
        assert_eq!(property_int(&p, "c"), None);
        assert_eq!(property_int(&p, "d"), None);
        assert_eq!(property_int(&p, "missing"), None);
    }

    #[test]
    fn test_property_text() {
        let p = props(json!({"s": "  Tampan ", "empty": "  ", "n": 3}));
        assert_eq!(property_text(&p, "s").as_deref(), Some("Tampan"));
        assert_eq!(property_text(&p, "empty"), None);
        assert_eq!(property_text(&p, "n").as_deref(), Some("3"));
    }
}
