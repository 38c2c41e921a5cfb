//! # floodmap
//!
//! Cœur d'un tableau de bord de suivi des inondations: couches de features
//! GeoJSON, résolution de la feature sous le curseur, filtres liés par
//! kecamatan, agrégats et tableau paginé.
//!
//! ## Features
//!
//! - Classification unique des features au chargement (crue, stagnation, zone administrative)
//! - Priorité des points sur les polygones au même pixel, avec tolérance en pixels
//! - Sélection partagée entre plusieurs groupes de cases à cocher
//! - Agrégats tolérants aux valeurs absentes (jamais de NaN)
//! - Types `geo` pour l'interopérabilité avec l'écosystème Rust géospatial
//!
//! ## Usage
//!
//! ```rust,ignore
//! use floodmap::{FeatureStore, MapSettings, Session, Viewport};
//! use floodmap::store::z_index;
//!
//! let mut store = FeatureStore::new();
//! store.ingest_slice("banjir", z_index::POINTS, &std::fs::read("banjir.json")?)?;
//!
//! let mut session = Session::new(store, Viewport::default(), MapSettings::default());
//! let hover = session.hover(geo::Coord { x: 512.0, y: 384.0 });
//! println!("{}", hover.label);
//! ```

pub mod barrier;
pub mod error;
pub mod filter;
pub mod info;
pub mod locate;
pub mod metrics;
pub mod projection;
pub mod resolver;
pub mod session;
pub mod store;
pub mod table;
pub mod types;
pub mod viewport;

pub use barrier::{BarrierState, LoadBarrier};
pub use error::FloodError;
pub use filter::{FilterSynchronizer, LinkedLayer, OptionDomain};
pub use metrics::{ChartData, DashboardMetrics, Tally};
pub use resolver::{Hit, Resolver, TieBreak};
pub use session::{MapSettings, Session};
pub use store::{FeatureStore, SourceCollection};
pub use table::{Row, SortDirection, SortField, TableView};
pub use types::{Category, Feature, FeatureId, GeometryKind, Properties};
pub use viewport::Viewport;

/// Noms des couches du tableau de bord
pub mod layers {
    /// Points de crue
    pub const FLOOD: &str = "banjir";
    /// Points de stagnation d'eau
    pub const WATERLOGGING: &str = "genangan";
    /// Polygones de la province
    pub const PROVINCE: &str = "riau";
    /// Polygones de la ville
    pub const CITY: &str = crate::info::CITY_LAYER;
}
