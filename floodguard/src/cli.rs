//! Définition et implémentation des commandes CLI
//!
//! Chaque commande charge le tableau de bord puis appelle une opération de la
//! session; la sortie console tient lieu de couche de présentation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use floodmap::info::{describe, hover_label};
use floodmap::table::{SortDirection, SortField};
use floodmap::Session;
use geo::Coord;
use serde_json::json;
use tracing::info;

use crate::config::Config;
use crate::export::{self, ExportFormat};
use crate::loader::{load_dashboard, Dashboard};
use crate::news::{latest, NEWS_LIMIT};

/// Groupe d'origine des filtres appliqués en ligne de commande
fn default_group(config: &Config) -> &str {
    config.filters.groups.first().map(String::as_str).unwrap_or("sidebar")
}

#[derive(Subcommand)]
pub enum Commands {
    /// Afficher les cartes de métriques, les graphiques et le rapport de chargement
    Summary {
        /// Sortie JSON
        #[arg(long)]
        json: bool,

        /// Enregistrer le rapport de chargement (JSON) dans ce fichier
        #[arg(long)]
        report_out: Option<PathBuf>,
    },

    /// Afficher le tableau (recherche, tri, pagination)
    Table {
        /// Recherche insensible à la casse sur le lieu et le kecamatan
        #[arg(short, long)]
        search: Option<String>,

        /// Colonne de tri: type, location, district, victims
        #[arg(long)]
        sort: Option<SortField>,

        /// Tri décroissant
        #[arg(long)]
        desc: bool,

        /// Numéro de page (ramené dans les bornes)
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Restreindre à ces kecamatan (répétable)
        #[arg(long = "district")]
        districts: Vec<String>,
    },

    /// Résoudre la feature sous un pixel de la vue
    Resolve {
        /// Colonne du pixel
        #[arg(long)]
        x: f64,

        /// Ligne du pixel
        #[arg(long)]
        y: f64,

        /// Tolérance de clic et affichage du popup
        #[arg(long)]
        click: bool,
    },

    /// Appliquer le filtre lié par kecamatan et lister les comptes visibles
    Filter {
        /// Kecamatan à cocher (répétable)
        #[arg(long = "district", required = true)]
        districts: Vec<String>,

        /// Groupe de cases d'origine (défaut: premier groupe configuré)
        #[arg(long)]
        group: Option<String>,
    },

    /// Chercher un lieu et afficher la vue obtenue
    Locate {
        /// Mot-clé (kecamatan, rue, lieu ou kabupaten)
        keyword: String,
    },

    /// Afficher les dernières actualités
    News,

    /// Exporter les features affichées
    Export {
        /// Format de sortie
        #[arg(short, long, value_enum)]
        format: ExportFormat,

        /// Fichier de sortie (extension du format ajoutée si absente)
        #[arg(short, long)]
        output: PathBuf,

        /// Restreindre à ces kecamatan (répétable)
        #[arg(long = "district")]
        districts: Vec<String>,
    },
}

/// Coche les districts demandés depuis le groupe `group`
fn apply_districts(session: &mut Session, districts: &[String], group: &str) -> Result<()> {
    for district in districts {
        session
            .toggle_filter(district, true, group)
            .context(format!("Failed to apply district filter: {}", district))?;
    }
    Ok(())
}

async fn load(config: &Config) -> Result<Dashboard> {
    load_dashboard(config).await.context("Failed to load dashboard data")
}

/// Exécute la commande summary
pub async fn cmd_summary(config: &Config, as_json: bool, report_out: Option<&Path>) -> Result<()> {
    let dashboard = load(config).await?;
    let metrics = dashboard.session.metrics();
    let charts = dashboard.session.charts();

    if let Some(path) = report_out {
        dashboard.report.save_to_file(path)?;
        info!(path = %path.display(), "Rapport de chargement enregistré");
    }

    if as_json {
        let out = json!({
            "metrics": metrics,
            "charts": charts,
            "report": dashboard.report,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Titik banjir:        {}", metrics.total_flood_points);
    println!("Titik genangan:      {}", metrics.total_waterlogging_points);
    println!("Total korban:        {}", metrics.total_victims);
    println!("Kecamatan terdampak: {}", metrics.affected_districts);

    println!("\n--- KORBAN PER LOKASI ---");
    for entry in charts.victims_by_location.entries() {
        println!("  {:<30} {}", entry.label, entry.value);
    }
    println!("\n--- KLASIFIKASI ---");
    for entry in charts.classification.entries() {
        println!("  {:<30} {}", entry.label, entry.value);
    }

    dashboard.report.display();
    Ok(())
}

/// Exécute la commande table
pub async fn cmd_table(
    config: &Config,
    search: Option<&str>,
    sort: Option<SortField>,
    desc: bool,
    page: usize,
    districts: &[String],
) -> Result<()> {
    let mut dashboard = load(config).await?;
    let session = &mut dashboard.session;
    apply_districts(session, districts, default_group(config))?;

    let table = session.table_mut();
    if let Some(term) = search {
        table.search(term);
    }
    if let Some(field) = sort {
        let direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
        table.sort(field, direction);
    }
    let info = table.go_to(page);

    println!("{:<10} {:<32} {:<20} {:>7}", "Tipe", "Lokasi", "Kecamatan", "Korban");
    for row in table.current_rows() {
        println!("{:<10} {:<32} {:<20} {:>7}", row.kind, row.location, row.district, row.victims);
    }
    println!(
        "\nPage {}/{} ({} rows){}{}",
        info.page,
        info.total_pages.max(1),
        info.total_rows,
        if info.has_previous { "  [prev]" } else { "" },
        if info.has_next { "  [next]" } else { "" }
    );
    Ok(())
}

/// Exécute la commande resolve
pub async fn cmd_resolve(config: &Config, x: f64, y: f64, click: bool) -> Result<()> {
    let mut dashboard = load(config).await?;
    let session = &mut dashboard.session;
    let screen = Coord { x, y };

    if click {
        match session.click(screen) {
            Some(popup) => println!("{}", serde_json::to_string_pretty(&popup)?),
            None => println!("Tidak ada fitur di titik ini"),
        }
        return Ok(());
    }

    let hover = session.hover(screen);
    println!("{}", hover.label);
    if let Some(feature) = hover.hit.and_then(|h| session.store().get(h.feature)) {
        let info = describe(feature);
        println!("{}", info.title);
        for (label, value) in &info.fields {
            println!("  {}: {}", label, value);
        }
        info!(feature = feature.id, label = %hover_label(Some(feature)), "Feature résolue");
    }
    Ok(())
}

/// Exécute la commande filter
pub async fn cmd_filter(config: &Config, districts: &[String], group: Option<&str>) -> Result<()> {
    let mut dashboard = load(config).await?;
    let session = &mut dashboard.session;
    apply_districts(session, districts, group.unwrap_or(default_group(config)))?;

    let filters = session
        .filters()
        .context("Linked filters are not initialized")?;

    println!("Selected: {}", filters.selected().iter().cloned().collect::<Vec<_>>().join(", "));
    println!("\n--- VISIBLE ---");
    for (layer, count) in filters.visible_counts() {
        println!("  {:<12} {}", layer, count);
    }
    println!("\n--- GROUPS ---");
    for g in filters.groups() {
        println!(
            "  {:<12} {}",
            g.id,
            g.checked_keys().into_iter().collect::<Vec<_>>().join(", ")
        );
    }
    println!("\nTable rows: {}", session.table().len());
    Ok(())
}

/// Exécute la commande locate
pub async fn cmd_locate(config: &Config, keyword: &str) -> Result<()> {
    let mut dashboard = load(config).await?;
    let session = &mut dashboard.session;

    match session.locate(keyword) {
        Some(found) => {
            let label = session
                .store()
                .get(found.feature)
                .map(|f| hover_label(Some(f)))
                .unwrap_or_default();
            let view = session.viewport();
            let center = floodmap::projection::from_web_mercator(view.center);
            println!("{}", label);
            println!("center: {:.6}, {:.6}  zoom: {:.2}", center.x, center.y, view.zoom);
        }
        None => println!("Lokasi tidak ditemukan: {}", keyword),
    }
    Ok(())
}

/// Exécute la commande news
pub async fn cmd_news(config: &Config) -> Result<()> {
    let dashboard = load(config).await?;
    let items = latest(&dashboard.news, NEWS_LIMIT);
    if items.is_empty() {
        println!("Belum ada berita terkini.");
        return Ok(());
    }
    for item in items {
        println!("{}", item.title);
        if let Some(date) = &item.published_at {
            println!("  {}", date);
        }
        println!("  {}", item.description);
        println!("  {}", item.url);
    }
    Ok(())
}

/// Exécute la commande export
pub async fn cmd_export(config: &Config, format: ExportFormat, output: &Path, districts: &[String]) -> Result<()> {
    let mut dashboard = load(config).await?;
    apply_districts(&mut dashboard.session, districts, default_group(config))?;

    let output = format.output_path(output);
    let written = export::export(&dashboard.session, format, &output)?;
    println!("{} items written to {}", written, output.display());
    Ok(())
}
