//! Point d'entrée CLI pour floodguard

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

use floodguard::cli::{self, Commands};
use floodguard::Config;

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

/// Tableau de bord de suivi des inondations de Pekanbaru
#[derive(Parser)]
#[command(name = "floodguard")]
#[command(author, version)]
#[command(about = "Tableau de bord des inondations de Pekanbaru: métriques, filtres liés, requêtes carte et exports")]
#[command(long_about = "Charge les points de crue, les points de stagnation, les polygones administratifs et les actualités depuis un répertoire de données.\n\nLes fichiers obligatoires absents sont remplacés par des données générées, les fichiers optionnels absents par des données vides.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Preset de configuration (dashboard/map) ou chemin vers un fichier JSON
    #[arg(long, default_value = "map", global = true)]
    config: String,

    /// Répertoire de données (prioritaire sur la config et FLOODGUARD_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    let mut config = Config::resolve(&cli.config)?.with_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    debug!(config = %cli.config, data_dir = %config.data_dir.display(), "Configuration chargée");

    match cli.command {
        Commands::Summary { json, report_out } => cli::cmd_summary(&config, json, report_out.as_deref()).await?,
        Commands::Table {
            search,
            sort,
            desc,
            page,
            districts,
        } => cli::cmd_table(&config, search.as_deref(), sort, desc, page, &districts).await?,
        Commands::Resolve { x, y, click } => cli::cmd_resolve(&config, x, y, click).await?,
        Commands::Filter { districts, group } => cli::cmd_filter(&config, &districts, group.as_deref()).await?,
        Commands::Locate { keyword } => cli::cmd_locate(&config, &keyword).await?,
        Commands::News => cli::cmd_news(&config).await?,
        Commands::Export {
            format,
            output,
            districts,
        } => cli::cmd_export(&config, format, &output, &districts).await?,
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
