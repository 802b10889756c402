//! Gianged HR - Desktop administration of collaborators and departments.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::Parser;
use eframe::egui;
use gianged_hr as app;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use app::auth::{AuthProvider, AuthSession, IdentityToolkitAuth, LocalAuth};
use app::config::{AppConfig, AuthBackend, ConfigLoadResult, StoreBackend};
use app::db;
use app::store::{DocumentStore, MemoryStore, PostgresStore};
use app::ui::App;

/// Desktop HR administration for collaborators and departments.
#[derive(Parser)]
#[command(name = "gianged-hr")]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    /// Explicit config file path
    #[arg(long, value_name = "PATH", conflicts_with = "dev")]
    config: Option<PathBuf>,

    /// In-memory store and local accounts, ignoring the config file
    #[arg(long)]
    offline: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Console plus a daily rolling file; keep the guard alive until exit.
    let file_appender = tracing_appender::rolling::daily(AppConfig::log_dir(), "gianged-hr.log");
    let (file_writer, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    tracing::info!("Gianged HR starting...");

    let config = load_config(&cli)?;

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    let store = rt.block_on(open_store(&config))?;
    let session = AuthSession::new(auth_provider(&config)?);

    run_main_app(rt, store, session, config)
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    if cli.offline {
        tracing::info!("Offline mode: in-memory store with local accounts");
        return Ok(AppConfig::offline());
    }

    let config_path = match (&cli.config, cli.dev) {
        (Some(path), _) => path.clone(),
        (None, true) => {
            tracing::info!("Dev mode: loading config from current directory");
            PathBuf::from("config.toml")
        }
        (None, false) => AppConfig::default_path(),
    };
    tracing::info!("Config path: {:?}", config_path);

    match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => {
            tracing::info!("Config loaded successfully");
            Ok(config)
        }
        ConfigLoadResult::Missing => {
            tracing::warn!("Config missing, using defaults");
            Ok(AppConfig::default())
        }
        ConfigLoadResult::Invalid(e) => Err(anyhow!("Invalid config {}: {e}", config_path.display())),
    }
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let store = PostgresStore::connect(&config.store.connection_string())
                .await
                .context("Failed to connect to database")?;

            if let Ok(version) = db::get_version(store.connection()).await {
                tracing::info!("PostgreSQL: {}", version);
            }

            if let Ok(counts) = db::get_collection_counts(&store).await {
                tracing::info!(
                    "Collections: {} departments, {} collaborators",
                    counts.departments,
                    counts.collaborators
                );
            }

            Ok(Arc::new(store))
        }
    }
}

fn auth_provider(config: &AppConfig) -> anyhow::Result<Arc<dyn AuthProvider>> {
    match config.auth.provider {
        AuthBackend::Local => {
            tracing::info!("Using local accounts");
            Ok(Arc::new(LocalAuth::new()))
        }
        AuthBackend::IdentityToolkit => {
            let provider = IdentityToolkitAuth::new(&config.auth.endpoint, &config.auth.api_key)
                .context("Failed to create the auth client")?;
            Ok(Arc::new(provider))
        }
    }
}

/// Run the main application.
fn run_main_app(
    rt: tokio::runtime::Runtime,
    store: Arc<dyn DocumentStore>,
    session: AuthSession,
    config: AppConfig,
) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Gianged HR")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Gianged HR",
        options,
        Box::new(|cc| {
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            Ok(Box::new(App::new(rt, store, session, config)))
        }),
    )
    .map_err(|e| anyhow!("UI error: {e}"))
}
