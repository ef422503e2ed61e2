//! Reusable server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: metrics recorder, store
//! selection, migrations, catalog seeding, REST API and graceful shutdown.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::{CatalogService, Scheduler};
use crate::config::{AppConfig, JWT_SECRET_ENV_VAR};
use crate::domain::{IdentityProvider, RepositoryProvider};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
use crate::infrastructure::database::seed::seed_default_catalog;
use crate::infrastructure::{init_database, InMemoryRepositoryProvider, JwtIdentityProvider};
use crate::interfaces::http::{create_api_router, ApiContext};
use crate::shared::{InfraError, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the server.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running reservation API.
///
/// ```rust,no_run
/// use slotkeeper::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub repos: Arc<dyn RepositoryProvider>,
    pub config: AppConfig,
    /// Port actually bound (differs from config when it asked for 0)
    pub api_port: u16,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownSignal,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, InfraError> {
        let app_cfg = opts.config;
        info!("Starting slotkeeper...");

        let prometheus = prometheus_handle()?;

        // ── Store ──────────────────────────────────────────────
        let (repos, db): (Arc<dyn RepositoryProvider>, Option<DatabaseConnection>) =
            if app_cfg.database.is_in_memory() {
                warn!("Using in-memory store; reservations are lost on restart");
                (Arc::new(InMemoryRepositoryProvider::new()), None)
            } else {
                let db = init_database(&app_cfg.database_config()).await?;
                if opts.auto_migrate {
                    info!("Running database migrations...");
                    Migrator::up(&db, None).await?;
                    info!("Migrations completed");
                }
                (Arc::new(SeaOrmRepositoryProvider::new(db.clone())), Some(db))
            };

        if app_cfg.scheduling.seed_default_catalog {
            seed_default_catalog(repos.resources()).await?;
        }

        // ── Services ───────────────────────────────────────────
        let jwt_config = app_cfg.jwt_config();
        if jwt_config.uses_default_secret() {
            warn!(
                "security.jwt_secret is the built-in development key; anyone can mint tokens. \
                 Set it in the config file or via {}",
                JWT_SECRET_ENV_VAR
            );
        }
        info!(
            issuer = %jwt_config.issuer,
            expiration_hours = jwt_config.expiration_hours,
            "JWT identity provider configured"
        );
        let identity: Arc<dyn IdentityProvider> = Arc::new(JwtIdentityProvider::new(jwt_config));
        let scheduler = Arc::new(Scheduler::new(repos.clone(), app_cfg.scheduler_config()));
        let catalog = Arc::new(CatalogService::new(repos.clone()));

        let api_router = create_api_router(ApiContext {
            scheduler,
            catalog,
            identity,
            db: db.clone(),
            metrics: Some(prometheus),
        });

        // ── REST API server ────────────────────────────────────
        let listener = tokio::net::TcpListener::bind(app_cfg.api_address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let shutdown = ShutdownSignal::new();
        let api_shutdown = shutdown.clone();
        let api_server = axum::serve(
            listener,
            api_router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!(error = %e, "REST API server error");
            }
        });

        Ok(Self {
            repos,
            config: app_cfg,
            api_port: local_addr.port(),
            db,
            shutdown,
            api_task,
        })
    }

    /// Trigger shutdown on SIGTERM / SIGINT.
    pub fn install_signal_handler(&self) {
        self.shutdown.listen_for_os_signals();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Wait for the server to stop, then close the database.
    ///
    /// Once shutdown is triggered, in-flight requests get
    /// `server.shutdown_timeout` seconds before the task is aborted.
    pub async fn wait(self) {
        let grace = Duration::from_secs(self.config.server.shutdown_timeout);
        let mut api_task = self.api_task;

        tokio::select! {
            result = &mut api_task => log_task_exit(result),
            _ = self.shutdown.wait() => {
                match tokio::time::timeout(grace, &mut api_task).await {
                    Ok(result) => log_task_exit(result),
                    Err(_) => {
                        warn!(timeout_secs = grace.as_secs(), "Shutdown timed out, aborting server task");
                        api_task.abort();
                    }
                }
            }
        }

        if let Some(db) = self.db {
            if let Err(e) = db.close().await {
                warn!(error = %e, "Error closing database connection");
            } else {
                info!("Database connection closed");
            }
        }
        info!("slotkeeper shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

fn log_task_exit(result: Result<(), tokio::task::JoinError>) {
    match result {
        Ok(()) => info!("REST API server stopped"),
        Err(e) => error!(error = %e, "REST API server task panicked"),
    }
}

/// The global metrics recorder can only be installed once per process, so
/// restarts within one process reuse the first handle.
fn prometheus_handle() -> Result<PrometheusHandle, InfraError> {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = PROM_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| InfraError::Metrics(e.to_string()))?;
    info!("Prometheus metrics recorder installed");
    Ok(PROM_HANDLE.get_or_init(|| handle).clone())
}

/// Initialize tracing (logging) from the application config.
///
/// Call once at process startup, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };
    if let Err(e) = result {
        eprintln!("tracing already initialized: {}", e);
    }
}
