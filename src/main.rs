//! slotkeeper server
//!
//! Reservation API for parking spaces and charger slots.
//!
//! ```sh
//! # Run with default config (~/.config/slotkeeper/config.toml)
//! slotkeeper
//!
//! # Custom config path and port
//! slotkeeper --config /etc/slotkeeper/config.toml --api-port 8081
//!
//! # Validate config without starting
//! slotkeeper --check
//!
//! # Mint a bearer token signed with the configured secret
//! slotkeeper --issue-token alice --role admin
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use slotkeeper::config::{default_config_path, AppConfig, CONFIG_ENV_VAR};
use slotkeeper::infrastructure::identity::create_token;
use slotkeeper::server::{init_tracing, ServerHandle, ServerOptions};

/// slotkeeper: time-slot reservations with conflict detection.
#[derive(Parser, Debug)]
#[command(
    name = "slotkeeper",
    version,
    about = "Reservation API for parking spaces and charger slots",
    long_about = "slotkeeper: REST API for booking parking spaces and charger slots \
                  without overlapping reservations.\n\n\
                  Default config: ~/.config/slotkeeper/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Print a bearer token for USER_ID and exit.
    #[arg(long, value_name = "USER_ID")]
    issue_token: Option<String>,

    /// Role to embed in the issued token. Repeatable.
    #[arg(long = "role", requires = "issue_token")]
    roles: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            if cli.check {
                return Err(e.into());
            }
            init_tracing(&AppConfig::default());
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
            AppConfig::fallback()
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.api_port {
        config.server.api_port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    // ── One-shot modes ─────────────────────────────────────────
    if let Some(user_id) = cli.issue_token {
        let token = create_token(&user_id, &cli.roles, &config.jwt_config())?;
        println!("{}", token);
        return Ok(());
    }

    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.api_address());
        println!("   Database    : {}", config.database.url);
        println!("   Log level   : {}", config.logging.level);
        if config.jwt_config().uses_default_secret() {
            println!("   WARNING     : security.jwt_secret is the built-in development key");
        }
        println!(
            "   Known-resource check : {}",
            config.scheduling.require_known_resource
        );
        return Ok(());
    }

    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.wait().await;

    Ok(())
}
