//! Application construction: config load, database pool, and run modes.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use figment::{Figment, providers::Env};
use sqlx::ConnectOptions;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

use crate::config::Config;
use crate::state::AppState;

/// Main application struct containing all necessary components
pub struct App {
    config: Config,
    db_pool: sqlx::PgPool,
}

impl App {
    /// Load configuration from the environment.
    pub fn load_config() -> Result<Config, anyhow::Error> {
        Figment::new()
            .merge(Env::raw())
            .extract()
            .context("Failed to load config")
    }

    /// Create a new App instance with the database pool established and
    /// migrations applied.
    pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
        let connect_options = sqlx::postgres::PgConnectOptions::from_str(&config.database_url)
            .context("Failed to parse database URL")?
            .log_statements(tracing::log::LevelFilter::Debug)
            .log_slow_statements(tracing::log::LevelFilter::Warn, Duration::from_secs(1));

        let db_pool = PgPoolOptions::new()
            .min_connections(0)
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(4))
            .idle_timeout(Duration::from_secs(60 * 2))
            .max_lifetime(Duration::from_secs(60 * 30))
            .connect_with(connect_options)
            .await
            .context("Failed to create database pool")?;

        info!(
            min_connections = 0,
            max_connections = 4,
            acquire_timeout = "4s",
            "database pool established"
        );

        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .context("Failed to run database migrations")?;
        info!("database migrations completed");

        Ok(App { config, db_pool })
    }

    /// Serve the web API until a shutdown signal arrives.
    pub async fn serve(self) -> Result<(), anyhow::Error> {
        let port = self.config.port;
        let state = AppState::new(self.db_pool, self.config);
        let router = crate::web::create_router(state);

        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
            .await
            .with_context(|| format!("Failed to bind port {port}"))?;
        info!(port, "web server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Web server error")
    }

    /// Run one-shot imports for the given semesters, stopping at the first
    /// failure.
    pub async fn import(self, semester_ids: &[String]) -> Result<(), anyhow::Error> {
        for semester_id in semester_ids {
            info!(semester_id, "importing semester");
            match crate::importer::import_semester(&self.config, &self.db_pool, semester_id).await
            {
                Ok(count) => info!(semester_id, sections = count, "imported semester"),
                Err(e) => {
                    error!(semester_id, error = %e, "semester import failed");
                    return Err(anyhow::Error::new(e));
                }
            }
        }
        Ok(())
    }
}

async fn shutdown_signal() {
    // SIGTERM is what container platforms send first; Ctrl+C covers local use.
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
