use common::{
    env_config::Config,
    error::{AppError, Res},
};
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};
use std::{str::FromStr, sync::Arc, time::Duration};

pub mod consulta;
pub mod plan;
pub mod profile;
pub mod rest;
pub mod store;
pub mod subscription;

#[cfg(any(test, feature = "memory"))]
pub mod memory;

pub mod models {
    pub mod consulta;
    pub mod plan;
    pub mod profile;
    pub mod subscription;
}

pub mod dtos {
    pub mod consulta;
    pub mod profile;
    pub mod subscription;
}

pub use store::Store;

/// Shared, possibly unconfigured, store handle.
pub type StoreHandle = Option<Arc<dyn Store>>;

/// Opens the Postgres pool and optionally applies the embedded migrations.
pub async fn setup(
    database_url: &str,
    require_ssl: bool,
    run_migrations: bool,
    acquire_timeout: Duration,
) -> Res<Arc<PgPool>> {
    let url = url::Url::parse(database_url)
        .map_err(|e| AppError::Internal(format!("Invalid DATABASE_URL: {}", e)))?;
    let host = url.host_str().unwrap_or("localhost");
    let port = url.port().unwrap_or(5432);
    let db_name = url.path().trim_start_matches('/');

    let mut options = PgConnectOptions::from_str(database_url)?;
    if require_ssl {
        options = options.ssl_mode(PgSslMode::Require);
    }

    let pool = PgPoolOptions::new()
        .acquire_timeout(acquire_timeout)
        .connect_with(options)
        .await?;
    log::info!("Connected to Postgres at {}:{}/{}", host, port, db_name);

    if run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!("Migrations applied");
    }

    Ok(Arc::new(pool))
}

/// Builds the store selected by the configuration.
///
/// `DATABASE_URL` wins over the REST endpoint. With neither configured the
/// handle is `None` and the account services turn into no-ops.
pub async fn connect(config: &Config) -> Res<StoreHandle> {
    let timeout = Duration::from_secs(config.store_timeout_secs);

    if let Some(database_url) = &config.database_url {
        let pool = setup(
            database_url,
            config.is_production(),
            config.run_migrations,
            timeout,
        )
        .await?;
        return Ok(Some(Arc::new(store::PgStore::new(pool))));
    }

    match (&config.supabase_url, &config.supabase_service_key) {
        (Some(base_url), Some(key)) => {
            let store = rest::RestStore::new(base_url, key.clone(), timeout)?;
            log::info!("Using REST store at {}", base_url);
            Ok(Some(Arc::new(store)))
        }
        _ => {
            log::warn!(
                "No store configured; bootstrap, usage snapshots and query logging are disabled"
            );
            Ok(None)
        }
    }
}
