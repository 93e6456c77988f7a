use std::{sync::Arc, time::Duration};

use color_eyre::eyre::Context;
use db::{
    catalog::{AvailabilityFilter, StepSequencer},
    setup_db_pool,
    validation::{KeywordCache, UrlValidator, ValidationChain},
    PgPool,
};
use tracing::instrument;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub port: u16,
    pub request_timeout: Duration,
}

fn parse_env<T>(key: &str, default: T) -> color_eyre::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .wrap_err_with(|| format!("Invalid {key}: {value:?}")),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    #[instrument(name = "AppConfig::from_env")]
    pub fn from_env() -> color_eyre::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .wrap_err("Missing DATABASE_URL, needed for app launch")?;

        Ok(Self {
            database_url,
            max_connections: parse_env("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            port: parse_env("PORT", DEFAULT_PORT)?,
            request_timeout: Duration::from_secs(parse_env(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AppState {
    pub db: PgPool,
    pub steps: StepSequencer,
    pub availability: AvailabilityFilter,
    pub keywords: Arc<KeywordCache>,
    pub validation: ValidationChain,
}

impl AppState {
    #[instrument(name = "AppState::from_env", err)]
    pub async fn from_env() -> color_eyre::Result<(AppConfig, Self)> {
        let config = AppConfig::from_env()?;
        let pool = setup_db_pool(&config.database_url, config.max_connections).await?;
        let state = Self::from_pool(pool).await?;

        Ok((config, state))
    }

    /// Builds the services around an already migrated pool.
    pub async fn from_pool(db: PgPool) -> color_eyre::Result<Self> {
        let keywords = Arc::new(
            KeywordCache::load(db.clone())
                .await
                .wrap_err("Failed to load banned keywords")?,
        );

        let validation = ValidationChain::new()
            .with(keywords.clone())
            .with(UrlValidator);

        Ok(Self {
            steps: StepSequencer::new(db.clone()),
            availability: AvailabilityFilter::new(db.clone()),
            keywords,
            validation,
            db,
        })
    }
}
