use color_eyre::eyre::{eyre, Context as _};
use sqlx::{migrate::Migrator, postgres::PgPoolOptions};

pub mod catalog;
pub mod error;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{Result, StoreError};
pub use sqlx;
pub use sqlx::PgPool;

pub static MIGRATOR: Migrator = sqlx::migrate!();

const MIGRATION_LOCK_ID: i64 = 0x5A_1A_D5_5A_1A_D5;

/// Connects to Postgres and brings the schema up to date.
///
/// Migrations run under a session advisory lock so several processes can
/// boot against the same database at once.
#[tracing::instrument(skip(database_url), err)]
pub async fn setup_db_pool(database_url: &str, max_connections: u32) -> color_eyre::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .wrap_err("Failed to connect to the database")?;

    let mut conn = pool.acquire().await?;

    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(MIGRATION_LOCK_ID)
        .execute(&mut *conn)
        .await?;

    let migrated = MIGRATOR.run(&mut *conn).await;

    let unlock_result = sqlx::query_scalar::<_, Option<bool>>("SELECT pg_advisory_unlock($1)")
        .bind(MIGRATION_LOCK_ID)
        .fetch_one(&mut *conn)
        .await?;

    migrated.wrap_err("Failed to run migrations")?;

    match unlock_result {
        Some(true) => tracing::info!("Migration lock unlocked"),
        Some(false) => tracing::warn!("Migration lock was not held when unlocking"),
        None => return Err(eyre!("Failed to unlock migration lock")),
    }

    Ok(pool)
}
