use color_eyre::Result;
use tracing::info;

use crate::{http_server, AppState};

pub(crate) async fn serve() -> Result<()> {
    let (config, app_state) = AppState::from_env().await?;

    info!(port = config.port, "Starting salad catalog API");
    http_server::run_server(&config, app_state).await?;

    info!("Main Returning");

    Ok(())
}

pub(crate) async fn migrate() -> Result<()> {
    let pool = super::connect().await?;
    pool.close().await;

    info!("Migrations applied");

    Ok(())
}
