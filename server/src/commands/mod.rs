use clap::Subcommand;
use color_eyre::Result;

pub(crate) mod catalog;
pub(crate) mod keywords;
pub(crate) mod serve;

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the HTTP API
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Manage the banned keyword list
    Keywords {
        #[command(subcommand)]
        action: keywords::KeywordAction,
    },
    /// Recipe administration
    Recipes {
        #[command(subcommand)]
        action: catalog::RecipeAction,
    },
    /// Inspect recipe steps
    Steps {
        #[command(subcommand)]
        action: catalog::StepAction,
    },
}

impl Default for Command {
    fn default() -> Self {
        Self::Serve
    }
}

impl Command {
    pub(crate) async fn run(&self) -> Result<()> {
        match &self {
            Command::Serve => serve::serve().await,
            Command::Migrate => serve::migrate().await,
            Command::Keywords { action } => action.run().await,
            Command::Recipes { action } => action.run().await,
            Command::Steps { action } => action.run().await,
        }
    }
}

/// Connects and migrates without loading the rest of the app state.
pub(crate) async fn connect() -> Result<db::PgPool> {
    let config = crate::AppConfig::from_env()?;

    db::setup_db_pool(&config.database_url, config.max_connections).await
}
