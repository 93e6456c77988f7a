use clap::Subcommand;
use color_eyre::Result;
use db::catalog::{Actor, Recipe, RecipeStatus, StepSequencer};
use uuid::Uuid;

#[derive(Subcommand)]
pub(crate) enum RecipeAction {
    /// Move a recipe through its lifecycle
    SetStatus {
        id: Uuid,
        status: RecipeStatus,
        /// Act as a moderator, allowing publish and reject
        #[arg(long)]
        admin: bool,
    },
}

impl RecipeAction {
    pub(crate) async fn run(&self) -> Result<()> {
        let pool = super::connect().await?;

        match self {
            RecipeAction::SetStatus { id, status, admin } => {
                let actor = if *admin { Actor::Admin } else { Actor::Author };
                let recipe = Recipe::set_status(&pool, *id, *status, actor).await?;
                println!("{} is now {}", recipe.recipe_id, recipe.status);
            }
        }

        Ok(())
    }
}

#[derive(Subcommand)]
pub(crate) enum StepAction {
    /// Print a recipe's steps in order
    List { recipe_id: Uuid },
}

impl StepAction {
    pub(crate) async fn run(&self) -> Result<()> {
        let steps = StepSequencer::new(super::connect().await?);

        match self {
            StepAction::List { recipe_id } => {
                for step in steps.list_for_recipe(*recipe_id).await? {
                    println!("{:>3}. {}  ({})", step.step_num, step.name, step.step_id);
                }
            }
        }

        Ok(())
    }
}
