use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Type};
use std::fmt;
use uuid::Uuid;

use crate::{Result, StoreError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "recipe_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecipeStatus {
    Editing,
    Moderation,
    Rejected,
    Published,
    Stored,
}

impl fmt::Display for RecipeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeStatus::Editing => write!(f, "editing"),
            RecipeStatus::Moderation => write!(f, "moderation"),
            RecipeStatus::Rejected => write!(f, "rejected"),
            RecipeStatus::Published => write!(f, "published"),
            RecipeStatus::Stored => write!(f, "stored"),
        }
    }
}

impl std::str::FromStr for RecipeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "editing" => Ok(RecipeStatus::Editing),
            "moderation" => Ok(RecipeStatus::Moderation),
            "rejected" => Ok(RecipeStatus::Rejected),
            "published" => Ok(RecipeStatus::Published),
            "stored" => Ok(RecipeStatus::Stored),
            _ => Err(format!("Unknown recipe status: {s}")),
        }
    }
}

/// Who is asking for a lifecycle change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Author,
    Admin,
}

impl RecipeStatus {
    /// Admins may set any status; authors only draft, submit or shelve.
    pub fn can_be_set_by(self, actor: Actor) -> bool {
        match actor {
            Actor::Admin => true,
            Actor::Author => matches!(
                self,
                RecipeStatus::Editing | RecipeStatus::Moderation | RecipeStatus::Stored
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecipe {
    pub salad_id: Uuid,
    pub number_of_servings: i32,
    pub time_to_cook: i32,
}

fn check_sizes(number_of_servings: i32, time_to_cook: i32) -> Result<()> {
    if number_of_servings <= 0 {
        return Err(StoreError::invalid("number of servings must be positive"));
    }
    if time_to_cook <= 0 {
        return Err(StoreError::invalid("time to cook must be positive"));
    }

    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    pub recipe_id: Uuid,
    pub salad_id: Uuid,
    pub status: RecipeStatus,
    pub number_of_servings: i32,
    pub time_to_cook: i32, // minutes
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Every recipe starts out in `editing`; only [`Recipe::set_status`] moves it on.
    pub async fn create(pool: &PgPool, new: &NewRecipe) -> Result<Self> {
        check_sizes(new.number_of_servings, new.time_to_cook)?;

        let recipe = sqlx::query_as::<_, Recipe>(
            "
            INSERT INTO recipes (salad_id, status, number_of_servings, time_to_cook)
            VALUES ($1, $2, $3, $4)
            RETURNING
                recipe_id,
                salad_id,
                status,
                number_of_servings,
                time_to_cook,
                rating,
                created_at,
                updated_at
            ",
        )
        .bind(new.salad_id)
        .bind(RecipeStatus::Editing)
        .bind(new.number_of_servings)
        .bind(new.time_to_cook)
        .fetch_one(pool)
        .await?;

        Ok(recipe)
    }

    pub async fn get_by_id(pool: &PgPool, recipe_id: Uuid) -> Result<Option<Self>> {
        let recipe = sqlx::query_as::<_, Recipe>(
            "
            SELECT
                recipe_id,
                salad_id,
                status,
                number_of_servings,
                time_to_cook,
                rating,
                created_at,
                updated_at
            FROM recipes
            WHERE recipe_id = $1
            ",
        )
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?;

        Ok(recipe)
    }

    pub async fn get_by_salad(pool: &PgPool, salad_id: Uuid) -> Result<Option<Self>> {
        let recipe = sqlx::query_as::<_, Recipe>(
            "
            SELECT
                recipe_id,
                salad_id,
                status,
                number_of_servings,
                time_to_cook,
                rating,
                created_at,
                updated_at
            FROM recipes
            WHERE salad_id = $1
            ",
        )
        .bind(salad_id)
        .fetch_optional(pool)
        .await?;

        Ok(recipe)
    }

    pub async fn update(
        &self,
        pool: &PgPool,
        number_of_servings: i32,
        time_to_cook: i32,
    ) -> Result<Self> {
        check_sizes(number_of_servings, time_to_cook)?;

        sqlx::query_as::<_, Recipe>(
            "
            UPDATE recipes
            SET number_of_servings = $2,
                time_to_cook = $3,
                updated_at = NOW()
            WHERE recipe_id = $1
            RETURNING
                recipe_id,
                salad_id,
                status,
                number_of_servings,
                time_to_cook,
                rating,
                created_at,
                updated_at
            ",
        )
        .bind(self.recipe_id)
        .bind(number_of_servings)
        .bind(time_to_cook)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("recipe", self.recipe_id))
    }

    #[tracing::instrument(skip(pool), err)]
    pub async fn set_status(
        pool: &PgPool,
        recipe_id: Uuid,
        status: RecipeStatus,
        actor: Actor,
    ) -> Result<Self> {
        if !status.can_be_set_by(actor) {
            return Err(StoreError::invalid(format!(
                "{actor:?} may not move a recipe to {status}"
            )));
        }

        sqlx::query_as::<_, Recipe>(
            "
            UPDATE recipes
            SET status = $2,
                updated_at = NOW()
            WHERE recipe_id = $1
            RETURNING
                recipe_id,
                salad_id,
                status,
                number_of_servings,
                time_to_cook,
                rating,
                created_at,
                updated_at
            ",
        )
        .bind(recipe_id)
        .bind(status)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("recipe", recipe_id))
    }

    pub async fn delete(pool: &PgPool, recipe_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("recipe", recipe_id));
        }

        Ok(())
    }
}
