use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::filter::{offset, PAGE_SIZE};
use crate::{error::require_text, Result, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    pub ingredient_id: Uuid,
    pub ingredient_type_id: Option<Uuid>,
    pub name: String,
    pub calories: i32,
    pub created_at: DateTime<Utc>,
}

impl Ingredient {
    pub async fn create(
        pool: &PgPool,
        name: &str,
        calories: i32,
        ingredient_type_id: Option<Uuid>,
    ) -> Result<Self> {
        require_text("ingredient name", name)?;
        if calories < 0 {
            return Err(StoreError::invalid("calories must not be negative"));
        }

        let ingredient = sqlx::query_as::<_, Ingredient>(
            "
            INSERT INTO ingredients (name, calories, ingredient_type_id)
            VALUES ($1, $2, $3)
            RETURNING
                ingredient_id,
                ingredient_type_id,
                name,
                calories,
                created_at
            ",
        )
        .bind(name.trim())
        .bind(calories)
        .bind(ingredient_type_id)
        .fetch_one(pool)
        .await?;

        Ok(ingredient)
    }

    pub async fn get_by_id(pool: &PgPool, ingredient_id: Uuid) -> Result<Option<Self>> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "
            SELECT
                ingredient_id,
                ingredient_type_id,
                name,
                calories,
                created_at
            FROM ingredients
            WHERE ingredient_id = $1
            ",
        )
        .bind(ingredient_id)
        .fetch_optional(pool)
        .await?;

        Ok(ingredient)
    }

    /// Alphabetical page of ingredients, `PAGE_SIZE` at a time.
    pub async fn list_page(pool: &PgPool, page: i64) -> Result<Vec<Self>> {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            "
            SELECT
                ingredient_id,
                ingredient_type_id,
                name,
                calories,
                created_at
            FROM ingredients
            ORDER BY name
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(PAGE_SIZE)
        .bind(offset(page)?)
        .fetch_all(pool)
        .await?;

        Ok(ingredients)
    }
}

/// A grouping of ingredients such as "vegetable" or "cheese".
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct IngredientType {
    pub ingredient_type_id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl IngredientType {
    pub async fn create(pool: &PgPool, name: &str, description: &str) -> Result<Self> {
        require_text("ingredient type name", name)?;

        let ingredient_type = sqlx::query_as::<_, IngredientType>(
            "
            INSERT INTO ingredient_types (name, description)
            VALUES ($1, $2)
            RETURNING ingredient_type_id, name, description, created_at
            ",
        )
        .bind(name.trim())
        .bind(description)
        .fetch_one(pool)
        .await?;

        Ok(ingredient_type)
    }

    pub async fn get_by_id(pool: &PgPool, ingredient_type_id: Uuid) -> Result<Option<Self>> {
        let ingredient_type = sqlx::query_as::<_, IngredientType>(
            "
            SELECT ingredient_type_id, name, description, created_at
            FROM ingredient_types
            WHERE ingredient_type_id = $1
            ",
        )
        .bind(ingredient_type_id)
        .fetch_optional(pool)
        .await?;

        Ok(ingredient_type)
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let ingredient_types = sqlx::query_as::<_, IngredientType>(
            "
            SELECT ingredient_type_id, name, description, created_at
            FROM ingredient_types
            ORDER BY name
            ",
        )
        .fetch_all(pool)
        .await?;

        Ok(ingredient_types)
    }

    pub async fn update(
        pool: &PgPool,
        ingredient_type_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Self> {
        require_text("ingredient type name", name)?;

        sqlx::query_as::<_, IngredientType>(
            "
            UPDATE ingredient_types
            SET name = $2,
                description = $3
            WHERE ingredient_type_id = $1
            RETURNING ingredient_type_id, name, description, created_at
            ",
        )
        .bind(ingredient_type_id)
        .bind(name.trim())
        .bind(description)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("ingredient type", ingredient_type_id))
    }

    /// Ingredients of a deleted type become untyped.
    pub async fn delete(pool: &PgPool, ingredient_type_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM ingredient_types WHERE ingredient_type_id = $1")
            .bind(ingredient_type_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("ingredient type", ingredient_type_id));
        }

        Ok(())
    }
}

/// A unit an ingredient amount is expressed in, e.g. "tablespoon".
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Measurement {
    pub measurement_id: Uuid,
    pub name: String,
    pub grams: i32,
}

impl Measurement {
    pub async fn create(pool: &PgPool, name: &str, grams: i32) -> Result<Self> {
        require_text("measurement name", name)?;
        if grams <= 0 {
            return Err(StoreError::invalid("grams must be positive"));
        }

        let measurement = sqlx::query_as::<_, Measurement>(
            "
            INSERT INTO measurements (name, grams)
            VALUES ($1, $2)
            RETURNING measurement_id, name, grams
            ",
        )
        .bind(name.trim())
        .bind(grams)
        .fetch_one(pool)
        .await?;

        Ok(measurement)
    }

    pub async fn get_by_id(pool: &PgPool, measurement_id: Uuid) -> Result<Option<Self>> {
        let measurement = sqlx::query_as::<_, Measurement>(
            "SELECT measurement_id, name, grams FROM measurements WHERE measurement_id = $1",
        )
        .bind(measurement_id)
        .fetch_optional(pool)
        .await?;

        Ok(measurement)
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let measurements = sqlx::query_as::<_, Measurement>(
            "SELECT measurement_id, name, grams FROM measurements ORDER BY name",
        )
        .fetch_all(pool)
        .await?;

        Ok(measurements)
    }
}

/// One row of the ingredient requirement index: recipe needs `amount` of
/// `ingredient_id` measured in `measurement_id`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecipeIngredient {
    pub recipe_ingredient_id: Uuid,
    pub recipe_id: Uuid,
    pub ingredient_id: Uuid,
    pub measurement_id: Uuid,
    pub amount: i32,
    pub created_at: DateTime<Utc>,
}

impl RecipeIngredient {
    /// Adds a requirement, or replaces the amount and unit of an existing one.
    pub async fn link(
        pool: &PgPool,
        recipe_id: Uuid,
        ingredient_id: Uuid,
        measurement_id: Uuid,
        amount: i32,
    ) -> Result<Self> {
        if amount <= 0 {
            return Err(StoreError::invalid("amount must be positive"));
        }

        let link = sqlx::query_as::<_, RecipeIngredient>(
            "
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, measurement_id, amount)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (recipe_id, ingredient_id) DO UPDATE
            SET measurement_id = EXCLUDED.measurement_id,
                amount = EXCLUDED.amount
            RETURNING
                recipe_ingredient_id,
                recipe_id,
                ingredient_id,
                measurement_id,
                amount,
                created_at
            ",
        )
        .bind(recipe_id)
        .bind(ingredient_id)
        .bind(measurement_id)
        .bind(amount)
        .fetch_one(pool)
        .await?;

        Ok(link)
    }

    pub async fn unlink(pool: &PgPool, recipe_id: Uuid, ingredient_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM recipe_ingredients WHERE recipe_id = $1 AND ingredient_id = $2",
        )
        .bind(recipe_id)
        .bind(ingredient_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "ingredient {ingredient_id} on recipe {recipe_id}"
            )));
        }

        Ok(())
    }

    pub async fn unlink_all(pool: &PgPool, recipe_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn requirements(pool: &PgPool, recipe_id: Uuid) -> Result<Vec<Self>> {
        let links = sqlx::query_as::<_, RecipeIngredient>(
            "
            SELECT
                recipe_ingredient_id,
                recipe_id,
                ingredient_id,
                measurement_id,
                amount,
                created_at
            FROM recipe_ingredients
            WHERE recipe_id = $1
            ORDER BY created_at, recipe_ingredient_id
            ",
        )
        .bind(recipe_id)
        .fetch_all(pool)
        .await?;

        Ok(links)
    }

    pub async fn required_ingredient_ids(pool: &PgPool, recipe_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT ingredient_id FROM recipe_ingredients WHERE recipe_id = $1 ORDER BY ingredient_id",
        )
        .bind(recipe_id)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }
}
