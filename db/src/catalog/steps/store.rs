//! Row-level statements over `recipe_steps`.
//!
//! Every function takes a connection that is already inside a transaction;
//! committing or rolling back is the sequencer's job.

use sqlx::PgConnection;
use uuid::Uuid;

use super::{sequence::Shift, RecipeStep};
use crate::{Result, StoreError};

#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub(crate) struct StepPosition {
    pub recipe_id: Uuid,
    pub step_num: i32,
    pub max_step_num: i32,
}

/// Serializes writers of one recipe's steps until the transaction ends.
pub(crate) async fn lock_recipe(conn: &mut PgConnection, recipe_id: Uuid) -> Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(recipe_id.to_string())
        .execute(conn)
        .await?;

    Ok(())
}

pub(crate) async fn owning_recipe(conn: &mut PgConnection, step_id: Uuid) -> Result<Uuid> {
    sqlx::query_scalar::<_, Uuid>("SELECT recipe_id FROM recipe_steps WHERE step_id = $1")
        .bind(step_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("recipe step", step_id))
}

/// Reads a step's position together with the recipe's current step count.
pub(crate) async fn locate(conn: &mut PgConnection, step_id: Uuid) -> Result<StepPosition> {
    sqlx::query_as::<_, StepPosition>(
        "
        SELECT
            s.recipe_id,
            s.step_num,
            (
                SELECT MAX(other.step_num)
                FROM recipe_steps other
                WHERE other.recipe_id = s.recipe_id
            ) AS max_step_num
        FROM recipe_steps s
        WHERE s.step_id = $1
        ",
    )
    .bind(step_id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| StoreError::not_found("recipe step", step_id))
}

pub(crate) async fn append(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    name: &str,
    description: &str,
) -> Result<RecipeStep> {
    let step = sqlx::query_as::<_, RecipeStep>(
        "
        INSERT INTO recipe_steps (recipe_id, step_num, name, description)
        SELECT $1, COALESCE(MAX(step_num), 0) + 1, $2, $3
        FROM recipe_steps
        WHERE recipe_id = $1
        RETURNING
            step_id,
            recipe_id,
            step_num,
            name,
            description,
            created_at,
            updated_at
        ",
    )
    .bind(recipe_id)
    .bind(name)
    .bind(description)
    .fetch_one(conn)
    .await?;

    Ok(step)
}

/// Slides every step of `recipe_id` inside `shift` by `shift.delta`.
pub(crate) async fn shift(conn: &mut PgConnection, recipe_id: Uuid, shift: Shift) -> Result<u64> {
    let result = sqlx::query(
        "
        UPDATE recipe_steps
        SET step_num = step_num + $4,
            updated_at = NOW()
        WHERE recipe_id = $1
          AND step_num BETWEEN $2 AND $3
        ",
    )
    .bind(recipe_id)
    .bind(shift.from)
    .bind(shift.to)
    .bind(shift.delta)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

pub(crate) async fn place(
    conn: &mut PgConnection,
    step_id: Uuid,
    step_num: i32,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<RecipeStep> {
    let step = sqlx::query_as::<_, RecipeStep>(
        "
        UPDATE recipe_steps
        SET step_num = $2,
            name = COALESCE($3, name),
            description = COALESCE($4, description),
            updated_at = NOW()
        WHERE step_id = $1
        RETURNING
            step_id,
            recipe_id,
            step_num,
            name,
            description,
            created_at,
            updated_at
        ",
    )
    .bind(step_id)
    .bind(step_num)
    .bind(name)
    .bind(description)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| StoreError::not_found("recipe step", step_id))?;

    Ok(step)
}

pub(crate) async fn delete_one(conn: &mut PgConnection, step_id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM recipe_steps WHERE step_id = $1")
        .bind(step_id)
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::not_found("recipe step", step_id));
    }

    Ok(())
}

pub(crate) async fn delete_all(conn: &mut PgConnection, recipe_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM recipe_steps WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

pub(crate) async fn positions(conn: &mut PgConnection, recipe_id: Uuid) -> Result<Vec<i32>> {
    let positions = sqlx::query_scalar::<_, i32>(
        "SELECT step_num FROM recipe_steps WHERE recipe_id = $1 ORDER BY step_num",
    )
    .bind(recipe_id)
    .fetch_all(conn)
    .await?;

    Ok(positions)
}
