//! Fixtures shared by the `db` and `server` test suites.
//!
//! These panic on failure; they are only compiled for tests.

use sqlx::PgPool;
use uuid::Uuid;

use crate::catalog::{
    Actor, Ingredient, Measurement, NewRecipe, Recipe, RecipeIngredient, RecipeStatus,
    RecipeStep, Salad, SaladType, StepSequencer,
};

/// A salad owned by a fresh author, with a published two-serving recipe.
pub async fn salad_with_recipe(pool: &PgPool, name: &str) -> (Salad, Recipe) {
    let salad = Salad::create(pool, Uuid::new_v4(), name, "")
        .await
        .expect("Failed to create salad");

    let recipe = Recipe::create(
        pool,
        &NewRecipe {
            salad_id: salad.salad_id,
            number_of_servings: 2,
            time_to_cook: 10,
        },
    )
    .await
    .expect("Failed to create recipe");

    let recipe = Recipe::set_status(pool, recipe.recipe_id, RecipeStatus::Published, Actor::Admin)
        .await
        .expect("Failed to publish recipe");

    (salad, recipe)
}

/// A published recipe whose steps are `names`, numbered from 1.
pub async fn recipe_with_steps(pool: &PgPool, names: &[&str]) -> (Recipe, Vec<RecipeStep>) {
    let (salad, recipe) = salad_with_recipe(pool, &format!("Salad {}", Uuid::new_v4())).await;
    debug_assert_eq!(recipe.salad_id, salad.salad_id);

    let sequencer = StepSequencer::new(pool.clone());
    let mut steps = Vec::with_capacity(names.len());
    for name in names {
        let step = sequencer
            .insert(recipe.recipe_id, name, &format!("{name} description"))
            .await
            .expect("Failed to insert step");
        steps.push(step);
    }

    (recipe, steps)
}

pub async fn set_rating(pool: &PgPool, recipe_id: Uuid, rating: Option<f64>) {
    sqlx::query("UPDATE recipes SET rating = $2 WHERE recipe_id = $1")
        .bind(recipe_id)
        .bind(rating)
        .execute(pool)
        .await
        .expect("Failed to set rating");
}

pub async fn ingredient(pool: &PgPool, name: &str) -> Ingredient {
    Ingredient::create(pool, name, 10, None)
        .await
        .expect("Failed to create ingredient")
}

pub async fn measurement(pool: &PgPool, name: &str, grams: i32) -> Measurement {
    Measurement::create(pool, name, grams)
        .await
        .expect("Failed to create measurement")
}

pub async fn salad_type(pool: &PgPool, name: &str) -> SaladType {
    SaladType::create(pool, name, "")
        .await
        .expect("Failed to create salad type")
}

/// Links each ingredient to the recipe, one "unit" apiece.
pub async fn require(pool: &PgPool, recipe_id: Uuid, ingredient_ids: &[Uuid]) {
    let unit = match sqlx::query_scalar::<_, Uuid>(
        "SELECT measurement_id FROM measurements WHERE name = 'unit'",
    )
    .fetch_optional(pool)
    .await
    .expect("Failed to look up unit")
    {
        Some(id) => id,
        None => measurement(pool, "unit", 1).await.measurement_id,
    };

    for ingredient_id in ingredient_ids {
        RecipeIngredient::link(pool, recipe_id, *ingredient_id, unit, 1)
            .await
            .expect("Failed to link ingredient");
    }
}
