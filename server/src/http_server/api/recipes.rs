use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use color_eyre::eyre::eyre;
use db::catalog::{NewRecipe, Page, Recipe, RecipeIngredient, RecipeStep};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AvailabilityParams;
use crate::{
    http_server::{errors::WithStatus as _, ResponseResult},
    AppState,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateRecipe {
    pub number_of_servings: Option<i32>,
    pub time_to_cook: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeDetails {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub steps: Vec<RecipeStep>,
    pub ingredients: Vec<RecipeIngredient>,
}

pub(super) async fn find_recipe(state: &AppState, recipe_id: Uuid) -> ResponseResult<Recipe> {
    Recipe::get_by_id(&state.db, recipe_id)
        .await?
        .ok_or_else(|| eyre!("Recipe {recipe_id} not found"))
        .with_status(StatusCode::NOT_FOUND)
}

/// Recipes that can be cooked from the given ingredients, best rated first.
#[axum_macros::debug_handler]
pub(crate) async fn list_available(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> ResponseResult<Json<Page<Recipe>>> {
    let (filter, page) = params.into_filter()?;

    Ok(Json(state.availability.recipes(&filter, page).await?))
}

/// New recipes always start out in `editing`; publishing goes through moderation.
#[axum_macros::debug_handler]
pub(crate) async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewRecipe>,
) -> ResponseResult<impl IntoResponse> {
    let recipe = Recipe::create(&state.db, &body).await?;

    Ok((StatusCode::CREATED, Json(recipe)))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
) -> ResponseResult<Json<RecipeDetails>> {
    let recipe = find_recipe(&state, recipe_id).await?;
    let steps = state.steps.list_for_recipe(recipe_id).await?;
    let ingredients = RecipeIngredient::requirements(&state.db, recipe_id).await?;

    Ok(Json(RecipeDetails {
        recipe,
        steps,
        ingredients,
    }))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    Json(body): Json<UpdateRecipe>,
) -> ResponseResult<Json<Recipe>> {
    let recipe = find_recipe(&state, recipe_id).await?;

    let updated = recipe
        .update(
            &state.db,
            body.number_of_servings.unwrap_or(recipe.number_of_servings),
            body.time_to_cook.unwrap_or(recipe.time_to_cook),
        )
        .await?;

    Ok(Json(updated))
}
