use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use db::catalog::{RecipeStep, StepEdit};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::recipes::find_recipe;
use crate::{content, http_server::ResponseResult, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct NewStep {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MoveStep {
    pub step_num: i32,
    #[serde(flatten)]
    pub edit: StepEdit,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Removed {
    pub removed: u64,
}

pub(crate) async fn list(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
) -> ResponseResult<Json<Vec<RecipeStep>>> {
    find_recipe(&state, recipe_id).await?;

    Ok(Json(state.steps.list_for_recipe(recipe_id).await?))
}

#[axum_macros::debug_handler]
pub(crate) async fn create(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    Json(body): Json<NewStep>,
) -> ResponseResult<impl IntoResponse> {
    let step = content::add_step(&state, recipe_id, &body.name, &body.description).await?;

    Ok((StatusCode::CREATED, Json(step)))
}

pub(crate) async fn remove_all(
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
) -> ResponseResult<Json<Removed>> {
    find_recipe(&state, recipe_id).await?;
    let removed = state.steps.remove_all_for_recipe(recipe_id).await?;

    Ok(Json(Removed { removed }))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path(step_id): Path<Uuid>,
) -> ResponseResult<Json<RecipeStep>> {
    Ok(Json(state.steps.get(step_id).await?))
}

/// Moves a step and optionally renames it, all in one transaction.
#[axum_macros::debug_handler]
pub(crate) async fn move_step(
    State(state): State<AppState>,
    Path(step_id): Path<Uuid>,
    Json(body): Json<MoveStep>,
) -> ResponseResult<Json<RecipeStep>> {
    let step = content::move_step(&state, step_id, body.step_num, body.edit).await?;

    Ok(Json(step))
}

pub(crate) async fn remove(
    State(state): State<AppState>,
    Path(step_id): Path<Uuid>,
) -> ResponseResult<StatusCode> {
    state.steps.remove(step_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
