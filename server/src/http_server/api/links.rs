//! Writes to the ingredient requirement and type membership link tables.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use db::catalog::{RecipeIngredient, SaladTypeMembership};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{http_server::ResponseResult, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct Requirement {
    pub measurement_id: Uuid,
    pub amount: i32,
}

pub(crate) async fn require_ingredient(
    State(state): State<AppState>,
    Path((recipe_id, ingredient_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<Requirement>,
) -> ResponseResult<Json<RecipeIngredient>> {
    let link = RecipeIngredient::link(
        &state.db,
        recipe_id,
        ingredient_id,
        body.measurement_id,
        body.amount,
    )
    .await?;

    Ok(Json(link))
}

pub(crate) async fn drop_ingredient(
    State(state): State<AppState>,
    Path((recipe_id, ingredient_id)): Path<(Uuid, Uuid)>,
) -> ResponseResult<StatusCode> {
    RecipeIngredient::unlink(&state.db, recipe_id, ingredient_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn add_type(
    State(state): State<AppState>,
    Path((salad_id, type_id)): Path<(Uuid, Uuid)>,
) -> ResponseResult<Json<SaladTypeMembership>> {
    Ok(Json(
        SaladTypeMembership::link(&state.db, salad_id, type_id).await?,
    ))
}

pub(crate) async fn remove_type(
    State(state): State<AppState>,
    Path((salad_id, type_id)): Path<(Uuid, Uuid)>,
) -> ResponseResult<StatusCode> {
    SaladTypeMembership::unlink(&state.db, salad_id, type_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
