//! Ingredients and their types, measurement units, salad types and the health check.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use color_eyre::eyre::{eyre, WrapErr};
use db::catalog::{Ingredient, IngredientType, Measurement, SaladType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PageParams;
use crate::{
    http_server::{errors::WithStatus as _, ResponseResult},
    AppState,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct NewIngredient {
    pub name: String,
    #[serde(default)]
    pub calories: i32,
    pub ingredient_type_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngredientTypeBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewMeasurement {
    pub name: String,
    pub grams: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewSaladType {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

pub(crate) async fn health(State(state): State<AppState>) -> ResponseResult<&'static str> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .wrap_err("Database is unreachable")
        .with_status(StatusCode::SERVICE_UNAVAILABLE)?;

    Ok("OK")
}

pub(crate) async fn list_ingredients(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ResponseResult<Json<Vec<Ingredient>>> {
    Ok(Json(
        Ingredient::list_page(&state.db, params.page.unwrap_or(1)).await?,
    ))
}

pub(crate) async fn create_ingredient(
    State(state): State<AppState>,
    Json(body): Json<NewIngredient>,
) -> ResponseResult<impl IntoResponse> {
    let ingredient = Ingredient::create(
        &state.db,
        &body.name,
        body.calories,
        body.ingredient_type_id,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(ingredient)))
}

pub(crate) async fn list_ingredient_types(
    State(state): State<AppState>,
) -> ResponseResult<Json<Vec<IngredientType>>> {
    Ok(Json(IngredientType::list_all(&state.db).await?))
}

pub(crate) async fn create_ingredient_type(
    State(state): State<AppState>,
    Json(body): Json<IngredientTypeBody>,
) -> ResponseResult<impl IntoResponse> {
    let ingredient_type =
        IngredientType::create(&state.db, &body.name, &body.description).await?;

    Ok((StatusCode::CREATED, Json(ingredient_type)))
}

pub(crate) async fn get_ingredient_type(
    State(state): State<AppState>,
    Path(ingredient_type_id): Path<Uuid>,
) -> ResponseResult<Json<IngredientType>> {
    let ingredient_type = IngredientType::get_by_id(&state.db, ingredient_type_id)
        .await?
        .ok_or_else(|| eyre!("Ingredient type {ingredient_type_id} not found"))
        .with_status(StatusCode::NOT_FOUND)?;

    Ok(Json(ingredient_type))
}

pub(crate) async fn update_ingredient_type(
    State(state): State<AppState>,
    Path(ingredient_type_id): Path<Uuid>,
    Json(body): Json<IngredientTypeBody>,
) -> ResponseResult<Json<IngredientType>> {
    Ok(Json(
        IngredientType::update(&state.db, ingredient_type_id, &body.name, &body.description)
            .await?,
    ))
}

pub(crate) async fn delete_ingredient_type(
    State(state): State<AppState>,
    Path(ingredient_type_id): Path<Uuid>,
) -> ResponseResult<StatusCode> {
    IngredientType::delete(&state.db, ingredient_type_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn list_measurements(
    State(state): State<AppState>,
) -> ResponseResult<Json<Vec<Measurement>>> {
    Ok(Json(Measurement::list_all(&state.db).await?))
}

pub(crate) async fn create_measurement(
    State(state): State<AppState>,
    Json(body): Json<NewMeasurement>,
) -> ResponseResult<impl IntoResponse> {
    let measurement = Measurement::create(&state.db, &body.name, body.grams).await?;

    Ok((StatusCode::CREATED, Json(measurement)))
}

pub(crate) async fn list_salad_types(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> ResponseResult<Json<Vec<SaladType>>> {
    Ok(Json(
        SaladType::list_page(&state.db, params.page.unwrap_or(1)).await?,
    ))
}

pub(crate) async fn create_salad_type(
    State(state): State<AppState>,
    Json(body): Json<NewSaladType>,
) -> ResponseResult<impl IntoResponse> {
    let salad_type = SaladType::create(&state.db, &body.name, &body.description).await?;

    Ok((StatusCode::CREATED, Json(salad_type)))
}
