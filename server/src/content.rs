//! Writes of user supplied text. Each one runs the validation chain over
//! every free-text field before touching the database.

use db::{
    catalog::{RecipeStep, Salad, StepEdit},
    Result,
};
use uuid::Uuid;

use crate::AppState;

#[tracing::instrument(skip(state, description), err)]
pub(crate) async fn create_salad(
    state: &AppState,
    author_id: Uuid,
    name: &str,
    description: &str,
) -> Result<Salad> {
    state
        .validation
        .verify_fields(&[("name", name), ("description", description)])?;

    Salad::create(&state.db, author_id, name, description).await
}

#[tracing::instrument(skip(state, salad, description), fields(salad_id = %salad.salad_id), err)]
pub(crate) async fn update_salad(
    state: &AppState,
    salad: &Salad,
    name: &str,
    description: &str,
) -> Result<Salad> {
    state
        .validation
        .verify_fields(&[("name", name), ("description", description)])?;

    salad.update(&state.db, name, description).await
}

#[tracing::instrument(skip(state, description), err)]
pub(crate) async fn add_step(
    state: &AppState,
    recipe_id: Uuid,
    name: &str,
    description: &str,
) -> Result<RecipeStep> {
    state
        .validation
        .verify_fields(&[("name", name), ("description", description)])?;

    state.steps.insert(recipe_id, name, description).await
}

#[tracing::instrument(skip(state, edit), err)]
pub(crate) async fn move_step(
    state: &AppState,
    step_id: Uuid,
    step_num: i32,
    edit: StepEdit,
) -> Result<RecipeStep> {
    let name = edit.name.as_deref().unwrap_or_default();
    let description = edit.description.as_deref().unwrap_or_default();
    state
        .validation
        .verify_fields(&[("name", name), ("description", description)])?;

    state.steps.move_to(step_id, step_num, edit).await
}
