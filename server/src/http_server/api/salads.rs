use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use color_eyre::eyre::eyre;
use db::catalog::{Page, Recipe, Salad, SaladTypeMembership};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AvailabilityParams, PageParams};
use crate::{
    content,
    http_server::{errors::WithStatus as _, ResponseResult},
    AppState,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSalad {
    pub author_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateSalad {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaladDetails {
    #[serde(flatten)]
    pub salad: Salad,
    pub recipe: Option<Recipe>,
    pub type_ids: Vec<Uuid>,
}

async fn find_salad(state: &AppState, salad_id: Uuid) -> ResponseResult<Salad> {
    Salad::get_by_id(&state.db, salad_id)
        .await?
        .ok_or_else(|| eyre!("Salad {salad_id} not found"))
        .with_status(StatusCode::NOT_FOUND)
}

/// Salads whose recipe can be cooked from the given ingredients.
#[axum_macros::debug_handler]
pub(crate) async fn list_available(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> ResponseResult<Json<Page<Salad>>> {
    let (filter, page) = params.into_filter()?;

    Ok(Json(state.availability.salads(&filter, page).await?))
}

#[axum_macros::debug_handler]
pub(crate) async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateSalad>,
) -> ResponseResult<impl IntoResponse> {
    let salad = content::create_salad(&state, body.author_id, &body.name, &body.description).await?;

    Ok((StatusCode::CREATED, Json(salad)))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    Path(salad_id): Path<Uuid>,
) -> ResponseResult<Json<SaladDetails>> {
    let salad = find_salad(&state, salad_id).await?;
    let recipe = Recipe::get_by_salad(&state.db, salad_id).await?;
    let type_ids = SaladTypeMembership::types_of(&state.db, salad_id).await?;

    Ok(Json(SaladDetails {
        salad,
        recipe,
        type_ids,
    }))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(salad_id): Path<Uuid>,
    Json(body): Json<UpdateSalad>,
) -> ResponseResult<Json<Salad>> {
    let salad = find_salad(&state, salad_id).await?;

    let name = body.name.unwrap_or_else(|| salad.name.clone());
    let description = body
        .description
        .unwrap_or_else(|| salad.description.clone());

    Ok(Json(
        content::update_salad(&state, &salad, &name, &description).await?,
    ))
}

/// Salads an author has commented on or rated.
pub(crate) async fn rated_by(
    State(state): State<AppState>,
    Path(author_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> ResponseResult<Json<Page<Salad>>> {
    let page = params.page.unwrap_or(1);

    Ok(Json(Salad::rated_by(&state.db, author_id, page).await?))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(salad_id): Path<Uuid>,
) -> ResponseResult<StatusCode> {
    Salad::delete(&state.db, salad_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use db::catalog::{Actor, RecipeStatus};
    use serde_json::json;
    use sqlx::PgPool;

    use super::*;
    use crate::http_server::{errors::ErrorBody, test_helpers::*};

    #[sqlx::test(migrations = "../db/migrations")]
    async fn create_then_fetch_a_salad(pool: PgPool) {
        let app = create_test_app(pool).await;
        let author_id = Uuid::new_v4();

        let response = send(
            &app,
            json_request(
                Method::POST,
                "/salads",
                &json!({ "author_id": author_id, "name": "Caprese", "description": "Tomato and basil" }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: Salad = response_body_json(response).await;
        assert_eq!(created.author_id, author_id);

        let response = send(
            &app,
            empty_request(Method::GET, &format!("/salads/{}", created.salad_id)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let details: SaladDetails = response_body_json(response).await;
        assert_eq!(details.salad.name, "Caprese");
        assert!(details.recipe.is_none());
        assert!(details.type_ids.is_empty());
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn links_in_salad_text_are_unprocessable(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = send(
            &app,
            json_request(
                Method::POST,
                "/salads",
                &json!({ "author_id": Uuid::new_v4(), "name": "Visit", "description": "www.spam.com" }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorBody = response_body_json(response).await;
        assert!(body.error.contains("url"), "{}", body.error);
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn patch_keeps_fields_that_are_not_sent(pool: PgPool) {
        let (salad, _recipe) = db::test_utils::salad_with_recipe(&pool, "Greek").await;
        let app = create_test_app(pool).await;

        let response = send(
            &app,
            json_request(
                Method::PATCH,
                &format!("/salads/{}", salad.salad_id),
                &json!({ "description": "Feta and olives" }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let updated: Salad = response_body_json(response).await;
        assert_eq!(updated.name, "Greek");
        assert_eq!(updated.description, "Feta and olives");
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn unknown_salads_are_not_found(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = send(
            &app,
            empty_request(Method::GET, &format!("/salads/{}", Uuid::new_v4())),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(
            &app,
            empty_request(Method::DELETE, &format!("/salads/{}", Uuid::new_v4())),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn listing_filters_by_type_and_status(pool: PgPool) {
        let (vegan_salad, _) = db::test_utils::salad_with_recipe(&pool, "Kale").await;
        let (_other, draft) = db::test_utils::salad_with_recipe(&pool, "Draft").await;
        let vegan = db::test_utils::salad_type(&pool, "vegan").await;
        SaladTypeMembership::link(&pool, vegan_salad.salad_id, vegan.type_id)
            .await
            .unwrap();
        Recipe::set_status(&pool, draft.recipe_id, RecipeStatus::Editing, Actor::Author)
            .await
            .unwrap();
        let app = create_test_app(pool).await;

        let response = send(&app, empty_request(Method::GET, "/salads")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let page: Page<Salad> = response_body_json(response).await;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].salad_id, vegan_salad.salad_id);

        let response = send(
            &app,
            empty_request(Method::GET, &format!("/salads?types={}", Uuid::new_v4())),
        )
        .await;
        let page: Page<Salad> = response_body_json(response).await;
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);

        let response = send(&app, empty_request(Method::GET, "/salads?status=editing")).await;
        let page: Page<Salad> = response_body_json(response).await;
        assert_eq!(page.items.len(), 1);
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn malformed_filters_are_bad_requests(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = send(&app, empty_request(Method::GET, "/salads?ingredients=tomato")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, empty_request(Method::GET, "/salads?page=0")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
