use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use color_eyre::eyre::eyre;
use db::catalog::{Comment, Page};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PageParams;
use crate::{
    http_server::{errors::WithStatus as _, ResponseResult},
    AppState,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct NewComment {
    pub author_id: Uuid,
    pub salad_id: Uuid,
    #[serde(default)]
    pub text: String,
    pub rating: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EditComment {
    #[serde(default)]
    pub text: String,
    pub rating: i32,
}

#[axum_macros::debug_handler]
pub(crate) async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewComment>,
) -> ResponseResult<impl IntoResponse> {
    let comment = Comment::create(
        &state.db,
        body.author_id,
        body.salad_id,
        &body.text,
        body.rating,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    Json(body): Json<EditComment>,
) -> ResponseResult<Json<Comment>> {
    Ok(Json(
        Comment::update(&state.db, comment_id, &body.text, body.rating).await?,
    ))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
) -> ResponseResult<StatusCode> {
    Comment::delete(&state.db, comment_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn get_for_author(
    State(state): State<AppState>,
    Path((salad_id, author_id)): Path<(Uuid, Uuid)>,
) -> ResponseResult<Json<Comment>> {
    let comment = Comment::get_by_salad_and_author(&state.db, salad_id, author_id)
        .await?
        .ok_or_else(|| eyre!("No comment by {author_id} on salad {salad_id}"))
        .with_status(StatusCode::NOT_FOUND)?;

    Ok(Json(comment))
}

pub(crate) async fn list_for_salad(
    State(state): State<AppState>,
    Path(salad_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> ResponseResult<Json<Page<Comment>>> {
    let page = params.page.unwrap_or(1);

    Ok(Json(
        Comment::list_by_salad(&state.db, salad_id, page).await?,
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use db::catalog::Recipe;
    use serde_json::json;
    use sqlx::PgPool;

    use super::*;
    use crate::http_server::test_helpers::*;

    #[sqlx::test(migrations = "../db/migrations")]
    async fn comments_update_the_recipe_rating(pool: PgPool) {
        let (salad, recipe) = db::test_utils::salad_with_recipe(&pool, "Caesar").await;
        let app = create_test_app(pool.clone()).await;

        let response = send(
            &app,
            json_request(
                Method::POST,
                "/comments",
                &json!({ "author_id": Uuid::new_v4(), "salad_id": salad.salad_id, "text": "Great", "rating": 4 }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let comment: Comment = response_body_json(response).await;

        let rated = Recipe::get_by_id(&pool, recipe.recipe_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rated.rating, Some(4.0));

        let response = send(
            &app,
            json_request(
                Method::PATCH,
                &format!("/comments/{}", comment.comment_id),
                &json!({ "rating": 2 }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &app,
            empty_request(Method::GET, &format!("/salads/{}/comments", salad.salad_id)),
        )
        .await;
        let page: Page<Comment> = response_body_json(response).await;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].rating, 2);
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn an_authors_comment_and_rated_salads_are_listed(pool: PgPool) {
        let (salad, _recipe) = db::test_utils::salad_with_recipe(&pool, "Nicoise").await;
        let (_unrated, _other) = db::test_utils::salad_with_recipe(&pool, "Plain").await;
        let author = Uuid::new_v4();
        let app = create_test_app(pool).await;
        let uri = format!("/salads/{}/comments/{author}", salad.salad_id);

        let response = send(&app, empty_request(Method::GET, &uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(
            &app,
            json_request(
                Method::POST,
                "/comments",
                &json!({ "author_id": author, "salad_id": salad.salad_id, "rating": 5 }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(&app, empty_request(Method::GET, &uri)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let comment: Comment = response_body_json(response).await;
        assert_eq!(comment.rating, 5);

        let response = send(
            &app,
            empty_request(Method::GET, &format!("/authors/{author}/rated-salads")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let page: Page<db::catalog::Salad> = response_body_json(response).await;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].salad_id, salad.salad_id);
        assert_eq!(page.total_pages, 1);

        let response = send(
            &app,
            empty_request(Method::GET, &format!("/authors/{author}/rated-salads?page=0")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn out_of_range_ratings_are_bad_requests(pool: PgPool) {
        let (salad, _recipe) = db::test_utils::salad_with_recipe(&pool, "Caesar").await;
        let app = create_test_app(pool).await;

        let response = send(
            &app,
            json_request(
                Method::POST,
                "/comments",
                &json!({ "author_id": Uuid::new_v4(), "salad_id": salad.salad_id, "rating": 9 }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
