use axum::{
    routing::{get, patch, post, put},
    Router,
};

use super::api::{comments, keywords, links, recipes, reference, salads, steps};
use crate::AppState;

pub(crate) fn make_router() -> Router<AppState> {
    Router::new()
        .route("/_health", get(reference::health))
        .route("/salads", get(salads::list_available).post(salads::create))
        .route(
            "/salads/{id}",
            get(salads::get).patch(salads::update).delete(salads::delete),
        )
        .route("/salads/{id}/comments", get(comments::list_for_salad))
        .route(
            "/salads/{id}/comments/{author_id}",
            get(comments::get_for_author),
        )
        .route("/authors/{id}/rated-salads", get(salads::rated_by))
        .route(
            "/salads/{id}/types/{type_id}",
            put(links::add_type).delete(links::remove_type),
        )
        .route("/recipes", get(recipes::list_available).post(recipes::create))
        .route("/recipes/{id}", get(recipes::get).patch(recipes::update))
        .route(
            "/recipes/{id}/steps",
            get(steps::list)
                .post(steps::create)
                .delete(steps::remove_all),
        )
        .route(
            "/recipes/{id}/ingredients/{ingredient_id}",
            put(links::require_ingredient).delete(links::drop_ingredient),
        )
        .route(
            "/steps/{id}",
            get(steps::get).patch(steps::move_step).delete(steps::remove),
        )
        .route("/comments", post(comments::create))
        .route(
            "/comments/{id}",
            patch(comments::update).delete(comments::delete),
        )
        .route("/keywords", get(keywords::list).post(keywords::create))
        .route("/keywords/{id}", axum::routing::delete(keywords::delete))
        .route(
            "/ingredients",
            get(reference::list_ingredients).post(reference::create_ingredient),
        )
        .route(
            "/ingredient-types",
            get(reference::list_ingredient_types).post(reference::create_ingredient_type),
        )
        .route(
            "/ingredient-types/{id}",
            get(reference::get_ingredient_type)
                .patch(reference::update_ingredient_type)
                .delete(reference::delete_ingredient_type),
        )
        .route(
            "/measurements",
            get(reference::list_measurements).post(reference::create_measurement),
        )
        .route(
            "/salad-types",
            get(reference::list_salad_types).post(reference::create_salad_type),
        )
}
