use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use db::validation::Keyword;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{http_server::ResponseResult, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct NewKeyword {
    pub word: String,
}

pub(crate) async fn list(State(state): State<AppState>) -> ResponseResult<Json<Vec<Keyword>>> {
    Ok(Json(state.keywords.list().await?))
}

/// Bans a word. The shared cache is refreshed before this returns, so the
/// very next write is checked against it.
#[axum_macros::debug_handler]
pub(crate) async fn create(
    State(state): State<AppState>,
    Json(body): Json<NewKeyword>,
) -> ResponseResult<impl IntoResponse> {
    let keyword = state.keywords.add(&body.word).await?;

    Ok((StatusCode::CREATED, Json(keyword)))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    Path(keyword_id): Path<Uuid>,
) -> ResponseResult<StatusCode> {
    state.keywords.remove(keyword_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use serde_json::json;
    use sqlx::PgPool;

    use super::*;
    use crate::http_server::test_helpers::*;

    #[sqlx::test(migrations = "../db/migrations")]
    async fn banning_a_word_applies_immediately(pool: PgPool) {
        let app = create_test_app(pool).await;
        let salad = |name: &str| {
            json_request(
                Method::POST,
                "/salads",
                &json!({ "author_id": Uuid::new_v4(), "name": name }),
            )
        };

        let response = send(&app, salad("Cheap salad")).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(
            &app,
            json_request(Method::POST, "/keywords", &json!({ "word": "Cheap" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let keyword: Keyword = response_body_json(response).await;
        assert_eq!(keyword.word, "cheap");

        let response = send(&app, salad("Cheap salad")).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = send(
            &app,
            empty_request(Method::DELETE, &format!("/keywords/{}", keyword.keyword_id)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, salad("Cheap salad")).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn phrases_cannot_be_banned(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = send(
            &app,
            json_request(Method::POST, "/keywords", &json!({ "word": "buy now" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, empty_request(Method::GET, "/keywords")).await;
        let keywords: Vec<Keyword> = response_body_json(response).await;
        assert!(keywords.is_empty());
    }
}
