//! Salad comments and the recipe rating they feed.
//!
//! `recipes.rating` is the mean of the salad's comment ratings and is only
//! ever written here, in the same transaction as the comment change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::filter::{offset, total_pages, Page, PAGE_SIZE};
use crate::{Result, StoreError};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub comment_id: Uuid,
    pub author_id: Uuid,
    pub salad_id: Uuid,
    pub text: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn check_rating(rating: i32) -> Result<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(StoreError::invalid(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )));
    }

    Ok(())
}

async fn refresh_rating(conn: &mut PgConnection, salad_id: Uuid) -> Result<()> {
    sqlx::query(
        "
        UPDATE recipes
        SET rating = (
                SELECT AVG(c.rating)::float8
                FROM comments c
                WHERE c.salad_id = $1
            ),
            updated_at = NOW()
        WHERE salad_id = $1
        ",
    )
    .bind(salad_id)
    .execute(conn)
    .await?;

    Ok(())
}

impl Comment {
    #[tracing::instrument(skip(pool, text), err)]
    pub async fn create(
        pool: &PgPool,
        author_id: Uuid,
        salad_id: Uuid,
        text: &str,
        rating: i32,
    ) -> Result<Self> {
        check_rating(rating)?;

        let mut transaction = pool.begin().await?;

        let comment = sqlx::query_as::<_, Comment>(
            "
            INSERT INTO comments (author_id, salad_id, text, rating)
            VALUES ($1, $2, $3, $4)
            RETURNING
                comment_id,
                author_id,
                salad_id,
                text,
                rating,
                created_at,
                updated_at
            ",
        )
        .bind(author_id)
        .bind(salad_id)
        .bind(text)
        .bind(rating)
        .fetch_one(&mut *transaction)
        .await?;

        refresh_rating(&mut transaction, salad_id).await?;
        transaction.commit().await?;

        Ok(comment)
    }

    pub async fn get_by_id(pool: &PgPool, comment_id: Uuid) -> Result<Option<Self>> {
        let comment = sqlx::query_as::<_, Comment>(
            "
            SELECT
                comment_id,
                author_id,
                salad_id,
                text,
                rating,
                created_at,
                updated_at
            FROM comments
            WHERE comment_id = $1
            ",
        )
        .bind(comment_id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    #[tracing::instrument(skip(pool, text), err)]
    pub async fn update(pool: &PgPool, comment_id: Uuid, text: &str, rating: i32) -> Result<Self> {
        check_rating(rating)?;

        let mut transaction = pool.begin().await?;

        let comment = sqlx::query_as::<_, Comment>(
            "
            UPDATE comments
            SET text = $2,
                rating = $3,
                updated_at = NOW()
            WHERE comment_id = $1
            RETURNING
                comment_id,
                author_id,
                salad_id,
                text,
                rating,
                created_at,
                updated_at
            ",
        )
        .bind(comment_id)
        .bind(text)
        .bind(rating)
        .fetch_optional(&mut *transaction)
        .await?
        .ok_or_else(|| StoreError::not_found("comment", comment_id))?;

        refresh_rating(&mut transaction, comment.salad_id).await?;
        transaction.commit().await?;

        Ok(comment)
    }

    #[tracing::instrument(skip(pool), err)]
    pub async fn delete(pool: &PgPool, comment_id: Uuid) -> Result<()> {
        let mut transaction = pool.begin().await?;

        let salad_id = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM comments WHERE comment_id = $1 RETURNING salad_id",
        )
        .bind(comment_id)
        .fetch_optional(&mut *transaction)
        .await?
        .ok_or_else(|| StoreError::not_found("comment", comment_id))?;

        refresh_rating(&mut transaction, salad_id).await?;
        transaction.commit().await?;

        Ok(())
    }

    /// The one comment `author_id` left on `salad_id`, if any.
    pub async fn get_by_salad_and_author(
        pool: &PgPool,
        salad_id: Uuid,
        author_id: Uuid,
    ) -> Result<Option<Self>> {
        let comment = sqlx::query_as::<_, Comment>(
            "
            SELECT
                comment_id,
                author_id,
                salad_id,
                text,
                rating,
                created_at,
                updated_at
            FROM comments
            WHERE salad_id = $1
              AND author_id = $2
            ",
        )
        .bind(salad_id)
        .bind(author_id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Newest comments first.
    pub async fn list_by_salad(pool: &PgPool, salad_id: Uuid, page: i64) -> Result<Page<Self>> {
        let start = offset(page)?;

        let comments = sqlx::query_as::<_, Comment>(
            "
            SELECT
                comment_id,
                author_id,
                salad_id,
                text,
                rating,
                created_at,
                updated_at
            FROM comments
            WHERE salad_id = $1
            ORDER BY created_at DESC, comment_id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(salad_id)
        .bind(PAGE_SIZE)
        .bind(start)
        .fetch_all(pool)
        .await?;

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE salad_id = $1")
            .bind(salad_id)
            .fetch_one(pool)
            .await?;

        Ok(Page {
            items: comments,
            page,
            total_pages: total_pages(count, PAGE_SIZE),
        })
    }
}
