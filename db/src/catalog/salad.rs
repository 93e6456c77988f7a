use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::filter::{offset, total_pages, Page, PAGE_SIZE};
use crate::{error::require_text, Result, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Salad {
    pub salad_id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Salad {
    pub async fn create(
        pool: &PgPool,
        author_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Self> {
        require_text("salad name", name)?;

        let salad = sqlx::query_as::<_, Salad>(
            "
            INSERT INTO salads (author_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING
                salad_id,
                author_id,
                name,
                description,
                created_at,
                updated_at
            ",
        )
        .bind(author_id)
        .bind(name)
        .bind(description)
        .fetch_one(pool)
        .await?;

        Ok(salad)
    }

    pub async fn get_by_id(pool: &PgPool, salad_id: Uuid) -> Result<Option<Self>> {
        let salad = sqlx::query_as::<_, Salad>(
            "
            SELECT
                salad_id,
                author_id,
                name,
                description,
                created_at,
                updated_at
            FROM salads
            WHERE salad_id = $1
            ",
        )
        .bind(salad_id)
        .fetch_optional(pool)
        .await?;

        Ok(salad)
    }

    pub async fn list_by_author(pool: &PgPool, author_id: Uuid) -> Result<Vec<Self>> {
        let salads = sqlx::query_as::<_, Salad>(
            "
            SELECT
                salad_id,
                author_id,
                name,
                description,
                created_at,
                updated_at
            FROM salads
            WHERE author_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(author_id)
        .fetch_all(pool)
        .await?;

        Ok(salads)
    }

    /// Salads `author_id` has commented on, most recently rated first.
    #[tracing::instrument(name = "Salad::rated_by", skip(pool), err)]
    pub async fn rated_by(pool: &PgPool, author_id: Uuid, page: i64) -> Result<Page<Self>> {
        let start = offset(page)?;

        let mut transaction = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *transaction)
            .await?;

        let salads = sqlx::query_as::<_, Salad>(
            "
            SELECT
                s.salad_id,
                s.author_id,
                s.name,
                s.description,
                s.created_at,
                s.updated_at
            FROM salads s
            JOIN comments c ON c.salad_id = s.salad_id
            WHERE c.author_id = $1
            ORDER BY c.updated_at DESC, s.salad_id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(author_id)
        .bind(PAGE_SIZE)
        .bind(start)
        .fetch_all(&mut *transaction)
        .await?;

        // One comment per author and salad, so comments count salads.
        let rows =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE author_id = $1")
                .bind(author_id)
                .fetch_one(&mut *transaction)
                .await?;
        transaction.commit().await?;

        Ok(Page {
            items: salads,
            page,
            total_pages: total_pages(rows, PAGE_SIZE),
        })
    }

    pub async fn update(&self, pool: &PgPool, name: &str, description: &str) -> Result<Self> {
        require_text("salad name", name)?;

        sqlx::query_as::<_, Salad>(
            "
            UPDATE salads
            SET name = $2,
                description = $3,
                updated_at = NOW()
            WHERE salad_id = $1
            RETURNING
                salad_id,
                author_id,
                name,
                description,
                created_at,
                updated_at
            ",
        )
        .bind(self.salad_id)
        .bind(name)
        .bind(description)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("salad", self.salad_id))
    }

    /// Removes the salad together with its recipe, steps and links.
    pub async fn delete(pool: &PgPool, salad_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM salads WHERE salad_id = $1")
            .bind(salad_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("salad", salad_id));
        }

        Ok(())
    }
}
