use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::filter::{offset, PAGE_SIZE};
use crate::{error::require_text, Result, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SaladType {
    pub type_id: Uuid,
    pub name: String,
    pub description: String,
}

impl SaladType {
    pub async fn create(pool: &PgPool, name: &str, description: &str) -> Result<Self> {
        require_text("salad type name", name)?;

        let salad_type = sqlx::query_as::<_, SaladType>(
            "
            INSERT INTO salad_types (name, description)
            VALUES ($1, $2)
            RETURNING type_id, name, description
            ",
        )
        .bind(name.trim())
        .bind(description)
        .fetch_one(pool)
        .await?;

        Ok(salad_type)
    }

    pub async fn get_by_id(pool: &PgPool, type_id: Uuid) -> Result<Option<Self>> {
        let salad_type = sqlx::query_as::<_, SaladType>(
            "SELECT type_id, name, description FROM salad_types WHERE type_id = $1",
        )
        .bind(type_id)
        .fetch_optional(pool)
        .await?;

        Ok(salad_type)
    }

    pub async fn list_page(pool: &PgPool, page: i64) -> Result<Vec<Self>> {
        let types = sqlx::query_as::<_, SaladType>(
            "
            SELECT type_id, name, description
            FROM salad_types
            ORDER BY name
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(PAGE_SIZE)
        .bind(offset(page)?)
        .fetch_all(pool)
        .await?;

        Ok(types)
    }
}

/// Type membership index: which salad types a salad belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::FromRow, PartialEq, Eq)]
pub struct SaladTypeMembership {
    pub salad_id: Uuid,
    pub type_id: Uuid,
}

impl SaladTypeMembership {
    /// Idempotent: linking an existing pair is a no-op.
    pub async fn link(pool: &PgPool, salad_id: Uuid, type_id: Uuid) -> Result<Self> {
        sqlx::query(
            "
            INSERT INTO salad_type_memberships (salad_id, type_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(salad_id)
        .bind(type_id)
        .execute(pool)
        .await?;

        Ok(Self { salad_id, type_id })
    }

    pub async fn unlink(pool: &PgPool, salad_id: Uuid, type_id: Uuid) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM salad_type_memberships WHERE salad_id = $1 AND type_id = $2")
                .bind(salad_id)
                .bind(type_id)
                .execute(pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "type {type_id} on salad {salad_id}"
            )));
        }

        Ok(())
    }

    pub async fn types_of(pool: &PgPool, salad_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT type_id FROM salad_type_memberships WHERE salad_id = $1 ORDER BY type_id",
        )
        .bind(salad_id)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }

    pub async fn salads_of(pool: &PgPool, type_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT salad_id FROM salad_type_memberships WHERE type_id = $1 ORDER BY salad_id",
        )
        .bind(type_id)
        .fetch_all(pool)
        .await?;

        Ok(ids)
    }
}
