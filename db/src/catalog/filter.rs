//! "What can I cook" queries.
//!
//! A recipe matches when every ingredient it requires is in the available
//! set, at least one of its salad's types is in the desired set, its status
//! is the requested one and its rating clears the threshold. Empty sets are
//! wildcards. A recipe that requires nothing matches any ingredient set.
//! Unrated recipes only pass when no positive threshold is asked for.
//!
//! Results are ranked rated-first by rating descending, then by id so pages
//! are stable.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::{Recipe, RecipeStatus, Salad};
use crate::{Result, StoreError};

pub const PAGE_SIZE: i64 = 30;

/// Shared by every availability query. Binds:
/// `$1` status, `$2` minimum rating, `$3` available ingredients,
/// `$4` desired salad types. Expects `recipes` aliased as `r`.
const MATCHES: &str = "
    r.status = $1
    AND ((r.rating IS NULL AND $2::float8 <= 0) OR r.rating >= $2::float8)
    AND (
        cardinality($3::uuid[]) = 0
        OR NOT EXISTS (
            SELECT 1
            FROM recipe_ingredients ri
            WHERE ri.recipe_id = r.recipe_id
              AND NOT (ri.ingredient_id = ANY($3::uuid[]))
        )
    )
    AND (
        cardinality($4::uuid[]) = 0
        OR EXISTS (
            SELECT 1
            FROM salad_type_memberships m
            WHERE m.salad_id = r.salad_id
              AND m.type_id = ANY($4::uuid[])
        )
    )
";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeFilter {
    pub available_ingredients: Vec<Uuid>,
    pub salad_types: Vec<Uuid>,
    pub min_rating: f64,
    pub status: RecipeStatus,
}

impl Default for RecipeFilter {
    fn default() -> Self {
        Self {
            available_ingredients: Vec::new(),
            salad_types: Vec::new(),
            min_rating: 0.0,
            status: RecipeStatus::Published,
        }
    }
}

impl RecipeFilter {
    fn check(&self) -> Result<()> {
        if !self.min_rating.is_finite() {
            return Err(StoreError::invalid("min_rating must be a finite number"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub total_pages: i64,
}

pub fn total_pages(rows: i64, page_size: i64) -> i64 {
    if rows <= 0 {
        return 0;
    }

    (rows + page_size - 1) / page_size
}

/// Row offset of a 1-based page.
pub fn offset(page: i64) -> Result<i64> {
    if page < 1 {
        return Err(StoreError::invalid(format!(
            "page must be at least 1, got {page}"
        )));
    }

    page.checked_sub(1)
        .and_then(|previous| previous.checked_mul(PAGE_SIZE))
        .ok_or_else(|| StoreError::invalid(format!("page {page} is too large")))
}

#[derive(Debug, Clone)]
pub struct AvailabilityFilter {
    pool: PgPool,
}

impl AvailabilityFilter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(name = "AvailabilityFilter::recipes", skip(self), err)]
    pub async fn recipes(&self, filter: &RecipeFilter, page: i64) -> Result<Page<Recipe>> {
        filter.check()?;
        let start = offset(page)?;

        let page_sql = format!(
            "
            SELECT
                r.recipe_id,
                r.salad_id,
                r.status,
                r.number_of_servings,
                r.time_to_cook,
                r.rating,
                r.created_at,
                r.updated_at
            FROM recipes r
            WHERE {MATCHES}
            ORDER BY r.rating IS NULL, r.rating DESC, r.recipe_id
            LIMIT $5 OFFSET $6
            "
        );

        let mut transaction = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *transaction)
            .await?;

        let items = sqlx::query_as::<_, Recipe>(&page_sql)
            .bind(filter.status)
            .bind(filter.min_rating)
            .bind(&filter.available_ingredients)
            .bind(&filter.salad_types)
            .bind(PAGE_SIZE)
            .bind(start)
            .fetch_all(&mut *transaction)
            .await?;

        let rows = count_matches(&mut transaction, filter).await?;
        transaction.commit().await?;

        tracing::debug!(rows, returned = items.len(), "Filtered recipes");

        Ok(Page {
            items,
            page,
            total_pages: total_pages(rows, PAGE_SIZE),
        })
    }

    /// Same matching and ranking as [`Self::recipes`], returning the salads.
    #[tracing::instrument(name = "AvailabilityFilter::salads", skip(self), err)]
    pub async fn salads(&self, filter: &RecipeFilter, page: i64) -> Result<Page<Salad>> {
        filter.check()?;
        let start = offset(page)?;

        let page_sql = format!(
            "
            SELECT
                s.salad_id,
                s.author_id,
                s.name,
                s.description,
                s.created_at,
                s.updated_at
            FROM salads s
            JOIN recipes r ON r.salad_id = s.salad_id
            WHERE {MATCHES}
            ORDER BY r.rating IS NULL, r.rating DESC, s.salad_id
            LIMIT $5 OFFSET $6
            "
        );

        let mut transaction = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *transaction)
            .await?;

        let items = sqlx::query_as::<_, Salad>(&page_sql)
            .bind(filter.status)
            .bind(filter.min_rating)
            .bind(&filter.available_ingredients)
            .bind(&filter.salad_types)
            .bind(PAGE_SIZE)
            .bind(start)
            .fetch_all(&mut *transaction)
            .await?;

        let rows = count_matches(&mut transaction, filter).await?;
        transaction.commit().await?;

        tracing::debug!(rows, returned = items.len(), "Filtered salads");

        Ok(Page {
            items,
            page,
            total_pages: total_pages(rows, PAGE_SIZE),
        })
    }
}

// One recipe per salad, so counting recipes also counts salads.
async fn count_matches(conn: &mut sqlx::PgConnection, filter: &RecipeFilter) -> Result<i64> {
    let count_sql = format!("SELECT COUNT(*) FROM recipes r WHERE {MATCHES}");

    let rows = sqlx::query_scalar::<_, i64>(&count_sql)
        .bind(filter.status)
        .bind(filter.min_rating)
        .bind(&filter.available_ingredients)
        .bind(&filter.salad_types)
        .fetch_one(conn)
        .await?;

    Ok(rows)
}
