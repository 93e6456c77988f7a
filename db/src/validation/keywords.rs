use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::Validator;
use crate::{Result, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Keyword {
    pub keyword_id: Uuid,
    pub word: String,
    pub created_at: DateTime<Utc>,
}

/// The form both stored keywords and checked words are compared in.
fn fold(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

impl Keyword {
    /// Lowercases a banned word and trims surrounding punctuation, refusing
    /// blanks and phrases.
    pub fn normalize(word: &str) -> Result<String> {
        let mut words = word.split_whitespace();

        let single = match (words.next(), words.next()) {
            (None, _) => return Err(StoreError::invalid("keyword must not be empty")),
            (Some(_), Some(_)) => {
                return Err(StoreError::invalid(format!(
                    "keyword must be a single word, got {word:?}"
                )))
            }
            (Some(single), None) => fold(single),
        };

        if single.is_empty() {
            return Err(StoreError::invalid(format!(
                "keyword must contain a letter or digit, got {word:?}"
            )));
        }

        Ok(single)
    }

    pub async fn create(pool: &PgPool, word: &str) -> Result<Self> {
        let word = Self::normalize(word)?;

        let keyword = sqlx::query_as::<_, Keyword>(
            "
            INSERT INTO keywords (word)
            VALUES ($1)
            RETURNING
                keyword_id,
                word,
                created_at
            ",
        )
        .bind(word)
        .fetch_one(pool)
        .await?;

        Ok(keyword)
    }

    pub async fn get_by_id(pool: &PgPool, keyword_id: Uuid) -> Result<Option<Self>> {
        let keyword = sqlx::query_as::<_, Keyword>(
            "
            SELECT
                keyword_id,
                word,
                created_at
            FROM keywords
            WHERE keyword_id = $1
            ",
        )
        .bind(keyword_id)
        .fetch_optional(pool)
        .await?;

        Ok(keyword)
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let keywords = sqlx::query_as::<_, Keyword>(
            "
            SELECT
                keyword_id,
                word,
                created_at
            FROM keywords
            ORDER BY word
            ",
        )
        .fetch_all(pool)
        .await?;

        Ok(keywords)
    }

    pub async fn update(pool: &PgPool, keyword_id: Uuid, word: &str) -> Result<Self> {
        let word = Self::normalize(word)?;

        sqlx::query_as::<_, Keyword>(
            "
            UPDATE keywords
            SET word = $2
            WHERE keyword_id = $1
            RETURNING
                keyword_id,
                word,
                created_at
            ",
        )
        .bind(keyword_id)
        .bind(word)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| StoreError::not_found("keyword", keyword_id))
    }

    pub async fn delete(pool: &PgPool, keyword_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM keywords WHERE keyword_id = $1")
            .bind(keyword_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("keyword", keyword_id));
        }

        Ok(())
    }
}

/// In-memory copy of the banned word list.
///
/// The whole set is loaded on construction and reloaded from the database
/// after every successful write made through the cache. Writes made by other
/// processes become visible on their next write or an explicit [`refresh`].
///
/// [`refresh`]: KeywordCache::refresh
#[derive(Debug)]
pub struct KeywordCache {
    pool: PgPool,
    words: RwLock<HashMap<String, Uuid>>,
}

impl KeywordCache {
    #[tracing::instrument(name = "KeywordCache::load", skip(pool), err)]
    pub async fn load(pool: PgPool) -> Result<Self> {
        let cache = Self {
            pool,
            words: RwLock::new(HashMap::new()),
        };
        cache.refresh().await?;

        Ok(cache)
    }

    pub async fn refresh(&self) -> Result<()> {
        let words: HashMap<String, Uuid> = Keyword::list_all(&self.pool)
            .await?
            .into_iter()
            .map(|keyword| (keyword.word, keyword.keyword_id))
            .collect();

        tracing::debug!(count = words.len(), "Loaded banned keywords");

        *self.words.write().unwrap_or_else(PoisonError::into_inner) = words;

        Ok(())
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn add(&self, word: &str) -> Result<Keyword> {
        let keyword = Keyword::create(&self.pool, word).await?;
        self.refresh().await?;

        Ok(keyword)
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn update(&self, keyword_id: Uuid, word: &str) -> Result<Keyword> {
        let keyword = Keyword::update(&self.pool, keyword_id, word).await?;
        self.refresh().await?;

        Ok(keyword)
    }

    #[tracing::instrument(skip(self), err)]
    pub async fn remove(&self, keyword_id: Uuid) -> Result<()> {
        Keyword::delete(&self.pool, keyword_id).await?;
        self.refresh().await?;

        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Keyword>> {
        Keyword::list_all(&self.pool).await
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&fold(word))
    }

    pub fn len(&self) -> usize {
        self.words
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Validator for KeywordCache {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn verify(&self, word: &str) -> Result<(), String> {
        if word.split_whitespace().nth(1).is_some() {
            return Err("accepts only one word".to_string());
        }

        if self.contains(word) {
            return Err(format!("found banned word {word}"));
        }

        Ok(())
    }
}
